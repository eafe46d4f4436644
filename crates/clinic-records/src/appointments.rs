//! 预约管理
//!
//! 预约只能以“已预约”状态创建；完成和取消都是终态，预约记录从不删除。

use crate::registry::ClinicalRecords;
use crate::state_machine::AppointmentEvent;
use chrono::{Local, NaiveDate, Utc};
use clinic_core::validation::require_text;
use clinic_core::{
    Appointment, AppointmentId, AppointmentStatus, AppointmentType, ClinicError, DoctorId,
    PatientId, Result, TimeSlot,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// 预约请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentRequest {
    pub doctor_id: Option<DoctorId>,
    pub date: Option<NaiveDate>,
    pub time: String,
    #[serde(rename = "type", default)]
    pub appointment_type: AppointmentType,
    pub reason: String,
}

/// 通过校验的预约内容
struct CheckedBooking {
    doctor_id: DoctorId,
    doctor_name: String,
    date: NaiveDate,
    time: TimeSlot,
    reason: String,
}

impl ClinicalRecords {
    /// 校验预约请求但不写入
    pub fn validate_appointment(
        &self,
        patient_id: PatientId,
        request: &AppointmentRequest,
        today: NaiveDate,
    ) -> Result<()> {
        self.check_booking(patient_id, request, today).map(|_| ())
    }

    fn check_booking(
        &self,
        patient_id: PatientId,
        request: &AppointmentRequest,
        today: NaiveDate,
    ) -> Result<CheckedBooking> {
        self.require_patient(patient_id)?;

        let doctor_id = request
            .doctor_id
            .ok_or_else(|| ClinicError::validation("doctor_id", "Select a doctor"))?;
        let doctor = self
            .directory()
            .get(doctor_id)
            .ok_or_else(|| ClinicError::validation("doctor_id", format!("Unknown doctor {}", doctor_id)))?;

        let date = request
            .date
            .ok_or_else(|| ClinicError::validation("date", "Select a date"))?;
        if date < today {
            return Err(ClinicError::validation("date", "Choose a future date"));
        }

        let time = TimeSlot::parse(&request.time)
            .ok_or_else(|| ClinicError::validation("time", "Select a time"))?;
        let reason = require_text("reason", &request.reason, "Provide a reason")?;

        Ok(CheckedBooking {
            doctor_id,
            doctor_name: doctor.name.clone(),
            date,
            time,
            reason: reason.to_string(),
        })
    }

    /// 以本地日期为“今天”预约
    pub fn add_appointment(&mut self, patient_id: PatientId, request: AppointmentRequest) -> Result<Appointment> {
        self.add_appointment_as_of(patient_id, request, Local::now().date_naive())
    }

    /// 预约，`today` 之前的日期视为无效
    pub fn add_appointment_as_of(
        &mut self,
        patient_id: PatientId,
        request: AppointmentRequest,
        today: NaiveDate,
    ) -> Result<Appointment> {
        let booking = self.check_booking(patient_id, &request, today)?;

        let appointment = Appointment {
            id: self.next_id(),
            doctor_id: booking.doctor_id,
            doctor_name: booking.doctor_name,
            date: booking.date,
            time: booking.time,
            appointment_type: request.appointment_type,
            reason: booking.reason,
            status: AppointmentStatus::Scheduled,
            created_at: Some(Utc::now()),
        };

        self.patient_mut(patient_id)?.appointments.push(appointment.clone());
        info!(
            "Booked appointment {} for patient {} with doctor {} on {} {}",
            appointment.id, patient_id, appointment.doctor_id, appointment.date, appointment.time
        );
        Ok(appointment)
    }

    /// 更新预约状态
    ///
    /// 目标状态只能是完成或取消。重复设置同一终态不做任何修改；
    /// 从一个终态改到另一个终态时直接覆盖（后写为准）。
    pub fn update_appointment_status(
        &mut self,
        patient_id: PatientId,
        appointment_id: AppointmentId,
        new_status: AppointmentStatus,
    ) -> Result<Appointment> {
        let event = AppointmentEvent::for_target(new_status).ok_or_else(|| {
            ClinicError::validation("status", "Appointments cannot be moved back to scheduled")
        })?;

        let current = self
            .require_patient(patient_id)?
            .appointment(appointment_id)
            .ok_or_else(|| appointment_not_found(patient_id, appointment_id))?
            .status;

        let next = if current == new_status {
            debug!("Appointment {} already {}", appointment_id, current);
            current
        } else if self.state_machine().can_transition(current, event) {
            self.state_machine().transition(current, event)?
        } else {
            warn!(
                "Overwriting terminal status of appointment {} from {} to {}",
                appointment_id, current, new_status
            );
            new_status
        };

        let appointment = self
            .patient_mut(patient_id)?
            .appointments
            .iter_mut()
            .find(|a| a.id == appointment_id)
            .ok_or_else(|| appointment_not_found(patient_id, appointment_id))?;
        appointment.status = next;

        info!(
            "Updated appointment {} status from {} to {}",
            appointment_id, current, next
        );
        Ok(appointment.clone())
    }
}

fn appointment_not_found(patient_id: PatientId, appointment_id: AppointmentId) -> ClinicError {
    ClinicError::NotFound(format!(
        "Appointment {} not found for patient {}",
        appointment_id, patient_id
    ))
}
