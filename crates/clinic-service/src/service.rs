//! 诊所服务
//!
//! [`ClinicService`] 在应用根构造一次，之后以引用方式传递。所有写操作
//! 先完成授权和校验，再经过模拟延迟，最后一次性提交；延迟期间取消时
//! 不产生任何修改。

use crate::access::{require_doctor, require_patient, require_patient_or_doctor};
use chrono::Local;
use clinic_core::validation::{non_blank, optional_email, require_phone, require_text};
use clinic_core::{
    Appointment, AppointmentId, AppointmentStatus, ClinicError, Doctor, Patient, PatientId,
    Prescription, Result,
};
use clinic_records::views::{
    dashboard_stats, filter_appointments, patient_dashboard, patient_summaries, prescription_overview,
};
use clinic_records::{
    AppointmentFilter, AppointmentRequest, ClinicalRecords, DashboardStats, NewPatient,
    PatientDashboard, PatientSummary, PrescriptionDraft, PrescriptionOverview, PrescriptionUpdate,
};
use clinic_session::{Actor, DoctorIdentity, PatientIdentity, SessionStore};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// 模拟延迟设置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencySettings {
    pub login: Duration,
    pub registration: Duration,
    pub booking: Duration,
}

impl LatencySettings {
    pub fn from_millis(login_ms: u64, registration_ms: u64, booking_ms: u64) -> Self {
        Self {
            login: Duration::from_millis(login_ms),
            registration: Duration::from_millis(registration_ms),
            booking: Duration::from_millis(booking_ms),
        }
    }

    /// 不等待
    pub fn none() -> Self {
        Self::from_millis(0, 0, 0)
    }
}

impl Default for LatencySettings {
    fn default() -> Self {
        Self::from_millis(1000, 1000, 1200)
    }
}

/// 医生看板
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorDashboard {
    pub stats: DashboardStats,
    pub patients: Vec<PatientSummary>,
}

/// 诊所服务
#[derive(Debug)]
pub struct ClinicService {
    session: SessionStore,
    records: ClinicalRecords,
    latency: LatencySettings,
}

impl ClinicService {
    /// 组装服务
    ///
    /// 恢复出的患者会话编号会被预留，新注册的患者不会拿到同一个编号；
    /// 登记表里找不到该患者或手机号不一致时，会话作废。
    pub fn new(mut session: SessionStore, records: ClinicalRecords, latency: LatencySettings) -> Self {
        if let Some(identity) = session.actor().as_patient() {
            records.reserve_id(identity.id);
            let stale = records
                .patient(identity.id)
                .map_or(true, |p| p.contact_info.phone != identity.phone);
            if stale {
                warn!(
                    "Restored session for patient {} does not match the registry, logging out",
                    identity.id
                );
                session.logout();
            }
        }

        info!(
            "Clinic service started: {} patients, {} doctors, session {:?}",
            records.len(),
            records.directory().len(),
            session.actor().kind()
        );
        Self {
            session,
            records,
            latency,
        }
    }

    pub fn actor(&self) -> &Actor {
        self.session.actor()
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn records(&self) -> &ClinicalRecords {
        &self.records
    }

    // ---------------------------------------------------------------------
    // 登录与注册
    // ---------------------------------------------------------------------

    /// 患者通过手机号或邮箱登录，两者至少填写一个
    pub async fn patient_login(
        &mut self,
        phone: Option<&str>,
        email: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<PatientIdentity> {
        let phone = non_blank(phone).map(|p| require_phone("phone", p)).transpose()?;
        let email = optional_email(email)?;
        if phone.is_none() && email.is_none() {
            return Err(ClinicError::validation("phone", "Please enter your phone number or email"));
        }

        pause(self.latency.login, cancel).await?;

        let patient = self
            .records
            .find_by_contact(phone.as_deref(), email.as_deref())
            .ok_or_else(|| {
                ClinicError::NotFound(
                    "No patient found with these credentials. Please check your information or register as a new patient."
                        .to_string(),
                )
            })?;

        let identity = patient_identity(patient);
        self.session.login(identity.clone());
        Ok(identity)
    }

    /// 医生通过邮箱和密码登录
    pub async fn doctor_login(
        &mut self,
        email: &str,
        password: &str,
        cancel: &CancellationToken,
    ) -> Result<DoctorIdentity> {
        let email = require_text("email", email, "Email is required")?;
        if password.is_empty() {
            return Err(ClinicError::validation("password", "Password is required"));
        }

        pause(self.latency.login, cancel).await?;

        let doctor = match self.records.directory().authenticate(email, password) {
            Some(doctor) => doctor,
            None => {
                warn!("Failed doctor login attempt for {}", email);
                return Err(ClinicError::doctor_required("Invalid email or password"));
            }
        };

        let identity = DoctorIdentity {
            id: doctor.id,
            name: doctor.name.clone(),
            email: doctor.email.clone(),
            specialization: doctor.specialization.clone(),
        };
        self.session.doctor_login(identity.clone());
        Ok(identity)
    }

    /// 注册新患者，`login_after` 为真时注册成功后直接登录
    pub async fn register_patient(
        &mut self,
        fields: NewPatient,
        login_after: bool,
        cancel: &CancellationToken,
    ) -> Result<Patient> {
        self.records.validate_patient(&fields)?;

        pause(self.latency.registration, cancel).await?;

        let patient = self.records.add_patient(fields)?;
        if login_after {
            self.session.login(patient_identity(&patient));
        }
        Ok(patient)
    }

    pub fn logout(&mut self) {
        self.session.logout();
    }

    // ---------------------------------------------------------------------
    // 预约
    // ---------------------------------------------------------------------

    /// 预约
    ///
    /// 患者只能为自己预约，医生可以为任意患者预约。
    pub async fn book_appointment(
        &mut self,
        patient_id: PatientId,
        request: AppointmentRequest,
        cancel: &CancellationToken,
    ) -> Result<Appointment> {
        require_patient_or_doctor(self.session.actor(), patient_id)?;

        let today = Local::now().date_naive();
        self.records.validate_appointment(patient_id, &request, today)?;

        pause(self.latency.booking, cancel).await?;

        self.records.add_appointment_as_of(patient_id, request, today)
    }

    pub fn update_appointment_status(
        &mut self,
        patient_id: PatientId,
        appointment_id: AppointmentId,
        status: AppointmentStatus,
    ) -> Result<Appointment> {
        require_patient_or_doctor(self.session.actor(), patient_id)?;
        self.records
            .update_appointment_status(patient_id, appointment_id, status)
    }

    pub fn patient_appointments(
        &self,
        patient_id: PatientId,
        filter: AppointmentFilter,
    ) -> Result<Vec<Appointment>> {
        require_patient(self.session.actor(), patient_id)?;
        let patient = self.records.require_patient(patient_id)?;
        Ok(filter_appointments(patient, filter).into_iter().cloned().collect())
    }

    // ---------------------------------------------------------------------
    // 患者视图
    // ---------------------------------------------------------------------

    pub fn patient_dashboard(&self, patient_id: PatientId) -> Result<PatientDashboard> {
        require_patient(self.session.actor(), patient_id)?;
        let patient = self.records.require_patient(patient_id)?;
        Ok(patient_dashboard(patient))
    }

    pub fn patient_prescriptions(&self, patient_id: PatientId) -> Result<PrescriptionOverview> {
        require_patient(self.session.actor(), patient_id)?;
        let patient = self.records.require_patient(patient_id)?;
        Ok(prescription_overview(patient))
    }

    // ---------------------------------------------------------------------
    // 医生操作
    // ---------------------------------------------------------------------

    pub fn doctor_dashboard(&self) -> Result<DoctorDashboard> {
        require_doctor(self.session.actor())?;
        let patients = self.records.patients();
        Ok(DoctorDashboard {
            stats: dashboard_stats(patients),
            patients: patient_summaries(patients),
        })
    }

    pub fn patient_details(&self, patient_id: PatientId) -> Result<Patient> {
        require_doctor(self.session.actor())?;
        self.records.require_patient(patient_id).cloned()
    }

    /// 开具处方，开具人取当前登录医生
    pub fn add_prescription(&mut self, patient_id: PatientId, draft: PrescriptionDraft) -> Result<Prescription> {
        let doctor = require_doctor(self.session.actor())?;
        self.records.add_prescription(patient_id, draft, &doctor.name)
    }

    pub fn update_prescription(
        &mut self,
        patient_id: PatientId,
        update: PrescriptionUpdate,
    ) -> Result<Prescription> {
        require_doctor(self.session.actor())?;
        self.records.update_prescription(patient_id, update)
    }

    /// 保存处方表单：已有当前处方时就地更新，否则新开
    pub fn save_prescription(&mut self, patient_id: PatientId, draft: PrescriptionDraft) -> Result<Prescription> {
        let doctor = require_doctor(self.session.actor())?;
        let has_current = self.records.require_patient(patient_id)?.prescription.is_some();

        if has_current {
            debug!("Patient {} has a current prescription, updating in place", patient_id);
            let update = PrescriptionUpdate {
                medications: Some(draft.medications),
                notes: Some(draft.notes.unwrap_or_default()),
                prescribed_by: Some(doctor.name.clone()),
            };
            self.records.update_prescription(patient_id, update)
        } else {
            self.records.add_prescription(patient_id, draft, &doctor.name)
        }
    }

    pub fn delete_prescription(&mut self, patient_id: PatientId) -> Result<Option<Prescription>> {
        require_doctor(self.session.actor())?;
        self.records.delete_prescription(patient_id)
    }

    // ---------------------------------------------------------------------
    // 参考数据
    // ---------------------------------------------------------------------

    pub fn doctors(&self) -> Vec<&Doctor> {
        self.records.directory().doctors().collect()
    }

    pub fn doctors_by_specialization(&self, specialization: &str) -> Vec<&Doctor> {
        self.records.directory().by_specialization(specialization)
    }

    /// 清空患者登记表，仅用于测试和演示
    pub fn reset_patients(&mut self) {
        self.records.reset_patients();
    }
}

fn patient_identity(patient: &Patient) -> PatientIdentity {
    PatientIdentity {
        id: patient.id,
        name: patient.name.clone(),
        email: patient.contact_info.email.clone(),
        phone: patient.contact_info.phone.clone(),
    }
}

/// 模拟延迟，期间取消时返回 [`ClinicError::Cancelled`]
async fn pause(delay: Duration, cancel: &CancellationToken) -> Result<()> {
    if delay.is_zero() {
        return if cancel.is_cancelled() {
            Err(ClinicError::Cancelled)
        } else {
            Ok(())
        };
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!("Operation cancelled during {:?} pause", delay);
            Err(ClinicError::Cancelled)
        }
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}
