//! 只读视图
//!
//! 基于患者快照计算的投影，不修改任何状态。看板统计每次查询时全量扫描。

use clinic_core::utils::round_to_tenth;
use clinic_core::{
    Appointment, AppointmentStatus, BloodType, Gender, Patient, PatientId, Prescription,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 最近就诊记录保留的条数
const RECENT_COMPLETED_LIMIT: usize = 3;

/// BMI 分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_value(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }
}

/// BMI 计算结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bmi {
    pub value: f64,
    pub category: BmiCategory,
}

/// 体重(kg) / 身高(m)²，保留一位小数；身高或体重缺失时返回 `None`
pub fn bmi(patient: &Patient) -> Option<Bmi> {
    let height_m = patient.height_cm.filter(|h| *h > 0.0)? / 100.0;
    let weight = patient.weight_kg.filter(|w| *w > 0.0)?;

    let value = round_to_tenth(weight / (height_m * height_m));
    Some(Bmi {
        value,
        category: BmiCategory::from_value(value),
    })
}

/// 预约列表筛选条件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AppointmentFilter {
    #[default]
    All,
    Status(AppointmentStatus),
}

impl AppointmentFilter {
    pub fn matches(&self, appointment: &Appointment) -> bool {
        match self {
            AppointmentFilter::All => true,
            AppointmentFilter::Status(status) => appointment.status == *status,
        }
    }
}

impl FromStr for AppointmentFilter {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Ok(AppointmentFilter::All);
        }
        value.parse().map(AppointmentFilter::Status)
    }
}

/// 按状态筛选预约，保持预约顺序
pub fn filter_appointments(patient: &Patient, filter: AppointmentFilter) -> Vec<&Appointment> {
    patient
        .appointments
        .iter()
        .filter(|a| filter.matches(a))
        .collect()
}

/// 医生看板统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_patients: usize,
    pub total_appointments: usize,
    /// 至少有一个待就诊预约的患者数
    pub patients_with_scheduled: usize,
    pub completed_appointments: usize,
}

pub fn dashboard_stats(patients: &[Patient]) -> DashboardStats {
    let mut stats = DashboardStats {
        total_patients: patients.len(),
        ..Default::default()
    };

    for patient in patients {
        stats.total_appointments += patient.appointments.len();
        if patient.has_scheduled_appointment() {
            stats.patients_with_scheduled += 1;
        }
        stats.completed_appointments += patient
            .appointments
            .iter()
            .filter(|a| a.status == AppointmentStatus::Completed)
            .count();
    }

    stats
}

/// 医生端患者列表中的一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub id: PatientId,
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    pub blood_type: Option<BloodType>,
    pub phone: String,
    pub appointment_count: usize,
    pub has_prescription: bool,
}

impl From<&Patient> for PatientSummary {
    fn from(patient: &Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name.clone(),
            age: patient.age,
            gender: patient.gender,
            blood_type: patient.blood_type,
            phone: patient.contact_info.phone.clone(),
            appointment_count: patient.appointments.len(),
            has_prescription: patient.prescription.is_some(),
        }
    }
}

pub fn patient_summaries(patients: &[Patient]) -> Vec<PatientSummary> {
    patients.iter().map(PatientSummary::from).collect()
}

/// 患者个人看板
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientDashboard {
    pub patient_id: PatientId,
    pub name: String,
    pub bmi: Option<Bmi>,
    pub upcoming: Vec<Appointment>,
    /// 最近完成的就诊，按预约顺序保留最后几条
    pub recent_completed: Vec<Appointment>,
    pub prescription: Option<Prescription>,
}

pub fn patient_dashboard(patient: &Patient) -> PatientDashboard {
    let upcoming = filter_appointments(patient, AppointmentFilter::Status(AppointmentStatus::Scheduled))
        .into_iter()
        .cloned()
        .collect();

    let completed = filter_appointments(patient, AppointmentFilter::Status(AppointmentStatus::Completed));
    let skip = completed.len().saturating_sub(RECENT_COMPLETED_LIMIT);
    let recent_completed = completed.into_iter().skip(skip).cloned().collect();

    PatientDashboard {
        patient_id: patient.id,
        name: patient.name.clone(),
        bmi: bmi(patient),
        upcoming,
        recent_completed,
        prescription: patient.prescription.clone(),
    }
}

/// 患者处方视图：当前处方和历史处方
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionOverview {
    pub current: Option<Prescription>,
    pub history: Vec<Prescription>,
}

pub fn prescription_overview(patient: &Patient) -> PrescriptionOverview {
    PrescriptionOverview {
        current: patient.prescription.clone(),
        history: patient.prescription_history.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ClinicalRecords;
    use chrono::NaiveDate;

    #[test]
    fn test_bmi_reference_value() {
        let records = ClinicalRecords::seeded();
        let rohan = records.patient(1).unwrap();

        let result = bmi(rohan).unwrap();
        assert_eq!(result.value, 23.0);
        assert_eq!(result.category, BmiCategory::Normal);
    }

    #[test]
    fn test_bmi_missing_measurements() {
        let records = ClinicalRecords::seeded();
        let mut patient = records.patient(2).unwrap().clone();
        patient.height_cm = None;
        assert!(bmi(&patient).is_none());

        patient.height_cm = Some(160.0);
        patient.weight_kg = None;
        assert!(bmi(&patient).is_none());
    }

    #[test]
    fn test_bmi_category_bands() {
        assert_eq!(BmiCategory::from_value(18.4), BmiCategory::Underweight);
        assert_eq!(BmiCategory::from_value(18.5), BmiCategory::Normal);
        assert_eq!(BmiCategory::from_value(24.9), BmiCategory::Normal);
        assert_eq!(BmiCategory::from_value(25.0), BmiCategory::Overweight);
        assert_eq!(BmiCategory::from_value(29.9), BmiCategory::Overweight);
        assert_eq!(BmiCategory::from_value(30.0), BmiCategory::Obese);
    }

    #[test]
    fn test_filter_appointments() {
        let records = ClinicalRecords::seeded();
        let rohan = records.patient(1).unwrap();

        let all = filter_appointments(rohan, "all".parse().unwrap());
        assert_eq!(all.iter().map(|a| a.id).collect::<Vec<_>>(), vec![1, 2]);

        let completed = filter_appointments(rohan, "completed".parse().unwrap());
        assert_eq!(completed.iter().map(|a| a.id).collect::<Vec<_>>(), vec![2]);

        assert!(filter_appointments(rohan, AppointmentFilter::Status(AppointmentStatus::Cancelled)).is_empty());
        assert!("pending".parse::<AppointmentFilter>().is_err());
    }

    #[test]
    fn test_dashboard_stats_on_seed_data() {
        let records = ClinicalRecords::seeded();
        let stats = dashboard_stats(records.patients());

        assert_eq!(
            stats,
            DashboardStats {
                total_patients: 5,
                total_appointments: 8,
                patients_with_scheduled: 5,
                completed_appointments: 3,
            }
        );
        assert_eq!(dashboard_stats(&[]), DashboardStats::default());
    }

    #[test]
    fn test_patient_dashboard_keeps_last_three_completed() {
        let mut records = ClinicalRecords::seeded();
        let today = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();

        for _ in 0..4 {
            let booked = records
                .add_appointment_as_of(
                    5,
                    crate::AppointmentRequest {
                        doctor_id: Some(3),
                        date: Some(today),
                        time: "02:30 PM".to_string(),
                        reason: "Sugar review".to_string(),
                        ..Default::default()
                    },
                    today,
                )
                .unwrap();
            records
                .update_appointment_status(5, booked.id, AppointmentStatus::Completed)
                .unwrap();
        }

        let dashboard = patient_dashboard(records.patient(5).unwrap());
        assert_eq!(dashboard.upcoming.len(), 1);
        assert_eq!(dashboard.recent_completed.len(), 3);
        assert!(dashboard.recent_completed.iter().all(|a| a.id > 8));
        assert_eq!(dashboard.bmi.map(|b| b.category), Some(BmiCategory::Overweight));
    }

    #[test]
    fn test_patient_summaries() {
        let mut records = ClinicalRecords::seeded();
        records.delete_prescription(2).unwrap();

        let summaries = patient_summaries(records.patients());
        assert_eq!(summaries.len(), 5);
        assert_eq!(summaries[0].appointment_count, 2);
        assert!(summaries[0].has_prescription);
        assert!(!summaries[1].has_prescription);
        assert_eq!(summaries[1].blood_type, Some(BloodType::OPositive));

        let overview = prescription_overview(records.patient(2).unwrap());
        assert!(overview.current.is_none());
        assert_eq!(overview.history.len(), 1);
    }
}
