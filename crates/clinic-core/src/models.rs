//! 核心数据模型定义

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub type PatientId = u64;
pub type AppointmentId = u64;
pub type DoctorId = u32;

/// 可预约的时间段
pub static TIME_SLOTS: [&str; 15] = [
    "09:00 AM", "09:30 AM", "10:00 AM", "10:30 AM", "11:00 AM",
    "11:30 AM", "12:00 PM", "02:00 PM", "02:30 PM", "03:00 PM",
    "03:30 PM", "04:00 PM", "04:30 PM", "05:00 PM", "05:30 PM",
];

/// 患者档案
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub blood_type: Option<BloodType>,
    pub allergies: Vec<String>,
    pub medical_history: Vec<String>,
    pub contact_info: ContactInfo,
    pub emergency_contact: Option<EmergencyContact>,
    pub appointments: Vec<Appointment>,
    pub prescription: Option<Prescription>,
    pub prescription_history: Vec<Prescription>,
}

impl Patient {
    pub fn appointment(&self, appointment_id: AppointmentId) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.id == appointment_id)
    }

    pub fn has_scheduled_appointment(&self) -> bool {
        self.appointments
            .iter()
            .any(|a| a.status == AppointmentStatus::Scheduled)
    }
}

/// 性别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(format!("Invalid gender: '{}'", value)),
        }
    }
}

/// ABO/Rh 血型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodType {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodType {
    pub fn all() -> [BloodType; 8] {
        [
            BloodType::APositive,
            BloodType::ANegative,
            BloodType::BPositive,
            BloodType::BNegative,
            BloodType::AbPositive,
            BloodType::AbNegative,
            BloodType::OPositive,
            BloodType::ONegative,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            BloodType::APositive => "A+",
            BloodType::ANegative => "A-",
            BloodType::BPositive => "B+",
            BloodType::BNegative => "B-",
            BloodType::AbPositive => "AB+",
            BloodType::AbNegative => "AB-",
            BloodType::OPositive => "O+",
            BloodType::ONegative => "O-",
        }
    }
}

impl FromStr for BloodType {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        let value = value.trim().to_uppercase();
        BloodType::all()
            .into_iter()
            .find(|b| b.label() == value)
            .ok_or_else(|| format!("Invalid blood type: '{}'", value))
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 联系方式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub phone: String,
    pub email: Option<String>,
}

/// 紧急联系人
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub relationship: Option<String>,
    pub phone: Option<String>,
}

/// 预约记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub doctor_id: DoctorId,
    /// 预约时医生姓名的快照，之后不随医生信息更新
    pub doctor_name: String,
    pub date: NaiveDate,
    pub time: TimeSlot,
    #[serde(rename = "type")]
    pub appointment_type: AppointmentType,
    pub reason: String,
    pub status: AppointmentStatus,
    /// 种子数据没有创建时间
    pub created_at: Option<DateTime<Utc>>,
}

/// 预约状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled, // 已预约
    Completed, // 已完成
    Cancelled, // 已取消
}

impl AppointmentStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AppointmentStatus::Scheduled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            _ => Err(format!("Invalid appointment status: '{}'", value)),
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 预约类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentType {
    #[default]
    General,
    Followup,
    Consultation,
    Emergency,
}

impl AppointmentType {
    pub fn all() -> [AppointmentType; 4] {
        [
            AppointmentType::General,
            AppointmentType::Followup,
            AppointmentType::Consultation,
            AppointmentType::Emergency,
        ]
    }

    /// 展示用名称
    pub fn label(&self) -> &'static str {
        match self {
            AppointmentType::General => "General Checkup",
            AppointmentType::Followup => "Follow-up",
            AppointmentType::Consultation => "Consultation",
            AppointmentType::Emergency => "Emergency",
        }
    }
}

impl FromStr for AppointmentType {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "general" => Ok(AppointmentType::General),
            "followup" => Ok(AppointmentType::Followup),
            "consultation" => Ok(AppointmentType::Consultation),
            "emergency" => Ok(AppointmentType::Emergency),
            _ => Err(format!("Invalid appointment type: '{}'", value)),
        }
    }
}

/// 预约时间段，只能取 [`TIME_SLOTS`] 中的值
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct TimeSlot(&'static str);

impl TimeSlot {
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        TIME_SLOTS
            .iter()
            .find(|slot| slot.eq_ignore_ascii_case(label))
            .map(|slot| TimeSlot(*slot))
    }

    pub fn all() -> impl Iterator<Item = TimeSlot> {
        TIME_SLOTS.iter().map(|slot| TimeSlot(*slot))
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl Default for TimeSlot {
    fn default() -> Self {
        TimeSlot(TIME_SLOTS[0])
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        TimeSlot::parse(&value).ok_or_else(|| format!("Invalid time slot: '{}'", value))
    }
}

// 标签指向静态表，不能从输入借用，先读成 String 再匹配
impl<'de> Deserialize<'de> for TimeSlot {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let label = String::deserialize(deserializer)?;
        TimeSlot::try_from(label).map_err(serde::de::Error::custom)
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        slot.0.to_string()
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// 药物剂型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DrugForm {
    #[default]
    Tablet,
    Capsule,
    Syrup,
    Injection,
    Inhaler,
    Drops,
    Cream,
    Ointment,
}

/// 处方中的单条药物
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub instructions: Option<String>,
    #[serde(rename = "type", default)]
    pub form: DrugForm,
}

impl Medication {
    pub fn new(name: &str, dosage: &str, frequency: &str) -> Self {
        Self {
            name: name.to_string(),
            dosage: dosage.to_string(),
            frequency: frequency.to_string(),
            instructions: None,
            form: DrugForm::default(),
        }
    }

    pub fn with_form(mut self, form: DrugForm) -> Self {
        self.form = form;
        self
    }

    pub fn with_instructions(mut self, instructions: &str) -> Self {
        self.instructions = Some(instructions.to_string());
        self
    }

    /// 表单中未填写完整的空行
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty() || self.dosage.trim().is_empty() || self.frequency.trim().is_empty()
    }
}

/// 处方
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    pub id: Uuid,
    pub medications: Vec<Medication>,
    pub notes: Option<String>,
    pub prescribed_by: String,
    pub prescribed_date: DateTime<Utc>,
    pub last_modified: Option<DateTime<Utc>>,
    /// 归档时间，仅历史处方有值
    pub end_date: Option<DateTime<Utc>>,
}

/// 医生坐诊时间
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub day: Weekday,
    pub hours: String,
}

/// 医生信息（参考数据，运行时只读）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: DoctorId,
    pub name: String,
    pub specialization: String,
    pub email: String,
    pub phone: String,
    pub experience_years: u8,
    pub qualifications: Vec<String>,
    pub availability: Vec<AvailabilityWindow>,
    /// 诊费（INR）
    pub consultation_fee: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_slot_parse() {
        assert_eq!(TimeSlot::parse("09:30 AM").map(|s| s.as_str()), Some("09:30 AM"));
        assert_eq!(TimeSlot::parse(" 05:30 pm ").map(|s| s.as_str()), Some("05:30 PM"));
        assert!(TimeSlot::parse("12:30 PM").is_none());
        assert!(TimeSlot::parse("").is_none());
        assert_eq!(TimeSlot::all().count(), 15);
    }

    #[test]
    fn test_time_slot_from_owned_json() {
        let value = serde_json::Value::String("03:30 pm".to_string());
        let slot: TimeSlot = serde_json::from_value(value).unwrap();
        assert_eq!(slot.as_str(), "03:30 PM");
        assert_eq!(serde_json::to_value(&slot).unwrap(), serde_json::json!("03:30 PM"));

        let err = serde_json::from_value::<TimeSlot>(serde_json::json!("12:30 PM")).unwrap_err();
        assert!(err.to_string().contains("Invalid time slot"));
    }

    #[test]
    fn test_appointment_serde_shape() {
        let json = r#"{
            "id": 4,
            "doctor_id": 3,
            "doctor_name": "Dr. Smith",
            "date": "2023-10-10",
            "time": "12:00 PM",
            "type": "consultation",
            "reason": "Blood pressure check",
            "status": "scheduled",
            "created_at": null
        }"#;
        let appointment: Appointment = serde_json::from_str(json).unwrap();
        assert_eq!(appointment.appointment_type, AppointmentType::Consultation);
        assert_eq!(appointment.time.as_str(), "12:00 PM");
        assert_eq!(appointment.status, AppointmentStatus::Scheduled);

        let bad = json.replace("12:00 PM", "01:00 PM");
        assert!(serde_json::from_str::<Appointment>(&bad).is_err());
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("AB-".parse::<BloodType>(), Ok(BloodType::AbNegative));
        assert!("C+".parse::<BloodType>().is_err());
        assert_eq!("Cancelled".parse::<AppointmentStatus>(), Ok(AppointmentStatus::Cancelled));
        assert_eq!("followup".parse::<AppointmentType>(), Ok(AppointmentType::Followup));
        assert_eq!("female".parse::<Gender>(), Ok(Gender::Female));
        assert!(AppointmentStatus::Completed.is_terminal());
        assert!(!AppointmentStatus::Scheduled.is_terminal());
    }

    #[test]
    fn test_blank_medication_rows() {
        assert!(Medication::new("", "5mg", "Once daily").is_blank());
        assert!(Medication::new("Amlodipine", "  ", "Once daily").is_blank());
        assert!(!Medication::new("Amlodipine", "5mg", "Once daily").is_blank());
    }
}
