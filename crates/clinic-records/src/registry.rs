//! 患者登记
//!
//! [`ClinicalRecords`] 是整个临床记录存储的所有者：患者列表、编号生成器、
//! 医生名录和预约状态机都挂在它下面。预约和处方相关的操作分别在
//! `appointments` 与 `prescriptions` 模块中为它实现。

use crate::directory::DoctorDirectory;
use crate::seed::seed_patients;
use crate::state_machine::AppointmentStateMachine;
use clinic_core::utils::IdGenerator;
use clinic_core::validation::{non_blank, normalize_phone, optional_email, require_age, require_phone, require_text};
use clinic_core::{
    BloodType, ClinicError, ContactInfo, EmergencyContact, Gender, Patient, PatientId, Result,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// 患者注册信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPatient {
    pub name: String,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub blood_type: Option<BloodType>,
    pub allergies: Vec<String>,
    pub medical_history: Vec<String>,
    pub phone: String,
    pub email: Option<String>,
    pub emergency_contact: Option<EmergencyContact>,
}

/// 临床记录存储
#[derive(Debug)]
pub struct ClinicalRecords {
    patients: Vec<Patient>,
    ids: IdGenerator,
    directory: DoctorDirectory,
    state_machine: AppointmentStateMachine,
}

impl ClinicalRecords {
    /// 创建空的记录存储
    pub fn new(directory: DoctorDirectory) -> Self {
        Self::with_patients(directory, Vec::new())
    }

    /// 使用已有患者初始化，新编号从已有患者和预约编号之后开始分配
    pub fn with_patients(directory: DoctorDirectory, patients: Vec<Patient>) -> Self {
        let existing = patients
            .iter()
            .flat_map(|p| std::iter::once(p.id).chain(p.appointments.iter().map(|a| a.id)));
        let ids = IdGenerator::after(existing);

        info!("Clinical records initialized with {} patients", patients.len());
        Self {
            patients,
            ids,
            directory,
            state_machine: AppointmentStateMachine::new(),
        }
    }

    /// 标准医生名录加种子患者
    pub fn seeded() -> Self {
        Self::with_patients(DoctorDirectory::standard(), seed_patients())
    }

    /// 校验注册信息但不写入
    pub fn validate_patient(&self, fields: &NewPatient) -> Result<()> {
        check_registration(fields).map(|_| ())
    }

    /// 注册新患者
    pub fn add_patient(&mut self, fields: NewPatient) -> Result<Patient> {
        let checked = check_registration(&fields)?;

        let patient = Patient {
            id: self.ids.next_id(),
            name: checked.name,
            age: checked.age,
            gender: checked.gender,
            height_cm: checked.height_cm,
            weight_kg: checked.weight_kg,
            blood_type: fields.blood_type,
            allergies: clean_list(fields.allergies),
            medical_history: clean_list(fields.medical_history),
            contact_info: ContactInfo {
                phone: checked.phone,
                email: checked.email,
            },
            emergency_contact: fields.emergency_contact.and_then(clean_emergency_contact),
            appointments: Vec::new(),
            prescription: None,
            prescription_history: Vec::new(),
        };

        self.patients.push(patient.clone());
        info!("Registered patient {} ({})", patient.id, patient.name);
        Ok(patient)
    }

    /// 按编号查找患者
    pub fn patient(&self, patient_id: PatientId) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id == patient_id)
    }

    /// 按编号查找患者，找不到时返回 `NotFound`
    pub fn require_patient(&self, patient_id: PatientId) -> Result<&Patient> {
        self.patient(patient_id)
            .ok_or_else(|| ClinicError::NotFound(format!("Patient {} not found", patient_id)))
    }

    pub(crate) fn patient_mut(&mut self, patient_id: PatientId) -> Result<&mut Patient> {
        self.patients
            .iter_mut()
            .find(|p| p.id == patient_id)
            .ok_or_else(|| ClinicError::NotFound(format!("Patient {} not found", patient_id)))
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    /// 按手机号或邮箱匹配患者，任一匹配即可
    pub fn find_by_contact(&self, phone: Option<&str>, email: Option<&str>) -> Option<&Patient> {
        let phone = non_blank(phone).and_then(normalize_phone);
        let email = non_blank(email);
        if phone.is_none() && email.is_none() {
            return None;
        }

        let found = self.patients.iter().find(|p| {
            let phone_match = phone
                .as_deref()
                .is_some_and(|phone| normalize_phone(&p.contact_info.phone).as_deref() == Some(phone));
            let email_match = email.is_some_and(|email| {
                p.contact_info
                    .email
                    .as_deref()
                    .is_some_and(|stored| stored.eq_ignore_ascii_case(email))
            });
            phone_match || email_match
        });

        debug!("Contact lookup matched patient {:?}", found.map(|p| p.id));
        found
    }

    pub fn directory(&self) -> &DoctorDirectory {
        &self.directory
    }

    pub fn state_machine(&self) -> &AppointmentStateMachine {
        &self.state_machine
    }

    pub(crate) fn next_id(&self) -> u64 {
        self.ids.next_id()
    }

    /// 预留外部已经持有的编号，之后分配的编号都大于它
    pub fn reserve_id(&self, id: u64) {
        debug!("Reserving id {}", id);
        self.ids.reserve(id);
    }

    /// 清空患者登记表
    pub fn reset_patients(&mut self) {
        info!("Resetting patient registry ({} patients removed)", self.patients.len());
        self.patients.clear();
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }
}

impl Default for ClinicalRecords {
    fn default() -> Self {
        Self::new(DoctorDirectory::standard())
    }
}

/// 通过校验的注册字段
struct CheckedRegistration {
    name: String,
    age: u8,
    gender: Gender,
    phone: String,
    email: Option<String>,
    height_cm: Option<f64>,
    weight_kg: Option<f64>,
}

/// 按表单顺序校验，返回首个出错的字段
fn check_registration(fields: &NewPatient) -> Result<CheckedRegistration> {
    let name = require_text("name", &fields.name, "Name is required")?.to_string();
    let age = require_age(fields.age)?;
    let gender = fields
        .gender
        .ok_or_else(|| ClinicError::validation("gender", "Please select gender"))?;
    let phone = require_phone("phone", &fields.phone)?;
    let email = optional_email(fields.email.as_deref())?;
    let height_cm = positive_measure("height", fields.height_cm)?;
    let weight_kg = positive_measure("weight", fields.weight_kg)?;

    Ok(CheckedRegistration {
        name,
        age,
        gender,
        phone,
        email,
        height_cm,
        weight_kg,
    })
}

fn positive_measure(field: &str, value: Option<f64>) -> Result<Option<f64>> {
    match value {
        Some(v) if !v.is_finite() || v <= 0.0 => Err(ClinicError::validation(
            field,
            format!("Please enter a valid {}", field),
        )),
        other => Ok(other),
    }
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn clean_emergency_contact(contact: EmergencyContact) -> Option<EmergencyContact> {
    let name = non_blank(Some(contact.name.as_str()))?.to_string();
    Some(EmergencyContact {
        name,
        relationship: non_blank(contact.relationship.as_deref()).map(str::to_string),
        phone: non_blank(contact.phone.as_deref()).map(str::to_string),
    })
}
