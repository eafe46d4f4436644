//! 医生名录
//!
//! 只读参考数据。登录匹配和医生列表展示都查询同一张表。
//! 凭据以加盐 SHA-256 摘要保存，不保留明文密码。

use chrono::Weekday;
use clinic_core::{AvailabilityWindow, Doctor, DoctorId};
use sha2::{Digest, Sha256};
use std::fmt;

/// 加盐的密码摘要
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    salt: String,
    digest: String,
}

impl Credential {
    /// 由明文密码派生摘要
    pub fn derive(salt: &str, password: &str) -> Self {
        Self {
            salt: salt.to_string(),
            digest: salted_digest(salt, password),
        }
    }

    /// 使用预先计算好的十六进制摘要
    pub fn from_digest(salt: &str, digest: &str) -> Self {
        Self {
            salt: salt.to_string(),
            digest: digest.to_ascii_lowercase(),
        }
    }

    pub fn verify(&self, password: &str) -> bool {
        let candidate = salted_digest(&self.salt, password);
        if candidate.len() != self.digest.len() {
            return false;
        }
        // 逐字节比较全部内容，不提前返回
        candidate
            .bytes()
            .zip(self.digest.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("salt", &self.salt)
            .field("digest", &"<redacted>")
            .finish()
    }
}

fn salted_digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// 名录条目
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    pub doctor: Doctor,
    credential: Credential,
}

impl DirectoryEntry {
    pub fn new(doctor: Doctor, credential: Credential) -> Self {
        Self { doctor, credential }
    }
}

/// 医生名录
#[derive(Debug, Clone)]
pub struct DoctorDirectory {
    entries: Vec<DirectoryEntry>,
}

impl DoctorDirectory {
    pub fn new(entries: Vec<DirectoryEntry>) -> Self {
        Self { entries }
    }

    /// 诊所的标准医生名录
    ///
    /// 演示账户的密码均为 `clinic@123`。
    pub fn standard() -> Self {
        let entries = vec![
            DirectoryEntry::new(
                doctor(
                    1,
                    "Dr. Rajesh Sharma",
                    "General Physician",
                    "rajesh.sharma@clinic.com",
                    "9876543211",
                    10,
                    &["MBBS", "MD (Internal Medicine)"],
                    &[
                        (Weekday::Mon, "09:00 AM - 01:00 PM"),
                        (Weekday::Wed, "09:00 AM - 01:00 PM"),
                        (Weekday::Fri, "09:00 AM - 01:00 PM"),
                    ],
                    500,
                ),
                Credential::from_digest(
                    "dr1.7c2e91",
                    "1acd7a96427022b56f477c4d803da6c1bd4af191d5f4c9d725716fbc5524811c",
                ),
            ),
            DirectoryEntry::new(
                doctor(
                    2,
                    "Dr. Neha Mehta",
                    "ENT Specialist",
                    "neha.mehta@clinic.com",
                    "9123456780",
                    7,
                    &["MBBS", "MS (ENT)"],
                    &[
                        (Weekday::Tue, "10:00 AM - 02:00 PM"),
                        (Weekday::Thu, "10:00 AM - 02:00 PM"),
                        (Weekday::Sat, "10:00 AM - 01:00 PM"),
                    ],
                    600,
                ),
                Credential::from_digest(
                    "dr2.b4f0a3",
                    "ad94f6bd12120710e3eed086298f0f02227b129cf94e0701d5a762a421c5f203",
                ),
            ),
            DirectoryEntry::new(
                doctor(
                    3,
                    "Dr. Amitabh Singh",
                    "Diabetologist",
                    "amitabh.singh@clinic.com",
                    "9345678901",
                    12,
                    &["MBBS", "MD (Endocrinology)"],
                    &[
                        (Weekday::Mon, "02:00 PM - 06:00 PM"),
                        (Weekday::Wed, "02:00 PM - 06:00 PM"),
                        (Weekday::Fri, "02:00 PM - 06:00 PM"),
                    ],
                    700,
                ),
                Credential::from_digest(
                    "dr3.e19d57",
                    "e1f72e15a5a2dc75463afb7763a5986de382eb1aefea6a8340503437226e6880",
                ),
            ),
            DirectoryEntry::new(
                doctor(
                    4,
                    "Dr. Kavita Patel",
                    "Pediatrics",
                    "kavita.patel@clinic.com",
                    "9456789012",
                    9,
                    &["MBBS", "MD (Pediatrics)"],
                    &[
                        (Weekday::Tue, "09:00 AM - 01:00 PM"),
                        (Weekday::Thu, "02:00 PM - 06:00 PM"),
                    ],
                    600,
                ),
                Credential::from_digest(
                    "dr4.5a8c22",
                    "7c858ab4bc88bac20856d32773bf34c22c2346f75fa1a0c1fc96d9ff1f4caad4",
                ),
            ),
            DirectoryEntry::new(
                doctor(
                    5,
                    "Dr. Sanjay Kumar",
                    "Dermatology",
                    "sanjay.kumar@clinic.com",
                    "9567890123",
                    8,
                    &["MBBS", "MD (Dermatology)"],
                    &[
                        (Weekday::Wed, "10:00 AM - 02:00 PM"),
                        (Weekday::Sat, "10:00 AM - 01:00 PM"),
                    ],
                    650,
                ),
                Credential::from_digest(
                    "dr5.c93b6f",
                    "a70d891893e9d891349db2f9a386410fca43f2b856add06105122962f412574f",
                ),
            ),
        ];

        Self::new(entries)
    }

    pub fn get(&self, id: DoctorId) -> Option<&Doctor> {
        self.entries
            .iter()
            .map(|entry| &entry.doctor)
            .find(|doctor| doctor.id == id)
    }

    pub fn doctors(&self) -> impl Iterator<Item = &Doctor> {
        self.entries.iter().map(|entry| &entry.doctor)
    }

    pub fn by_specialization(&self, specialization: &str) -> Vec<&Doctor> {
        self.doctors()
            .filter(|doctor| doctor.specialization.eq_ignore_ascii_case(specialization.trim()))
            .collect()
    }

    /// 按邮箱和密码匹配医生
    pub fn authenticate(&self, email: &str, password: &str) -> Option<&Doctor> {
        let email = email.trim();
        let entry = self
            .entries
            .iter()
            .find(|entry| entry.doctor.email.eq_ignore_ascii_case(email))?;

        if entry.credential.verify(password) {
            Some(&entry.doctor)
        } else {
            tracing::debug!("Credential mismatch for doctor {}", entry.doctor.id);
            None
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for DoctorDirectory {
    fn default() -> Self {
        Self::standard()
    }
}

#[allow(clippy::too_many_arguments)]
fn doctor(
    id: DoctorId,
    name: &str,
    specialization: &str,
    email: &str,
    phone: &str,
    experience_years: u8,
    qualifications: &[&str],
    availability: &[(Weekday, &str)],
    consultation_fee: u32,
) -> Doctor {
    Doctor {
        id,
        name: name.to_string(),
        specialization: specialization.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        experience_years,
        qualifications: qualifications.iter().map(|q| q.to_string()).collect(),
        availability: availability
            .iter()
            .map(|(day, hours)| AvailabilityWindow {
                day: *day,
                hours: hours.to_string(),
            })
            .collect(),
        consultation_fee,
    }
}
