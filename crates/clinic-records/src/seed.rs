//! 种子患者数据
//!
//! 进程启动时用于初始化患者登记表。

use chrono::{DateTime, NaiveDate, Utc};
use clinic_core::{
    Appointment, AppointmentStatus, AppointmentType, BloodType, ContactInfo, DoctorId,
    EmergencyContact, Gender, Medication, Patient, PatientId, Prescription, TimeSlot,
};
use uuid::Uuid;

struct SeedPatient {
    id: PatientId,
    name: &'static str,
    age: u8,
    gender: Gender,
    height_cm: f64,
    weight_kg: f64,
    blood_type: BloodType,
    allergies: &'static [&'static str],
    medical_history: &'static [&'static str],
    phone: &'static str,
    email: &'static str,
    emergency: (&'static str, &'static str, &'static str),
}

/// 种子患者列表
pub fn seed_patients() -> Vec<Patient> {
    vec![
        patient(
            SeedPatient {
                id: 1,
                name: "Rohan Sharma",
                age: 29,
                gender: Gender::Male,
                height_cm: 172.0,
                weight_kg: 68.0,
                blood_type: BloodType::BPositive,
                allergies: &["Dust", "Pollen"],
                medical_history: &["Asthma"],
                phone: "9876543210",
                email: "rohan.sharma@example.com",
                emergency: ("Meena Sharma", "Mother", "9876512345"),
            },
            vec![
                appointment(1, 1, "Dr. Sharma", (2023, 10, 5), "09:30 AM", AppointmentType::General, "Regular checkup for asthma", AppointmentStatus::Scheduled),
                appointment(2, 1, "Dr. Sharma", (2023, 9, 15), "10:00 AM", AppointmentType::Followup, "Asthma follow-up", AppointmentStatus::Completed),
            ],
            prescription(
                "Dr. Sharma",
                (2023, 9, 15),
                vec![
                    Medication::new("Salbutamol Inhaler", "2 puffs", "As needed").with_form(clinic_core::DrugForm::Inhaler),
                    Medication::new("Montair LC", "10mg", "Once daily"),
                ],
                "Avoid allergens. Use inhaler during attacks.",
            ),
        ),
        patient(
            SeedPatient {
                id: 2,
                name: "Priya Verma",
                age: 35,
                gender: Gender::Female,
                height_cm: 160.0,
                weight_kg: 60.0,
                blood_type: BloodType::OPositive,
                allergies: &[],
                medical_history: &["Thyroid"],
                phone: "9123456789",
                email: "priya.verma@example.com",
                emergency: ("Amit Verma", "Husband", "9988776655"),
            },
            vec![appointment(3, 2, "Dr. Mehta", (2023, 10, 6), "11:00 AM", AppointmentType::Followup, "Thyroid monitoring", AppointmentStatus::Scheduled)],
            prescription(
                "Dr. Mehta",
                (2023, 9, 1),
                vec![Medication::new("Thyronorm", "50mcg", "Once daily before breakfast")],
                "Regular thyroid tests every 6 months.",
            ),
        ),
        patient(
            SeedPatient {
                id: 3,
                name: "Amit Singh",
                age: 45,
                gender: Gender::Male,
                height_cm: 170.0,
                weight_kg: 75.0,
                blood_type: BloodType::APositive,
                allergies: &["Peanuts"],
                medical_history: &["Hypertension"],
                phone: "9112233445",
                email: "amit.singh@example.com",
                emergency: ("Seema Singh", "Wife", "9122233445"),
            },
            vec![
                appointment(4, 3, "Dr. Smith", (2023, 10, 10), "12:00 PM", AppointmentType::Consultation, "Blood pressure check", AppointmentStatus::Scheduled),
                appointment(5, 3, "Dr. Smith", (2023, 9, 25), "02:00 PM", AppointmentType::General, "Hypertension consultation", AppointmentStatus::Completed),
            ],
            prescription(
                "Dr. Smith",
                (2023, 9, 25),
                vec![Medication::new("Amlodipine", "5mg", "Once daily")],
                "Monitor BP daily.",
            ),
        ),
        patient(
            SeedPatient {
                id: 4,
                name: "Neha Patel",
                age: 32,
                gender: Gender::Female,
                height_cm: 158.0,
                weight_kg: 58.0,
                blood_type: BloodType::BPositive,
                allergies: &[],
                medical_history: &["Migraine"],
                phone: "9334455667",
                email: "neha.patel@example.com",
                emergency: ("Rahul Patel", "Brother", "9345566778"),
            },
            vec![appointment(6, 2, "Dr. Mehta", (2023, 10, 12), "03:00 PM", AppointmentType::Consultation, "Severe migraine episodes", AppointmentStatus::Scheduled)],
            prescription(
                "Dr. Mehta",
                (2023, 9, 20),
                vec![
                    Medication::new("Suminat", "50mg", "As needed"),
                    Medication::new("Dolo 650", "650mg", "As needed for pain"),
                ],
                "Avoid bright lights and loud noise during headaches.",
            ),
        ),
        patient(
            SeedPatient {
                id: 5,
                name: "Suresh Kumar",
                age: 50,
                gender: Gender::Male,
                height_cm: 165.0,
                weight_kg: 80.0,
                blood_type: BloodType::AbPositive,
                allergies: &["Penicillin"],
                medical_history: &["Diabetes", "High Cholesterol"],
                phone: "9223344556",
                email: "suresh.kumar@example.com",
                emergency: ("Lakshmi Devi", "Wife", "9234455667"),
            },
            vec![
                appointment(7, 1, "Dr. Sharma", (2023, 10, 15), "04:00 PM", AppointmentType::Followup, "Diabetes and cholesterol checkup", AppointmentStatus::Scheduled),
                appointment(8, 1, "Dr. Sharma", (2023, 9, 30), "03:30 PM", AppointmentType::General, "Regular diabetes monitoring", AppointmentStatus::Completed),
            ],
            prescription(
                "Dr. Sharma",
                (2023, 9, 30),
                vec![
                    Medication::new("Metformin", "500mg", "Twice daily"),
                    Medication::new("Atorvastatin", "10mg", "Once daily"),
                    Medication::new("Dolo 650", "650mg", "If required for pain"),
                ],
                "Monitor sugar levels regularly.",
            ),
        ),
    ]
}

fn patient(seed: SeedPatient, appointments: Vec<Appointment>, prescription: Prescription) -> Patient {
    let (contact_name, relationship, contact_phone) = seed.emergency;
    Patient {
        id: seed.id,
        name: seed.name.to_string(),
        age: seed.age,
        gender: seed.gender,
        height_cm: Some(seed.height_cm),
        weight_kg: Some(seed.weight_kg),
        blood_type: Some(seed.blood_type),
        allergies: seed.allergies.iter().map(|s| s.to_string()).collect(),
        medical_history: seed.medical_history.iter().map(|s| s.to_string()).collect(),
        contact_info: ContactInfo {
            phone: seed.phone.to_string(),
            email: Some(seed.email.to_string()),
        },
        emergency_contact: Some(EmergencyContact {
            name: contact_name.to_string(),
            relationship: Some(relationship.to_string()),
            phone: Some(contact_phone.to_string()),
        }),
        appointments,
        prescription: Some(prescription),
        prescription_history: Vec::new(),
    }
}

#[allow(clippy::too_many_arguments)]
fn appointment(
    id: u64,
    doctor_id: DoctorId,
    doctor_name: &str,
    date: (i32, u32, u32),
    time: &str,
    appointment_type: AppointmentType,
    reason: &str,
    status: AppointmentStatus,
) -> Appointment {
    Appointment {
        id,
        doctor_id,
        doctor_name: doctor_name.to_string(),
        date: ymd(date),
        time: TimeSlot::parse(time).unwrap_or_default(),
        appointment_type,
        reason: reason.to_string(),
        status,
        created_at: None,
    }
}

fn prescription(
    prescribed_by: &str,
    date: (i32, u32, u32),
    medications: Vec<Medication>,
    notes: &str,
) -> Prescription {
    Prescription {
        id: Uuid::new_v4(),
        medications,
        notes: Some(notes.to_string()),
        prescribed_by: prescribed_by.to_string(),
        prescribed_date: midnight_utc(ymd(date)),
        last_modified: None,
        end_date: None,
    }
}

fn ymd((year, month, day): (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_ids_are_unique() {
        let patients = seed_patients();
        assert_eq!(patients.len(), 5);

        let patient_ids: HashSet<_> = patients.iter().map(|p| p.id).collect();
        assert_eq!(patient_ids.len(), 5);

        let appointment_ids: HashSet<_> = patients
            .iter()
            .flat_map(|p| p.appointments.iter().map(|a| a.id))
            .collect();
        assert_eq!(appointment_ids.len(), 8);
    }

    #[test]
    fn test_seed_matches_reference_values() {
        let patients = seed_patients();
        let rohan = &patients[0];
        assert_eq!(rohan.contact_info.phone, "9876543210");
        assert_eq!(rohan.appointments[0].time.as_str(), "09:30 AM");
        assert_eq!(rohan.appointments[0].date, NaiveDate::from_ymd_opt(2023, 10, 5).unwrap());
        assert_eq!(rohan.prescription.as_ref().unwrap().medications.len(), 2);
        assert!(patients.iter().all(|p| p.prescription_history.is_empty()));
    }
}
