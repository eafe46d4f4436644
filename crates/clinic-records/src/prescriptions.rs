//! 处方管理
//!
//! 每位患者最多一张当前处方。被替换或删除的处方打上结束时间后追加到
//! 历史列表，归档后不再修改。更新操作直接修改当前处方，不产生历史版本。

use crate::registry::ClinicalRecords;
use chrono::{DateTime, Utc};
use clinic_core::validation::non_blank;
use clinic_core::{ClinicError, Medication, PatientId, Prescription, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// 新处方内容
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrescriptionDraft {
    pub medications: Vec<Medication>,
    pub notes: Option<String>,
}

/// 处方部分更新，`None` 表示该字段保持不变
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrescriptionUpdate {
    pub medications: Option<Vec<Medication>>,
    /// 传入空白字符串会清除备注
    pub notes: Option<String>,
    pub prescribed_by: Option<String>,
}

impl ClinicalRecords {
    /// 开具新处方，原有的当前处方先归档
    pub fn add_prescription(
        &mut self,
        patient_id: PatientId,
        draft: PrescriptionDraft,
        prescribed_by: &str,
    ) -> Result<Prescription> {
        self.require_patient(patient_id)?;
        let medications = usable_medications(draft.medications)?;

        let now = Utc::now();
        let prescription = Prescription {
            id: Uuid::new_v4(),
            medications,
            notes: clean_notes(draft.notes),
            prescribed_by: prescribed_by.trim().to_string(),
            prescribed_date: now,
            last_modified: None,
            end_date: None,
        };

        let patient = self.patient_mut(patient_id)?;
        if let Some(previous) = patient.prescription.take() {
            debug!("Archiving prescription {} for patient {}", previous.id, patient_id);
            patient.prescription_history.push(archive(previous, now));
        }
        patient.prescription = Some(prescription.clone());

        info!(
            "Issued prescription {} for patient {} by {}",
            prescription.id, patient_id, prescription.prescribed_by
        );
        Ok(prescription)
    }

    /// 就地修改当前处方
    pub fn update_prescription(&mut self, patient_id: PatientId, update: PrescriptionUpdate) -> Result<Prescription> {
        let medications = update.medications.map(usable_medications).transpose()?;

        let patient = self.patient_mut(patient_id)?;
        let current = patient.prescription.as_mut().ok_or_else(|| {
            ClinicError::NotFound(format!("Patient {} has no current prescription", patient_id))
        })?;

        if let Some(medications) = medications {
            current.medications = medications;
        }
        if let Some(notes) = update.notes {
            current.notes = clean_notes(Some(notes));
        }
        if let Some(prescribed_by) = non_blank(update.prescribed_by.as_deref()) {
            current.prescribed_by = prescribed_by.to_string();
        }
        current.last_modified = Some(Utc::now());

        info!("Updated prescription {} for patient {}", current.id, patient_id);
        Ok(current.clone())
    }

    /// 撤销当前处方并归档，没有当前处方时不做任何修改
    pub fn delete_prescription(&mut self, patient_id: PatientId) -> Result<Option<Prescription>> {
        let patient = self.patient_mut(patient_id)?;

        match patient.prescription.take() {
            Some(current) => {
                let archived = archive(current, Utc::now());
                patient.prescription_history.push(archived.clone());
                info!("Archived prescription {} for patient {}", archived.id, patient_id);
                Ok(Some(archived))
            }
            None => {
                debug!("Patient {} has no prescription to delete", patient_id);
                Ok(None)
            }
        }
    }
}

fn archive(mut prescription: Prescription, at: DateTime<Utc>) -> Prescription {
    prescription.end_date = Some(at);
    prescription
}

/// 去掉未填写完整的行，至少保留一条
fn usable_medications(medications: Vec<Medication>) -> Result<Vec<Medication>> {
    let medications: Vec<Medication> = medications
        .into_iter()
        .filter(|m| !m.is_blank())
        .map(|m| Medication {
            name: m.name.trim().to_string(),
            dosage: m.dosage.trim().to_string(),
            frequency: m.frequency.trim().to_string(),
            instructions: non_blank(m.instructions.as_deref()).map(str::to_string),
            form: m.form,
        })
        .collect();

    if medications.is_empty() {
        return Err(ClinicError::validation(
            "medications",
            "Please add at least one valid medication",
        ));
    }
    Ok(medications)
}

fn clean_notes(notes: Option<String>) -> Option<String> {
    non_blank(notes.as_deref()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinic_core::DrugForm;

    fn draft(name: &str) -> PrescriptionDraft {
        PrescriptionDraft {
            medications: vec![
                Medication::new(name, "500mg", "Twice daily").with_form(DrugForm::Capsule),
                Medication::new("", "", ""),
            ],
            notes: Some("  Take after meals ".to_string()),
        }
    }

    #[test]
    fn test_add_prescription_archives_previous() {
        let mut records = ClinicalRecords::seeded();
        let patient = records.add_patient(crate::NewPatient {
            name: "Kiran Das".to_string(),
            age: Some(38),
            gender: Some(clinic_core::Gender::Other),
            phone: "9000000001".to_string(),
            ..Default::default()
        });
        let patient_id = patient.unwrap().id;

        let first = records.add_prescription(patient_id, draft("Amoxicillin"), "Dr. Neha Mehta").unwrap();
        let second = records.add_prescription(patient_id, draft("Azithromycin"), "Dr. Neha Mehta").unwrap();

        let patient = records.patient(patient_id).unwrap();
        assert_eq!(patient.prescription_history.len(), 1);
        assert_eq!(patient.prescription.as_ref(), Some(&second));
        assert_eq!(patient.prescription_history[0].id, first.id);
        assert!(patient.prescription_history[0].end_date.is_some());
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_add_prescription_filters_blank_rows() {
        let mut records = ClinicalRecords::seeded();
        let prescription = records.add_prescription(3, draft("Telmisartan"), " Dr. Amitabh Singh ").unwrap();

        assert_eq!(prescription.medications.len(), 1);
        assert_eq!(prescription.medications[0].form, DrugForm::Capsule);
        assert_eq!(prescription.notes.as_deref(), Some("Take after meals"));
        assert_eq!(prescription.prescribed_by, "Dr. Amitabh Singh");
        assert_eq!(records.patient(3).unwrap().prescription_history.len(), 1);
    }

    #[test]
    fn test_add_prescription_errors() {
        let mut records = ClinicalRecords::seeded();
        let before = records.patient(2).unwrap().clone();

        let empty = PrescriptionDraft {
            medications: vec![Medication::new("Thyronorm", "", "Once daily")],
            notes: None,
        };
        let err = records.add_prescription(2, empty, "Dr. Neha Mehta").unwrap_err();
        assert_eq!(err.field(), Some("medications"));

        let after = records.patient(2).unwrap();
        assert_eq!(after.prescription, before.prescription);
        assert!(after.prescription_history.is_empty());

        assert!(matches!(
            records.add_prescription(77, draft("x"), "Dr. Neha Mehta"),
            Err(ClinicError::NotFound(_))
        ));
    }

    #[test]
    fn test_update_prescription_overwrites_in_place() {
        let mut records = ClinicalRecords::seeded();
        let original = records.patient(5).unwrap().prescription.clone().unwrap();

        let updated = records
            .update_prescription(
                5,
                PrescriptionUpdate {
                    notes: Some("Check HbA1c every quarter.".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.medications, original.medications);
        assert_eq!(updated.notes.as_deref(), Some("Check HbA1c every quarter."));
        assert!(updated.last_modified.is_some());
        assert!(records.patient(5).unwrap().prescription_history.is_empty());
    }

    #[test]
    fn test_update_prescription_errors() {
        let mut records = ClinicalRecords::seeded();

        let err = records
            .update_prescription(
                1,
                PrescriptionUpdate {
                    medications: Some(vec![Medication::new(" ", "1", "1")]),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.field(), Some("medications"));

        records.delete_prescription(1).unwrap();
        assert!(matches!(
            records.update_prescription(1, PrescriptionUpdate::default()),
            Err(ClinicError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_prescription() {
        let mut records = ClinicalRecords::seeded();

        let archived = records.delete_prescription(4).unwrap().unwrap();
        let patient = records.patient(4).unwrap();
        assert!(patient.prescription.is_none());
        assert_eq!(patient.prescription_history, vec![archived.clone()]);
        assert!(archived.end_date.is_some());

        // 没有当前处方时为空操作
        assert_eq!(records.delete_prescription(4).unwrap(), None);
        let patient = records.patient(4).unwrap();
        assert!(patient.prescription.is_none());
        assert_eq!(patient.prescription_history.len(), 1);
    }
}
