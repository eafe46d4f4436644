//! 访问控制

use clinic_core::{ClinicError, PatientId, Result};
use clinic_session::{Actor, DoctorIdentity, PatientIdentity};
use tracing::warn;

/// 只允许患者本人访问
pub fn require_patient(actor: &Actor, patient_id: PatientId) -> Result<&PatientIdentity> {
    match actor.as_patient() {
        Some(identity) if identity.id == patient_id => Ok(identity),
        Some(identity) => {
            warn!("Patient {} attempted to access records of patient {}", identity.id, patient_id);
            Err(ClinicError::patient_required("You can only access your own records"))
        }
        None => Err(ClinicError::patient_required("Please log in as a patient")),
    }
}

pub fn require_doctor(actor: &Actor) -> Result<&DoctorIdentity> {
    actor
        .as_doctor()
        .ok_or_else(|| ClinicError::doctor_required("Doctor access required"))
}

/// 患者本人或任意医生
///
/// 用于预约和预约状态变更。
pub fn require_patient_or_doctor(actor: &Actor, patient_id: PatientId) -> Result<()> {
    if actor.as_doctor().is_some() {
        return Ok(());
    }
    require_patient(actor, patient_id).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinic_core::{LoginRedirect, Recovery};

    fn patient(id: PatientId) -> Actor {
        Actor::Patient(PatientIdentity {
            id,
            name: "Priya Verma".to_string(),
            email: None,
            phone: "9123456789".to_string(),
        })
    }

    fn doctor() -> Actor {
        Actor::Doctor(DoctorIdentity {
            id: 1,
            name: "Dr. Rajesh Sharma".to_string(),
            email: "rajesh.sharma@clinic.com".to_string(),
            specialization: "General Physician".to_string(),
        })
    }

    #[test]
    fn test_patient_access() {
        assert!(require_patient(&patient(2), 2).is_ok());

        let err = require_patient(&patient(2), 3).unwrap_err();
        assert_eq!(err.recovery(), Recovery::Login(LoginRedirect::PatientLogin));

        assert!(require_patient(&Actor::Anonymous, 2).is_err());
        assert!(require_patient(&doctor(), 2).is_err());
    }

    #[test]
    fn test_doctor_access() {
        assert!(require_doctor(&doctor()).is_ok());

        let err = require_doctor(&patient(2)).unwrap_err();
        assert_eq!(err.recovery(), Recovery::Login(LoginRedirect::DoctorLogin));
        assert!(require_doctor(&Actor::Anonymous).is_err());
    }

    #[test]
    fn test_patient_or_doctor() {
        assert!(require_patient_or_doctor(&doctor(), 5).is_ok());
        assert!(require_patient_or_doctor(&patient(5), 5).is_ok());
        assert!(require_patient_or_doctor(&patient(4), 5).is_err());
        assert!(require_patient_or_doctor(&Actor::Anonymous, 5).is_err());
    }
}
