//! 登录身份

use clinic_core::{DoctorId, PatientId};
use serde::{Deserialize, Serialize};

/// 身份类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    Anonymous,
    Patient,
    Doctor,
}

/// 已登录患者的身份快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientIdentity {
    pub id: PatientId,
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
}

/// 已登录医生的身份快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorIdentity {
    pub id: DoctorId,
    pub name: String,
    pub email: String,
    pub specialization: String,
}

/// 当前操作者
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Actor {
    #[default]
    Anonymous,
    Patient(PatientIdentity),
    Doctor(DoctorIdentity),
}

impl Actor {
    pub fn kind(&self) -> ActorKind {
        match self {
            Actor::Anonymous => ActorKind::Anonymous,
            Actor::Patient(_) => ActorKind::Patient,
            Actor::Doctor(_) => ActorKind::Doctor,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Actor::Anonymous)
    }

    pub fn as_patient(&self) -> Option<&PatientIdentity> {
        match self {
            Actor::Patient(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn as_doctor(&self) -> Option<&DoctorIdentity> {
        match self {
            Actor::Doctor(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn display_name(&self) -> Option<&str> {
        match self {
            Actor::Anonymous => None,
            Actor::Patient(identity) => Some(&identity.name),
            Actor::Doctor(identity) => Some(&identity.name),
        }
    }
}
