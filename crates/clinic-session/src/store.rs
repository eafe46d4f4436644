//! 会话存储
//!
//! 同一时刻只有一个活动身份。`login`/`doctor_login`/`logout` 都经过
//! [`SessionStore::transition`]，在内存中切换身份后立即把完整快照写回存储。

use crate::actor::{Actor, DoctorIdentity, PatientIdentity};
use crate::storage::SessionStorage;
use clinic_core::{ClinicError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// 会话记录在持久化存储中的键
pub const DEFAULT_STORAGE_KEY: &str = "auth-storage";

/// 持久化的用户类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Patient,
    Doctor,
}

/// 持久化的会话记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub is_logged_in: bool,
    pub user: Option<serde_json::Value>,
    pub user_type: Option<UserType>,
}

impl SessionRecord {
    pub fn from_actor(actor: &Actor) -> Result<Self> {
        let record = match actor {
            Actor::Anonymous => Self {
                is_logged_in: false,
                user: None,
                user_type: None,
            },
            Actor::Patient(identity) => Self {
                is_logged_in: true,
                user: Some(serde_json::to_value(identity)?),
                user_type: Some(UserType::Patient),
            },
            Actor::Doctor(identity) => Self {
                is_logged_in: true,
                user: Some(serde_json::to_value(identity)?),
                user_type: Some(UserType::Doctor),
            },
        };
        Ok(record)
    }

    pub fn into_actor(self) -> Result<Actor> {
        if !self.is_logged_in {
            return Ok(Actor::Anonymous);
        }

        match (self.user_type, self.user) {
            (Some(UserType::Patient), Some(user)) => {
                Ok(Actor::Patient(serde_json::from_value::<PatientIdentity>(user)?))
            }
            (Some(UserType::Doctor), Some(user)) => {
                Ok(Actor::Doctor(serde_json::from_value::<DoctorIdentity>(user)?))
            }
            _ => Err(ClinicError::Storage(
                "logged-in session record is missing user or userType".to_string(),
            )),
        }
    }
}

/// 会话存储
pub struct SessionStore {
    actor: Actor,
    storage: Box<dyn SessionStorage>,
    key: String,
}

impl SessionStore {
    /// 从持久化存储恢复会话，记录缺失或损坏时回退为匿名
    pub fn restore(storage: impl SessionStorage + 'static) -> Self {
        Self::restore_with_key(storage, DEFAULT_STORAGE_KEY)
    }

    pub fn restore_with_key(storage: impl SessionStorage + 'static, key: &str) -> Self {
        let actor = match Self::read_actor(&storage, key) {
            Ok(actor) => actor,
            Err(e) => {
                warn!("Discarding unreadable session record '{}': {}", key, e);
                Actor::Anonymous
            }
        };

        info!("Session restored as {:?}", actor.kind());
        Self {
            actor,
            storage: Box::new(storage),
            key: key.to_string(),
        }
    }

    fn read_actor(storage: &dyn SessionStorage, key: &str) -> Result<Actor> {
        match storage.load(key)? {
            Some(raw) => serde_json::from_str::<SessionRecord>(&raw)?.into_actor(),
            None => Ok(Actor::Anonymous),
        }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    /// 患者登录，调用方负责事先完成凭据匹配
    pub fn login(&mut self, identity: PatientIdentity) {
        info!("Patient {} logged in", identity.id);
        self.transition(Actor::Patient(identity));
    }

    /// 医生登录，调用方负责事先完成凭据匹配
    pub fn doctor_login(&mut self, identity: DoctorIdentity) {
        info!("Doctor {} logged in", identity.id);
        self.transition(Actor::Doctor(identity));
    }

    pub fn logout(&mut self) {
        if self.actor.is_authenticated() {
            info!("{:?} session logged out", self.actor.kind());
        }
        self.transition(Actor::Anonymous);
    }

    pub fn is_authenticated(&self) -> bool {
        self.actor.is_authenticated()
    }

    pub fn is_patient(&self) -> bool {
        self.actor.as_patient().is_some()
    }

    pub fn is_doctor(&self) -> bool {
        self.actor.as_doctor().is_some()
    }

    /// 将当前身份写入持久化存储
    pub fn flush(&self) -> Result<()> {
        let record = SessionRecord::from_actor(&self.actor)?;
        let raw = serde_json::to_string(&record)?;
        self.storage.save(&self.key, &raw)?;
        debug!("Session record '{}' flushed", self.key);
        Ok(())
    }

    // 写入失败不回滚内存中的身份，只记录告警
    fn transition(&mut self, actor: Actor) {
        self.actor = actor;
        if let Err(e) = self.flush() {
            warn!("Failed to persist session record '{}': {}", self.key, e);
        }
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("actor", &self.actor)
            .field("key", &self.key)
            .finish()
    }
}
