//! # 会话模块
//!
//! 保存当前登录身份（匿名、患者或医生），并在每次身份变更时持久化，
//! 进程重启后自动恢复。

pub mod actor;
pub mod storage;
pub mod store;

pub use actor::{Actor, ActorKind, DoctorIdentity, PatientIdentity};
pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage};
pub use store::{SessionRecord, SessionStore, UserType, DEFAULT_STORAGE_KEY};
