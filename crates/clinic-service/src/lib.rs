//! # 诊所服务
//!
//! 应用根持有的唯一服务对象，把会话、临床记录和访问控制组合在一起。
//! 登录、注册和预约前有一段模拟延迟，可通过取消令牌中止。

pub mod access;
pub mod service;

pub use service::{ClinicService, DoctorDashboard, LatencySettings};
