//! # 临床记录模块
//!
//! 进程内的诊所数据存储：
//! - 患者登记：注册、按编号或联系方式查找
//! - 预约：预约、完成、取消，状态由状态机约束
//! - 处方：当前处方与只追加的历史处方
//! - 医生名录：只读参考数据，同时用于登录匹配和列表展示
//! - 视图：BMI、预约筛选和看板统计等只读投影

pub mod appointments;
pub mod directory;
pub mod prescriptions;
pub mod registry;
pub mod seed;
pub mod state_machine;
pub mod views;

// 重新导出主要类型
pub use appointments::AppointmentRequest;
pub use directory::{Credential, DirectoryEntry, DoctorDirectory};
pub use prescriptions::{PrescriptionDraft, PrescriptionUpdate};
pub use registry::{ClinicalRecords, NewPatient};
pub use state_machine::{AppointmentEvent, AppointmentStateMachine};
pub use views::{
    AppointmentFilter, Bmi, BmiCategory, DashboardStats, PatientDashboard, PatientSummary,
    PrescriptionOverview,
};
