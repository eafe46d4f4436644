//! # Clinic Core
//!
//! 诊所系统的核心模块，提供基础数据结构、错误定义、表单校验和通用工具。

pub mod error;
pub mod models;
pub mod utils;
pub mod validation;

pub use error::{ClinicError, LoginRedirect, Recovery, Result};
pub use models::*;
