//! 错误定义模块

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 授权失败时调用方应跳转的登录入口
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoginRedirect {
    /// 患者登录页
    PatientLogin,
    /// 医生登录页
    DoctorLogin,
}

impl LoginRedirect {
    pub fn path(&self) -> &'static str {
        match self {
            LoginRedirect::PatientLogin => "/login",
            LoginRedirect::DoctorLogin => "/doctor-login",
        }
    }
}

/// 展示层处理错误的方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovery {
    /// 重新填写指定字段
    Reprompt { field: String },
    /// 回到安全的落地页
    SafeLanding,
    /// 跳转到登录页
    Login(LoginRedirect),
    /// 稍后重试
    Retry,
}

/// 诊所系统统一错误类型
#[derive(Error, Debug)]
pub enum ClinicError {
    #[error("验证错误: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("权限错误: {message}")]
    Authorization {
        message: String,
        redirect: LoginRedirect,
    },

    #[error("存储错误: {0}")]
    Storage(String),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("操作已取消")]
    Cancelled,
}

impl ClinicError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ClinicError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn patient_required(message: impl Into<String>) -> Self {
        ClinicError::Authorization {
            message: message.into(),
            redirect: LoginRedirect::PatientLogin,
        }
    }

    pub fn doctor_required(message: impl Into<String>) -> Self {
        ClinicError::Authorization {
            message: message.into(),
            redirect: LoginRedirect::DoctorLogin,
        }
    }

    /// 校验失败的字段名
    pub fn field(&self) -> Option<&str> {
        match self {
            ClinicError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    /// 将错误翻译为展示层的恢复动作
    pub fn recovery(&self) -> Recovery {
        match self {
            ClinicError::Validation { field, .. } => Recovery::Reprompt {
                field: field.clone(),
            },
            ClinicError::NotFound(_) => Recovery::SafeLanding,
            ClinicError::Authorization { redirect, .. } => Recovery::Login(*redirect),
            _ => Recovery::Retry,
        }
    }
}

/// 诊所系统统一结果类型
pub type Result<T> = std::result::Result<T, ClinicError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovery_mapping() {
        let err = ClinicError::validation("phone", "Please enter a valid 10-digit phone number");
        assert_eq!(err.field(), Some("phone"));
        assert_eq!(
            err.recovery(),
            Recovery::Reprompt {
                field: "phone".to_string()
            }
        );

        let err = ClinicError::doctor_required("Doctor access required");
        assert_eq!(err.recovery(), Recovery::Login(LoginRedirect::DoctorLogin));
        assert_eq!(LoginRedirect::DoctorLogin.path(), "/doctor-login");

        assert_eq!(
            ClinicError::NotFound("Patient 9 not found".to_string()).recovery(),
            Recovery::SafeLanding
        );
        assert_eq!(ClinicError::Cancelled.recovery(), Recovery::Retry);
    }
}
