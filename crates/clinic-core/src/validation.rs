//! 表单字段校验
//!
//! 注册、登录和预约共用的字段规则。校验失败统一返回
//! [`ClinicError::Validation`]，并带上首个出错的字段名。

use crate::error::{ClinicError, Result};
use regex::Regex;
use std::sync::LazyLock;

static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{10}$").unwrap());
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").unwrap());

pub const MIN_AGE: u32 = 1;
pub const MAX_AGE: u32 = 120;

/// 去掉非数字字符后恰好是10位数字时返回规范化号码
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    PHONE_PATTERN.is_match(&digits).then_some(digits)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// 空白字符串视为未填写
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub fn require_text<'a>(field: &str, value: &'a str, message: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ClinicError::validation(field, message));
    }
    Ok(trimmed)
}

pub fn require_age(age: Option<u32>) -> Result<u8> {
    match age {
        Some(age) if (MIN_AGE..=MAX_AGE).contains(&age) => Ok(age as u8),
        _ => Err(ClinicError::validation("age", "Please enter a valid age")),
    }
}

pub fn require_phone(field: &str, raw: &str) -> Result<String> {
    normalize_phone(raw)
        .ok_or_else(|| ClinicError::validation(field, "Please enter a valid 10-digit phone number"))
}

/// 可选邮箱：未填写返回 `None`，填写了则必须格式正确
pub fn optional_email(raw: Option<&str>) -> Result<Option<String>> {
    match non_blank(raw) {
        None => Ok(None),
        Some(email) if is_valid_email(email) => Ok(Some(email.to_string())),
        Some(_) => Err(ClinicError::validation("email", "Please enter a valid email address")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("9876543210").as_deref(), Some("9876543210"));
        assert_eq!(normalize_phone("(987) 654-3210").as_deref(), Some("9876543210"));
        assert_eq!(normalize_phone("+91 98765 43210"), None);
        assert_eq!(normalize_phone("12345"), None);
        assert_eq!(normalize_phone(""), None);
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("rohan.sharma@example.com"));
        assert!(!is_valid_email("rohan.sharma@example"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("rohan sharma"));
    }

    #[test]
    fn test_optional_email() {
        assert_eq!(optional_email(None).unwrap(), None);
        assert_eq!(optional_email(Some("   ")).unwrap(), None);
        assert_eq!(
            optional_email(Some(" a@b.co ")).unwrap().as_deref(),
            Some("a@b.co")
        );
        let err = optional_email(Some("not-an-email")).unwrap_err();
        assert_eq!(err.field(), Some("email"));
    }

    #[test]
    fn test_age_bounds() {
        assert!(require_age(Some(0)).is_err());
        assert_eq!(require_age(Some(1)).unwrap(), 1);
        assert_eq!(require_age(Some(120)).unwrap(), 120);
        assert!(require_age(Some(121)).is_err());
        assert!(require_age(None).is_err());
    }

    #[test]
    fn test_require_text() {
        assert_eq!(require_text("name", "  Rohan ", "Name is required").unwrap(), "Rohan");
        let err = require_text("reason", " \t", "Provide a reason").unwrap_err();
        assert_eq!(err.field(), Some("reason"));
    }
}
