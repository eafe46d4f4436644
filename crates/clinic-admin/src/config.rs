//! 配置管理
//!
//! 配置来源按优先级从低到高：内置默认值、配置文件、`CLINIC_` 前缀的环境变量。
//! 嵌套字段用双下划线分隔，例如 `CLINIC_SESSION__STORAGE_DIR`。

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// 单次模拟延迟的上限
const MAX_LATENCY_MS: u64 = 60_000;

/// 诊所系统完整配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicConfig {
    /// 会话持久化配置
    pub session: SessionConfig,
    /// 模拟延迟配置
    pub latency: LatencyConfig,
    /// 日志配置
    pub logging: LoggingConfig,
    /// 临床记录配置
    pub records: RecordsConfig,
}

/// 会话持久化配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// 会话文件目录
    pub storage_dir: String,
    /// 会话记录键，同时作为文件名
    pub storage_key: String,
}

/// 模拟延迟（毫秒）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencyConfig {
    pub login_ms: u64,
    pub registration_ms: u64,
    pub booking_ms: u64,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 过滤指令，例如 `info` 或 `clinic_records=debug,info`
    pub level: String,
}

/// 临床记录配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordsConfig {
    /// 启动时载入种子患者
    pub load_seed_data: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_dir: "./data/session".to_string(),
            storage_key: "auth-storage".to_string(),
        }
    }
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            login_ms: 1000,
            registration_ms: 1000,
            booking_ms: 1200,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self { load_seed_data: true }
    }
}

/// 配置管理器
#[derive(Debug)]
pub struct ConfigManager {
    config: ClinicConfig,
    config_path: Option<String>,
    validator: ConfigValidator,
}

impl ConfigManager {
    /// 加载并校验配置，`config_path` 为空时只使用默认值和环境变量
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let validator = ConfigValidator::new();
        let config = Self::load_config(config_path)?;
        validator.validate(&config)?;

        Ok(Self {
            config,
            config_path: config_path.map(str::to_string),
            validator,
        })
    }

    fn load_config(config_path: Option<&str>) -> Result<ClinicConfig> {
        let defaults = Config::try_from(&ClinicConfig::default())
            .context("Failed to build default configuration")?;

        let mut builder = Config::builder().add_source(defaults);
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("CLINIC")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration sources")?;

        let config: ClinicConfig = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        match config_path {
            Some(path) => info!("Configuration loaded successfully from: {}", path),
            None => info!("Configuration loaded from defaults and environment"),
        }
        Ok(config)
    }

    pub fn config(&self) -> &ClinicConfig {
        &self.config
    }

    pub fn config_path(&self) -> Option<&str> {
        self.config_path.as_deref()
    }

    /// 替换配置，校验失败时保留原配置
    pub fn update_config(&mut self, new_config: ClinicConfig) -> Result<()> {
        self.validator.validate(&new_config)?;
        self.config = new_config;
        debug!("Configuration updated");
        Ok(())
    }
}

/// 配置验证器
#[derive(Debug)]
pub struct ConfigValidator {
    validation_rules: Vec<ValidationRule>,
}

#[derive(Debug)]
struct ValidationRule {
    field_path: &'static str,
    validator: fn(&ClinicConfig) -> Result<()>,
}

impl ConfigValidator {
    pub fn new() -> Self {
        let validation_rules = vec![
            ValidationRule {
                field_path: "session.storage_dir",
                validator: |config| {
                    if config.session.storage_dir.trim().is_empty() {
                        anyhow::bail!("Session storage directory cannot be empty");
                    }
                    Ok(())
                },
            },
            ValidationRule {
                field_path: "session.storage_key",
                validator: |config| {
                    let key = config.session.storage_key.trim();
                    if key.is_empty() {
                        anyhow::bail!("Session storage key cannot be empty");
                    }
                    if key.contains(['/', '\\']) || key.starts_with('.') {
                        anyhow::bail!("Session storage key '{}' is not a plain file name", key);
                    }
                    Ok(())
                },
            },
            ValidationRule {
                field_path: "latency",
                validator: |config| {
                    let latency = &config.latency;
                    for (name, value) in [
                        ("login_ms", latency.login_ms),
                        ("registration_ms", latency.registration_ms),
                        ("booking_ms", latency.booking_ms),
                    ] {
                        if value > MAX_LATENCY_MS {
                            anyhow::bail!("{} must not exceed {} ms, got {}", name, MAX_LATENCY_MS, value);
                        }
                    }
                    Ok(())
                },
            },
            ValidationRule {
                field_path: "logging.level",
                validator: |config| {
                    EnvFilter::try_new(&config.logging.level)
                        .map(|_| ())
                        .with_context(|| format!("Invalid log filter '{}'", config.logging.level))
                },
            },
        ];

        Self { validation_rules }
    }

    pub fn validate(&self, config: &ClinicConfig) -> Result<()> {
        for rule in &self.validation_rules {
            if let Err(e) = (rule.validator)(config) {
                error!("Configuration validation failed for {}: {}", rule.field_path, e);
                return Err(e.context(format!("Invalid configuration value: {}", rule.field_path)));
            }
        }

        debug!("Configuration validation passed");
        Ok(())
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_config(contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("clinic-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("clinic.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = ClinicConfig::default();
        assert!(ConfigValidator::new().validate(&config).is_ok());
        assert_eq!(config.session.storage_key, "auth-storage");
        assert_eq!(config.latency.booking_ms, 1200);
        assert!(config.records.load_seed_data);
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let path = temp_config(
            r#"
[session]
storage_dir = "/var/lib/clinic"

[latency]
booking_ms = 0
"#,
        );

        let manager = ConfigManager::load(path.to_str()).unwrap();
        let config = manager.config();
        assert_eq!(config.session.storage_dir, "/var/lib/clinic");
        assert_eq!(config.session.storage_key, "auth-storage");
        assert_eq!(config.latency.booking_ms, 0);
        assert_eq!(config.latency.login_ms, 1000);
        assert_eq!(config.logging.level, "info");

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let path = temp_config(
            r#"
[session]
storage_key = "../escape"
"#,
        );

        let err = ConfigManager::load(path.to_str()).unwrap_err();
        assert!(format!("{:#}", err).contains("session.storage_key"));

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(ConfigManager::load(Some("/nonexistent/clinic-config.toml")).is_err());
    }

    #[test]
    fn test_update_config_validates() {
        let path = temp_config("");
        let mut manager = ConfigManager::load(path.to_str()).unwrap();

        let mut bad = manager.config().clone();
        bad.latency.login_ms = MAX_LATENCY_MS + 1;
        assert!(manager.update_config(bad).is_err());
        assert_eq!(manager.config().latency.login_ms, 1000);

        let mut good = manager.config().clone();
        good.logging.level = "clinic_records=debug,info".to_string();
        manager.update_config(good).unwrap();
        assert_eq!(manager.config().logging.level, "clinic_records=debug,info");

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }
}
