//! 日志初始化

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

/// 初始化全局日志订阅器
///
/// `RUST_LOG` 存在时优先于传入的过滤指令。重复初始化返回错误。
pub fn init_logging(level: &str) -> Result<()> {
    let filter = build_filter(level)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::debug!("Logging initialized with filter '{}'", level);
    Ok(())
}

fn build_filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level).with_context(|| format!("Invalid log filter '{}'", level)),
    }
}
