//! # Observability
//!
//! 可观测性模块：Tracing 初始化 + channel 指标。
//!
//! ## 功能
//!
//! - Tracing 初始化 (JSON/Pretty/Compact 格式，`RUST_LOG` 优先)
//! - Emit / dispatch / pipe 指标记录
//!
//! ## 使用示例
//!
//! ```ignore
//! use observability::{metrics, LogFormat, ObservabilityConfig};
//!
//! observability::init_with_config(ObservabilityConfig::new(LogFormat::Compact, "debug"))?;
//!
//! // 记录分发结果
//! metrics::record_dispatch("demo.Bar", metrics::DispatchOutcome::Delivered);
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

// Re-exports
pub use crate::metrics::{
    record_dispatch, record_payload_emitted, record_pipe_dropped, DispatchOutcome,
};

/// 可观测性配置
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// 日志格式
    pub log_format: LogFormat,
    /// 默认日志级别 (`RUST_LOG` 未设置时生效)
    pub default_log_level: String,
}

impl ObservabilityConfig {
    pub fn new(log_format: LogFormat, default_log_level: impl Into<String>) -> Self {
        Self {
            log_format,
            default_log_level: default_log_level.into(),
        }
    }

    /// `RUST_LOG`，否则 `default_log_level`
    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.default_log_level))
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self::new(LogFormat::Json, "info")
    }
}

/// 日志格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON 结构化日志
    #[default]
    Json,
    /// 人类可读格式
    Pretty,
    /// 紧凑单行格式
    Compact,
}

impl LogFormat {
    fn layer(self) -> Box<dyn Layer<Registry> + Send + Sync> {
        match self {
            LogFormat::Json => fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
            LogFormat::Pretty => fmt::layer().pretty().boxed(),
            LogFormat::Compact => fmt::layer().compact().boxed(),
        }
    }
}

/// 安装全局 tracing 订阅器
///
/// # Errors
/// 已安装过订阅器
pub fn init_with_config(config: ObservabilityConfig) -> Result<()> {
    tracing_subscriber::registry()
        .with(config.log_format.layer())
        .with(config.filter())
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    tracing::info!(log_format = ?config.log_format, "Observability initialized");

    Ok(())
}
