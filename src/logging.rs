// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 支持环境变量配置日志级别；输出到 stderr（stdout 留给 JSON 报告）
// ==========================================

use std::error::Error;
use tracing_subscriber::{fmt, EnvFilter};

type InitResult = Result<(), Box<dyn Error + Send + Sync + 'static>>;

/// 日志输出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// 人类可读
    #[default]
    Pretty,
    /// 单行 JSON（便于机器解析）
    Json,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// 过滤器（RUST_LOG 语法）；RUST_LOG 环境变量优先
    pub filter: String,
    pub format: LogFormat,
    pub with_line_number: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Pretty,
            with_line_number: true,
        }
    }
}

impl LogConfig {
    /// 按命令行 -v 次数调整级别
    ///
    /// - 0: 使用 default_filter
    /// - 1: debug
    /// - 2+: trace
    pub fn from_verbosity(verbosity: u8, default_filter: &str) -> Self {
        let filter = match verbosity {
            0 => default_filter.to_string(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        };
        Self {
            filter,
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: info）
///   例如: RUST_LOG=debug 或 RUST_LOG=g4it_inventory=trace
///
/// # 示例
/// ```no_run
/// use g4it_inventory::logging;
/// logging::init();
/// ```
pub fn init() {
    // 重复初始化时保留已有订阅者
    let _ = init_with(&LogConfig::default());
}

/// 按配置初始化日志系统
pub fn init_with(config: &LogConfig) -> InitResult {
    // 从环境变量读取日志级别，否则使用配置
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter)?,
    };

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(config.with_line_number);

    match config.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
}

/// 初始化测试环境的日志系统
///
/// 使用更详细的日志级别，便于调试
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_verbosity() {
        assert_eq!(LogConfig::from_verbosity(0, "warn").filter, "warn");
        assert_eq!(LogConfig::from_verbosity(1, "warn").filter, "debug");
        assert_eq!(LogConfig::from_verbosity(5, "warn").filter, "trace");
    }

    #[test]
    fn test_init_test_is_repeatable() {
        init_test();
        init_test();
        tracing::debug!("日志系统可重复初始化");
    }
}
