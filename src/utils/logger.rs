//! 日志系统模块
//!
//! 基于 tracing 生态。路由器自身只通过 `tracing` 宏输出事件，
//! 是否安装订阅者、输出到哪里由宿主应用决定。本模块提供一个开箱即用的安装器：
//!
//! - 控制台输出（可读格式或 JSON）
//! - 文件输出（非阻塞写入，按时间轮转）
//! - `RUST_LOG` 或配置指令过滤
//!
//! # 示例
//!
//! ```rust,no_run
//! use chips_messaging::utils::logger::{Logger, LoggerConfig, RotationStrategy};
//!
//! let config = LoggerConfig::builder()
//!     .level("debug")
//!     .file_output("./logs")
//!     .rotation(RotationStrategy::Hourly)
//!     .build();
//!
//! let _guard = Logger::init(config).unwrap();
//! tracing::info!(router = "System Router", "路由器已启动");
//! ```

use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::core::config::LogConfig;
use crate::utils::{MessagingError, Result};

/// 默认日志文件前缀
pub const DEFAULT_FILE_PREFIX: &str = "chips-messaging";

// ============================================================================
// 日志轮转策略
// ============================================================================

/// 日志轮转策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationStrategy {
    /// 不轮转
    Never,
    /// 每分钟轮转（主要用于测试）
    Minutely,
    /// 每小时轮转
    Hourly,
    /// 每天轮转
    #[default]
    Daily,
}

impl RotationStrategy {
    fn to_rotation(self) -> Rotation {
        match self {
            RotationStrategy::Never => Rotation::NEVER,
            RotationStrategy::Minutely => Rotation::MINUTELY,
            RotationStrategy::Hourly => Rotation::HOURLY,
            RotationStrategy::Daily => Rotation::DAILY,
        }
    }
}

impl FromStr for RotationStrategy {
    type Err = MessagingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "never" | "none" => Ok(RotationStrategy::Never),
            "minutely" | "minute" => Ok(RotationStrategy::Minutely),
            "hourly" | "hour" => Ok(RotationStrategy::Hourly),
            "daily" | "day" => Ok(RotationStrategy::Daily),
            other => Err(MessagingError::InvalidConfigValue {
                key: "logging.rotation".to_string(),
                reason: format!("未知的轮转策略 '{}'", other),
            }),
        }
    }
}

impl std::fmt::Display for RotationStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RotationStrategy::Never => "never",
            RotationStrategy::Minutely => "minutely",
            RotationStrategy::Hourly => "hourly",
            RotationStrategy::Daily => "daily",
        };
        f.write_str(s)
    }
}

// ============================================================================
// 日志配置
// ============================================================================

/// 日志系统配置
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// 默认日志级别
    pub level: String,

    /// 是否使用 JSON 格式输出
    pub json_format: bool,

    /// 是否输出到控制台
    pub console_output: bool,

    /// 文件输出目录（None 表示不输出到文件）
    pub file_output: Option<PathBuf>,

    /// 日志文件名前缀
    pub file_prefix: String,

    /// 日志轮转策略
    pub rotation: RotationStrategy,

    /// 是否显示目标模块
    pub show_target: bool,

    /// 是否显示线程 ID
    pub show_thread_ids: bool,

    /// 是否显示文件名和行号
    pub show_file_line: bool,

    /// 自定义过滤指令（EnvFilter 格式）
    /// 例如："chips_messaging::router=trace"
    pub filter_directives: Option<String>,

    /// 是否启用 ANSI 颜色（仅控制台可读格式）
    pub ansi_colors: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            console_output: true,
            file_output: None,
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            rotation: RotationStrategy::Daily,
            show_target: true,
            show_thread_ids: false,
            show_file_line: false,
            filter_directives: None,
            ansi_colors: true,
        }
    }
}

impl LoggerConfig {
    /// 创建配置构建器
    pub fn builder() -> LoggerConfigBuilder {
        LoggerConfigBuilder::new()
    }

    /// 从 `MessagingConfig` 的日志配置创建
    ///
    /// 无法识别的轮转策略回退为每天轮转（`MessagingConfig::validate` 会提前拒绝它）。
    pub fn from_log_config(log_config: &LogConfig) -> Self {
        Self {
            level: log_config.level.clone(),
            json_format: log_config.json_format,
            file_output: if log_config.file_output {
                log_config.log_dir.clone()
            } else {
                None
            },
            rotation: log_config.rotation.parse().unwrap_or_default(),
            ..Default::default()
        }
    }
}

/// 日志配置构建器
#[derive(Debug, Default)]
pub struct LoggerConfigBuilder {
    config: LoggerConfig,
}

impl LoggerConfigBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self {
            config: LoggerConfig::default(),
        }
    }

    /// 设置日志级别
    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.config.level = level.into();
        self
    }

    /// 启用 JSON 格式输出
    pub fn json_format(mut self, enable: bool) -> Self {
        self.config.json_format = enable;
        self
    }

    /// 设置控制台输出
    pub fn console_output(mut self, enable: bool) -> Self {
        self.config.console_output = enable;
        self
    }

    /// 设置文件输出目录
    pub fn file_output(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.file_output = Some(dir.into());
        self
    }

    /// 设置日志文件前缀
    pub fn file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.file_prefix = prefix.into();
        self
    }

    /// 设置轮转策略
    pub fn rotation(mut self, strategy: RotationStrategy) -> Self {
        self.config.rotation = strategy;
        self
    }

    /// 显示目标模块
    pub fn show_target(mut self, enable: bool) -> Self {
        self.config.show_target = enable;
        self
    }

    /// 显示线程 ID
    pub fn show_thread_ids(mut self, enable: bool) -> Self {
        self.config.show_thread_ids = enable;
        self
    }

    /// 显示文件名和行号
    pub fn show_file_line(mut self, enable: bool) -> Self {
        self.config.show_file_line = enable;
        self
    }

    /// 设置过滤指令
    pub fn filter_directives(mut self, directives: impl Into<String>) -> Self {
        self.config.filter_directives = Some(directives.into());
        self
    }

    /// 启用 ANSI 颜色
    pub fn ansi_colors(mut self, enable: bool) -> Self {
        self.config.ansi_colors = enable;
        self
    }

    /// 构建配置
    pub fn build(self) -> LoggerConfig {
        self.config
    }
}

// ============================================================================
// 日志守卫
// ============================================================================

/// 日志系统守卫
///
/// 持有非阻塞写入器的 `WorkerGuard`，丢弃时刷新所有挂起的日志。
#[derive(Default)]
pub struct LogGuard {
    guards: Vec<WorkerGuard>,
}

impl LogGuard {
    /// 是否持有写入器（`try_init` 在重复初始化时返回空守卫）
    pub fn is_active(&self) -> bool {
        !self.guards.is_empty()
    }
}

// ============================================================================
// 日志系统
// ============================================================================

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// 日志系统安装器
pub struct Logger;

impl Logger {
    /// 初始化全局日志订阅者
    ///
    /// 返回的 `LogGuard` 必须保持存活直到程序退出。
    ///
    /// # 错误
    ///
    /// 已初始化、过滤指令无效或全局订阅者已被其他代码安装时返回
    /// `MessagingError::InitFailed` / `MessagingError::InvalidConfigValue`
    pub fn init(config: LoggerConfig) -> Result<LogGuard> {
        if LOGGER_INITIALIZED.get().is_some() {
            return Err(MessagingError::InitFailed(
                "日志系统已初始化，不能重复初始化".to_string(),
            ));
        }

        let filter = Self::create_env_filter(&config)?;
        let mut guard = LogGuard::default();
        let mut layers: Vec<BoxedLayer> = Vec::new();

        if config.console_output {
            let (writer, worker) = tracing_appender::non_blocking(io::stdout());
            guard.guards.push(worker);
            layers.push(Self::fmt_layer(&config, writer, config.ansi_colors));
        }

        if let Some(ref dir) = config.file_output {
            let appender = RollingFileAppender::new(
                config.rotation.to_rotation(),
                dir,
                format!("{}.log", config.file_prefix),
            );
            let (writer, worker) = tracing_appender::non_blocking(appender);
            guard.guards.push(worker);
            layers.push(Self::fmt_layer(&config, writer, false));
        }

        tracing_subscriber::registry()
            .with(layers.with_filter(filter))
            .try_init()
            .map_err(|e| MessagingError::InitFailed(format!("日志系统初始化失败: {}", e)))?;

        let _ = LOGGER_INITIALIZED.set(());
        Ok(guard)
    }

    /// 尝试初始化日志系统（不会失败）
    ///
    /// 已初始化时返回空守卫，适用于测试。
    pub fn try_init(config: LoggerConfig) -> LogGuard {
        Self::init(config).unwrap_or_default()
    }

    /// 使用默认配置初始化
    pub fn init_default() -> Result<LogGuard> {
        Self::init(LoggerConfig::default())
    }

    /// 是否已经通过本模块安装了订阅者
    pub fn is_initialized() -> bool {
        LOGGER_INITIALIZED.get().is_some()
    }

    /// 创建过滤器：优先 `RUST_LOG`，否则使用配置级别，再叠加自定义指令
    fn create_env_filter(config: &LoggerConfig) -> Result<EnvFilter> {
        let mut filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

        if let Some(ref directives) = config.filter_directives {
            for directive in directives.split(',').map(str::trim).filter(|d| !d.is_empty()) {
                let parsed = directive.parse().map_err(|e| MessagingError::InvalidConfigValue {
                    key: "filter_directives".to_string(),
                    reason: format!("'{}': {}", directive, e),
                })?;
                filter = filter.add_directive(parsed);
            }
        }

        Ok(filter)
    }

    fn fmt_layer<W>(config: &LoggerConfig, writer: W, ansi: bool) -> BoxedLayer
    where
        W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
    {
        let layer = fmt::layer()
            .with_writer(writer)
            .with_target(config.show_target)
            .with_thread_ids(config.show_thread_ids)
            .with_file(config.show_file_line)
            .with_line_number(config.show_file_line);

        if config.json_format {
            layer.json().with_ansi(false).boxed()
        } else {
            layer.with_ansi(ansi).boxed()
        }
    }
}

// ============================================================================
// 结构化日志字段定义
// ============================================================================

/// 路由器与注册表日志中使用的字段名称
///
/// `tracing` 宏要求字段名为标识符，这里的常量供日志的消费方
/// （JSON 日志查询、测试断言）引用，与实际输出的字段保持一致。
pub mod fields {
    /// 路由器名称
    pub const ROUTER: &str = "router";
    /// 事件类别
    pub const CATEGORY: &str = "category";
    /// 路由描述
    pub const ROUTE: &str = "route";
    /// 路由无效原因
    pub const REASON: &str = "reason";
    /// 清理的失效路由数
    pub const PURGED: &str = "purged";
    /// 快照中的候选路由数
    pub const CANDIDATES: &str = "candidates";
    /// 成功调用的回调数
    pub const DELIVERED: &str = "delivered";
    /// panic 的回调数
    pub const PANICKED: &str = "panicked";
    /// 清空的路由数
    pub const FLUSHED: &str = "flushed";
    /// 是否隔离回调 panic
    pub const ISOLATE_PANICS: &str = "isolate_panics";
    /// 注册表键
    pub const REGISTRY_KEY: &str = "key";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_from_str() {
        assert_eq!("daily".parse::<RotationStrategy>().unwrap(), RotationStrategy::Daily);
        assert_eq!("DAY".parse::<RotationStrategy>().unwrap(), RotationStrategy::Daily);
        assert_eq!("hour".parse::<RotationStrategy>().unwrap(), RotationStrategy::Hourly);
        assert_eq!("minutely".parse::<RotationStrategy>().unwrap(), RotationStrategy::Minutely);
        assert_eq!("none".parse::<RotationStrategy>().unwrap(), RotationStrategy::Never);

        let err = "weekly".parse::<RotationStrategy>().unwrap_err();
        assert_eq!(err.error_code(), "CONFIG-002");
    }

    #[test]
    fn test_rotation_display_round_trip() {
        for strategy in [
            RotationStrategy::Never,
            RotationStrategy::Minutely,
            RotationStrategy::Hourly,
            RotationStrategy::Daily,
        ] {
            assert_eq!(strategy.to_string().parse::<RotationStrategy>().unwrap(), strategy);
        }
    }

    #[test]
    fn test_logger_config_default() {
        let config = LoggerConfig::default();
        assert_eq!(config.level, "info");
        assert!(!config.json_format);
        assert!(config.console_output);
        assert!(config.file_output.is_none());
        assert_eq!(config.file_prefix, "chips-messaging");
        assert_eq!(config.rotation, RotationStrategy::Daily);
    }

    #[test]
    fn test_logger_config_builder() {
        let config = LoggerConfig::builder()
            .level("debug")
            .json_format(true)
            .file_output("/var/log/chips")
            .file_prefix("router")
            .rotation(RotationStrategy::Hourly)
            .show_thread_ids(true)
            .filter_directives("chips_messaging::router=trace")
            .ansi_colors(false)
            .build();

        assert_eq!(config.level, "debug");
        assert!(config.json_format);
        assert_eq!(config.file_output, Some(PathBuf::from("/var/log/chips")));
        assert_eq!(config.file_prefix, "router");
        assert_eq!(config.rotation, RotationStrategy::Hourly);
        assert!(config.show_thread_ids);
        assert!(!config.ansi_colors);
    }

    #[test]
    fn test_from_log_config() {
        let log_config = LogConfig {
            level: "debug".to_string(),
            file_output: true,
            log_dir: Some(PathBuf::from("/var/log")),
            json_format: true,
            rotation: "hourly".to_string(),
        };

        let config = LoggerConfig::from_log_config(&log_config);
        assert_eq!(config.level, "debug");
        assert!(config.json_format);
        assert_eq!(config.file_output, Some(PathBuf::from("/var/log")));
        assert_eq!(config.rotation, RotationStrategy::Hourly);

        // file_output=false 时忽略目录
        let log_config = LogConfig {
            file_output: false,
            log_dir: Some(PathBuf::from("/var/log")),
            ..LogConfig::default()
        };
        assert!(LoggerConfig::from_log_config(&log_config).file_output.is_none());
    }

    #[test]
    fn test_create_env_filter() {
        let config = LoggerConfig::builder()
            .filter_directives("chips_messaging=debug, chips_messaging::router=trace")
            .build();
        assert!(Logger::create_env_filter(&config).is_ok());

        let config = LoggerConfig::builder()
            .filter_directives("chips_messaging=notalevel")
            .build();
        assert!(Logger::create_env_filter(&config).is_err());
    }

    #[test]
    fn test_try_init_never_fails() {
        let _guard = Logger::try_init(LoggerConfig::builder().console_output(false).build());
        let second = Logger::try_init(LoggerConfig::default());
        assert!(!second.is_active());
    }
}
