//! 消息路由配置
//!
//! 定义路由器、日志和路由器注册表的配置结构以及加载逻辑。

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::utils::{MessagingError, Result};

/// 系统路由器的注册键
pub const SYSTEM_ROUTER_KEY: &str = "system";

/// 路由器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// 路由器名称（用于日志）
    #[serde(default = "default_router_name")]
    pub name: String,

    /// 是否隔离回调 panic
    ///
    /// 启用时 panic 的回调被记录并跳过，其余订阅者照常收到消息；
    /// 关闭时 panic 直接传播给分发调用方。
    #[serde(default = "default_true")]
    pub isolate_panics: bool,
}

fn default_router_name() -> String {
    "System Router".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            name: default_router_name(),
            isolate_panics: true,
        }
    }
}

impl RouterConfig {
    /// 创建指定名称的配置
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否输出到文件
    #[serde(default)]
    pub file_output: bool,

    /// 日志文件目录
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// 是否输出 JSON 格式
    #[serde(default)]
    pub json_format: bool,

    /// 日志轮转策略
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "warning", "error"];
const ROTATIONS: [&str; 8] = [
    "never", "none", "minutely", "minute", "hourly", "hour", "daily", "day",
];

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: false,
            log_dir: None,
            json_format: false,
            rotation: default_rotation(),
        }
    }
}

/// 路由器注册表配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// 预先创建的路由器注册键（系统路由器总是存在）
    #[serde(default)]
    pub routers: Vec<String>,
}

/// 消息路由配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessagingConfig {
    /// 配置文件路径
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// 路由器配置
    #[serde(default)]
    pub router: RouterConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LogConfig,

    /// 注册表配置
    #[serde(default)]
    pub registry: RegistryConfig,
}

impl MessagingConfig {
    /// 创建配置构建器
    pub fn builder() -> MessagingConfigBuilder {
        MessagingConfigBuilder::new()
    }

    /// 从文件加载配置
    ///
    /// `.json` 扩展名按 JSON 解析，其余按 YAML 解析。加载后立即校验。
    pub async fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            MessagingError::ConfigLoadFailed(format!("{}: {}", path.display(), e))
        })?;

        let mut config: MessagingConfig =
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                serde_json::from_str(&content)?
            } else {
                serde_yaml::from_str(&content)?
            };

        config.validate()?;
        config.config_path = Some(path);
        Ok(config)
    }

    /// 合并另一个配置（用于覆盖）
    pub fn merge(&mut self, other: MessagingConfig) {
        // 只覆盖非默认值的配置
        if other.router.name != default_router_name() {
            self.router.name = other.router.name;
        }
        if !other.router.isolate_panics {
            self.router.isolate_panics = false;
        }
        if other.logging.level != default_log_level() {
            self.logging.level = other.logging.level;
        }
        if other.logging.file_output {
            self.logging.file_output = true;
            self.logging.log_dir = other.logging.log_dir;
        }
        if other.logging.json_format {
            self.logging.json_format = true;
        }
        if other.logging.rotation != default_rotation() {
            self.logging.rotation = other.logging.rotation;
        }
        for key in other.registry.routers {
            if !self
                .registry
                .routers
                .iter()
                .any(|k| k.eq_ignore_ascii_case(&key))
            {
                self.registry.routers.push(key);
            }
        }
        if other.config_path.is_some() {
            self.config_path = other.config_path;
        }
    }

    /// 校验配置
    ///
    /// # 错误
    ///
    /// 第一个无效的配置项以 `MessagingError::InvalidConfigValue` 返回
    pub fn validate(&self) -> Result<()> {
        if self.router.name.trim().is_empty() {
            return Err(invalid("router.name", "路由器名称不能为空"));
        }

        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(invalid(
                "logging.level",
                format!("未知的日志级别 '{}'", self.logging.level),
            ));
        }

        let rotation = self.logging.rotation.to_lowercase();
        if !ROTATIONS.contains(&rotation.as_str()) {
            return Err(invalid(
                "logging.rotation",
                format!("未知的轮转策略 '{}'", self.logging.rotation),
            ));
        }

        if self.logging.file_output && self.logging.log_dir.is_none() {
            return Err(invalid("logging.log_dir", "启用文件日志时必须指定目录"));
        }

        let mut seen = HashSet::new();
        for key in &self.registry.routers {
            let normalized = key.trim().to_lowercase();
            if normalized.is_empty() {
                return Err(invalid("registry.routers", "路由器注册键不能为空"));
            }
            if normalized == SYSTEM_ROUTER_KEY {
                return Err(invalid(
                    "registry.routers",
                    "系统路由器总是存在，不能重复声明",
                ));
            }
            if !seen.insert(normalized) {
                return Err(invalid(
                    "registry.routers",
                    format!("路由器注册键重复: '{}'", key),
                ));
            }
        }

        Ok(())
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> MessagingError {
    MessagingError::InvalidConfigValue {
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// 配置构建器
#[derive(Debug, Default)]
pub struct MessagingConfigBuilder {
    config: MessagingConfig,
}

impl MessagingConfigBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self {
            config: MessagingConfig::default(),
        }
    }

    /// 设置系统路由器名称
    pub fn router_name(mut self, name: impl Into<String>) -> Self {
        self.config.router.name = name.into();
        self
    }

    /// 设置是否隔离回调 panic
    pub fn isolate_panics(mut self, enable: bool) -> Self {
        self.config.router.isolate_panics = enable;
        self
    }

    /// 设置日志级别
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    /// 启用文件日志
    pub fn file_logging(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.config.logging.file_output = true;
        self.config.logging.log_dir = Some(log_dir.into());
        self
    }

    /// 启用 JSON 格式日志
    pub fn json_logging(mut self) -> Self {
        self.config.logging.json_format = true;
        self
    }

    /// 设置日志轮转策略
    pub fn rotation(mut self, rotation: impl Into<String>) -> Self {
        self.config.logging.rotation = rotation.into();
        self
    }

    /// 预先创建一个命名路由器
    pub fn router(mut self, key: impl Into<String>) -> Self {
        self.config.registry.routers.push(key.into());
        self
    }

    /// 构建配置
    pub fn build(self) -> MessagingConfig {
        self.config
    }
}
