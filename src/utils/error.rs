//! 消息路由错误类型定义
//!
//! 本模块定义了消息路由中使用的所有错误类型。
//! 注册/注销错误属于可恢复的诊断信息，分发本身从不返回错误。

use thiserror::Error;

use crate::router::route::InvalidReason;

/// 消息路由核心错误类型
#[derive(Error, Debug)]
pub enum MessagingError {
    // ==================== 路由注册错误 ====================

    /// 路由无效（缺少订阅者、缺少回调、保留类别或多目标回调）
    #[error("路由无效: {route} - {reason}")]
    InvalidRoute {
        /// 路由描述
        route: String,
        /// 无效原因
        reason: InvalidReason,
    },

    /// 相同的路由已注册
    #[error("路由重复注册: {0}")]
    DuplicateRoute(String),

    /// 要移除的路由不存在
    #[error("路由不存在: {0}")]
    RouteNotFound(String),

    // ==================== 配置错误 ====================

    /// 配置加载失败
    #[error("配置加载失败: {0}")]
    ConfigLoadFailed(String),

    /// 配置值无效
    #[error("配置值无效: '{key}' - {reason}")]
    InvalidConfigValue {
        /// 配置项
        key: String,
        /// 原因
        reason: String,
    },

    // ==================== IO 和序列化错误 ====================

    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 序列化/反序列化错误
    #[error("JSON 错误: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML 序列化/反序列化错误
    #[error("YAML 错误: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // ==================== 通用错误 ====================

    /// 初始化失败
    #[error("初始化失败: {0}")]
    InitFailed(String),

    /// 其他错误
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// 消息路由操作结果类型别名
pub type Result<T> = std::result::Result<T, MessagingError>;

/// 错误码常量
pub mod error_code {
    // 路由错误 (ROUTE-xxx)
    /// 无效路由
    pub const ROUTE_INVALID: &str = "ROUTE-001";
    /// 重复路由
    pub const ROUTE_DUPLICATE: &str = "ROUTE-002";
    /// 路由不存在
    pub const ROUTE_NOT_FOUND: &str = "ROUTE-003";

    // 配置错误 (CONFIG-xxx)
    /// 配置加载失败
    pub const CONFIG_LOAD_FAILED: &str = "CONFIG-001";
    /// 配置值无效
    pub const CONFIG_INVALID_VALUE: &str = "CONFIG-002";

    // 核心错误 (CORE-xxx)
    /// 初始化失败
    pub const CORE_INIT_FAILED: &str = "CORE-001";
}

impl MessagingError {
    /// 获取错误码
    pub fn error_code(&self) -> &'static str {
        match self {
            MessagingError::InvalidRoute { .. } => error_code::ROUTE_INVALID,
            MessagingError::DuplicateRoute(_) => error_code::ROUTE_DUPLICATE,
            MessagingError::RouteNotFound(_) => error_code::ROUTE_NOT_FOUND,
            MessagingError::ConfigLoadFailed(_)
            | MessagingError::Io(_)
            | MessagingError::Json(_)
            | MessagingError::Yaml(_) => error_code::CONFIG_LOAD_FAILED,
            MessagingError::InvalidConfigValue { .. } => error_code::CONFIG_INVALID_VALUE,
            MessagingError::InitFailed(_) => error_code::CORE_INIT_FAILED,
            MessagingError::Other(_) => "UNKNOWN",
        }
    }

    /// 是否为路由注册/注销类错误
    pub fn is_route_error(&self) -> bool {
        matches!(
            self,
            MessagingError::InvalidRoute { .. }
                | MessagingError::DuplicateRoute(_)
                | MessagingError::RouteNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MessagingError::DuplicateRoute("[1, Test1, cb]".to_string());
        assert!(err.to_string().contains("Test1"));

        let err = MessagingError::InvalidRoute {
            route: "[Null, Test1, Null]".to_string(),
            reason: InvalidReason::MissingOwner,
        };
        assert!(err.to_string().contains("缺少订阅者"));
    }

    #[test]
    fn test_error_code() {
        let err = MessagingError::RouteNotFound("r".to_string());
        assert_eq!(err.error_code(), error_code::ROUTE_NOT_FOUND);
        assert!(err.is_route_error());

        let err = MessagingError::InitFailed("x".to_string());
        assert_eq!(err.error_code(), error_code::CORE_INIT_FAILED);
        assert!(!err.is_route_error());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: MessagingError = io_err.into();
        assert!(matches!(err, MessagingError::Io(_)));
        assert_eq!(err.error_code(), error_code::CONFIG_LOAD_FAILED);
    }
}
