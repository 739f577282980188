//! 核心模块
//!
//! 包含消息路由的配置结构。

pub mod config;

pub use config::{
    LogConfig, MessagingConfig, MessagingConfigBuilder, RegistryConfig, RouterConfig,
    SYSTEM_ROUTER_KEY,
};
