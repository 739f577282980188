//! # Chips Messaging - 薯片消息路由
//!
//! 进程内、类型化的发布/订阅消息路由。订阅者按事件类别注册回调，
//! 发布者按类别同步分发消息，可以限定分发范围：
//!
//! - **广播**: 类别下所有存活的订阅者
//! - **层级**: 目标的后代或祖先
//! - **区域**: 球形或环带范围（可反选、可检查遮挡）
//! - **激活状态**: 激活或未激活的订阅者
//!
//! 订阅者的存活、层级、位置和激活状态都由宿主通过 [`Host`] trait 提供，
//! 路由器不持有订阅者。失效订阅者的路由在下一次分发该类别时被自动清理。
//!
//! ## 快速开始
//!
//! ```rust
//! use std::sync::Arc;
//! use chips_messaging::{Callback, Host, Route, Router1, RoutingEvent};
//!
//! struct World;
//!
//! impl Host for World {
//!     type Handle = u32;
//!     type Category = RoutingEvent;
//!
//!     fn is_alive(&self, _owner: &u32) -> bool {
//!         true
//!     }
//! }
//!
//! let router: Router1<World, String> = Router1::new(Arc::new(World));
//! router
//!     .add_route(Route::new(
//!         7,
//!         Callback::from_fn1(|msg: &String| println!("收到: {}", msg)),
//!         RoutingEvent::Test1,
//!     ))
//!     .unwrap();
//!
//! router.route_message(RoutingEvent::Test1, &("hello".to_string(),));
//! ```
//!
//! ## 模块结构
//!
//! - `router` - 路由、路由表、路由器、注册表
//! - `core` - 配置
//! - `utils` - 错误类型和日志系统

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod core;
pub mod router;
pub mod utils;

// 重导出常用类型，方便使用
pub use router::{
    AreaQuery, AreaShape, Callback, DispatchStatsSnapshot, EventCategory, Host, InvalidReason,
    MessageTarget, Route, RouteTable, Router, Router0, Router1, Router2, Router3,
    RouterRegistry, RoutingEvent, Vector3, MIN_AREA_RADIUS,
};

pub use utils::logger::{fields, LogGuard, Logger, LoggerConfig, LoggerConfigBuilder, RotationStrategy};
pub use utils::{error_code, MessagingError, Result};

pub use core::config::{
    LogConfig, MessagingConfig, MessagingConfigBuilder, RegistryConfig, RouterConfig,
};

/// 库版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
