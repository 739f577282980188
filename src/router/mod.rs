//! 路由模块
//!
//! 包含消息路由的核心组件：
//! - 事件类别与宿主环境 trait
//! - 回调与路由
//! - 路由表
//! - 分发范围（层级 / 区域）
//! - 路由器主结构体
//! - 路由器注册表

pub mod callback;
pub mod category;
pub mod host;
pub mod registry;
pub mod route;
pub mod route_table;
pub mod router;
pub mod scope;

// 重导出常用类型
pub use callback::Callback;
pub use category::{EventCategory, RoutingEvent};
pub use host::{Host, Vector3};
pub use registry::RouterRegistry;
pub use route::{InvalidReason, Route};
pub use route_table::RouteTable;
pub use router::{
    DispatchStats, DispatchStatsSnapshot, Router, Router0, Router1, Router2, Router3,
};
pub use scope::{AreaQuery, AreaShape, MessageTarget, MIN_AREA_RADIUS};
