//! 宿主能力接口
//!
//! 路由核心不持有订阅者对象，只通过句柄向宿主查询：
//!
//! - **存活**: 句柄是否仍指向存活对象
//! - **层级**: 句柄之间的父子关系
//! - **位置**: 句柄的三维坐标
//! - **激活**: 句柄是否处于激活状态
//! - **遮挡**: 两点之间的视线是否被阻挡
//!
//! 核心只依赖这些签名，从不依赖其实现。

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

use super::category::EventCategory;

/// 三维坐标
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    /// X 分量
    pub x: f32,
    /// Y 分量
    pub y: f32,
    /// Z 分量
    pub z: f32,
}

impl Vector3 {
    /// 原点
    pub const ZERO: Vector3 = Vector3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// 创建坐标
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// 两点间的欧氏距离
    ///
    /// 以 `f64` 计算，区域分发用它与半径做精确比较。
    pub fn distance(&self, other: &Vector3) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        let dz = self.z as f64 - other.z as f64;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl std::fmt::Display for Vector3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// 宿主环境
///
/// 由宿主应用（例如场景图）实现。除 [`Host::is_alive`] 外均有默认实现，
/// 宿主只需实现自己支持的能力。
///
/// # 示例
///
/// ```
/// use chips_messaging::router::{Host, RoutingEvent};
///
/// struct AlwaysAlive;
///
/// impl Host for AlwaysAlive {
///     type Handle = u32;
///     type Category = RoutingEvent;
///
///     fn is_alive(&self, _owner: &u32) -> bool {
///         true
///     }
/// }
/// ```
pub trait Host: Send + Sync + 'static {
    /// 订阅者句柄（非拥有引用）
    type Handle: Clone + Eq + Hash + Debug + Send + Sync + 'static;

    /// 事件类别集合
    type Category: EventCategory;

    /// 句柄是否仍指向存活对象
    fn is_alive(&self, owner: &Self::Handle) -> bool;

    /// `node` 是否为 `ancestor` 的后代
    ///
    /// 是否把节点自身视为自己的后代由宿主决定。
    fn is_descendant_of(&self, _node: &Self::Handle, _ancestor: &Self::Handle) -> bool {
        false
    }

    /// 句柄的位置，没有位置的订阅者不参与区域分发
    fn position(&self, _owner: &Self::Handle) -> Option<Vector3> {
        None
    }

    /// 句柄是否处于激活状态
    fn is_active(&self, _owner: &Self::Handle) -> bool {
        true
    }

    /// 两点之间的视线是否被阻挡
    fn line_of_sight_blocked(&self, _from: Vector3, _to: Vector3) -> bool {
        false
    }
}
