//! 分发范围参数
//!
//! - [`MessageTarget`]: 层级范围（目标句柄 + 事件类别）
//! - [`AreaQuery`]: 空间范围（原点 + 半径或环带 + 反选/遮挡选项 + 事件类别）
//!
//! 二者都是不可变的值对象，只负责携带参数。

use serde::{Deserialize, Serialize};
use std::fmt;

use super::host::Vector3;

/// 区域半径下限
pub const MIN_AREA_RADIUS: f32 = 0.001;

/// 半径取绝对值并限制在下限之上（NaN 视为下限）
fn normalize_radius(radius: f32) -> f32 {
    radius.abs().max(MIN_AREA_RADIUS)
}

/// 层级范围
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageTarget<T, C> {
    /// 范围目标
    pub recipient: T,
    /// 发送的事件类别
    pub event: C,
}

impl<T, C> MessageTarget<T, C> {
    /// 创建层级范围
    pub fn new(recipient: T, event: C) -> Self {
        Self { recipient, event }
    }
}

/// 区域形状
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum AreaShape {
    /// 球形区域
    Sphere {
        /// 半径
        radius: f32,
    },
    /// 环带区域
    Band {
        /// 内半径
        inner: f32,
        /// 外半径
        outer: f32,
    },
}

/// 空间范围
///
/// # 示例
///
/// ```
/// use chips_messaging::router::{AreaQuery, RoutingEvent, Vector3};
///
/// let query = AreaQuery::band(Vector3::ZERO, 10.0, -2.0, RoutingEvent::Test1)
///     .inverse()
///     .with_occlusion_check();
///
/// assert_eq!(query.band_bounds(), Some((2.0, 10.0)));
/// assert!(query.is_inverse());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaQuery<C> {
    origin: Vector3,
    shape: AreaShape,
    inverse: bool,
    check_occlusion: bool,
    event: C,
}

impl<C: Copy> AreaQuery<C> {
    /// 球形区域：距离不超过 `radius` 的订阅者
    pub fn sphere(origin: Vector3, radius: f32, event: C) -> Self {
        Self {
            origin,
            shape: AreaShape::Sphere {
                radius: normalize_radius(radius),
            },
            inverse: false,
            check_occlusion: false,
            event,
        }
    }

    /// 环带区域：距离位于 `[inner, outer]` 的订阅者
    ///
    /// 内外半径颠倒时自动交换。
    pub fn band(origin: Vector3, inner: f32, outer: f32, event: C) -> Self {
        let a = normalize_radius(inner);
        let b = normalize_radius(outer);
        let (inner, outer) = if a <= b { (a, b) } else { (b, a) };
        Self {
            origin,
            shape: AreaShape::Band { inner, outer },
            inverse: false,
            check_occlusion: false,
            event,
        }
    }

    /// 反选：区域之外的订阅者
    pub fn inverse(mut self) -> Self {
        self.inverse = true;
        self
    }

    /// 排除视线被遮挡的订阅者
    pub fn with_occlusion_check(mut self) -> Self {
        self.check_occlusion = true;
        self
    }

    /// 更换原点
    pub fn with_origin(mut self, origin: Vector3) -> Self {
        self.origin = origin;
        self
    }

    /// 更换事件类别
    pub fn with_event(mut self, event: C) -> Self {
        self.event = event;
        self
    }

    /// 原点
    pub fn origin(&self) -> Vector3 {
        self.origin
    }

    /// 区域形状
    pub fn shape(&self) -> AreaShape {
        self.shape
    }

    /// 是否反选
    pub fn is_inverse(&self) -> bool {
        self.inverse
    }

    /// 是否检查遮挡
    pub fn checks_occlusion(&self) -> bool {
        self.check_occlusion
    }

    /// 事件类别
    pub fn event(&self) -> C {
        self.event
    }

    /// 球形半径
    pub fn radius(&self) -> Option<f32> {
        match self.shape {
            AreaShape::Sphere { radius } => Some(radius),
            AreaShape::Band { .. } => None,
        }
    }

    /// 环带内外半径
    pub fn band_bounds(&self) -> Option<(f32, f32)> {
        match self.shape {
            AreaShape::Sphere { .. } => None,
            AreaShape::Band { inner, outer } => Some((inner, outer)),
        }
    }

    /// 距离是否满足区域条件（含反选）
    ///
    /// 比较不带容差：球形 `d <= r`，环带 `inner <= d <= outer`；
    /// 反选时为 `d > r` 与 `d < inner || d > outer`。
    /// NaN 距离不满足任何条件，反选也不例外。
    pub fn contains_distance(&self, distance: f64) -> bool {
        match (self.shape, self.inverse) {
            (AreaShape::Sphere { radius }, false) => distance <= radius as f64,
            (AreaShape::Sphere { radius }, true) => distance > radius as f64,
            (AreaShape::Band { inner, outer }, false) => {
                distance >= inner as f64 && distance <= outer as f64
            }
            (AreaShape::Band { inner, outer }, true) => {
                distance < inner as f64 || distance > outer as f64
            }
        }
    }

    /// 坐标是否满足区域条件（含反选）
    pub fn contains(&self, position: &Vector3) -> bool {
        self.contains_distance(self.origin.distance(position))
    }
}

impl<C: fmt::Debug> fmt::Display for AreaQuery<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shape {
            AreaShape::Sphere { radius } => write!(f, "[{}, {}", self.origin, radius)?,
            AreaShape::Band { inner, outer } => {
                write!(f, "[{}, {}, {}", self.origin, inner, outer)?
            }
        }
        if self.inverse {
            write!(f, ", inverse")?;
        }
        write!(f, ", {:?}]", self.event)
    }
}
