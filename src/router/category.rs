//! 事件类别
//!
//! 事件类别是发布者与订阅者之间的匹配标签。类别集合封闭且较小，
//! 并包含一个保留的 `NULL` 值，该值永远不能用于注册。

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// 事件类别 trait
///
/// 宿主可以定义自己的类别枚举，只需指定保留的空值。
pub trait EventCategory: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// 保留的空类别
    const NULL: Self;

    /// 是否为保留的空类别
    fn is_null(&self) -> bool {
        *self == Self::NULL
    }
}

/// 内置事件类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum RoutingEvent {
    /// 保留值，不可注册
    Null = 0,
    /// 测试事件 1
    Test1 = 1,
    /// 测试事件 2
    Test2 = 2,
    /// 测试事件 3
    Test3 = 3,
    /// 测试事件 4
    Test4 = 4,
    /// 测试事件 5
    Test5 = 5,
    /// 测试事件 6
    Test6 = 6,
    /// 测试事件 7
    Test7 = 7,
    /// 测试事件 8
    Test8 = 8,
    /// 测试事件 9
    Test9 = 9,
    /// 测试事件 10
    Test10 = 10,
    /// 测试事件 11
    Test11 = 11,
    /// 测试事件 12
    Test12 = 12,
    /// 测试事件 13
    Test13 = 13,
    /// 测试事件 14
    Test14 = 14,
    /// 测试事件 15
    Test15 = 15,
    /// 测试事件 16
    Test16 = 16,
}

impl EventCategory for RoutingEvent {
    const NULL: Self = RoutingEvent::Null;
}

impl RoutingEvent {
    /// 所有非空类别
    pub const ALL: [RoutingEvent; 16] = [
        RoutingEvent::Test1,
        RoutingEvent::Test2,
        RoutingEvent::Test3,
        RoutingEvent::Test4,
        RoutingEvent::Test5,
        RoutingEvent::Test6,
        RoutingEvent::Test7,
        RoutingEvent::Test8,
        RoutingEvent::Test9,
        RoutingEvent::Test10,
        RoutingEvent::Test11,
        RoutingEvent::Test12,
        RoutingEvent::Test13,
        RoutingEvent::Test14,
        RoutingEvent::Test15,
        RoutingEvent::Test16,
    ];

    /// 从原始值转换，未知值返回 `None`
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(RoutingEvent::Null),
            1..=16 => Some(Self::ALL[value as usize - 1]),
            _ => None,
        }
    }
}

impl Default for RoutingEvent {
    fn default() -> Self {
        RoutingEvent::Null
    }
}

impl std::fmt::Display for RoutingEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
