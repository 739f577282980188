//! 路由（订阅记录）
//!
//! 路由把订阅者句柄、回调和事件类别绑定为一个不可变的值。
//! 同一订阅者可以用多条路由同时订阅多个类别。
//!
//! 路由构造从不失败：无效路由是合法的惰性值，由注册流程拒绝。

use std::fmt;
use std::hash::{Hash, Hasher};

use super::callback::Callback;
use super::category::EventCategory;
use super::host::Host;

/// 路由无效的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidReason {
    /// 缺少订阅者
    MissingOwner,
    /// 缺少回调
    MissingCallback,
    /// 使用了保留的空类别
    NullCategory,
    /// 使用多目标回调构造
    MulticastCallback,
}

impl InvalidReason {
    /// 简短标签，用于日志
    pub fn as_label(&self) -> &'static str {
        match self {
            InvalidReason::MissingOwner => "missing_owner",
            InvalidReason::MissingCallback => "missing_callback",
            InvalidReason::NullCategory => "null_category",
            InvalidReason::MulticastCallback => "multicast_callback",
        }
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            InvalidReason::MissingOwner => "缺少订阅者",
            InvalidReason::MissingCallback => "缺少回调",
            InvalidReason::NullCategory => "事件类别为 Null",
            InvalidReason::MulticastCallback => "回调绑定了多个目标",
        };
        f.write_str(msg)
    }
}

/// 路由
///
/// - `owner`: 订阅者句柄，不持有对象，由宿主判定存活
/// - `callback`: 恰好绑定一个函数对象
/// - `category`: 触发该路由的事件类别
///
/// 两条路由当且仅当三者都相等时相等（回调按指针身份比较）。
pub struct Route<H: Host, A = (), R = ()> {
    owner: Option<H::Handle>,
    callback: Option<Callback<A, R>>,
    category: H::Category,
    invalid: Option<InvalidReason>,
}

impl<H: Host, A, R> Route<H, A, R> {
    /// 创建路由
    ///
    /// `owner` 与 `callback` 都可以直接传值或传 `Option`。
    ///
    /// # 示例
    ///
    /// ```
    /// use chips_messaging::router::{Callback, Host, Route, RoutingEvent};
    ///
    /// struct World;
    /// impl Host for World {
    ///     type Handle = u32;
    ///     type Category = RoutingEvent;
    ///     fn is_alive(&self, _: &u32) -> bool { true }
    /// }
    ///
    /// let route: Route<World> = Route::new(1, Callback::from_fn0(|| {}), RoutingEvent::Test1);
    /// assert!(route.is_valid());
    ///
    /// let orphan: Route<World> = Route::new(None, Callback::from_fn0(|| {}), RoutingEvent::Test1);
    /// assert!(!orphan.is_valid());
    /// ```
    pub fn new(
        owner: impl Into<Option<H::Handle>>,
        callback: impl Into<Option<Callback<A, R>>>,
        category: H::Category,
    ) -> Self {
        let owner = owner.into();
        let callback = callback.into();
        let invalid = Self::check(owner.is_some(), callback.is_some(), &category);
        Self {
            owner,
            callback,
            category,
            invalid,
        }
    }

    /// 从回调列表创建路由
    ///
    /// 列表必须恰好包含一个回调。多于一个时不会截断，而是得到
    /// [`InvalidReason::MulticastCallback`] 的无效路由，保留第一个回调仅用于诊断输出。
    pub fn from_multicast(
        owner: impl Into<Option<H::Handle>>,
        callbacks: impl IntoIterator<Item = Callback<A, R>>,
        category: H::Category,
    ) -> Self {
        let mut callbacks = callbacks.into_iter();
        let first = callbacks.next();
        let extra = callbacks.next().is_some();

        let mut route = Self::new(owner, first, category);
        if extra && route.invalid.is_none() {
            route.invalid = Some(InvalidReason::MulticastCallback);
        }
        route
    }

    fn check(has_owner: bool, has_callback: bool, category: &H::Category) -> Option<InvalidReason> {
        if !has_owner {
            Some(InvalidReason::MissingOwner)
        } else if !has_callback {
            Some(InvalidReason::MissingCallback)
        } else if category.is_null() {
            Some(InvalidReason::NullCategory)
        } else {
            None
        }
    }

    /// 订阅者句柄
    pub fn owner(&self) -> Option<&H::Handle> {
        self.owner.as_ref()
    }

    /// 回调
    pub fn callback(&self) -> Option<&Callback<A, R>> {
        self.callback.as_ref()
    }

    /// 事件类别
    pub fn category(&self) -> H::Category {
        self.category
    }

    /// 路由是否有效
    pub fn is_valid(&self) -> bool {
        self.invalid.is_none()
    }

    /// 无效原因
    pub fn invalid_reason(&self) -> Option<InvalidReason> {
        self.invalid
    }

    /// 订阅者是否已失效
    ///
    /// 没有订阅者的路由视为失效。
    pub fn is_dead(&self, host: &H) -> bool {
        match self.owner {
            Some(ref owner) => !host.is_alive(owner),
            None => true,
        }
    }
}

impl<H: Host, A, R> Clone for Route<H, A, R> {
    fn clone(&self) -> Self {
        Self {
            owner: self.owner.clone(),
            callback: self.callback.clone(),
            category: self.category,
            invalid: self.invalid,
        }
    }
}

impl<H: Host, A, R> PartialEq for Route<H, A, R> {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner
            && self.callback == other.callback
            && self.category == other.category
    }
}

impl<H: Host, A, R> Eq for Route<H, A, R> {}

impl<H: Host, A, R> Hash for Route<H, A, R> {
    fn hash<S: Hasher>(&self, state: &mut S) {
        self.owner.hash(state);
        self.callback.hash(state);
        self.category.hash(state);
    }
}

impl<H: Host, A, R> fmt::Display for Route<H, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.owner {
            Some(ref owner) => write!(f, "[{:?}, ", owner)?,
            None => write!(f, "[Null, ")?,
        }
        write!(f, "{:?}, ", self.category)?;
        match self.callback {
            Some(ref callback) => write!(f, "{:?}]", callback),
            None => write!(f, "Null]"),
        }
    }
}

impl<H: Host, A, R> fmt::Debug for Route<H, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("owner", &self.owner)
            .field("callback", &self.callback)
            .field("category", &self.category)
            .field("invalid", &self.invalid)
            .finish()
    }
}
