//! 路由器主结构体
//!
//! 持有路由表，提供注册、移除、清空、计数以及一组分发操作：
//!
//! - **广播**: 类别下所有存活订阅者
//! - **层级**: 目标的后代 / 祖先
//! - **区域**: 球形、环带及其反选，可选遮挡检查
//! - **激活**: 激活 / 未激活的订阅者
//!
//! 每次分发前先清理该类别中订阅者已失效的路由，然后在锁外按注册顺序调用回调。
//! 回调中可以再次注册或移除路由，变更从下一次分发开始生效。

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info, trace, warn};

use super::callback::Callback;
use super::category::EventCategory;
use super::host::Host;
use super::route::Route;
use super::route_table::RouteTable;
use super::scope::{AreaQuery, MessageTarget};
use crate::core::config::RouterConfig;
use crate::utils::{MessagingError, Result};

/// 无参数路由器
pub type Router0<H, R = ()> = Router<H, (), R>;
/// 单参数路由器
pub type Router1<H, T1, R = ()> = Router<H, (T1,), R>;
/// 双参数路由器
pub type Router2<H, T1, T2, R = ()> = Router<H, (T1, T2), R>;
/// 三参数路由器
pub type Router3<H, T1, T2, T3, R = ()> = Router<H, (T1, T2, T3), R>;

/// 分发统计信息
#[derive(Debug, Default)]
pub struct DispatchStats {
    /// 分发调用次数
    dispatches: AtomicU64,
    /// 成功调用的回调次数
    delivered: AtomicU64,
    /// panic 的回调次数
    panicked: AtomicU64,
    /// 清理的失效路由数
    purged: AtomicU64,
    /// 被拒绝的注册/移除次数
    rejected: AtomicU64,
    /// 最后分发时间
    last_dispatch_at: Mutex<Option<DateTime<Utc>>>,
}

impl DispatchStats {
    /// 创建新的统计实例
    pub fn new() -> Self {
        Self::default()
    }

    fn record_dispatch(&self, delivered: usize, panicked: usize) {
        self.dispatches.fetch_add(1, Ordering::Relaxed);
        self.delivered.fetch_add(delivered as u64, Ordering::Relaxed);
        self.panicked.fetch_add(panicked as u64, Ordering::Relaxed);
        *self.last_dispatch_at.lock() = Some(Utc::now());
    }

    fn record_purged(&self, count: usize) {
        self.purged.fetch_add(count as u64, Ordering::Relaxed);
    }

    fn record_rejection(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// 获取统计快照
    pub fn snapshot(&self) -> DispatchStatsSnapshot {
        DispatchStatsSnapshot {
            dispatches: self.dispatches.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            panicked: self.panicked.load(Ordering::Relaxed),
            purged: self.purged.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            last_dispatch_at: *self.last_dispatch_at.lock(),
        }
    }

    /// 重置统计
    pub fn reset(&self) {
        self.dispatches.store(0, Ordering::Relaxed);
        self.delivered.store(0, Ordering::Relaxed);
        self.panicked.store(0, Ordering::Relaxed);
        self.purged.store(0, Ordering::Relaxed);
        self.rejected.store(0, Ordering::Relaxed);
        *self.last_dispatch_at.lock() = None;
    }
}

/// 分发统计快照
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchStatsSnapshot {
    /// 分发调用次数
    pub dispatches: u64,
    /// 成功调用的回调次数
    pub delivered: u64,
    /// panic 的回调次数
    pub panicked: u64,
    /// 清理的失效路由数
    pub purged: u64,
    /// 被拒绝的注册/移除次数
    pub rejected: u64,
    /// 最后分发时间
    pub last_dispatch_at: Option<DateTime<Utc>>,
}

/// 路由器
///
/// `A` 为参数元组，`R` 为回调返回值。所有分发操作返回按注册顺序收集的结果，
/// 没有匹配的路由时返回空 `Vec`。
///
/// # 示例
///
/// ```
/// use std::sync::Arc;
/// use chips_messaging::router::{Callback, Host, Route, Router1, RoutingEvent};
///
/// struct World;
/// impl Host for World {
///     type Handle = u32;
///     type Category = RoutingEvent;
///     fn is_alive(&self, _: &u32) -> bool { true }
/// }
///
/// let router: Router1<World, i32, i32> = Router1::new(Arc::new(World));
/// router
///     .add_route(Route::new(1, Callback::from_fn1(|x: &i32| x + 1), RoutingEvent::Test1))
///     .unwrap();
///
/// assert_eq!(router.route_message(RoutingEvent::Test1, &(41,)), vec![42]);
/// assert!(router.route_message(RoutingEvent::Test2, &(0,)).is_empty());
/// ```
pub struct Router<H: Host, A = (), R = ()> {
    /// 路由表
    table: RwLock<RouteTable<H, A, R>>,
    /// 宿主环境
    host: Arc<H>,
    /// 统计信息
    stats: DispatchStats,
    /// 配置
    config: RouterConfig,
}

impl<H: Host, A, R> Router<H, A, R> {
    /// 使用默认配置创建路由器
    pub fn new(host: Arc<H>) -> Self {
        Self::with_config(host, RouterConfig::default())
    }

    /// 使用指定配置创建路由器
    pub fn with_config(host: Arc<H>, config: RouterConfig) -> Self {
        debug!(
            router = %config.name,
            isolate_panics = config.isolate_panics,
            "创建路由器"
        );
        Self {
            table: RwLock::new(RouteTable::new()),
            host,
            stats: DispatchStats::new(),
            config,
        }
    }

    /// 路由器名称
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// 路由器配置
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// 宿主环境
    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    /// 分发统计
    pub fn stats(&self) -> DispatchStatsSnapshot {
        self.stats.snapshot()
    }

    /// 重置分发统计
    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    // ==================== 注册 ====================

    /// 注册路由
    ///
    /// # 错误
    ///
    /// - 路由无效时返回 `MessagingError::InvalidRoute`
    /// - 相同路由已注册时返回 `MessagingError::DuplicateRoute`
    ///
    /// 两种情况都会记录 error 级别日志，路由表保持不变。
    pub fn add_route(&self, route: Route<H, A, R>) -> Result<()> {
        if let Some(reason) = route.invalid_reason() {
            self.stats.record_rejection();
            error!(
                router = %self.config.name,
                route = %route,
                reason = reason.as_label(),
                "无法注册无效路由"
            );
            return Err(MessagingError::InvalidRoute {
                route: route.to_string(),
                reason,
            });
        }

        let mut table = self.table.write();
        if table.contains(&route) {
            drop(table);
            self.stats.record_rejection();
            error!(router = %self.config.name, route = %route, "无法注册重复路由");
            return Err(MessagingError::DuplicateRoute(route.to_string()));
        }

        trace!(router = %self.config.name, route = %route, "路由注册成功");
        table.insert(route);
        Ok(())
    }

    /// 移除路由
    ///
    /// 类别的最后一条路由被移除时同时移除该类别，所有类别都为空时路由表被拆除。
    ///
    /// # 错误
    ///
    /// - 路由无效时返回 `MessagingError::InvalidRoute`
    /// - 路由未注册时返回 `MessagingError::RouteNotFound`
    pub fn remove_route(&self, route: &Route<H, A, R>) -> Result<()> {
        if let Some(reason) = route.invalid_reason() {
            self.stats.record_rejection();
            error!(
                router = %self.config.name,
                route = %route,
                reason = reason.as_label(),
                "无法移除无效路由"
            );
            return Err(MessagingError::InvalidRoute {
                route: route.to_string(),
                reason,
            });
        }

        let removed = self.table.write().remove(route);
        if !removed {
            self.stats.record_rejection();
            error!(router = %self.config.name, route = %route, "无法移除不存在的路由");
            return Err(MessagingError::RouteNotFound(route.to_string()));
        }

        trace!(router = %self.config.name, route = %route, "路由已移除");
        Ok(())
    }

    /// 清空整个路由表
    ///
    /// 代价较高：所有订阅者都需要重新注册。路由器从不隐式调用此操作。
    pub fn flush_routes(&self) {
        let flushed = {
            let mut table = self.table.write();
            let total = table.total();
            table.clear();
            total
        };
        info!(router = %self.config.name, flushed = flushed, "路由表已清空");
    }

    /// 路由数量
    ///
    /// 传入保留的空类别时返回所有类别的总数。
    pub fn route_count(&self, category: H::Category) -> usize {
        let table = self.table.read();
        if category.is_null() {
            table.total()
        } else {
            table.count(category)
        }
    }

    /// 路由表是否存在（至少注册了一条路由）
    pub fn tables_exist(&self) -> bool {
        self.table.read().exists()
    }

    /// 当前有路由的类别
    pub fn categories(&self) -> Vec<H::Category> {
        self.table.read().categories()
    }

    // ==================== 分发 ====================

    /// 向类别下的所有订阅者分发消息
    pub fn route_message(&self, category: H::Category, args: &A) -> Vec<R> {
        self.dispatch(category, args, |_, _| true)
    }

    /// 向目标及其后代分发消息
    ///
    /// 只有订阅了该类别的后代才会收到消息。目标已失效时不分发。
    pub fn route_message_descendants(
        &self,
        scope: &MessageTarget<H::Handle, H::Category>,
        args: &A,
    ) -> Vec<R> {
        let target = &scope.recipient;
        let target_alive = self.host.is_alive(target);
        self.dispatch(scope.event, args, |host, owner| {
            target_alive && host.is_descendant_of(owner, target)
        })
    }

    /// 向目标及其祖先分发消息
    ///
    /// 只有订阅了该类别的祖先才会收到消息。目标已失效时不分发。
    pub fn route_message_ascendants(
        &self,
        scope: &MessageTarget<H::Handle, H::Category>,
        args: &A,
    ) -> Vec<R> {
        let target = &scope.recipient;
        let target_alive = self.host.is_alive(target);
        self.dispatch(scope.event, args, |host, owner| {
            target_alive && host.is_descendant_of(target, owner)
        })
    }

    /// 按空间范围分发消息
    ///
    /// 没有位置的订阅者不参与。启用遮挡检查时，视线被阻挡的订阅者也被排除。
    pub fn route_message_area(&self, query: &AreaQuery<H::Category>, args: &A) -> Vec<R> {
        let origin = query.origin();
        self.dispatch(query.event(), args, |host, owner| {
            let Some(position) = host.position(owner) else {
                return false;
            };
            query.contains(&position)
                && !(query.checks_occlusion() && host.line_of_sight_blocked(origin, position))
        })
    }

    /// 向激活的订阅者分发消息
    pub fn route_message_active_objects(&self, category: H::Category, args: &A) -> Vec<R> {
        self.dispatch(category, args, |host, owner| host.is_active(owner))
    }

    /// 向未激活的订阅者分发消息
    pub fn route_message_inactive_objects(&self, category: H::Category, args: &A) -> Vec<R> {
        self.dispatch(category, args, |host, owner| !host.is_active(owner))
    }

    /// 清理失效路由并返回类别的路由快照
    fn sweep_and_snapshot(&self, category: H::Category) -> Vec<Route<H, A, R>> {
        let mut table = self.table.write();
        let purged = table.sweep(category, &self.host);
        if purged > 0 {
            self.stats.record_purged(purged);
            debug!(
                router = %self.config.name,
                category = ?category,
                purged = purged,
                "已清理失效路由"
            );
        }
        table.snapshot(category)
    }

    /// 分发核心：清理、快照、过滤、调用
    fn dispatch<F>(&self, category: H::Category, args: &A, filter: F) -> Vec<R>
    where
        F: Fn(&H, &H::Handle) -> bool,
    {
        let candidates = self.sweep_and_snapshot(category);
        if candidates.is_empty() {
            trace!(router = %self.config.name, category = ?category, "没有匹配的订阅者");
            self.stats.record_dispatch(0, 0);
            return Vec::new();
        }

        let mut results = Vec::with_capacity(candidates.len());
        let mut panicked = 0;

        for route in &candidates {
            let (Some(owner), Some(callback)) = (route.owner(), route.callback()) else {
                continue;
            };
            if !filter(&self.host, owner) {
                continue;
            }

            match self.invoke(callback, args) {
                Some(value) => results.push(value),
                None => {
                    panicked += 1;
                    warn!(
                        router = %self.config.name,
                        route = %route,
                        "回调 panic，继续分发给其余订阅者"
                    );
                }
            }
        }

        self.stats.record_dispatch(results.len(), panicked);
        trace!(
            router = %self.config.name,
            category = ?category,
            candidates = candidates.len(),
            delivered = results.len(),
            panicked = panicked,
            "消息分发完成"
        );
        results
    }

    /// 调用单个回调
    ///
    /// 启用隔离时捕获 panic 并返回 `None`，否则 panic 直接向调用方传播。
    fn invoke(&self, callback: &Callback<A, R>, args: &A) -> Option<R> {
        if self.config.isolate_panics {
            panic::catch_unwind(AssertUnwindSafe(|| callback.call(args))).ok()
        } else {
            Some(callback.call(args))
        }
    }
}

impl<H: Host, A, R> fmt::Debug for Router<H, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table.read();
        f.debug_struct("Router")
            .field("name", &self.config.name)
            .field("routes", &table.total())
            .field("categories", &table.categories())
            .finish()
    }
}
