//! 路由器注册表
//!
//! 按名称管理一组共享同一宿主的路由器。注册表创建时即包含一个永久的系统路由器，
//! 注册键不区分大小写。

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use super::host::Host;
use super::router::Router;
use crate::core::config::{MessagingConfig, RouterConfig, SYSTEM_ROUTER_KEY};

/// 路由器注册表
///
/// # 示例
///
/// ```
/// use std::sync::Arc;
/// use chips_messaging::router::{Host, RouterRegistry, RoutingEvent};
///
/// struct World;
/// impl Host for World {
///     type Handle = u32;
///     type Category = RoutingEvent;
///     fn is_alive(&self, _: &u32) -> bool { true }
/// }
///
/// let registry: RouterRegistry<World> = RouterRegistry::new(Arc::new(World));
/// let ui = registry.add_router("UI");
///
/// assert!(registry.has_router("ui"));
/// assert!(Arc::ptr_eq(&ui, &registry.get_router("Ui").unwrap()));
/// assert!(!registry.remove_router("system"));
/// ```
pub struct RouterRegistry<H: Host, A = (), R = ()> {
    host: Arc<H>,
    /// 新建路由器沿用的配置（名称除外）
    template: RouterConfig,
    system: Arc<Router<H, A, R>>,
    routers: RwLock<HashMap<String, Arc<Router<H, A, R>>>>,
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

impl<H: Host, A, R> RouterRegistry<H, A, R> {
    /// 创建注册表，系统路由器使用默认配置
    pub fn new(host: Arc<H>) -> Self {
        Self::with_config(host, RouterConfig::default())
    }

    /// 创建注册表，系统路由器使用指定配置
    pub fn with_config(host: Arc<H>, config: RouterConfig) -> Self {
        let system = Arc::new(Router::with_config(host.clone(), config.clone()));
        let mut routers = HashMap::new();
        routers.insert(SYSTEM_ROUTER_KEY.to_string(), system.clone());

        debug!(router = %config.name, "路由器注册表已创建");
        Self {
            host,
            template: config,
            system,
            routers: RwLock::new(routers),
        }
    }

    /// 按配置创建注册表并预先创建 `registry.routers` 中的路由器
    pub fn from_config(host: Arc<H>, config: &MessagingConfig) -> Self {
        let registry = Self::with_config(host, config.router.clone());
        for key in &config.registry.routers {
            registry.add_router(key);
        }
        registry
    }

    /// 宿主环境
    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    /// 系统路由器
    pub fn system_router(&self) -> Arc<Router<H, A, R>> {
        self.system.clone()
    }

    /// 添加路由器
    ///
    /// 键已存在时记录警告并返回已有的路由器。
    pub fn add_router(&self, key: &str) -> Arc<Router<H, A, R>> {
        let normalized = normalize_key(key);
        let mut routers = self.routers.write();

        if let Some(existing) = routers.get(&normalized) {
            warn!(key = %normalized, "路由器已存在，返回已有实例");
            return existing.clone();
        }

        let config = RouterConfig {
            name: key.trim().to_string(),
            ..self.template.clone()
        };
        let router = Arc::new(Router::with_config(self.host.clone(), config));
        routers.insert(normalized.clone(), router.clone());

        info!(key = %normalized, "路由器已添加");
        router
    }

    /// 移除路由器
    ///
    /// 系统路由器不能被移除。
    ///
    /// # 返回
    ///
    /// 成功移除返回 `true`
    pub fn remove_router(&self, key: &str) -> bool {
        let normalized = normalize_key(key);
        if normalized == SYSTEM_ROUTER_KEY {
            warn!(key = %normalized, "不能移除系统路由器");
            return false;
        }

        match self.routers.write().remove(&normalized) {
            Some(_) => {
                info!(key = %normalized, "路由器已移除");
                true
            }
            None => {
                debug!(key = %normalized, "要移除的路由器不存在");
                false
            }
        }
    }

    /// 路由器是否存在
    pub fn has_router(&self, key: &str) -> bool {
        self.routers.read().contains_key(&normalize_key(key))
    }

    /// 获取路由器
    pub fn get_router(&self, key: &str) -> Option<Arc<Router<H, A, R>>> {
        self.routers.read().get(&normalize_key(key)).cloned()
    }

    /// 所有注册键（已排序）
    pub fn router_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.routers.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// 路由器数量（含系统路由器）
    pub fn len(&self) -> usize {
        self.routers.read().len()
    }

    /// 注册表总是包含系统路由器，因此永不为空
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl<H: Host, A, R> fmt::Debug for RouterRegistry<H, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterRegistry")
            .field("routers", &self.router_names())
            .finish()
    }
}
