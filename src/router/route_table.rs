//! 路由表数据结构
//!
//! 管理事件类别到有序路由列表的映射。
//!
//! 不变量：
//! - 映射中不存在空列表，类别的最后一条路由移除时同时移除该类别
//! - "表是否存在" 由映射是否为空推导，不单独记录状态
//! - 列表顺序即注册顺序，也是分发顺序

use std::collections::HashMap;

use super::host::Host;
use super::route::Route;

/// 路由表
pub struct RouteTable<H: Host, A = (), R = ()> {
    /// 事件类别 -> 路由列表（按注册顺序）
    routes: HashMap<H::Category, Vec<Route<H, A, R>>>,
}

impl<H: Host, A, R> RouteTable<H, A, R> {
    /// 创建空路由表
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// 表是否存在（至少有一个类别包含路由）
    pub fn exists(&self) -> bool {
        !self.routes.is_empty()
    }

    /// 表是否为空
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// 路由是否已注册
    pub fn contains(&self, route: &Route<H, A, R>) -> bool {
        self.routes
            .get(&route.category())
            .map_or(false, |list| list.contains(route))
    }

    /// 追加路由到其类别的列表末尾
    ///
    /// 调用方负责有效性与重复检查。
    pub fn insert(&mut self, route: Route<H, A, R>) {
        self.routes.entry(route.category()).or_default().push(route);
    }

    /// 移除一条匹配的路由
    ///
    /// # 返回
    ///
    /// 找到并移除返回 `true`
    pub fn remove(&mut self, route: &Route<H, A, R>) -> bool {
        let category = route.category();
        let Some(list) = self.routes.get_mut(&category) else {
            return false;
        };

        let Some(index) = list.iter().position(|r| r == route) else {
            return false;
        };

        list.remove(index);
        if list.is_empty() {
            self.routes.remove(&category);
            self.teardown_if_empty();
        }
        true
    }

    /// 清理类别中所有订阅者已失效的路由
    ///
    /// # 返回
    ///
    /// 被清理的路由数量
    pub fn sweep(&mut self, category: H::Category, host: &H) -> usize {
        let Some(list) = self.routes.get_mut(&category) else {
            return 0;
        };

        let before = list.len();
        list.retain(|route| !route.is_dead(host));
        let purged = before - list.len();

        if list.is_empty() {
            self.routes.remove(&category);
            self.teardown_if_empty();
        }
        purged
    }

    /// 类别中路由的快照（按注册顺序）
    pub fn snapshot(&self, category: H::Category) -> Vec<Route<H, A, R>> {
        self.routes.get(&category).cloned().unwrap_or_default()
    }

    /// 类别中的路由数量
    pub fn count(&self, category: H::Category) -> usize {
        self.routes.get(&category).map_or(0, Vec::len)
    }

    /// 所有类别的路由总数
    pub fn total(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    /// 已填充的类别
    pub fn categories(&self) -> Vec<H::Category> {
        self.routes.keys().copied().collect()
    }

    /// 清空整个路由表
    pub fn clear(&mut self) {
        self.routes = HashMap::new();
    }

    /// 最后一个类别移除后释放映射占用的内存
    fn teardown_if_empty(&mut self) {
        if self.routes.is_empty() {
            self.routes = HashMap::new();
        }
    }
}

impl<H: Host, A, R> Default for RouteTable<H, A, R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::{Callback, RoutingEvent};
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[derive(Default)]
    struct World {
        dead: Mutex<HashSet<u32>>,
    }

    impl World {
        fn kill(&self, id: u32) {
            self.dead.lock().unwrap().insert(id);
        }
    }

    impl Host for World {
        type Handle = u32;
        type Category = RoutingEvent;

        fn is_alive(&self, owner: &u32) -> bool {
            !self.dead.lock().unwrap().contains(owner)
        }
    }

    fn route(owner: u32, category: RoutingEvent) -> Route<World> {
        Route::new(owner, Callback::from_fn0(|| {}), category)
    }

    #[test]
    fn test_insert_and_count() {
        let mut table: RouteTable<World> = RouteTable::new();
        assert!(!table.exists());

        table.insert(route(1, RoutingEvent::Test1));
        table.insert(route(2, RoutingEvent::Test1));
        table.insert(route(1, RoutingEvent::Test2));

        assert!(table.exists());
        assert_eq!(table.count(RoutingEvent::Test1), 2);
        assert_eq!(table.count(RoutingEvent::Test2), 1);
        assert_eq!(table.count(RoutingEvent::Test3), 0);
        assert_eq!(table.total(), 3);
    }

    #[test]
    fn test_snapshot_preserves_order() {
        let mut table: RouteTable<World> = RouteTable::new();
        for owner in [5, 3, 9, 1] {
            table.insert(route(owner, RoutingEvent::Test1));
        }

        let owners: Vec<u32> = table
            .snapshot(RoutingEvent::Test1)
            .iter()
            .map(|r| *r.owner().unwrap())
            .collect();
        assert_eq!(owners, vec![5, 3, 9, 1]);
        assert!(table.snapshot(RoutingEvent::Test2).is_empty());
    }

    #[test]
    fn test_remove_drops_empty_category() {
        let mut table: RouteTable<World> = RouteTable::new();
        let a = route(1, RoutingEvent::Test1);
        let b = route(1, RoutingEvent::Test2);
        table.insert(a.clone());
        table.insert(b.clone());

        assert!(table.remove(&a));
        assert!(!table.remove(&a));
        assert_eq!(table.categories(), vec![RoutingEvent::Test2]);

        assert!(table.remove(&b));
        assert!(!table.exists());
        assert!(table.categories().is_empty());
    }

    #[test]
    fn test_remove_only_first_match() {
        let mut table: RouteTable<World> = RouteTable::new();
        let a = route(1, RoutingEvent::Test1);
        // 表层不做重复检查，验证只移除一条
        table.insert(a.clone());
        table.insert(a.clone());

        assert!(table.remove(&a));
        assert_eq!(table.count(RoutingEvent::Test1), 1);
        assert!(table.contains(&a));
    }

    #[test]
    fn test_sweep() {
        let world = World::default();
        let mut table: RouteTable<World> = RouteTable::new();
        table.insert(route(1, RoutingEvent::Test1));
        table.insert(route(2, RoutingEvent::Test1));
        table.insert(route(2, RoutingEvent::Test2));

        assert_eq!(table.sweep(RoutingEvent::Test1, &world), 0);

        world.kill(2);
        assert_eq!(table.sweep(RoutingEvent::Test1, &world), 1);
        assert_eq!(table.count(RoutingEvent::Test1), 1);
        // 其他类别不受影响，直到该类别被清理
        assert_eq!(table.count(RoutingEvent::Test2), 1);

        assert_eq!(table.sweep(RoutingEvent::Test2, &world), 1);
        assert_eq!(table.categories(), vec![RoutingEvent::Test1]);

        world.kill(1);
        assert_eq!(table.sweep(RoutingEvent::Test1, &world), 1);
        assert!(!table.exists());
        assert_eq!(table.sweep(RoutingEvent::Test1, &world), 0);
    }

    #[test]
    fn test_clear() {
        let mut table: RouteTable<World> = RouteTable::new();
        table.insert(route(1, RoutingEvent::Test1));
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.total(), 0);
    }
}
