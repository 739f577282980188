//! 集成测试共用的宿主环境

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use chips_messaging::{Host, RoutingEvent, Vector3};

/// 场景中的实体
#[derive(Debug, Clone)]
pub struct Entity {
    pub alive: bool,
    pub active: bool,
    pub parent: Option<u32>,
    pub position: Option<Vector3>,
}

/// 测试场景：实体树 + 位置 + 遮挡墙
#[derive(Default)]
pub struct Scene {
    next_id: AtomicU32,
    entities: Mutex<HashMap<u32, Entity>>,
    /// 与 x 轴垂直的墙，视线跨越任意一面墙即被遮挡
    walls: Mutex<Vec<f32>>,
}

impl Scene {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// 创建实体并返回句柄
    pub fn spawn(&self) -> u32 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.entities.lock().unwrap().insert(
            id,
            Entity {
                alive: true,
                active: true,
                parent: None,
                position: None,
            },
        );
        id
    }

    pub fn spawn_child(&self, parent: u32) -> u32 {
        let id = self.spawn();
        self.entities.lock().unwrap().get_mut(&id).unwrap().parent = Some(parent);
        id
    }

    pub fn spawn_at(&self, x: f32, y: f32, z: f32) -> u32 {
        let id = self.spawn();
        self.entities.lock().unwrap().get_mut(&id).unwrap().position = Some(Vector3::new(x, y, z));
        id
    }

    pub fn destroy(&self, id: u32) {
        if let Some(entity) = self.entities.lock().unwrap().get_mut(&id) {
            entity.alive = false;
        }
    }

    pub fn set_active(&self, id: u32, active: bool) {
        self.entities.lock().unwrap().get_mut(&id).unwrap().active = active;
    }

    pub fn add_wall(&self, x: f32) {
        self.walls.lock().unwrap().push(x);
    }
}

impl Host for Scene {
    type Handle = u32;
    type Category = RoutingEvent;

    fn is_alive(&self, owner: &u32) -> bool {
        self.entities
            .lock()
            .unwrap()
            .get(owner)
            .map_or(false, |e| e.alive)
    }

    fn is_descendant_of(&self, node: &u32, ancestor: &u32) -> bool {
        let entities = self.entities.lock().unwrap();
        let mut current = Some(*node);
        while let Some(id) = current {
            if id == *ancestor {
                return true;
            }
            current = entities.get(&id).and_then(|e| e.parent);
        }
        false
    }

    fn position(&self, owner: &u32) -> Option<Vector3> {
        self.entities.lock().unwrap().get(owner).and_then(|e| e.position)
    }

    fn is_active(&self, owner: &u32) -> bool {
        self.entities
            .lock()
            .unwrap()
            .get(owner)
            .map_or(false, |e| e.active)
    }

    fn line_of_sight_blocked(&self, from: Vector3, to: Vector3) -> bool {
        self.walls
            .lock()
            .unwrap()
            .iter()
            .any(|&x| (from.x < x) != (to.x < x))
    }
}

/// 记录回调调用顺序的日志
#[derive(Default, Clone)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 生成一个把 `label` 写入日志的无参数回调
    pub fn recorder(&self, label: &'static str) -> chips_messaging::Callback<()> {
        let calls = self.calls.clone();
        chips_messaging::Callback::from_fn0(move || calls.lock().unwrap().push(label))
    }

    pub fn take(&self) -> Vec<&'static str> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }
}
