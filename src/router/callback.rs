//! 路由回调
//!
//! 回调统一为 `Fn(&A) -> R`，`A` 是参数元组：
//! `()`、`(T1,)`、`(T1, T2)`、`(T1, T2, T3)`。
//!
//! 相等性分两种：
//! - [`Callback::bind`] 创建的回调按 (接收者, 方法) 判定，
//!   同一接收者上的同一方法重复绑定得到相等的回调；
//! - 其余构造方式创建的回调是不透明闭包，按函数对象指针判定，
//!   只有克隆得到的回调与原回调相等。

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// 路由回调
///
/// 回调函数必须是线程安全的，可以在多个线程中并发调用。
pub struct Callback<A, R = ()> {
    inner: Arc<dyn Fn(&A) -> R + Send + Sync>,
    binding: Option<Binding>,
}

/// 绑定身份：接收者地址与方法地址
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Binding {
    receiver: usize,
    method: usize,
}

impl<A, R> Callback<A, R> {
    /// 从接受参数元组引用的闭包创建回调
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&A) -> R + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(f),
            binding: None,
        }
    }

    /// 调用回调
    pub fn call(&self, args: &A) -> R {
        (self.inner)(args)
    }

    /// 两个回调是否为同一个函数对象
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }

    /// 是否由 [`Callback::bind`] 创建
    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// 回调对象地址（忽略虚表指针）
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }
}

impl<A: 'static, R: 'static> Callback<A, R> {
    /// 把方法绑定到共享接收者上
    ///
    /// 回调持有接收者的一份 `Arc`。对同一接收者（按 `Arc` 指针）
    /// 重复绑定同一方法得到的回调彼此相等，哈希值也相同，
    /// 因此同一订阅者重复注册会被路由器识别为重复路由。
    ///
    /// # 示例
    ///
    /// ```
    /// use std::sync::Arc;
    /// use chips_messaging::Callback;
    ///
    /// struct Door;
    /// impl Door {
    ///     fn on_open(&self, _: &()) {}
    /// }
    ///
    /// let door = Arc::new(Door);
    /// let a: Callback<()> = Callback::bind(&door, Door::on_open);
    /// let b: Callback<()> = Callback::bind(&door, Door::on_open);
    /// assert_eq!(a, b);
    /// ```
    pub fn bind<T>(receiver: &Arc<T>, method: fn(&T, &A) -> R) -> Self
    where
        T: Send + Sync + 'static,
    {
        let binding = Binding {
            receiver: Arc::as_ptr(receiver) as *const () as usize,
            method: method as usize,
        };
        let receiver = Arc::clone(receiver);
        Self {
            inner: Arc::new(move |args: &A| method(&*receiver, args)),
            binding: Some(binding),
        }
    }
}

impl<R: 'static> Callback<(), R> {
    /// 无参数回调
    pub fn from_fn0<F>(f: F) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
    {
        Self::new(move |_: &()| f())
    }
}

impl<T1: 'static, R: 'static> Callback<(T1,), R> {
    /// 单参数回调
    pub fn from_fn1<F>(f: F) -> Self
    where
        F: Fn(&T1) -> R + Send + Sync + 'static,
    {
        Self::new(move |(a,): &(T1,)| f(a))
    }
}

impl<T1: 'static, T2: 'static, R: 'static> Callback<(T1, T2), R> {
    /// 双参数回调
    pub fn from_fn2<F>(f: F) -> Self
    where
        F: Fn(&T1, &T2) -> R + Send + Sync + 'static,
    {
        Self::new(move |(a, b): &(T1, T2)| f(a, b))
    }
}

impl<T1: 'static, T2: 'static, T3: 'static, R: 'static> Callback<(T1, T2, T3), R> {
    /// 三参数回调
    pub fn from_fn3<F>(f: F) -> Self
    where
        F: Fn(&T1, &T2, &T3) -> R + Send + Sync + 'static,
    {
        Self::new(move |(a, b, c): &(T1, T2, T3)| f(a, b, c))
    }
}

impl<A, R> Clone for Callback<A, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            binding: self.binding,
        }
    }
}

impl<A, R> PartialEq for Callback<A, R> {
    fn eq(&self, other: &Self) -> bool {
        match (self.binding, other.binding) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.ptr_eq(other),
            _ => false,
        }
    }
}

impl<A, R> Eq for Callback<A, R> {}

impl<A, R> Hash for Callback<A, R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.binding {
            Some(binding) => binding.hash(state),
            None => self.addr().hash(state),
        }
    }
}

impl<A, R> fmt::Debug for Callback<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.binding {
            Some(b) => write!(f, "Callback@{:#x}::{:#x}", b.receiver, b.method),
            None => write!(f, "Callback@{:#x}", self.addr()),
        }
    }
}
