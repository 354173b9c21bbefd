// crates/pg_foundation/src/intern.rs

//! 值驻留表
//!
//! 把相等的值规范化为同一个实例：第一次出现时分配并登记，之后相等的值
//! 返回同一个句柄。句柄是 `u32`，句柄相等当且仅当值相等，因此可以直接
//! 作为哈希表的键并做 O(1) 比较。
//!
//! 驻留的值在进程生命周期内存活（一次性泄漏为 `'static`），永不修改，
//! 所以 `resolve` 可以返回 `&'static T` 而不必持有锁。
//!
//! # 内存布局
//!
//! ```text
//! Interner<T> {
//!     slots:  [&T0, &T1, &T2],        // 句柄 -> 值
//!     lookup: {T0: 0, T1: 1, T2: 2},  // 值 -> 句柄
//! }
//! ```
//!
//! # 示例
//!
//! ```
//! use pg_foundation::intern::Interner;
//!
//! let mut table: Interner<(String, u8)> = Interner::new();
//! let a = table.intern(("I".to_string(), 0));
//! let b = table.intern(("I".to_string(), 0));
//! let c = table.intern(("J".to_string(), 1));
//! assert_eq!(a, b);
//! assert_ne!(a, c);
//! assert_eq!(table.resolve(c).map(|v| v.1), Some(1));
//! ```

use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::OnceLock;

/// 单所有者驻留表
#[derive(Debug)]
pub struct Interner<T: 'static> {
    slots: Vec<&'static T>,
    lookup: HashMap<&'static T, u32>,
}

impl<T: Eq + Hash + 'static> Interner<T> {
    /// 创建空表
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    /// 查询已驻留值的句柄
    #[inline]
    pub fn get(&self, value: &T) -> Option<u32> {
        self.lookup.get(value).copied()
    }

    /// 驻留一个值，返回其规范句柄
    pub fn intern(&mut self, value: T) -> u32 {
        if let Some(id) = self.get(&value) {
            return id;
        }
        let id = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        assert!(id != u32::MAX, "interner capacity exhausted");
        let leaked: &'static T = Box::leak(Box::new(value));
        self.slots.push(leaked);
        self.lookup.insert(leaked, id);
        id
    }

    /// 句柄 -> 值
    #[inline]
    pub fn resolve(&self, id: u32) -> Option<&'static T> {
        self.slots.get(id as usize).copied()
    }

    /// 已驻留值的数量
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<T: Eq + Hash + 'static> Default for Interner<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// 进程级驻留表
///
/// 可放在 `static` 中使用，首次访问时惰性初始化。读多写少，用读写锁保护；
/// 绝大多数调用只走读锁路径。
///
/// ```
/// use pg_foundation::intern::GlobalInterner;
///
/// static NAMES: GlobalInterner<String> = GlobalInterner::new();
///
/// let a = NAMES.intern("x".to_string());
/// assert_eq!(a, NAMES.intern("x".to_string()));
/// assert_eq!(NAMES.resolve(a), "x");
/// ```
pub struct GlobalInterner<T: 'static> {
    cell: OnceLock<RwLock<Interner<T>>>,
}

impl<T: Eq + Hash + Send + Sync + 'static> GlobalInterner<T> {
    /// 创建（常量上下文可用）
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    fn table(&self) -> &RwLock<Interner<T>> {
        self.cell.get_or_init(|| RwLock::new(Interner::new()))
    }

    /// 驻留一个值，返回其规范句柄
    pub fn intern(&self, value: T) -> u32 {
        if let Some(id) = self.table().read().get(&value) {
            return id;
        }
        // 写锁内 `intern` 会再查一次，两个线程同时插入同一个值也只登记一次
        let id = self.table().write().intern(value);
        log::trace!("interned new value as #{}", id);
        id
    }

    /// 句柄 -> 值
    ///
    /// # Panics
    ///
    /// 句柄只能由本表的 `intern` 产生；传入其它来源的句柄会 panic。
    pub fn resolve(&self, id: u32) -> &'static T {
        match self.table().read().resolve(id) {
            Some(value) => value,
            None => panic!("handle #{} was not minted by this interner", id),
        }
    }

    /// 已驻留值的数量
    pub fn len(&self) -> usize {
        self.table().read().len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Eq + Hash + Send + Sync + 'static> Default for GlobalInterner<T> {
    fn default() -> Self {
        Self::new()
    }
}
