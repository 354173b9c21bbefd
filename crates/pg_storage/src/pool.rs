// crates/pg_storage/src/pool.rs

//! 临时缓冲池
//!
//! 按 (网格形状, 维度元组, 标量类型) 分桶缓存临时缓冲区。
//!
//! 获取时从桶中弹出一个缓冲区，桶为空则用当前后端按网格存储形状新分配；
//! [`PoolGuard`] 析构时（包括 panic 展开时）把全部缓冲区放回各自的桶。
//! 放回的缓冲区不会被清零，下次取出时带着上次的内容。
//!
//! 缓冲池记录缓冲区来自哪个后端，换用其他后端获取会返回
//! [`PgError::BackendMismatch`]，直到调用 [`TemporaryStoragePool::reset`]。

use parking_lot::Mutex;
use pg_foundation::{PgError, PgResult, ScalarType};
use pg_grid::{ComputationalGrid, DimSymbol, Grid, GridKey};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::sync::OnceLock;

use crate::backend::StorageBackend;
use crate::buffer::Buffer;

/// 缓冲池的桶键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PoolKey {
    shape: SmallVec<[usize; 4]>,
    dims: GridKey,
    scalar: ScalarType,
}

impl PoolKey {
    /// 由网格和标量类型构造
    pub fn new(grid: &Grid, scalar: ScalarType) -> Self {
        Self {
            shape: SmallVec::from_slice(grid.shape()),
            dims: grid.abstract_dims().clone(),
            scalar,
        }
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:?}<{}>", self.dims, self.shape.as_slice(), self.scalar)
    }
}

#[derive(Debug, Default)]
struct PoolState {
    backend: Option<String>,
    buckets: HashMap<PoolKey, Vec<Buffer>>,
    allocations: usize,
}

/// 临时缓冲池
#[derive(Debug, Default)]
pub struct TemporaryStoragePool {
    state: Mutex<PoolState>,
}

impl TemporaryStoragePool {
    /// 空缓冲池
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取一组临时缓冲区
    ///
    /// 每个请求是 (维度元组, 标量类型)。维度元组必须是计算网格中的拓扑；
    /// 中途失败时已取出的缓冲区会随守卫一起放回。缓冲池在取得第一个缓冲区后
    /// 才绑定到该后端，查找失败的请求不会改变绑定。
    pub fn acquire<'p>(
        &'p self,
        backend: &dyn StorageBackend,
        computational_grid: &ComputationalGrid,
        requests: &[(&[DimSymbol], ScalarType)],
    ) -> PgResult<PoolGuard<'p>> {
        self.check_backend(backend.name())?;

        let mut guard = PoolGuard {
            pool: self,
            entries: Vec::with_capacity(requests.len()),
        };
        for &(dims, scalar) in requests {
            let grid = computational_grid.grid(dims)?;
            let key = PoolKey::new(grid, scalar);
            let buffer = match self.pop(&key) {
                Some(buffer) => {
                    log::trace!("复用临时缓冲区 {}", key);
                    buffer
                }
                None => {
                    let buffer = backend.zeros(scalar, grid.storage_shape());
                    self.state.lock().allocations += 1;
                    log::debug!("新分配临时缓冲区 {} storage_shape={:?}", key, buffer.shape());
                    buffer
                }
            };
            guard.entries.push((key, buffer));
            if guard.entries.len() == 1 {
                self.bind_backend(backend.name());
            }
        }
        Ok(guard)
    }

    fn check_backend(&self, name: &str) -> PgResult<()> {
        match &self.state.lock().backend {
            Some(pooled) if pooled != name => Err(PgError::backend_mismatch(pooled.clone(), name)),
            _ => Ok(()),
        }
    }

    fn bind_backend(&self, name: &str) {
        self.state
            .lock()
            .backend
            .get_or_insert_with(|| name.to_string());
    }

    fn pop(&self, key: &PoolKey) -> Option<Buffer> {
        self.state.lock().buckets.get_mut(key).and_then(Vec::pop)
    }

    fn release(&self, entries: Vec<(PoolKey, Buffer)>) {
        let mut state = self.state.lock();
        for (key, buffer) in entries {
            state.buckets.entry(key).or_default().push(buffer);
        }
    }

    /// 丢弃全部缓存的缓冲区，并解除与后端的绑定
    ///
    /// 切换后端前必须调用。
    pub fn reset(&self) {
        let mut state = self.state.lock();
        let dropped: usize = state.buckets.values().map(Vec::len).sum();
        state.buckets.clear();
        state.backend = None;
        log::info!("临时缓冲池已重置，释放 {} 个缓冲区", dropped);
    }

    /// 开启一个后端会话
    ///
    /// 创建时与结束时都会重置缓冲池。同一后端上的一系列运行应放在同一个会话里。
    pub fn session(&self) -> PoolSession<'_> {
        self.reset();
        PoolSession { pool: self }
    }

    /// 累计新分配次数
    pub fn allocation_count(&self) -> usize {
        self.state.lock().allocations
    }

    /// 当前缓存（未被取出）的缓冲区数量
    pub fn cached_count(&self) -> usize {
        self.state.lock().buckets.values().map(Vec::len).sum()
    }

    /// 当前绑定的后端
    pub fn backend(&self) -> Option<String> {
        self.state.lock().backend.clone()
    }
}

/// 缓冲池会话，析构时重置缓冲池
#[derive(Debug)]
pub struct PoolSession<'p> {
    pool: &'p TemporaryStoragePool,
}

impl PoolSession<'_> {
    /// 会话所属的缓冲池
    pub fn pool(&self) -> &TemporaryStoragePool {
        self.pool
    }
}

impl Drop for PoolSession<'_> {
    fn drop(&mut self) {
        self.pool.reset();
    }
}

/// 进程级缓冲池
pub fn global() -> &'static TemporaryStoragePool {
    static POOL: OnceLock<TemporaryStoragePool> = OnceLock::new();
    POOL.get_or_init(TemporaryStoragePool::new)
}

/// 重置进程级缓冲池
pub fn reset_pool() {
    global().reset();
}

/// 临时缓冲区守卫
///
/// 按请求顺序持有缓冲区，析构时全部放回缓冲池。
pub struct PoolGuard<'p> {
    pool: &'p TemporaryStoragePool,
    entries: Vec<(PoolKey, Buffer)>,
}

impl PoolGuard<'_> {
    /// 缓冲区个数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 第 `n` 个缓冲区
    pub fn get(&self, n: usize) -> Option<&Buffer> {
        self.entries.get(n).map(|(_, buffer)| buffer)
    }

    /// 第 `n` 个缓冲区（可变）
    pub fn get_mut(&mut self, n: usize) -> Option<&mut Buffer> {
        self.entries.get_mut(n).map(|(_, buffer)| buffer)
    }

    /// 遍历全部缓冲区（可变）
    pub fn buffers_mut(&mut self) -> impl Iterator<Item = &mut Buffer> + '_ {
        self.entries.iter_mut().map(|(_, buffer)| buffer)
    }
}

impl Index<usize> for PoolGuard<'_> {
    type Output = Buffer;

    fn index(&self, n: usize) -> &Buffer {
        &self.entries[n].1
    }
}

impl IndexMut<usize> for PoolGuard<'_> {
    fn index_mut(&mut self, n: usize) -> &mut Buffer {
        &mut self.entries[n].1
    }
}

impl Drop for PoolGuard<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.entries));
    }
}

impl fmt::Debug for PoolGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter().map(|(key, _)| key)).finish()
    }
}
