// crates/pg_storage/src/lib.rs

//! PhysGrid 存储层
//!
//! # 模块概览
//!
//! - [`element`]: 五种缓冲区元素类型及其转换
//! - [`buffer`]: 按标量类型区分的 n 维缓冲区
//! - [`backend`]: 存储后端抽象与主机内存实现
//! - [`field`]: 带单位与视图元数据的场
//! - [`allocator`]: 场分配、包装与平铺赋值
//! - [`pool`]: 临时缓冲池
//!
//! # 示例
//!
//! ```
//! use pg_config::DomainConfig;
//! use pg_foundation::ScalarType;
//! use pg_grid::{i, j, k, ComputationalGrid};
//! use pg_storage::{allocate_field, CpuBackend};
//!
//! let cg = ComputationalGrid::new(DomainConfig::with_points(1, 14, 1)).unwrap();
//! let grid = cg.grid(&[i(), j(), k()]).unwrap();
//! let field = allocate_field(&CpuBackend::new(), grid, &[], "K", ScalarType::F64).unwrap();
//! assert_eq!(field.buffer().shape(), &[2, 15, 2]);
//! assert_eq!(field.attrs().view_shape, vec![1, 14, 1]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod allocator;
pub mod backend;
pub mod buffer;
pub mod element;
pub mod field;
pub mod pool;

pub use allocator::{allocate_buffer, allocate_field, assign, field_from_buffer};
pub use backend::{backend_from_config, CpuBackend, StorageBackend};
pub use buffer::Buffer;
pub use element::Element;
pub use field::{Field, FieldAttrs};
pub use pool::{reset_pool, PoolGuard, PoolKey, PoolSession, TemporaryStoragePool};
