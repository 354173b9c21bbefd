// crates/pg_grid/src/lib.rs

//! PhysGrid 网格层
//!
//! 维度代数与交错结构化网格。
//!
//! # 模块概览
//!
//! - [`dimension`]: 驻留的维度符号（轴、偏移、方向）及其代数
//! - [`concrete`]: 维度在计算域上的具体化（格点数、填充、间距、坐标）
//! - [`data_dim`]: 非空间的数据维度
//! - [`dim`]: 网格维度/数据维度/扩展轴的统一表示
//! - [`grid`]: 网格及其存储寻址
//! - [`computational`]: 一个计算域上的全部网格拓扑
//!
//! # 示例
//!
//! ```
//! use pg_config::DomainConfig;
//! use pg_grid::{i, j, k, ComputationalGrid};
//!
//! let cg = ComputationalGrid::new(DomainConfig::with_points(1, 14, 1)).unwrap();
//! let grid = cg.grid(&[i(), j(), k()]).unwrap();
//! assert_eq!(grid.shape(), &[1, 14, 1]);
//! assert_eq!(grid.storage_shape(), &[2, 15, 2]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod computational;
pub mod concrete;
pub mod data_dim;
pub mod dim;
pub mod dimension;
pub mod grid;

pub use computational::ComputationalGrid;
pub use concrete::ConcreteDim;
pub use data_dim::{d5, DataDim};
pub use dim::Dim;
pub use dimension::{i, ij, j, k, Axis, DimSymbol, Direction, Offset};
pub use grid::{Grid, GridKey};
