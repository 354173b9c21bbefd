// crates/pg_grid/src/grid.rs

//! 网格
//!
//! 一组维度符号在计算域上的具体化结果。逻辑形状之外，每个轴可能带一个
//! halo 点（填充），因此存储形状与逻辑形状不同：
//!
//! ```text
//! storage_shape[i]  = shape[i] + |padding[i]|
//! storage_origin[i] = max(-padding[i], 0)
//! view_slice[i]     = origin[i] .. origin[i] + shape[i]
//! ```
//!
//! 存储相关的三个量在首次访问时计算并缓存。

use ndarray::Array1;
use pg_config::DomainConfig;
use pg_foundation::PgResult;
use smallvec::SmallVec;
use std::borrow::Borrow;
use std::fmt;
use std::ops::{Deref, Range};
use std::sync::OnceLock;

use crate::concrete::ConcreteDim;
use crate::dimension::DimSymbol;

// ============================================================================
// 网格键
// ============================================================================

/// 维度符号元组，作为网格表的键
///
/// 实现了 `Borrow<[DimSymbol]>`，可以直接用切片查表。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GridKey(SmallVec<[DimSymbol; 4]>);

impl GridKey {
    /// 维度符号切片
    #[inline]
    pub fn dims(&self) -> &[DimSymbol] {
        &self.0
    }
}

impl Deref for GridKey {
    type Target = [DimSymbol];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Borrow<[DimSymbol]> for GridKey {
    fn borrow(&self) -> &[DimSymbol] {
        &self.0
    }
}

impl From<&[DimSymbol]> for GridKey {
    fn from(dims: &[DimSymbol]) -> Self {
        Self(SmallVec::from_slice(dims))
    }
}

impl<const N: usize> From<[DimSymbol; N]> for GridKey {
    fn from(dims: [DimSymbol; N]) -> Self {
        Self(dims.into_iter().collect())
    }
}

impl fmt::Display for GridKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (n, dim) in self.0.iter().enumerate() {
            if n > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", dim)?;
        }
        if self.0.len() == 1 {
            f.write_str(",")?;
        }
        f.write_str(")")
    }
}

// ============================================================================
// 网格
// ============================================================================

/// 具体化后的网格
///
/// 所有按轴的元组都与构造时传入的维度顺序对齐。
#[derive(Debug, Clone)]
pub struct Grid {
    abstract_dims: GridKey,
    dim_names: Vec<&'static str>,
    shape: SmallVec<[usize; 4]>,
    coords: Vec<Array1<f64>>,
    padding: SmallVec<[isize; 4]>,
    spacing: SmallVec<[f64; 4]>,

    storage_shape: OnceLock<Vec<usize>>,
    storage_origin: OnceLock<Vec<usize>>,
    storage_view_slice: OnceLock<Vec<Range<usize>>>,
}

impl Grid {
    /// 在计算域上构建网格
    pub fn new(dims: &[DimSymbol], domain: &DomainConfig) -> PgResult<Self> {
        let concrete = dims
            .iter()
            .map(|dim| dim.concretize(domain))
            .collect::<PgResult<Vec<ConcreteDim>>>()?;

        let grid = Self {
            abstract_dims: GridKey::from(dims),
            dim_names: dims.iter().map(|d| d.label()).collect(),
            shape: concrete.iter().map(|c| c.size()).collect(),
            coords: concrete.iter().map(|c| c.coords().clone()).collect(),
            padding: concrete.iter().map(|c| c.padding()).collect(),
            spacing: concrete.iter().map(|c| c.spacing()).collect(),
            storage_shape: OnceLock::new(),
            storage_origin: OnceLock::new(),
            storage_view_slice: OnceLock::new(),
        };
        log::debug!("构建网格 {} shape={:?}", grid.abstract_dims, grid.shape);
        Ok(grid)
    }

    /// 维度符号
    #[inline]
    pub fn abstract_dims(&self) -> &GridKey {
        &self.abstract_dims
    }

    /// 维度名称
    #[inline]
    pub fn dim_names(&self) -> &[&'static str] {
        &self.dim_names
    }

    /// 维数
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// 逻辑形状
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// 各轴坐标（含 halo 点）
    #[inline]
    pub fn coords(&self) -> &[Array1<f64>] {
        &self.coords
    }

    /// 各轴带符号填充
    #[inline]
    pub fn padding(&self) -> &[isize] {
        &self.padding
    }

    /// 各轴间距
    #[inline]
    pub fn spacing(&self) -> &[f64] {
        &self.spacing
    }

    /// 存储形状
    pub fn storage_shape(&self) -> &[usize] {
        self.storage_shape.get_or_init(|| {
            self.shape
                .iter()
                .zip(&self.padding)
                .map(|(&n, &p)| n + p.unsigned_abs())
                .collect()
        })
    }

    /// 逻辑区域在存储中的起点
    pub fn storage_origin(&self) -> &[usize] {
        self.storage_origin.get_or_init(|| {
            self.padding.iter().map(|&p| (-p).max(0) as usize).collect()
        })
    }

    /// 逻辑区域在存储中的索引范围
    pub fn storage_view_slice(&self) -> &[Range<usize>] {
        self.storage_view_slice.get_or_init(|| {
            self.storage_origin()
                .iter()
                .zip(&self.shape)
                .map(|(&origin, &n)| origin..origin + n)
                .collect()
        })
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-D grid with dimensions:", self.ndim())?;
        for n in 0..self.ndim() {
            write!(
                f,
                "\n    * {}: size={} spacing={} padding={}",
                self.dim_names[n], self.shape[n], self.spacing[n], self.padding[n]
            )?;
        }
        Ok(())
    }
}
