// crates/pg_grid/src/computational.rs

//! 计算网格
//!
//! 一个计算域上所有受支持的网格拓扑，构建后不可变：
//!
//! | 键              | 用途                 |
//! |-----------------|----------------------|
//! | `(I, J, K)`     | 三维质量点           |
//! | `(I, J, K-1/2)` | 三维层界面           |
//! | `(I, J)`        | 二维水平场           |
//! | `(K,)`          | 垂直廓线（质量层）   |
//! | `(K-1/2,)`      | 垂直廓线（层界面）   |

use pg_config::DomainConfig;
use pg_foundation::{PgError, PgResult};
use std::collections::HashMap;
use std::fmt;

use crate::dimension::{i, j, k, DimSymbol};
use crate::grid::{Grid, GridKey};

/// 计算网格
#[derive(Debug, Clone)]
pub struct ComputationalGrid {
    domain: DomainConfig,
    order: Vec<GridKey>,
    grids: HashMap<GridKey, Grid>,
}

impl ComputationalGrid {
    /// 构建全部五种拓扑
    ///
    /// 计算域先经过验证，非法的格点数或边界在这里就会报错。
    pub fn new(domain: DomainConfig) -> PgResult<Self> {
        domain.validate()?;

        let half = k().shift(-0.5)?;
        let keys: [GridKey; 5] = [
            GridKey::from([i(), j(), k()]),
            GridKey::from([i(), j(), half]),
            GridKey::from([i(), j()]),
            GridKey::from([k()]),
            GridKey::from([half]),
        ];

        let mut grids = HashMap::with_capacity(keys.len());
        for key in &keys {
            grids.insert(key.clone(), Grid::new(key, &domain)?);
        }
        log::debug!(
            "计算网格就绪: nx={} ny={} nz={}",
            domain.nx,
            domain.ny,
            domain.nz
        );

        Ok(Self {
            domain,
            order: keys.to_vec(),
            grids,
        })
    }

    /// 按维度元组查找网格
    pub fn grid(&self, dims: &[DimSymbol]) -> PgResult<&Grid> {
        self.grids
            .get(dims)
            .ok_or_else(|| PgError::grid_not_found(GridKey::from(dims).to_string()))
    }

    /// 是否包含某个拓扑
    pub fn contains(&self, dims: &[DimSymbol]) -> bool {
        self.grids.contains_key(dims)
    }

    /// 按规范顺序遍历所有网格
    pub fn grids(&self) -> impl Iterator<Item = &Grid> + '_ {
        self.order.iter().filter_map(move |key| self.grids.get(key))
    }

    /// 计算域配置
    #[inline]
    pub fn domain(&self) -> &DomainConfig {
        &self.domain
    }
}

impl fmt::Display for ComputationalGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "computational grid with {} topologies", self.order.len())?;
        for grid in self.grids() {
            write!(f, "\n{}", grid)?;
        }
        Ok(())
    }
}
