// crates/pg_config/src/domain.rs

//! DomainConfig - 计算域配置
//!
//! 描述三维结构化网格的物理范围与每个方向上的格点数。
//! 轴编号约定：0 = x，1 = y，2 = z（垂直）。

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 单个轴的范围与格点数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisExtent {
    /// 物理边界 (起点, 终点)
    pub bounds: (f64, f64),
    /// 格点（单元）数
    pub size: usize,
}

/// 计算域配置
///
/// ```
/// use pg_config::DomainConfig;
///
/// let domain = DomainConfig { nx: 1, ny: 14, ..Default::default() };
/// assert!(domain.validate().is_ok());
/// assert_eq!(domain.extent(1).map(|e| e.size), Some(14));
/// assert!(domain.extent(3).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainConfig {
    /// x 方向格点数
    #[serde(default = "default_n")]
    pub nx: usize,
    /// y 方向格点数
    #[serde(default = "default_n")]
    pub ny: usize,
    /// 垂直层数
    #[serde(default = "default_n")]
    pub nz: usize,

    /// x 起点
    #[serde(default = "default_min")]
    pub xmin: f64,
    /// x 终点
    #[serde(default = "default_max")]
    pub xmax: f64,
    /// y 起点
    #[serde(default = "default_min")]
    pub ymin: f64,
    /// y 终点
    #[serde(default = "default_max")]
    pub ymax: f64,
    /// z 起点
    #[serde(default = "default_min")]
    pub zmin: f64,
    /// z 终点
    #[serde(default = "default_max")]
    pub zmax: f64,
}

fn default_n() -> usize { 1 }
fn default_min() -> f64 { 0.0 }
fn default_max() -> f64 { 1.0 }

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            nx: default_n(),
            ny: default_n(),
            nz: default_n(),
            xmin: default_min(),
            xmax: default_max(),
            ymin: default_min(),
            ymax: default_max(),
            zmin: default_min(),
            zmax: default_max(),
        }
    }
}

impl DomainConfig {
    /// 按格点数创建，边界取默认单位区间
    pub fn with_points(nx: usize, ny: usize, nz: usize) -> Self {
        Self { nx, ny, nz, ..Default::default() }
    }

    /// 获取某个轴的范围与格点数；轴编号超出 0..=2 时返回 `None`
    pub fn extent(&self, axis: usize) -> Option<AxisExtent> {
        match axis {
            0 => Some(AxisExtent { bounds: (self.xmin, self.xmax), size: self.nx }),
            1 => Some(AxisExtent { bounds: (self.ymin, self.ymax), size: self.ny }),
            2 => Some(AxisExtent { bounds: (self.zmin, self.zmax), size: self.nz }),
            _ => None,
        }
    }

    /// 格点总数（质量点）
    pub fn num_points(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// 验证配置有效性
    ///
    /// 格点数必须为正；边界必须有限且不重合，否则网格间距无定义。
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, n) in [("domain.nx", self.nx), ("domain.ny", self.ny), ("domain.nz", self.nz)] {
            if n == 0 {
                return Err(ConfigError::invalid(key, n, "格点数必须为正"));
            }
        }

        let bounds = [
            ("domain.x", self.xmin, self.xmax),
            ("domain.y", self.ymin, self.ymax),
            ("domain.z", self.zmin, self.zmax),
        ];
        for (key, lo, hi) in bounds {
            if !lo.is_finite() || !hi.is_finite() {
                return Err(ConfigError::invalid(key, format!("[{}, {}]", lo, hi), "边界必须为有限值"));
            }
            if lo == hi {
                return Err(ConfigError::invalid(key, format!("[{}, {}]", lo, hi), "边界不能重合"));
            }
            if lo > hi {
                log::warn!("{} 的边界递减 [{}, {}]，坐标将按递减方向生成", key, lo, hi);
            }
        }

        Ok(())
    }
}
