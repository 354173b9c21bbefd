// crates/pg_grid/src/concrete.rs

//! 具体维度
//!
//! 把维度符号落到计算域的一个轴上，得到格点数、间距、填充与坐标。
//!
//! | 偏移 | 格点数          | 填充         | 间距分母   | 坐标步长因子 |
//! |------|-----------------|--------------|------------|--------------|
//! | 0    | `n`             | `direction`  | `size`     | 1.5          |
//! | ±0.5 | `n + 1`         | 0            | `size - 1` | 1.0          |
//!
//! 只有单元中心轴带一个 halo 点，填充的符号表示加在哪一侧：
//! 正数加在末尾，负数加在开头。

use ndarray::Array1;

use crate::dimension::{DimSymbol, Direction};

/// 在计算域上具体化后的维度
#[derive(Debug, Clone)]
pub struct ConcreteDim {
    abstract_dim: DimSymbol,
    bounds: (f64, f64),
    size: usize,
    padding: isize,
    spacing: f64,
    coords: Array1<f64>,
}

impl ConcreteDim {
    /// 由符号、物理边界和格点数构造
    ///
    /// 调用方保证 `bounds.0 != bounds.1`（计算域验证时已检查）。
    pub fn new(abstract_dim: DimSymbol, bounds: (f64, f64), domain_size: usize) -> Self {
        let offset = abstract_dim.offset();
        let direction = abstract_dim.direction();

        let size = if offset.is_staggered() { domain_size + 1 } else { domain_size };
        let padding = if offset.is_staggered() { 0 } else { direction.sign() };

        let denominator = if offset.is_staggered() { size - 1 } else { size };
        let spacing = (bounds.1 - bounds.0).abs() / denominator as f64;

        let step = if bounds.1 > bounds.0 { spacing } else { -spacing };
        let step_factor = if offset.is_staggered() { 1.0 } else { 1.5 };
        let len = size + padding.unsigned_abs();
        let mut coords: Vec<f64> = (0..len)
            .map(|i| bounds.0 + i as f64 * step_factor * step)
            .collect();
        if direction == Direction::Backward {
            coords.reverse();
        }

        Self {
            abstract_dim,
            bounds,
            size,
            padding,
            spacing,
            coords: Array1::from(coords),
        }
    }

    /// 对应的维度符号
    #[inline]
    pub fn abstract_dim(&self) -> DimSymbol {
        self.abstract_dim
    }

    /// 物理边界
    #[inline]
    pub fn bounds(&self) -> (f64, f64) {
        self.bounds
    }

    /// 逻辑格点数
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// 带符号的填充
    #[inline]
    pub fn padding(&self) -> isize {
        self.padding
    }

    /// 网格间距
    #[inline]
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// 坐标，长度为 `size + |padding|`
    #[inline]
    pub fn coords(&self) -> &Array1<f64> {
        &self.coords
    }
}

impl PartialEq<DimSymbol> for ConcreteDim {
    fn eq(&self, other: &DimSymbol) -> bool {
        self.abstract_dim == *other
    }
}

impl PartialEq for ConcreteDim {
    fn eq(&self, other: &Self) -> bool {
        self.abstract_dim == other.abstract_dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::{i, k};

    #[test]
    fn test_mass_point_axis() {
        let dim = ConcreteDim::new(k(), (0.0, 1.0), 10);
        assert_eq!(dim.size(), 10);
        assert_eq!(dim.padding(), 1);
        assert!((dim.spacing() - 0.1).abs() < 1e-15);
        assert_eq!(dim.coords().len(), 11);
        assert!((dim.coords()[2] - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_staggered_axis() {
        for delta in [-0.5, 0.5] {
            let half = k().shift(delta).unwrap();
            let dim = ConcreteDim::new(half, (0.0, 1.0), 10);
            assert_eq!(dim.size(), 11);
            assert_eq!(dim.padding(), 0);
            assert!((dim.spacing() - 0.1).abs() < 1e-15);
            assert_eq!(dim.coords().len(), 11);
            assert!((dim.coords()[10] - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_backward_axis_pads_leading_side() {
        let dim = ConcreteDim::new(-i(), (0.0, 4.0), 4);
        assert_eq!(dim.padding(), -1);
        assert_eq!(dim.coords().len(), 5);
        // 反向轴的坐标整体倒序
        assert_eq!(dim.coords()[4], 0.0);
        assert!((dim.coords()[0] - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_backward_staggered_axis_has_no_padding() {
        let dim = ConcreteDim::new(-(k().shift(0.5).unwrap()), (0.0, 1.0), 3);
        assert_eq!(dim.padding(), 0);
        assert_eq!(dim.size(), 4);
    }

    #[test]
    fn test_decreasing_bounds() {
        let dim = ConcreteDim::new(k().shift(-0.5).unwrap(), (1.0, 0.0), 4);
        assert!((dim.spacing() - 0.25).abs() < 1e-15);
        assert_eq!(dim.coords()[0], 1.0);
        assert!((dim.coords()[4] - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_equality_with_symbol() {
        let dim = ConcreteDim::new(k(), (0.0, 1.0), 3);
        assert!(dim == k());
        assert!(dim != i());
    }
}
