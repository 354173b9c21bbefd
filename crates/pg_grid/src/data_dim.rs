// crates/pg_grid/src/data_dim.rs

//! 数据维度
//!
//! 非空间的结构轴，例如把 5 个分量叠放在数组最后一维上。与维度符号一样
//! 按 (名称, 大小, 方向) 驻留；可选的 `index` 不参与相等比较和哈希，
//! 它只在读取外部数据时用于选取单个分量。

use ndarray::Array1;
use pg_foundation::{ensure, GlobalInterner, PgError, PgResult};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Neg;

use crate::dimension::{intern_label, Direction};

#[derive(Debug, PartialEq, Eq, Hash)]
struct DataDimKey {
    name: String,
    size: usize,
    direction: Direction,
}

static DATA_DIMS: GlobalInterner<DataDimKey> = GlobalInterner::new();

/// 数据维度句柄
///
/// ```
/// use pg_grid::data_dim::DataDim;
///
/// let d = DataDim::new("D", 5).unwrap();
/// let d2 = d.at(2).unwrap();
/// assert_eq!(d2.index(), Some(2));
/// assert_eq!(d, d2); // 索引不参与比较
/// assert!(d2.at(1).is_err());
/// ```
#[derive(Clone, Copy)]
pub struct DataDim {
    id: u32,
    index: Option<usize>,
}

impl DataDim {
    /// 正向数据维度，大小必须为正
    pub fn new(name: &str, size: usize) -> PgResult<Self> {
        Self::with_direction(name, size, Direction::Forward)
    }

    /// 指定方向的数据维度
    pub fn with_direction(name: &str, size: usize, direction: Direction) -> PgResult<Self> {
        ensure!(size > 0, PgError::invalid_data_dim(name, "大小必须为正"));
        Ok(Self::intern(name.to_string(), size, direction, None))
    }

    fn intern(name: String, size: usize, direction: Direction, index: Option<usize>) -> Self {
        let id = DATA_DIMS.intern(DataDimKey {
            name,
            size,
            direction,
        });
        Self { id, index }
    }

    #[inline]
    fn key(&self) -> &'static DataDimKey {
        DATA_DIMS.resolve(self.id)
    }

    /// 驻留表中的句柄值
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// 名称
    pub fn name(&self) -> &'static str {
        &self.key().name
    }

    /// 大小
    pub fn size(&self) -> usize {
        self.key().size
    }

    /// 方向
    pub fn direction(&self) -> Direction {
        self.key().direction
    }

    /// 维度标签，与 `Display` 一致，例如 `D5`
    pub fn label(&self) -> &'static str {
        intern_label(self.to_string())
    }

    /// 固定索引
    #[inline]
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// 选取单个分量
    ///
    /// 已带索引的维度不能再次索引；索引必须小于维度大小。
    pub fn at(&self, index: usize) -> PgResult<Self> {
        if let Some(existing) = self.index {
            return Err(PgError::already_indexed(self.name(), existing));
        }
        ensure!(
            index < self.size(),
            PgError::invalid_data_dim(
                self.name(),
                format!("索引 {} 超出范围 0..{}", index, self.size())
            )
        );
        Ok(Self {
            id: self.id,
            index: Some(index),
        })
    }

    /// 翻转方向，保留索引
    pub fn negate(&self) -> Self {
        let key = self.key();
        Self::intern(key.name.clone(), key.size, key.direction.flip(), self.index)
    }

    /// 坐标 `0..size`，反向时倒序
    pub fn coords(&self) -> Array1<f64> {
        let size = self.size();
        match self.direction() {
            Direction::Forward => Array1::from_iter((0..size).map(|v| v as f64)),
            Direction::Backward => Array1::from_iter((0..size).rev().map(|v| v as f64)),
        }
    }
}

impl PartialEq for DataDim {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DataDim {}

impl Hash for DataDim {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Neg for DataDim {
    type Output = DataDim;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

impl fmt::Display for DataDim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name(), self.size())
    }
}

impl fmt::Debug for DataDim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.direction() == Direction::Backward { "-" } else { "" };
        match self.index {
            Some(index) => write!(f, "DataDim({}{}[{}])", sign, self, index),
            None => write!(f, "DataDim({}{})", sign, self),
        }
    }
}

/// 五分量数据维度
pub fn d5() -> DataDim {
    DataDim::intern("D".to_string(), 5, Direction::Forward, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning() {
        let a = DataDim::new("D", 5).unwrap();
        assert_eq!(a.id(), d5().id());
        assert_ne!(a, DataDim::new("D", 4).unwrap());
        assert_ne!(a, -a);
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(DataDim::new("E", 0), Err(PgError::InvalidDataDim { .. })));
    }

    #[test]
    fn test_index_ignored_by_equality() {
        use std::collections::HashSet;

        let d = d5();
        let set: HashSet<DataDim> = [d, d.at(0).unwrap(), d.at(4).unwrap()].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_double_index_fails() {
        let first = d5().at(0).unwrap();
        assert!(matches!(first.at(1), Err(PgError::AlreadyIndexed { index: 0, .. })));
    }

    #[test]
    fn test_index_out_of_range() {
        assert!(d5().at(5).is_err());
    }

    #[test]
    fn test_negation_keeps_index() {
        let d = d5().at(3).unwrap();
        let neg = -d;
        assert_eq!(neg.index(), Some(3));
        assert_eq!(neg.direction(), Direction::Backward);
        assert_eq!(-neg, d);
    }

    #[test]
    fn test_coords_and_display() {
        assert_eq!(d5().coords().to_vec(), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!((-d5()).coords().to_vec(), vec![4.0, 3.0, 2.0, 1.0, 0.0]);
        assert_eq!(d5().to_string(), "D5");
        assert_eq!(d5().label(), "D5");
        assert_eq!(d5().at(1).unwrap().label(), "D5");
        assert_eq!(format!("{:?}", d5().at(1).unwrap()), "DataDim(D5[1])");
    }
}
