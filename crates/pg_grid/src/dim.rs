// crates/pg_grid/src/dim.rs

//! 通用维度
//!
//! 外部数据的维度描述里同时出现网格维度、数据维度和"新增的长度为 1 的轴"，
//! [`Dim`] 把三者统一起来。

use std::fmt;
use std::ops::Neg;

use crate::data_dim::DataDim;
use crate::dimension::DimSymbol;

/// 网格维度、数据维度或扩展轴
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dim {
    /// 网格维度
    Grid(DimSymbol),
    /// 数据维度
    Data(DataDim),
    /// 源数据中不存在、需要补一个长度为 1 的轴
    Expanded,
}

impl Dim {
    /// 维度名称；扩展轴没有名称
    pub fn name(&self) -> Option<&'static str> {
        match self {
            Dim::Grid(symbol) => Some(symbol.name()),
            Dim::Data(data) => Some(data.name()),
            Dim::Expanded => None,
        }
    }

    /// 数据维度上固定的索引
    pub fn index(&self) -> Option<usize> {
        match self {
            Dim::Data(data) => data.index(),
            _ => None,
        }
    }
}

impl Neg for Dim {
    type Output = Dim;

    fn neg(self) -> Self::Output {
        match self {
            Dim::Grid(symbol) => Dim::Grid(-symbol),
            Dim::Data(data) => Dim::Data(-data),
            Dim::Expanded => Dim::Expanded,
        }
    }
}

impl From<DimSymbol> for Dim {
    fn from(symbol: DimSymbol) -> Self {
        Dim::Grid(symbol)
    }
}

impl From<DataDim> for Dim {
    fn from(data: DataDim) -> Self {
        Dim::Data(data)
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dim::Grid(symbol) => write!(f, "{}", symbol),
            Dim::Data(data) => write!(f, "{}", data),
            Dim::Expanded => f.write_str("<expanded>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_dim::d5;
    use crate::dimension::k;

    #[test]
    fn test_negation_and_names() {
        assert_eq!(-Dim::from(k()), Dim::Grid(-k()));
        assert_eq!(-Dim::Expanded, Dim::Expanded);
        assert_eq!(Dim::from(d5()).name(), Some("D"));
        assert_eq!(Dim::Expanded.name(), None);
    }

    #[test]
    fn test_indexed_data_dim_matches_bare() {
        let indexed = Dim::from(d5().at(2).unwrap());
        assert_eq!(indexed.index(), Some(2));
        assert_eq!(indexed, Dim::from(d5()));
        assert_eq!(-indexed, -Dim::from(d5()));
    }
}
