// crates/pg_framework/src/properties.rs

//! 场属性表
//!
//! 组件用属性表声明输入、诊断量和倾向项：每个场名对应它所在的网格、
//! 单位和数据维度。`dims` 由 [`fill_properties_with_dims`] 根据计算网格填入。

use pg_foundation::PgResult;
use pg_grid::{ComputationalGrid, DataDim, GridKey};
use std::collections::BTreeMap;

/// 单个场的属性
#[derive(Debug, Clone, PartialEq)]
pub struct FieldProperty {
    /// 所在网格
    pub grid: GridKey,
    /// 物理单位
    pub units: String,
    /// 数据维度
    pub data_dims: Vec<DataDim>,
    /// 维度名称，填充前为空
    pub dims: Vec<&'static str>,
}

impl FieldProperty {
    /// 无数据维度的属性
    pub fn new(grid: impl Into<GridKey>, units: impl Into<String>) -> Self {
        Self {
            grid: grid.into(),
            units: units.into(),
            data_dims: Vec::new(),
            dims: Vec::new(),
        }
    }

    /// 附加数据维度
    pub fn with_data_dims(mut self, data_dims: impl IntoIterator<Item = DataDim>) -> Self {
        self.data_dims.extend(data_dims);
        self
    }
}

/// 场名 -> 属性，按场名有序
pub type PropertyDict = BTreeMap<String, FieldProperty>;

/// 按计算网格填入每个条目的维度名称
///
/// `dims` = 网格维度名称 + 数据维度名称。条目引用的网格不存在时返回
/// [`pg_foundation::PgError::GridNotFound`]。
pub fn fill_properties_with_dims(
    computational_grid: &ComputationalGrid,
    mut properties: PropertyDict,
) -> PgResult<PropertyDict> {
    for property in properties.values_mut() {
        let grid = computational_grid.grid(&property.grid)?;
        property.dims = grid
            .dim_names()
            .iter()
            .copied()
            .chain(property.data_dims.iter().map(|d| d.label()))
            .collect();
    }
    Ok(properties)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pg_config::DomainConfig;
    use pg_grid::{d5, i, ij, j, k};

    fn properties() -> PropertyDict {
        let half = k().shift(-0.5).unwrap();
        let mut props = PropertyDict::new();
        props.insert("f_t".into(), FieldProperty::new([i(), j(), k()], "K"));
        props.insert("f_aph".into(), FieldProperty::new([i(), j(), half], "Pa"));
        props.insert(
            "f_q".into(),
            FieldProperty::new([i(), j(), k()], "kg kg-1").with_data_dims([d5()]),
        );
        props
    }

    #[test]
    fn test_fill_dims() {
        let cg = ComputationalGrid::new(DomainConfig::with_points(2, 2, 3)).unwrap();
        let filled = fill_properties_with_dims(&cg, properties()).unwrap();

        assert_eq!(filled["f_t"].dims, vec!["I", "J", "K"]);
        assert_eq!(filled["f_aph"].dims, vec!["I", "J", "K - 0.5"]);
        assert_ne!(filled["f_t"].dims, filled["f_aph"].dims);
        assert_eq!(filled["f_q"].dims, vec!["I", "J", "K", "D5"]);
        assert_eq!(filled["f_q"].units, "kg kg-1");
    }

    #[test]
    fn test_unknown_grid() {
        let cg = ComputationalGrid::new(DomainConfig::default()).unwrap();
        let mut props = properties();
        props.insert("f_col".into(), FieldProperty::new([ij(), k()], "1"));
        let err = fill_properties_with_dims(&cg, props).unwrap_err();
        assert!(err.is_not_found());
    }
}
