// crates/pg_framework/src/ingest.rs

//! 外部数据读取
//!
//! 数据源按名称提供 `f64` 数组，数组的轴顺序、方向和维度集合未必与模型一致。
//! 读取时用一组映射把源数组变换到模型布局：
//!
//! 1. 映射中的每一项是扩展轴、某个源维度，或某个源维度的反向
//! 2. 反向项对应的源轴被翻转
//! 3. 按映射顺序重排源轴
//! 4. 在扩展轴的位置插入长度为 1 的轴
//! 5. 带索引的数据维度只取该索引处的切片（去掉这一轴）
//! 6. 转换为目标标量类型
//!
//! 数据维度的相等比较不看索引，因此映射里可以直接写 `d5().at(0)`。

use ndarray::{ArrayD, Axis, IxDyn};
use pg_config::BackendConfig;
use pg_foundation::{ensure, DType, PgError, PgResult};
use pg_grid::{ComputationalGrid, DataDim, Dim, DimSymbol};
use pg_storage::{allocate_field, assign, Buffer, Field, StorageBackend};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// 外部数据源
pub trait FieldSource {
    /// 按名称取出数据集
    fn dataset(&self, name: &str) -> Option<ArrayD<f64>>;
}

/// 内存数据源
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    datasets: HashMap<String, ArrayD<f64>>,
}

#[derive(Debug, Deserialize)]
struct DatasetRecord {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl MemorySource {
    /// 空数据源
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加数据集，同名覆盖
    pub fn insert(&mut self, name: impl Into<String>, array: ArrayD<f64>) -> &mut Self {
        self.datasets.insert(name.into(), array);
        self
    }

    /// 数据集个数
    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    /// 从 JSON 解析
    ///
    /// 格式为 `{"名称": {"shape": [...], "data": [...]}}`，数据按行主序排列。
    pub fn from_json(json: &str) -> PgResult<Self> {
        let records: HashMap<String, DatasetRecord> = serde_json::from_str(json)
            .map_err(|e| PgError::config(format!("数据集 JSON 解析失败: {}", e)))?;

        let mut source = Self::new();
        for (name, record) in records {
            let expected: usize = record.shape.iter().product();
            ensure!(
                expected == record.data.len(),
                PgError::invalid_config(
                    format!("{}.data", name),
                    format!("{} 个值", record.data.len()),
                    format!("形状 {:?} 需要 {} 个值", record.shape, expected)
                )
            );
            let array = ArrayD::from_shape_vec(IxDyn(&record.shape), record.data)
                .map_err(|e| PgError::internal(e.to_string()))?;
            source.insert(name, array);
        }
        Ok(source)
    }

    /// 从 JSON 文件加载
    pub fn from_file(path: impl AsRef<Path>) -> PgResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }
}

impl FieldSource for MemorySource {
    fn dataset(&self, name: &str) -> Option<ArrayD<f64>> {
        self.datasets.get(name).cloned()
    }
}

/// 源数组的名称与布局
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLayout {
    /// 数据集名称
    pub name: String,
    /// 源数组各轴对应的维度
    pub dims: Vec<Dim>,
    /// 模型布局中每个轴取自哪个源维度
    pub dims_map: Vec<Dim>,
}

impl SourceLayout {
    /// 构造布局
    pub fn new(
        name: impl Into<String>,
        dims: impl IntoIterator<Item = Dim>,
        dims_map: impl IntoIterator<Item = Dim>,
    ) -> Self {
        Self {
            name: name.into(),
            dims: dims.into_iter().collect(),
            dims_map: dims_map.into_iter().collect(),
        }
    }

    /// 源布局与模型布局一致
    pub fn identity(name: impl Into<String>, dims: impl IntoIterator<Item = Dim>) -> Self {
        let dims: Vec<Dim> = dims.into_iter().collect();
        Self {
            name: name.into(),
            dims_map: dims.clone(),
            dims,
        }
    }
}

/// 标量参数值
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    /// 布尔
    Bool(bool),
    /// 浮点
    Float(f64),
    /// 整数
    Int(i64),
}

/// 从数据源读取场
pub struct FieldReader<S> {
    source: S,
    computational_grid: Arc<ComputationalGrid>,
    backend: Arc<dyn StorageBackend>,
    config: BackendConfig,
}

impl<S: FieldSource> FieldReader<S> {
    /// 创建读取器
    pub fn new(
        source: S,
        computational_grid: Arc<ComputationalGrid>,
        backend: Arc<dyn StorageBackend>,
        config: BackendConfig,
    ) -> Self {
        Self {
            source,
            computational_grid,
            backend,
            config,
        }
    }

    /// 数据源
    pub fn source(&self) -> &S {
        &self.source
    }

    /// 读取并变换到模型布局
    ///
    /// `dims` 是模型布局下的全部维度，结果的秩必须与之相同。
    pub fn read_field(&self, dims: &[Dim], dtype: DType, layout: &SourceLayout) -> PgResult<Buffer> {
        let name = layout.name.as_str();
        let mut value = self
            .source
            .dataset(name)
            .ok_or_else(|| PgError::field_not_found(name))?;
        ensure!(
            value.ndim() == layout.dims.len(),
            PgError::shape_mismatch(name, layout.dims.len(), value.ndim())
        );

        let mut expand_axes = Vec::new();
        let mut flip_axes = Vec::new();
        let mut layout_map = Vec::new();
        let mut selections = Vec::new();
        for (i, dim) in layout.dims_map.iter().enumerate() {
            match dim {
                Dim::Expanded => expand_axes.push(i),
                _ => {
                    if let Some(j) = layout.dims.iter().position(|d| d == dim) {
                        layout_map.push(j);
                    } else if let Some(j) = layout.dims.iter().position(|d| *d == -*dim) {
                        layout_map.push(j);
                        flip_axes.push(j);
                    } else {
                        return Err(PgError::not_a_source_dim(dim.to_string()));
                    }
                }
            }
            if let Some(index) = dim.index() {
                selections.push((i, index));
            }
        }
        Self::check_permutation(name, &layout_map, value.ndim())?;

        for &axis in &flip_axes {
            value.invert_axis(Axis(axis));
        }
        let mut value = value.permuted_axes(IxDyn(&layout_map));
        for &axis in &expand_axes {
            value = value.insert_axis(Axis(axis));
        }
        for &(axis, index) in selections.iter().rev() {
            let len = value.len_of(Axis(axis));
            ensure!(
                index < len,
                PgError::invalid_data_dim(
                    layout.dims_map[axis].to_string(),
                    format!("索引 {} 超出源数组长度 {}", index, len)
                )
            );
            value = value.index_axis_move(Axis(axis), index);
        }

        PgError::check_rank(name, dims.len(), value.ndim())?;
        let scalar = self.config.scalar_type(dtype);
        log::debug!("读取 {} -> {:?} ({})", name, value.shape(), scalar);
        Ok(Buffer::from(value).cast(scalar))
    }

    fn check_permutation(name: &str, layout_map: &[usize], ndim: usize) -> PgResult<()> {
        ensure!(
            layout_map.len() == ndim,
            PgError::shape_mismatch(name, ndim, layout_map.len())
        );
        let mut seen = vec![false; ndim];
        for &j in layout_map {
            ensure!(
                !seen[j],
                PgError::invalid_config(
                    format!("{}.dims_map", name),
                    format!("{:?}", layout_map),
                    "每个源维度只能出现一次"
                )
            );
            seen[j] = true;
        }
        Ok(())
    }

    /// 分配场并写入读取结果
    pub fn get_field(
        &self,
        grid_dims: &[DimSymbol],
        units: &str,
        data_dims: &[DataDim],
        dtype: DType,
        layout: &SourceLayout,
    ) -> PgResult<Field> {
        let grid = self.computational_grid.grid(grid_dims)?;
        let scalar = self.config.scalar_type(dtype);
        let mut field = allocate_field(self.backend.as_ref(), grid, data_dims, units, scalar)?;

        let dims: Vec<Dim> = grid_dims
            .iter()
            .map(|&d| Dim::from(d))
            .chain(data_dims.iter().map(|&d| Dim::from(d)))
            .collect();
        let value = self.read_field(&dims, dtype, layout)?;
        assign(&mut field, &value)?;
        Ok(field)
    }

    /// 读取标量参数
    ///
    /// 取数据集的第一个元素；数据集不存在时用 `default`，再缺省则布尔为真、数值为零。
    pub fn param(&self, name: &str, dtype: DType, default: Option<f64>) -> ParamValue {
        let raw = self
            .source
            .dataset(name)
            .and_then(|array| array.iter().next().copied());
        let value = match (raw, default, dtype) {
            (Some(v), _, _) => v,
            (None, Some(d), _) => d,
            (None, None, DType::Bool) => 1.0,
            (None, None, _) => 0.0,
        };
        match dtype {
            DType::Bool => ParamValue::Bool(value != 0.0),
            DType::Float => ParamValue::Float(value),
            DType::Int => ParamValue::Int(value as i64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr2, Array};
    use pg_config::DomainConfig;
    use pg_foundation::ScalarType;
    use pg_grid::{d5, i, j, k};
    use pg_storage::CpuBackend;

    fn reader(source: MemorySource) -> FieldReader<MemorySource> {
        let cg = ComputationalGrid::new(DomainConfig::with_points(2, 3, 4)).unwrap();
        FieldReader::new(
            source,
            Arc::new(cg),
            Arc::new(CpuBackend::new()),
            BackendConfig::default(),
        )
    }

    fn gi() -> Dim {
        Dim::from(i())
    }

    fn gk() -> Dim {
        Dim::from(k())
    }

    #[test]
    fn test_missing_field() {
        let r = reader(MemorySource::new());
        let layout = SourceLayout::identity("t", [gk()]);
        let err = r.read_field(&[gk()], DType::Float, &layout).unwrap_err();
        assert!(matches!(err, PgError::FieldNotFound { .. }));
    }

    #[test]
    fn test_rank_mismatch() {
        let mut source = MemorySource::new();
        source.insert("t", ArrayD::zeros(IxDyn(&[2, 4])));
        let r = reader(source);
        let layout = SourceLayout::identity("t", [gk()]);
        let err = r.read_field(&[gk()], DType::Float, &layout).unwrap_err();
        assert!(matches!(err, PgError::ShapeMismatch { expected: 1, actual: 2, .. }));
    }

    #[test]
    fn test_transpose_and_flip() {
        let mut source = MemorySource::new();
        // 源布局 (K, I)
        source.insert("t", arr2(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]).into_dyn());
        let r = reader(source);

        let layout = SourceLayout::new("t", [gk(), gi()], [gi(), -gk()]);
        let out = r.read_field(&[gi(), gk()], DType::Float, &layout).unwrap();
        let view = out.view::<f64>().unwrap();
        assert_eq!(view.shape(), &[2, 3]);
        assert_eq!(view.to_owned(), arr2(&[[5.0, 3.0, 1.0], [6.0, 4.0, 2.0]]).into_dyn());
    }

    #[test]
    fn test_expand_and_index() {
        let mut source = MemorySource::new();
        // 源布局 (K, D5)
        let data = Array::from_shape_fn((4, 5), |(kk, d)| (10 * kk + d) as f64).into_dyn();
        source.insert("q", data);
        let r = reader(source);

        let layout = SourceLayout::new(
            "q",
            [gk(), Dim::from(d5())],
            [Dim::Expanded, gk(), Dim::from(d5().at(2).unwrap())],
        );
        let out = r
            .read_field(&[gi(), gk()], DType::Int, &layout)
            .unwrap();
        assert_eq!(out.scalar_type(), ScalarType::I64);
        let view = out.view::<i64>().unwrap();
        assert_eq!(view.shape(), &[1, 4]);
        assert_eq!(view.iter().copied().collect::<Vec<_>>(), vec![2, 12, 22, 32]);
    }

    #[test]
    fn test_not_a_source_dim() {
        let mut source = MemorySource::new();
        source.insert("t", ArrayD::zeros(IxDyn(&[4])));
        let r = reader(source);
        let layout = SourceLayout::new("t", [gk()], [Dim::from(j())]);
        let err = r.read_field(&[Dim::from(j())], DType::Float, &layout).unwrap_err();
        assert!(matches!(err, PgError::NotASourceDim { .. }));
    }

    #[test]
    fn test_get_field_tiles_column() {
        let mut source = MemorySource::new();
        source.insert("t", ArrayD::from_shape_vec(IxDyn(&[4]), vec![1.0, 2.0, 3.0, 4.0]).unwrap());
        let r = reader(source);

        let layout = SourceLayout::new("t", [gk()], [Dim::Expanded, Dim::Expanded, gk()]);
        let field = r.get_field(&[i(), j(), k()], "K", &[], DType::Float, &layout).unwrap();
        let view = field.view::<f64>().unwrap();
        assert_eq!(view.shape(), &[2, 3, 4]);
        assert_eq!(view[[1, 2, 3]], 4.0);
        assert_eq!(view[[0, 1, 0]], 1.0);
    }

    #[test]
    fn test_params() {
        let mut source = MemorySource::new();
        source.insert("NSTEPS", ArrayD::from_elem(IxDyn(&[1]), 12.0));
        let r = reader(source);
        assert_eq!(r.param("NSTEPS", DType::Int, None), ParamValue::Int(12));
        assert_eq!(r.param("LFLAG", DType::Bool, None), ParamValue::Bool(true));
        assert_eq!(r.param("RG", DType::Float, Some(9.8)), ParamValue::Float(9.8));
    }

    #[test]
    fn test_json_source() {
        let source = MemorySource::from_json(r#"{"t": {"shape": [2, 2], "data": [1, 2, 3, 4]}}"#)
            .unwrap();
        assert_eq!(source.len(), 1);
        assert_eq!(source.dataset("t").unwrap()[[1, 0]], 3.0);
        assert!(MemorySource::from_json(r#"{"t": {"shape": [3], "data": [1]}}"#).is_err());
    }
}
