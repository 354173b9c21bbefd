// crates/pg_storage/src/field.rs

//! 场
//!
//! 带单位、坐标与视图元数据的缓冲区。缓冲区按存储形状分配，
//! 逻辑区域由 `view_slice` 给出。

use ndarray::{Array1, ArrayViewD, ArrayViewMutD, Slice};
use pg_foundation::{ensure, PgError, PgResult, ScalarType};
use std::fmt;
use std::ops::Range;

use crate::buffer::Buffer;
use crate::element::Element;

/// 场属性
#[derive(Debug, Clone, PartialEq)]
pub struct FieldAttrs {
    /// 物理单位
    pub units: String,
    /// 逻辑形状（网格形状 + 数据维度大小）
    pub view_shape: Vec<usize>,
    /// 逻辑区域在存储中的索引范围，每个轴一个
    pub view_slice: Vec<Range<usize>>,
    /// 逻辑区域在存储中的起点
    pub origin: Vec<usize>,
}

/// 场
#[derive(Debug, Clone)]
pub struct Field {
    pub(crate) buffer: Buffer,
    pub(crate) dims: Vec<&'static str>,
    pub(crate) coords: Vec<Array1<f64>>,
    pub(crate) attrs: FieldAttrs,
}

impl Field {
    /// 存储缓冲区
    #[inline]
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// 整个存储区域（含 halo）的可变视图
    ///
    /// 形状固定为存储形状，视图元数据因此始终有效。
    pub fn storage_mut<T: Element>(&mut self) -> PgResult<ArrayViewMutD<'_, T>> {
        self.buffer.view_mut::<T>()
    }

    /// 替换缓冲区，返回旧缓冲区
    ///
    /// 新缓冲区的存储形状与标量类型必须与原缓冲区一致。
    pub fn replace_buffer(&mut self, buffer: Buffer) -> PgResult<Buffer> {
        ensure!(
            buffer.scalar_type() == self.buffer.scalar_type(),
            PgError::dtype_mismatch(self.buffer.scalar_type().name(), buffer.scalar_type().name())
        );
        ensure!(
            buffer.shape() == self.buffer.shape(),
            PgError::invalid_config(
                "buffer.shape",
                format!("{:?}", buffer.shape()),
                format!("存储形状必须为 {:?}", self.buffer.shape())
            )
        );
        Ok(std::mem::replace(&mut self.buffer, buffer))
    }

    /// 取出缓冲区
    pub fn into_buffer(self) -> Buffer {
        self.buffer
    }

    /// 维度名称（网格维度在前，数据维度在后）
    #[inline]
    pub fn dims(&self) -> &[&'static str] {
        &self.dims
    }

    /// 各维坐标
    #[inline]
    pub fn coords(&self) -> &[Array1<f64>] {
        &self.coords
    }

    /// 属性
    #[inline]
    pub fn attrs(&self) -> &FieldAttrs {
        &self.attrs
    }

    /// 单位
    #[inline]
    pub fn units(&self) -> &str {
        &self.attrs.units
    }

    /// 标量类型
    #[inline]
    pub fn scalar_type(&self) -> ScalarType {
        self.buffer.scalar_type()
    }

    /// 转换为另一种标量类型的新场，元数据保持不变
    pub fn cast(&self, scalar: ScalarType) -> Field {
        Field {
            buffer: self.buffer.clone().cast(scalar),
            dims: self.dims.clone(),
            coords: self.coords.clone(),
            attrs: self.attrs.clone(),
        }
    }

    /// 逻辑区域的只读视图
    pub fn view<T: Element>(&self) -> PgResult<ArrayViewD<'_, T>> {
        let slice = &self.attrs.view_slice;
        let mut array = self.buffer.view::<T>()?;
        array.slice_each_axis_inplace(|ax| Slice::from(slice[ax.axis.index()].clone()));
        Ok(array)
    }

    /// 逻辑区域的可变视图
    pub fn view_mut<T: Element>(&mut self) -> PgResult<ArrayViewMutD<'_, T>> {
        let slice = &self.attrs.view_slice;
        let mut array = self.buffer.view_mut::<T>()?;
        array.slice_each_axis_inplace(|ax| Slice::from(slice[ax.axis.index()].clone()));
        Ok(array)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "field<{}> dims=({}) view_shape={:?} storage_shape={:?} units={:?}",
            self.scalar_type(),
            self.dims.join(", "),
            self.attrs.view_shape,
            self.buffer.shape(),
            self.attrs.units
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::allocate_field;
    use crate::backend::CpuBackend;
    use pg_config::DomainConfig;
    use pg_grid::{i, j, k, ComputationalGrid};

    fn field() -> Field {
        let cg = ComputationalGrid::new(DomainConfig::with_points(3, 1, 4)).unwrap();
        let grid = cg.grid(&[k()]).unwrap();
        allocate_field(&CpuBackend::new(), grid, &[], "K", ScalarType::F64).unwrap()
    }

    #[test]
    fn test_replace_buffer_checks_shape() {
        let mut field = field();
        let err = field.replace_buffer(Buffer::zeros(ScalarType::F64, &[3])).unwrap_err();
        assert!(matches!(err, PgError::InvalidConfig { .. }));
        assert_eq!(field.buffer().shape(), &[5]);
        assert_eq!(field.view::<f64>().unwrap().len(), 4);
    }

    #[test]
    fn test_replace_buffer_checks_dtype() {
        let mut field = field();
        let err = field.replace_buffer(Buffer::zeros(ScalarType::F32, &[5])).unwrap_err();
        assert!(matches!(err, PgError::DtypeMismatch { .. }));
        assert_eq!(field.scalar_type(), ScalarType::F64);
    }

    #[test]
    fn test_replace_buffer_returns_previous() {
        let mut field = field();
        field.storage_mut::<f64>().unwrap().fill(1.0);
        let mut next = Buffer::zeros(ScalarType::F64, &[5]);
        next.view_mut::<f64>().unwrap()[[4]] = 7.0;

        let previous = field.replace_buffer(next).unwrap();
        assert!(previous.view::<f64>().unwrap().iter().all(|&v| v == 1.0));
        assert_eq!(field.storage_mut::<f64>().unwrap()[[4]], 7.0);
        // halo 点在逻辑视图之外
        assert!(field.view::<f64>().unwrap().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_cast_keeps_view_metadata() {
        let mut field = field();
        field.view_mut::<f64>().unwrap().fill(2.5);
        let ints = field.cast(ScalarType::I32);
        assert_eq!(ints.scalar_type(), ScalarType::I32);
        assert_eq!(ints.attrs(), field.attrs());
        assert_eq!(ints.dims(), field.dims());
        assert!(ints.view::<i32>().unwrap().iter().all(|&v| v == 2));
        assert_eq!(ints.buffer().view::<i32>().unwrap()[[4]], 0);
    }

    #[test]
    fn test_storage_view_covers_halo() {
        let cg = ComputationalGrid::new(DomainConfig::with_points(3, 1, 4)).unwrap();
        let grid = cg.grid(&[i(), j()]).unwrap();
        let mut field = allocate_field(&CpuBackend::new(), grid, &[], "1", ScalarType::I32).unwrap();
        assert_eq!(field.storage_mut::<i32>().unwrap().shape(), &[4, 2]);
        assert_eq!(field.view::<i32>().unwrap().shape(), &[3, 1]);
    }
}
