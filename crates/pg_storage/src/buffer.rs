// crates/pg_storage/src/buffer.rs

//! 后端缓冲区
//!
//! 运行时标量类型由精度配置决定，因此缓冲区是按标量类型区分的枚举，
//! 每个变体持有一个 n 维数组。类型化访问通过 [`Element`] 完成。

use ndarray::{ArrayD, ArrayViewD, ArrayViewMutD, IxDyn};
use pg_foundation::{PgError, PgResult, ScalarType};

use crate::element::Element;

/// 对五种变体统一展开同一段代码
macro_rules! dispatch {
    ($buffer:expr, $array:ident => $body:expr) => {
        match $buffer {
            Buffer::Bool($array) => $body,
            Buffer::I32($array) => $body,
            Buffer::I64($array) => $body,
            Buffer::F32($array) => $body,
            Buffer::F64($array) => $body,
        }
    };
}

/// n 维缓冲区
#[derive(Debug, Clone, PartialEq)]
pub enum Buffer {
    /// 布尔
    Bool(ArrayD<bool>),
    /// 32 位整数
    I32(ArrayD<i32>),
    /// 64 位整数
    I64(ArrayD<i64>),
    /// 单精度
    F32(ArrayD<f32>),
    /// 双精度
    F64(ArrayD<f64>),
}

impl Buffer {
    /// 零初始化缓冲区
    pub fn zeros(scalar: ScalarType, shape: &[usize]) -> Self {
        match scalar {
            ScalarType::Bool => Self::filled_zero::<bool>(shape),
            ScalarType::I32 => Self::filled_zero::<i32>(shape),
            ScalarType::I64 => Self::filled_zero::<i64>(shape),
            ScalarType::F32 => Self::filled_zero::<f32>(shape),
            ScalarType::F64 => Self::filled_zero::<f64>(shape),
        }
    }

    fn filled_zero<T: Element>(shape: &[usize]) -> Self {
        T::wrap(ArrayD::from_elem(IxDyn(shape), T::zeroed()))
    }

    /// 包装已有数组
    pub fn from_array<T: Element>(array: ArrayD<T>) -> Self {
        T::wrap(array)
    }

    /// 标量类型
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Buffer::Bool(_) => ScalarType::Bool,
            Buffer::I32(_) => ScalarType::I32,
            Buffer::I64(_) => ScalarType::I64,
            Buffer::F32(_) => ScalarType::F32,
            Buffer::F64(_) => ScalarType::F64,
        }
    }

    /// 形状
    pub fn shape(&self) -> &[usize] {
        dispatch!(self, array => array.shape())
    }

    /// 维数
    pub fn ndim(&self) -> usize {
        dispatch!(self, array => array.ndim())
    }

    /// 元素总数
    pub fn len(&self) -> usize {
        dispatch!(self, array => array.len())
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 首元素地址，用于判断两个句柄是否指向同一块存储
    pub fn as_ptr(&self) -> *const u8 {
        dispatch!(self, array => array.as_ptr() as *const u8)
    }

    /// 类型化只读视图
    pub fn view<T: Element>(&self) -> PgResult<ArrayViewD<'_, T>> {
        let actual = self.scalar_type();
        T::view(self).ok_or_else(|| PgError::dtype_mismatch(T::SCALAR.name(), actual.name()))
    }

    /// 类型化可变视图
    pub fn view_mut<T: Element>(&mut self) -> PgResult<ArrayViewMutD<'_, T>> {
        let actual = self.scalar_type();
        T::view_mut(self).ok_or_else(|| PgError::dtype_mismatch(T::SCALAR.name(), actual.name()))
    }

    /// 转换为某种元素类型的新数组
    pub fn to_array<T: Element>(&self) -> ArrayD<T> {
        dispatch!(self, array => array.mapv(|v| v.cast::<T>()))
    }

    /// 转换为指定标量类型；类型相同时直接返回自身
    pub fn cast(self, scalar: ScalarType) -> Self {
        if self.scalar_type() == scalar {
            return self;
        }
        match scalar {
            ScalarType::Bool => Buffer::Bool(self.to_array()),
            ScalarType::I32 => Buffer::I32(self.to_array()),
            ScalarType::I64 => Buffer::I64(self.to_array()),
            ScalarType::F32 => Buffer::F32(self.to_array()),
            ScalarType::F64 => Buffer::F64(self.to_array()),
        }
    }
}

impl<T: Element> From<ArrayD<T>> for Buffer {
    fn from(array: ArrayD<T>) -> Self {
        T::wrap(array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros() {
        let buffer = Buffer::zeros(ScalarType::I32, &[2, 3]);
        assert_eq!(buffer.shape(), &[2, 3]);
        assert_eq!(buffer.scalar_type(), ScalarType::I32);
        assert!(buffer.view::<i32>().unwrap().iter().all(|&v| v == 0));

        let flags = Buffer::zeros(ScalarType::Bool, &[4]);
        assert!(flags.view::<bool>().unwrap().iter().all(|&v| !v));
    }

    #[test]
    fn test_typed_view_mismatch() {
        let buffer = Buffer::zeros(ScalarType::F32, &[1]);
        assert!(matches!(buffer.view::<f64>(), Err(PgError::DtypeMismatch { .. })));
    }

    #[test]
    fn test_cast() {
        let array = ArrayD::from_shape_vec(IxDyn(&[3]), vec![0.0, 1.9, -2.5]).unwrap();
        let ints = Buffer::from(array).cast(ScalarType::I64);
        assert_eq!(ints.view::<i64>().unwrap().iter().copied().collect::<Vec<_>>(), vec![0, 1, -2]);

        let flags = ints.cast(ScalarType::Bool);
        assert_eq!(flags.view::<bool>().unwrap().iter().copied().collect::<Vec<_>>(), vec![false, true, true]);
    }

    #[test]
    fn test_identity_by_pointer() {
        let a = Buffer::zeros(ScalarType::F64, &[8]);
        let b = a.clone();
        assert_ne!(a.as_ptr(), b.as_ptr());
        let moved = a;
        let ptr = moved.as_ptr();
        assert_eq!(ptr, moved.as_ptr());
    }
}
