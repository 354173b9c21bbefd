// crates/pg_storage/src/element.rs

//! 缓冲区元素类型
//!
//! 存储层支持的五种标量：`bool`、`i32`、`i64`、`f32`、`f64`。
//! 类型之间的转换与 `as` 一致，`bool` 与数值之间按 0/1 转换。

use bytemuck::Zeroable;
use ndarray::{ArrayD, ArrayViewD, ArrayViewMutD};
use pg_foundation::ScalarType;
use std::fmt::Debug;

use crate::buffer::Buffer;

/// 缓冲区元素
///
/// 零初始化依赖 [`Zeroable`]；`bool` 不是 `Pod`，因此这里不要求 `Pod`。
pub trait Element: Copy + Zeroable + PartialEq + Debug + Send + Sync + 'static {
    /// 对应的标量类型
    const SCALAR: ScalarType;

    /// 是否为浮点类型
    const IS_FLOAT: bool;

    /// 整数路径上的中间表示
    fn to_i64(self) -> i64;

    /// 浮点路径上的中间表示
    fn to_f64(self) -> f64;

    /// 从整数转换
    fn from_i64(value: i64) -> Self;

    /// 从浮点转换
    fn from_f64(value: f64) -> Self;

    /// 包装为缓冲区
    fn wrap(array: ArrayD<Self>) -> Buffer;

    /// 类型匹配时借出视图
    fn view(buffer: &Buffer) -> Option<ArrayViewD<'_, Self>>;

    /// 类型匹配时借出可变视图
    fn view_mut(buffer: &mut Buffer) -> Option<ArrayViewMutD<'_, Self>>;

    /// 转换为另一种元素类型
    ///
    /// 浮点源经 `f64`、整数与布尔源经 `i64`，再用 `as` 落到目标类型。
    /// 两条路径都不损失源值，结果与直接 `as` 相同。
    #[inline]
    fn cast<D: Element>(self) -> D {
        if Self::IS_FLOAT {
            D::from_f64(self.to_f64())
        } else {
            D::from_i64(self.to_i64())
        }
    }
}

macro_rules! impl_numeric_element {
    ($ty:ty, $scalar:ident, $is_float:expr) => {
        impl Element for $ty {
            const SCALAR: ScalarType = ScalarType::$scalar;
            const IS_FLOAT: bool = $is_float;

            #[inline]
            fn to_i64(self) -> i64 {
                self as i64
            }

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_i64(value: i64) -> Self {
                value as $ty
            }

            #[inline]
            fn from_f64(value: f64) -> Self {
                value as $ty
            }

            fn wrap(array: ArrayD<Self>) -> Buffer {
                Buffer::$scalar(array)
            }

            fn view(buffer: &Buffer) -> Option<ArrayViewD<'_, Self>> {
                match buffer {
                    Buffer::$scalar(array) => Some(array.view()),
                    _ => None,
                }
            }

            fn view_mut(buffer: &mut Buffer) -> Option<ArrayViewMutD<'_, Self>> {
                match buffer {
                    Buffer::$scalar(array) => Some(array.view_mut()),
                    _ => None,
                }
            }
        }
    };
}

impl_numeric_element!(i32, I32, false);
impl_numeric_element!(i64, I64, false);
impl_numeric_element!(f32, F32, true);
impl_numeric_element!(f64, F64, true);

impl Element for bool {
    const SCALAR: ScalarType = ScalarType::Bool;
    const IS_FLOAT: bool = false;

    #[inline]
    fn to_i64(self) -> i64 {
        i64::from(self)
    }

    #[inline]
    fn to_f64(self) -> f64 {
        if self { 1.0 } else { 0.0 }
    }

    #[inline]
    fn from_i64(value: i64) -> Self {
        value != 0
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value != 0.0
    }

    fn wrap(array: ArrayD<Self>) -> Buffer {
        Buffer::Bool(array)
    }

    fn view(buffer: &Buffer) -> Option<ArrayViewD<'_, Self>> {
        match buffer {
            Buffer::Bool(array) => Some(array.view()),
            _ => None,
        }
    }

    fn view_mut(buffer: &mut Buffer) -> Option<ArrayViewMutD<'_, Self>> {
        match buffer {
            Buffer::Bool(array) => Some(array.view_mut()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cast_matches_as() {
        assert_eq!(2.7f64.cast::<i32>(), 2.7f64 as i32);
        assert_eq!((-1.5f32).cast::<i64>(), -1);
        assert_eq!(1e10f64.cast::<i32>(), i32::MAX);
        assert_eq!(i64::MAX.cast::<i64>(), i64::MAX);
        assert_eq!(3i32.cast::<f32>(), 3.0);
    }

    #[test]
    fn test_bool_casts() {
        assert_eq!(true.cast::<f64>(), 1.0);
        assert_eq!(false.cast::<i32>(), 0);
        assert!(0.25f64.cast::<bool>());
        assert!(!0i64.cast::<bool>());
    }
}
