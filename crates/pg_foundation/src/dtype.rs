// crates/pg_foundation/src/dtype.rs

//! 数据类型与运行时精度
//!
//! 场在声明时只说明逻辑类型（`bool` / `float` / `int`），具体的标量宽度由
//! 运行时 [`Precision`] 决定：
//!
//! | 逻辑类型 | F32     | F64     |
//! |----------|---------|---------|
//! | bool     | bool    | bool    |
//! | float    | f32     | f64     |
//! | int      | i32     | i64     |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{PgError, PgResult};

/// 运行时精度选择
///
/// # 示例
///
/// ```
/// use pg_foundation::dtype::{DType, Precision, ScalarType};
///
/// let precision: Precision = "single".parse().unwrap();
/// assert_eq!(precision.scalar_type(DType::Float), ScalarType::F32);
/// assert_eq!(Precision::default().scalar_type(DType::Int), ScalarType::I64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// 单精度（32位）
    F32,
    /// 双精度（64位），默认
    #[default]
    F64,
}

impl Precision {
    /// 获取精度名称
    pub fn name(&self) -> &'static str {
        match self {
            Precision::F32 => "f32",
            Precision::F64 => "f64",
        }
    }

    /// 逻辑类型 -> 具体标量类型
    pub fn scalar_type(&self, dtype: DType) -> ScalarType {
        match (dtype, self) {
            (DType::Bool, _) => ScalarType::Bool,
            (DType::Float, Precision::F32) => ScalarType::F32,
            (DType::Float, Precision::F64) => ScalarType::F64,
            (DType::Int, Precision::F32) => ScalarType::I32,
            (DType::Int, Precision::F64) => ScalarType::I64,
        }
    }

    /// 完整的逻辑类型映射表，交给模板编译器使用
    pub fn dtype_map(&self) -> [(DType, ScalarType); 3] {
        [DType::Bool, DType::Float, DType::Int].map(|d| (d, self.scalar_type(d)))
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Precision {
    type Err = PgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "f32" | "float" | "single" | "float32" => Ok(Self::F32),
            "f64" | "double" | "float64" => Ok(Self::F64),
            _ => Err(PgError::invalid_config("precision", s, "期望 'f32' 或 'f64'")),
        }
    }
}

/// 场的逻辑数据类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    /// 布尔
    Bool,
    /// 浮点
    Float,
    /// 整数
    Int,
}

impl DType {
    /// 类型名称
    pub fn name(&self) -> &'static str {
        match self {
            DType::Bool => "bool",
            DType::Float => "float",
            DType::Int => "int",
        }
    }

    /// 按命名约定从场名推断类型
    ///
    /// 布尔场以 `b` 开头（如 `b_cloudy`），浮点场以 `f` 开头（如 `f_t`），
    /// 整数场以 `i` 开头（如 `i_level`）。
    ///
    /// ```
    /// use pg_foundation::dtype::DType;
    ///
    /// assert_eq!(DType::from_field_name("f_t").unwrap(), DType::Float);
    /// assert!(DType::from_field_name("t").is_err());
    /// ```
    pub fn from_field_name(field_name: &str) -> PgResult<Self> {
        match field_name.chars().next() {
            Some('b') => Ok(DType::Bool),
            Some('f') => Ok(DType::Float),
            Some('i') => Ok(DType::Int),
            _ => Err(PgError::unknown_dtype(field_name)),
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DType {
    type Err = PgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bool" => Ok(DType::Bool),
            "float" => Ok(DType::Float),
            "int" => Ok(DType::Int),
            _ => Err(PgError::invalid_config("dtype", s, "期望 'bool'、'float' 或 'int'")),
        }
    }
}

/// 缓冲区的具体标量类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    /// bool
    Bool,
    /// i32
    I32,
    /// i64
    I64,
    /// f32
    F32,
    /// f64
    F64,
}

impl ScalarType {
    /// 类型名称
    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::I32 => "i32",
            ScalarType::I64 => "i64",
            ScalarType::F32 => "f32",
            ScalarType::F64 => "f64",
        }
    }

    /// 每个元素的字节数
    pub fn size_bytes(&self) -> usize {
        match self {
            ScalarType::Bool => 1,
            ScalarType::I32 | ScalarType::F32 => 4,
            ScalarType::I64 | ScalarType::F64 => 8,
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_default() {
        assert_eq!(Precision::default(), Precision::F64);
    }

    #[test]
    fn test_precision_parse() {
        assert_eq!("f32".parse::<Precision>().unwrap(), Precision::F32);
        assert_eq!("F64".parse::<Precision>().unwrap(), Precision::F64);
        assert_eq!("double".parse::<Precision>().unwrap(), Precision::F64);
        assert!("quad".parse::<Precision>().is_err());
    }

    #[test]
    fn test_scalar_mapping() {
        assert_eq!(Precision::F32.scalar_type(DType::Bool), ScalarType::Bool);
        assert_eq!(Precision::F32.scalar_type(DType::Int), ScalarType::I32);
        assert_eq!(Precision::F64.scalar_type(DType::Float), ScalarType::F64);
        assert_eq!(ScalarType::I32.size_bytes(), 4);
    }

    #[test]
    fn test_dtype_from_field_name() {
        assert_eq!(DType::from_field_name("b_cloud").unwrap(), DType::Bool);
        assert_eq!(DType::from_field_name("f_q").unwrap(), DType::Float);
        assert_eq!(DType::from_field_name("i_lev").unwrap(), DType::Int);
        assert!(matches!(
            DType::from_field_name("q"),
            Err(PgError::UnknownDtype { .. })
        ));
        assert!(DType::from_field_name("").is_err());
    }

    #[test]
    fn test_precision_serde() {
        let json = serde_json::to_string(&Precision::F32).unwrap();
        assert_eq!(json, "\"f32\"");
        let dtype: DType = serde_json::from_str("\"int\"").unwrap();
        assert_eq!(dtype, DType::Int);
    }
}
