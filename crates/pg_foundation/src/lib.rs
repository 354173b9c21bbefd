// crates/pg_foundation/src/lib.rs

//! PhysGrid Foundation Layer
//!
//! 基础层，提供整个项目的基础抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型与 `ensure!`/`require!` 宏
//! - [`intern`]: 值驻留表（规范化单例 + 轻量句柄）
//! - [`dtype`]: 逻辑数据类型、具体标量类型与运行时精度
//!
//! # 示例
//!
//! ```
//! use pg_foundation::{
//!     dtype::{DType, Precision, ScalarType},
//!     error::{PgError, PgResult},
//! };
//!
//! fn scalar_of(name: &str, precision: Precision) -> PgResult<ScalarType> {
//!     Ok(precision.scalar_type(DType::from_field_name(name)?))
//! }
//!
//! assert_eq!(scalar_of("f_t", Precision::F32).unwrap(), ScalarType::F32);
//! assert!(matches!(scalar_of("t", Precision::F64), Err(PgError::UnknownDtype { .. })));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dtype;
pub mod error;
pub mod intern;

// 重导出常用类型
pub use dtype::{DType, Precision, ScalarType};
pub use error::{PgError, PgResult};
pub use intern::{GlobalInterner, Interner};

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::dtype::{DType, Precision, ScalarType};
    pub use crate::error::{PgError, PgResult};
    pub use crate::{ensure, require};
}
