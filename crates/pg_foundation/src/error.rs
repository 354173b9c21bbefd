// crates/pg_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `PgError` 枚举和 `PgResult` 类型别名，用于整个项目的错误处理。
//!
//! # 错误分类
//!
//! 1. **配置错误**: 非法偏移、重复索引、秩不匹配等，属于调用方编程缺陷，不可恢复
//! 2. **查找错误**: 未知网格、未知模板、数据源中缺失的场，携带出错的键
//! 3. **形状错误**: 数据源数组秩与声明的维度数不一致，携带期望值与实际值
//!
//! 本层没有瞬时错误的概念，任何错误都不会被重试。
//!
//! # 示例
//!
//! ```
//! use pg_foundation::error::{PgError, PgResult};
//!
//! fn lookup(key: &str) -> PgResult<()> {
//!     Err(PgError::grid_not_found(key))
//! }
//! assert!(lookup("(I, K)").is_err());
//! ```

use thiserror::Error;

/// 统一结果类型
pub type PgResult<T> = Result<T, PgError>;

/// PhysGrid 错误类型
#[derive(Error, Debug)]
pub enum PgError {
    // ========================================================================
    // 配置错误（调用方缺陷）
    // ========================================================================

    /// 维度偏移不是合法的半步值
    #[error("非法维度偏移: {name} 的偏移 {offset} 不在 {{-0.5, 0, 0.5}} 之中")]
    InvalidOffset {
        /// 维度名
        name: String,
        /// 非法偏移
        offset: f64,
    },

    /// 对已带索引的数据维度再次索引
    #[error("数据维度 {name} 已经带有索引 {index}，不能再次索引")]
    AlreadyIndexed {
        /// 维度名
        name: String,
        /// 已有索引
        index: usize,
    },

    /// 非法数据维度
    #[error("非法数据维度 {name}: {reason}")]
    InvalidDataDim {
        /// 维度名
        name: String,
        /// 原因
        reason: String,
    },

    /// 数组秩不匹配
    #[error("秩不匹配: {name} 期望 {expected} 维, 实际 {actual} 维")]
    RankMismatch {
        /// 数据名称
        name: String,
        /// 期望秩
        expected: usize,
        /// 实际秩
        actual: usize,
    },

    /// 数据类型不匹配
    #[error("数据类型不匹配: 期望 {expected}, 实际 {actual}")]
    DtypeMismatch {
        /// 期望类型
        expected: String,
        /// 实际类型
        actual: String,
    },

    /// 无法从场名推断数据类型
    #[error("无法从场名推断数据类型: {field:?}")]
    UnknownDtype {
        /// 场名
        field: String,
    },

    /// 缓冲池中的缓冲区来自另一个后端
    #[error("后端不一致: 缓冲池属于 {pooled}, 当前请求来自 {requested}，切换后端前请先重置缓冲池")]
    BackendMismatch {
        /// 缓冲池当前所属后端
        pooled: String,
        /// 请求的后端
        requested: String,
    },

    /// 配置错误
    #[error("配置错误: {message}")]
    Config {
        /// 具体错误信息
        message: String,
    },

    /// 配置值无效
    #[error("配置值无效: {key}={value}, 原因: {reason}")]
    InvalidConfig {
        /// 配置键名
        key: String,
        /// 配置值
        value: String,
        /// 无效原因说明
        reason: String,
    },

    // ========================================================================
    // 查找错误
    // ========================================================================

    /// 计算网格中不存在该维度元组
    #[error("网格未找到: {key}")]
    GridNotFound {
        /// 维度元组的文本表示
        key: String,
    },

    /// 未注册的模板
    #[error("未知模板: `{name}`")]
    StencilNotFound {
        /// 模板名
        name: String,
    },

    /// 重复注册模板或模板函数
    #[error("已存在名为 `{name}` 的{kind}")]
    Duplicate {
        /// 注册项类别
        kind: &'static str,
        /// 名称
        name: String,
    },

    /// 数据源中不存在该场
    #[error("数据源中未找到场 {name:?}")]
    FieldNotFound {
        /// 场名
        name: String,
    },

    /// 维度不在数据源维度列表中
    #[error("{dim} 不是数据源维度")]
    NotASourceDim {
        /// 维度的文本表示
        dim: String,
    },

    /// 未知存储后端
    #[error("未知存储后端: {name} (支持的后端: {supported:?})")]
    UnknownBackend {
        /// 后端名
        name: String,
        /// 支持的后端
        supported: Vec<String>,
    },

    // ========================================================================
    // 形状错误
    // ========================================================================

    /// 数据源数组的秩与声明的维度数不一致
    #[error("场 {name:?} 应有 {expected} 个维度, 实际为 {actual} 维")]
    ShapeMismatch {
        /// 场名
        name: String,
        /// 期望秩
        expected: usize,
        /// 实际秩
        actual: usize,
    },

    // ========================================================================
    // 其他
    // ========================================================================

    /// IO 错误
    #[error("IO错误: {message}")]
    Io {
        /// 描述性错误信息
        message: String,
        #[source]
        /// 可选的底层 IO 错误
        source: Option<std::io::Error>,
    },

    /// 内部错误
    #[error("内部错误: {message}")]
    Internal {
        /// 内部错误描述
        message: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl PgError {
    /// 非法偏移
    pub fn invalid_offset(name: impl Into<String>, offset: f64) -> Self {
        Self::InvalidOffset {
            name: name.into(),
            offset,
        }
    }

    /// 重复索引
    pub fn already_indexed(name: impl Into<String>, index: usize) -> Self {
        Self::AlreadyIndexed {
            name: name.into(),
            index,
        }
    }

    /// 非法数据维度
    pub fn invalid_data_dim(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDataDim {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// 秩不匹配
    pub fn rank_mismatch(name: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::RankMismatch {
            name: name.into(),
            expected,
            actual,
        }
    }

    /// 数据类型不匹配
    pub fn dtype_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::DtypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// 无法推断数据类型
    pub fn unknown_dtype(field: impl Into<String>) -> Self {
        Self::UnknownDtype {
            field: field.into(),
        }
    }

    /// 后端不一致
    pub fn backend_mismatch(pooled: impl Into<String>, requested: impl Into<String>) -> Self {
        Self::BackendMismatch {
            pooled: pooled.into(),
            requested: requested.into(),
        }
    }

    /// 配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 配置值无效
    pub fn invalid_config(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// 网格未找到
    pub fn grid_not_found(key: impl Into<String>) -> Self {
        Self::GridNotFound { key: key.into() }
    }

    /// 未知模板
    pub fn stencil_not_found(name: impl Into<String>) -> Self {
        Self::StencilNotFound { name: name.into() }
    }

    /// 重复注册
    pub fn duplicate(kind: &'static str, name: impl Into<String>) -> Self {
        Self::Duplicate {
            kind,
            name: name.into(),
        }
    }

    /// 场未找到
    pub fn field_not_found(name: impl Into<String>) -> Self {
        Self::FieldNotFound { name: name.into() }
    }

    /// 不是数据源维度
    pub fn not_a_source_dim(dim: impl Into<String>) -> Self {
        Self::NotASourceDim { dim: dim.into() }
    }

    /// 未知后端
    pub fn unknown_backend(name: impl Into<String>, supported: Vec<String>) -> Self {
        Self::UnknownBackend {
            name: name.into(),
            supported,
        }
    }

    /// 形状不匹配
    pub fn shape_mismatch(name: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            name: name.into(),
            expected,
            actual,
        }
    }

    /// 内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

// ========================================================================
// 验证辅助方法
// ========================================================================

impl PgError {
    /// 检查秩是否匹配
    #[inline]
    pub fn check_rank(name: &str, expected: usize, actual: usize) -> PgResult<()> {
        if expected != actual {
            Err(Self::rank_mismatch(name, expected, actual))
        } else {
            Ok(())
        }
    }

    /// 是否为查找类错误
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::GridNotFound { .. }
                | Self::StencilNotFound { .. }
                | Self::FieldNotFound { .. }
                | Self::NotASourceDim { .. }
                | Self::UnknownBackend { .. }
        )
    }
}

// ========================================================================
// 标准库错误转换
// ========================================================================

impl From<std::io::Error> for PgError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

/// 条件不满足时提前返回错误
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err.into());
        }
    };
}

/// 取出 `Option` 中的值，为 `None` 时提前返回错误
#[macro_export]
macro_rules! require {
    ($opt:expr, $err:expr) => {
        match $opt {
            Some(v) => v,
            None => return Err($err.into()),
        }
    };
}

// ========================================================================
// 测试
// ========================================================================
