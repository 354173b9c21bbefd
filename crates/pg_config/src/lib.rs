// crates/pg_config/src/lib.rs

//! PhysGrid Config Layer
//!
//! 配置层，提供计算域、后端与运行配置。所有配置都可以从 JSON 反序列化，
//! 并在加载时验证。
//!
//! # 模块概览
//!
//! - [`domain`]: DomainConfig 计算域（格点数与物理边界）
//! - [`backend`]: BackendConfig 后端名称、精度与模板编译选项
//! - [`run_config`]: RunConfig 完整运行配置，支持文件读写
//! - [`error`]: 配置错误类型

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod domain;
pub mod error;
pub mod run_config;

// 重导出核心类型
pub use backend::BackendConfig;
pub use domain::{AxisExtent, DomainConfig};
pub use error::ConfigError;
pub use run_config::RunConfig;
