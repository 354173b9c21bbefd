// crates/pg_framework/src/lib.rs

//! PhysGrid 组件框架
//!
//! 在网格与存储层之上为物理组件提供公共设施。
//!
//! # 模块概览
//!
//! - [`properties`]: 场属性表与维度填充
//! - [`component`]: 计算网格组件、诊断组件与倾向组件
//! - [`stencil`]: 模板注册、编译请求与编译器接口
//! - [`ingest`]: 从外部数据源读取场

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod component;
pub mod ingest;
pub mod properties;
pub mod stencil;

pub use component::{ComputationalGridComponent, DiagnosticComponent, TendencyComponent};
pub use ingest::{FieldReader, FieldSource, MemorySource, ParamValue, SourceLayout};
pub use properties::{fill_properties_with_dims, FieldProperty, PropertyDict};
pub use stencil::{
    CompileRequest, NativeCompiler, StencilCompiler, StencilDefinition, StencilFunction,
    StencilKernel, StencilRegistry,
};
