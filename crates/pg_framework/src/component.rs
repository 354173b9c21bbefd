// crates/pg_framework/src/component.rs

//! 计算网格组件
//!
//! 物理组件都定义在同一个计算网格上，共享后端配置。[`ComputationalGridComponent`]
//! 提供它们共有的能力：填充属性表维度、按场名分配场、获取临时缓冲区、编译模板。
//! [`DiagnosticComponent`] 与 [`TendencyComponent`] 在此之上声明各自的属性表。

use pg_config::BackendConfig;
use pg_foundation::{DType, PgError, PgResult, ScalarType};
use pg_grid::{ComputationalGrid, DimSymbol};
use pg_storage::{
    allocate_field, backend_from_config, Field, PoolGuard, StorageBackend, TemporaryStoragePool,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::properties::{fill_properties_with_dims, PropertyDict};
use crate::stencil::{StencilCompiler, StencilKernel, StencilRegistry};

/// 定义在计算网格上的组件
#[derive(Clone)]
pub struct ComputationalGridComponent {
    computational_grid: Arc<ComputationalGrid>,
    config: BackendConfig,
    backend: Arc<dyn StorageBackend>,
}

impl ComputationalGridComponent {
    /// 按配置创建，后端由配置决定
    pub fn new(computational_grid: Arc<ComputationalGrid>, config: BackendConfig) -> PgResult<Self> {
        config.validate()?;
        let backend = backend_from_config(&config)?;
        Ok(Self {
            computational_grid,
            config,
            backend,
        })
    }

    /// 计算网格
    #[inline]
    pub fn computational_grid(&self) -> &ComputationalGrid {
        &self.computational_grid
    }

    /// 后端配置
    #[inline]
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// 存储后端
    #[inline]
    pub fn backend(&self) -> &dyn StorageBackend {
        self.backend.as_ref()
    }

    /// 存储后端的共享句柄
    #[inline]
    pub fn backend_handle(&self) -> Arc<dyn StorageBackend> {
        Arc::clone(&self.backend)
    }

    /// 逻辑类型对应的标量类型
    #[inline]
    pub fn scalar_type(&self, dtype: DType) -> ScalarType {
        self.config.scalar_type(dtype)
    }

    /// 填充属性表维度
    pub fn fill_properties_with_dims(&self, properties: PropertyDict) -> PgResult<PropertyDict> {
        fill_properties_with_dims(&self.computational_grid, properties)
    }

    /// 按属性表分配场
    ///
    /// 数据类型由场名前缀决定：`b` 布尔、`f` 浮点、`i` 整数。
    pub fn allocate(&self, name: &str, properties: &PropertyDict) -> PgResult<Field> {
        let property = properties
            .get(name)
            .ok_or_else(|| PgError::field_not_found(name))?;
        let dtype = DType::from_field_name(name)?;
        let grid = self.computational_grid.grid(&property.grid)?;
        allocate_field(
            self.backend.as_ref(),
            grid,
            &property.data_dims,
            &property.units,
            self.scalar_type(dtype),
        )
    }

    /// 从缓冲池获取临时缓冲区
    pub fn temporaries<'p>(
        &self,
        pool: &'p TemporaryStoragePool,
        requests: &[(&[DimSymbol], DType)],
    ) -> PgResult<PoolGuard<'p>> {
        let requests: Vec<(&[DimSymbol], ScalarType)> = requests
            .iter()
            .map(|&(dims, dtype)| (dims, self.scalar_type(dtype)))
            .collect();
        pool.acquire(self.backend.as_ref(), &self.computational_grid, &requests)
    }

    /// 编译已注册的模板
    pub fn compile_stencil(
        &self,
        registry: &StencilRegistry,
        compiler: &dyn StencilCompiler,
        name: &str,
        externals: BTreeMap<String, Value>,
    ) -> PgResult<Box<dyn StencilKernel>> {
        registry.compile(compiler, name, &self.config, externals)
    }
}

impl fmt::Debug for ComputationalGridComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputationalGridComponent")
            .field("domain", self.computational_grid.domain())
            .field("backend", &self.backend.name())
            .field("precision", &self.config.precision)
            .finish()
    }
}

/// 诊断组件：由输入计算诊断量
pub trait DiagnosticComponent {
    /// 共享的网格组件
    fn base(&self) -> &ComputationalGridComponent;

    /// 声明的输入（未填充维度）
    fn declared_inputs(&self) -> PropertyDict;

    /// 声明的诊断量（未填充维度）
    fn declared_diagnostics(&self) -> PropertyDict;

    /// 输入属性表
    fn input_properties(&self) -> PgResult<PropertyDict> {
        self.base().fill_properties_with_dims(self.declared_inputs())
    }

    /// 诊断量属性表
    fn diagnostic_properties(&self) -> PgResult<PropertyDict> {
        self.base().fill_properties_with_dims(self.declared_diagnostics())
    }

    /// 分配一个诊断量
    fn allocate_diagnostic(&self, name: &str) -> PgResult<Field> {
        self.base().allocate(name, &self.diagnostic_properties()?)
    }
}

/// 倾向组件：由输入计算倾向项，可附带诊断量
pub trait TendencyComponent {
    /// 共享的网格组件
    fn base(&self) -> &ComputationalGridComponent;

    /// 声明的输入（未填充维度）
    fn declared_inputs(&self) -> PropertyDict;

    /// 声明的倾向项（未填充维度）
    fn declared_tendencies(&self) -> PropertyDict;

    /// 声明的诊断量，默认为空
    fn declared_diagnostics(&self) -> PropertyDict {
        PropertyDict::new()
    }

    /// 输入属性表
    fn input_properties(&self) -> PgResult<PropertyDict> {
        self.base().fill_properties_with_dims(self.declared_inputs())
    }

    /// 倾向项属性表
    fn tendency_properties(&self) -> PgResult<PropertyDict> {
        self.base().fill_properties_with_dims(self.declared_tendencies())
    }

    /// 诊断量属性表
    fn diagnostic_properties(&self) -> PgResult<PropertyDict> {
        self.base().fill_properties_with_dims(self.declared_diagnostics())
    }

    /// 分配一个倾向项
    fn allocate_tendency(&self, name: &str) -> PgResult<Field> {
        self.base().allocate(name, &self.tendency_properties()?)
    }

    /// 分配一个诊断量
    fn allocate_diagnostic(&self, name: &str) -> PgResult<Field> {
        self.base().allocate(name, &self.diagnostic_properties()?)
    }
}
