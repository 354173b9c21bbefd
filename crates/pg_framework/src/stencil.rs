// crates/pg_framework/src/stencil.rs

//! 模板注册与编译
//!
//! 模板定义按名称注册，编译时由 [`StencilCompiler`] 把定义与一份
//! [`CompileRequest`]（数据类型映射、外部常量、后端选项）变成可执行的
//! [`StencilKernel`]。可复用的逐点函数另有一张表，规则相同：同名重复注册报错。

use parking_lot::RwLock;
use pg_config::BackendConfig;
use pg_foundation::{DType, PgError, PgResult, ScalarType};
use pg_storage::Buffer;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// 已编译的模板
pub trait StencilKernel: Send + Sync {
    /// 模板名
    fn name(&self) -> &str;

    /// 在 `origin` 起、大小为 `domain` 的区域上执行
    fn run(&self, args: &mut [&mut Buffer], origin: &[usize], domain: &[usize]) -> PgResult<()>;
}

/// 模板定义：根据编译请求生成内核
pub type StencilDefinition =
    Arc<dyn Fn(&CompileRequest) -> PgResult<Box<dyn StencilKernel>> + Send + Sync>;

/// 逐点函数
pub type StencilFunction = Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// 编译请求
#[derive(Debug, Clone, PartialEq)]
pub struct CompileRequest {
    /// 模板名
    pub name: String,
    /// 后端名
    pub backend: String,
    /// 逻辑类型 -> 具体标量类型
    pub dtypes: BTreeMap<DType, ScalarType>,
    /// 编译期外部常量
    pub externals: BTreeMap<String, Value>,
    /// 后端选项
    pub options: BTreeMap<String, Value>,
    /// 强制重新编译
    pub rebuild: bool,
    /// 收集编译信息
    pub build_info: bool,
}

impl CompileRequest {
    /// 由后端配置构造
    ///
    /// 后端选项复制自 `backend_opts`；解释型后端之外注入 `verbose`。
    pub fn new(name: &str, config: &BackendConfig, externals: BTreeMap<String, Value>) -> Self {
        let mut options = config.backend_opts.clone();
        if config.accepts_verbose() {
            options.insert("verbose".to_string(), Value::Bool(config.verbose));
        }
        Self {
            name: name.to_string(),
            backend: config.backend.clone(),
            dtypes: config.precision.dtype_map().into_iter().collect(),
            externals,
            options,
            rebuild: config.rebuild,
            build_info: config.build_info,
        }
    }

    /// 逻辑类型对应的标量类型
    pub fn scalar_type(&self, dtype: DType) -> Option<ScalarType> {
        self.dtypes.get(&dtype).copied()
    }

    /// 读取外部常量
    pub fn external(&self, key: &str) -> Option<&Value> {
        self.externals.get(key)
    }
}

/// 模板编译器
pub trait StencilCompiler: Send + Sync {
    /// 编译一个模板定义
    fn compile(
        &self,
        definition: &StencilDefinition,
        request: &CompileRequest,
    ) -> PgResult<Box<dyn StencilKernel>>;
}

/// 主机编译器：直接调用定义生成内核
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeCompiler;

impl StencilCompiler for NativeCompiler {
    fn compile(
        &self,
        definition: &StencilDefinition,
        request: &CompileRequest,
    ) -> PgResult<Box<dyn StencilKernel>> {
        log::debug!(
            "编译模板 {} (backend={}, rebuild={})",
            request.name,
            request.backend,
            request.rebuild
        );
        definition(request)
    }
}

/// 模板与逐点函数注册表
#[derive(Default)]
pub struct StencilRegistry {
    stencils: RwLock<BTreeMap<String, StencilDefinition>>,
    functions: RwLock<BTreeMap<String, StencilFunction>>,
}

impl StencilRegistry {
    /// 空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册模板定义
    pub fn register_stencil(&self, name: &str, definition: StencilDefinition) -> PgResult<()> {
        let mut stencils = self.stencils.write();
        if stencils.contains_key(name) {
            return Err(PgError::duplicate("模板", name));
        }
        stencils.insert(name.to_string(), definition);
        log::trace!("注册模板 {}", name);
        Ok(())
    }

    /// 注册逐点函数
    pub fn register_function(&self, name: &str, function: StencilFunction) -> PgResult<()> {
        let mut functions = self.functions.write();
        if functions.contains_key(name) {
            return Err(PgError::duplicate("模板函数", name));
        }
        functions.insert(name.to_string(), function);
        log::trace!("注册模板函数 {}", name);
        Ok(())
    }

    /// 查找模板定义
    pub fn stencil(&self, name: &str) -> PgResult<StencilDefinition> {
        self.stencils
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| PgError::stencil_not_found(name))
    }

    /// 查找逐点函数
    pub fn function(&self, name: &str) -> PgResult<StencilFunction> {
        self.functions
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| PgError::stencil_not_found(name))
    }

    /// 已注册的模板名
    pub fn stencil_names(&self) -> Vec<String> {
        self.stencils.read().keys().cloned().collect()
    }

    /// 按名称编译模板
    pub fn compile(
        &self,
        compiler: &dyn StencilCompiler,
        name: &str,
        config: &BackendConfig,
        externals: BTreeMap<String, Value>,
    ) -> PgResult<Box<dyn StencilKernel>> {
        let definition = self.stencil(name)?;
        let request = CompileRequest::new(name, config, externals);
        compiler.compile(&definition, &request)
    }
}

impl fmt::Debug for StencilRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StencilRegistry")
            .field("stencils", &self.stencils.read().keys().collect::<Vec<_>>())
            .field("functions", &self.functions.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

/// 进程级注册表
pub fn global() -> &'static StencilRegistry {
    static REGISTRY: OnceLock<StencilRegistry> = OnceLock::new();
    REGISTRY.get_or_init(StencilRegistry::new)
}
