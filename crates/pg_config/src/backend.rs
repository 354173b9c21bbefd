// crates/pg_config/src/backend.rs

//! BackendConfig - 存储与模板后端配置

use pg_foundation::{DType, Precision, ScalarType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ConfigError;

/// 不接受 `verbose` 选项的后端（解释型/调试后端）
pub const QUIET_BACKENDS: [&str; 3] = ["debug", "numpy", "cpu"];

/// 后端配置
///
/// 缓冲区由后端分配，因此属于同一个后端；切换后端时必须清空临时缓冲池。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// 后端名称
    #[serde(default = "default_backend")]
    pub backend: String,

    /// 计算精度，决定 float/int 的具体宽度
    #[serde(default)]
    pub precision: Precision,

    /// 强制重新编译模板
    #[serde(default)]
    pub rebuild: bool,

    /// 编译时输出详细信息
    #[serde(default)]
    pub verbose: bool,

    /// 收集编译信息
    #[serde(default)]
    pub build_info: bool,

    /// 透传给模板编译器的后端选项
    #[serde(default)]
    pub backend_opts: BTreeMap<String, serde_json::Value>,
}

fn default_backend() -> String { "cpu".to_string() }

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            precision: Precision::default(),
            rebuild: false,
            verbose: false,
            build_info: false,
            backend_opts: BTreeMap::new(),
        }
    }
}

impl BackendConfig {
    /// 指定后端名称
    pub fn with_backend(backend: impl Into<String>) -> Self {
        Self { backend: backend.into(), ..Default::default() }
    }

    /// 逻辑类型 -> 具体标量类型
    #[inline]
    pub fn scalar_type(&self, dtype: DType) -> ScalarType {
        self.precision.scalar_type(dtype)
    }

    /// 该后端是否接受 `verbose` 选项
    pub fn accepts_verbose(&self) -> bool {
        !QUIET_BACKENDS.contains(&self.backend.as_str())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.trim().is_empty() {
            return Err(ConfigError::invalid("backend.backend", &self.backend, "后端名称不能为空"));
        }
        if self.backend_opts.contains_key("verbose") {
            log::warn!("backend_opts 中的 verbose 会被 backend.verbose 覆盖");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backend() {
        let config = BackendConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.backend, "cpu");
        assert_eq!(config.scalar_type(DType::Float), ScalarType::F64);
        assert!(!config.accepts_verbose());
    }

    #[test]
    fn test_empty_backend_rejected() {
        let config = BackendConfig::with_backend("  ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_compiled_backend_accepts_verbose() {
        assert!(BackendConfig::with_backend("gt:cpu_ifirst").accepts_verbose());
        assert!(!BackendConfig::with_backend("numpy").accepts_verbose());
    }
}
