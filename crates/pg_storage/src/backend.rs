// crates/pg_storage/src/backend.rs

//! 存储后端
//!
//! 后端负责分配缓冲区。同一后端分配的缓冲区才能互相复用，
//! 临时缓冲池据此按后端名称区分来源。

use pg_config::BackendConfig;
use pg_foundation::{PgError, PgResult, ScalarType};
use std::fmt::Debug;
use std::sync::Arc;

use crate::buffer::Buffer;

/// 内置的主机内存后端名称
pub const HOST_BACKENDS: [&str; 5] = ["cpu", "debug", "numpy", "gt:cpu_ifirst", "gt:cpu_kfirst"];

/// 存储后端
pub trait StorageBackend: Send + Sync + Debug {
    /// 后端名称
    fn name(&self) -> &str;

    /// 分配零初始化缓冲区
    fn zeros(&self, scalar: ScalarType, shape: &[usize]) -> Buffer;
}

/// 主机内存后端
///
/// 以不同名称注册，对应使用主机内存的各种模板后端。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuBackend {
    name: String,
}

impl CpuBackend {
    /// 默认的 `cpu` 后端
    pub fn new() -> Self {
        Self::named("cpu")
    }

    /// 以指定名称创建
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for CpuBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn zeros(&self, scalar: ScalarType, shape: &[usize]) -> Buffer {
        Buffer::zeros(scalar, shape)
    }
}

/// 根据配置创建后端
pub fn backend_from_config(config: &BackendConfig) -> PgResult<Arc<dyn StorageBackend>> {
    let name = config.backend.as_str();
    if HOST_BACKENDS.contains(&name) {
        log::debug!("使用主机内存后端 {}", name);
        Ok(Arc::new(CpuBackend::named(name)))
    } else {
        Err(PgError::unknown_backend(
            name,
            HOST_BACKENDS.iter().map(|s| s.to_string()).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_config() {
        let backend = backend_from_config(&BackendConfig::default()).unwrap();
        assert_eq!(backend.name(), "cpu");
        let buffer = backend.zeros(ScalarType::F32, &[2, 2]);
        assert_eq!(buffer.scalar_type(), ScalarType::F32);

        let numpy = backend_from_config(&BackendConfig::with_backend("numpy")).unwrap();
        assert_eq!(numpy.name(), "numpy");
    }

    #[test]
    fn test_unknown_backend() {
        let err = backend_from_config(&BackendConfig::with_backend("gpu")).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("gpu"));
    }
}
