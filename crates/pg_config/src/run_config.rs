// crates/pg_config/src/run_config.rs

//! RunConfig - 一次运行的完整配置

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::backend::BackendConfig;
use crate::domain::DomainConfig;
use crate::error::ConfigError;

/// 运行配置（计算域 + 后端）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunConfig {
    /// 计算域
    #[serde(default)]
    pub domain: DomainConfig,

    /// 后端
    #[serde(default)]
    pub backend: BackendConfig,
}

impl RunConfig {
    /// 从 JSON 文件加载并验证
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// 从 JSON 字符串解析并验证
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: RunConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.domain.validate()?;
        self.backend.validate()?;
        Ok(())
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pg_foundation::Precision;

    #[test]
    fn test_default_config() {
        let config = RunConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json() {
        let config = RunConfig::from_json(
            r#"{"domain": {"nx": 1, "ny": 14, "nz": 5}, "backend": {"precision": "f32"}}"#,
        )
        .unwrap();
        assert_eq!(config.domain.ny, 14);
        assert_eq!(config.backend.precision, Precision::F32);
        assert_eq!(config.backend.backend, "cpu");
    }

    #[test]
    fn test_invalid_json_values() {
        assert!(matches!(
            RunConfig::from_json(r#"{"domain": {"nx": 0}}"#),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(RunConfig::from_json("{"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let path = std::env::temp_dir().join(format!("pg_config_{}.json", std::process::id()));
        let mut config = RunConfig::default();
        config.domain.nz = 90;
        config.backend.rebuild = true;
        config.save_to_file(&path).unwrap();

        let loaded = RunConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            RunConfig::from_file("/nonexistent/physgrid.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
