// apps/pg_cli/src/commands/mod.rs

//! 子命令

pub mod info;
pub mod run;
pub mod validate;

use anyhow::{Context, Result};
use pg_config::RunConfig;
use std::path::Path;

/// 读取运行配置；未指定时使用默认配置
pub(crate) fn load_config(path: Option<&Path>) -> Result<RunConfig> {
    match path {
        Some(path) => RunConfig::from_file(path)
            .with_context(|| format!("无法加载配置文件 {}", path.display())),
        None => Ok(RunConfig::default()),
    }
}
