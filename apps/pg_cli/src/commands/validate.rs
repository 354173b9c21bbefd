// apps/pg_cli/src/commands/validate.rs

//! 配置验证命令
//!
//! 加载运行配置，逐个网格检查存储布局，并确认后端可用。

use anyhow::{bail, Result};
use clap::Args;
use pg_config::RunConfig;
use pg_grid::ComputationalGrid;
use pg_storage::backend_from_config;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: PathBuf,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 验证结果
#[derive(Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn passed(&self, strict: bool) -> bool {
        self.errors.is_empty() && (!strict || self.warnings.is_empty())
    }
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== PhysGrid 配置验证 ===");
    println!("检查配置文件: {}", args.config.display());

    let mut result = ValidationResult::default();
    match RunConfig::from_file(&args.config) {
        Ok(config) => check_config(&config, &mut result),
        Err(e) => result.add_error(e.to_string()),
    }

    for msg in &result.warnings {
        warn!("{}", msg);
        println!("  ! {}", msg);
    }
    for msg in &result.errors {
        error!("{}", msg);
        println!("  ✗ {}", msg);
    }

    if !result.passed(args.strict) {
        bail!(
            "验证失败: {} 个错误, {} 个警告",
            result.errors.len(),
            result.warnings.len()
        );
    }
    println!("  ✓ 配置有效");
    Ok(())
}

fn check_config(config: &RunConfig, result: &mut ValidationResult) {
    if let Err(e) = backend_from_config(&config.backend) {
        result.add_error(e.to_string());
    }

    let cg = match ComputationalGrid::new(config.domain.clone()) {
        Ok(cg) => cg,
        Err(e) => {
            result.add_error(e.to_string());
            return;
        }
    };
    for grid in cg.grids() {
        println!(
            "  {} storage_shape={:?} origin={:?}",
            grid.abstract_dims(),
            grid.storage_shape(),
            grid.storage_origin()
        );
    }

    if config.domain.nz == 1 {
        result.add_warning("nz = 1：K - 1/2 网格只有两层界面");
    }
    if config.backend.verbose && !config.backend.accepts_verbose() {
        result.add_warning(format!("后端 {} 忽略 verbose 选项", config.backend.backend));
    }
}
