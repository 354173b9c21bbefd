// apps/pg_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 显示计算网格、精度映射与可用后端。

use anyhow::{Context, Result};
use clap::Args;
use pg_grid::ComputationalGrid;
use pg_storage::backend::HOST_BACKENDS;
use std::path::PathBuf;
use tracing::info;

use super::load_config;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 只显示可用后端
    #[arg(long)]
    pub backends: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== PhysGrid 信息 ===");

    if args.backends {
        print_backends();
        return Ok(());
    }

    let config = load_config(args.config.as_deref())?;
    let cg = ComputationalGrid::new(config.domain.clone()).context("无法构建计算网格")?;

    println!("=== 计算网格 ===");
    println!("{}", cg);
    println!();

    println!("=== 后端 ===");
    println!("后端: {}", config.backend.backend);
    println!("精度: {}", config.backend.precision);
    for (dtype, scalar) in config.backend.precision.dtype_map() {
        println!("  {:<6} -> {}", dtype.name(), scalar);
    }
    println!();

    print_backends();
    Ok(())
}

fn print_backends() {
    println!("=== 可用后端 ===");
    for name in HOST_BACKENDS {
        println!("  - {}", name);
    }
}
