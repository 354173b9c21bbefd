// apps/pg_cli/src/main.rs

//! PhysGrid 命令行界面
//!
//! 围绕一份 JSON 运行配置（计算域 + 后端）工作：
//!
//! - `info`: 打印五种网格拓扑的形状、间距与填充，以及精度对应的标量类型
//! - `validate`: 加载配置，逐个网格检查存储布局并确认后端可用
//! - `run`: 在 (I, J, K) 网格上分配场，平铺常数或读取数据集，再演示临时缓冲池复用
//!
//! 各库通过 `log` 输出的记录也由这里安装的 tracing 订阅器接管。

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// 日志级别
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// 交错网格场存储工具
#[derive(Parser)]
#[command(name = "pg_cli", version, about = "Inspect PhysGrid grids, validate run configs and exercise field storage")]
struct Cli {
    /// 日志级别；`debug` 显示网格构建与缓冲区分配，`trace` 显示缓冲区复用
    #[arg(short, long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 打印计算网格、精度映射与可用后端
    Info(commands::info::InfoArgs),
    /// 检查运行配置能否构建网格与后端
    Validate(commands::validate::ValidateArgs),
    /// 分配 (I, J, K) 场并赋值，然后借用临时缓冲区
    Run(commands::run::RunArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    FmtSubscriber::builder()
        .with_max_level(Level::from(cli.log_level))
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    match cli.command {
        Commands::Info(args) => commands::info::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
        Commands::Run(args) => commands::run::execute(args),
    }
}
