// apps/pg_cli/src/commands/run.rs

//! 运行命令
//!
//! 在计算网格上分配一个三维场，从 JSON 数据集读取或用常数平铺赋值，
//! 然后用临时缓冲池演示缓冲区复用。

use anyhow::{bail, Context, Result};
use clap::Args;
use ndarray::{ArrayD, IxDyn};
use pg_foundation::{DType, Precision, ScalarType};
use pg_framework::{ComputationalGridComponent, FieldReader, MemorySource, SourceLayout};
use pg_grid::{i, j, k, ComputationalGrid, Dim, DimSymbol};
use pg_storage::{allocate_field, assign, Buffer, Field, TemporaryStoragePool};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use super::load_config;

/// 运行参数
#[derive(Args)]
pub struct RunArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// JSON 数据文件，格式为 {"名称": {"shape": [...], "data": [...]}}
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// 数据集名称
    #[arg(long, default_value = "t")]
    pub dataset: String,

    /// 数据集各维对应的网格维度，逗号分隔，例如 "K" 或 "J,I,K"
    #[arg(long, default_value = "K")]
    pub source_dims: String,

    /// 未提供数据文件时平铺的常数
    #[arg(long, default_value = "1.0")]
    pub value: f64,

    /// 使用 f32 精度
    #[arg(long)]
    pub f32: bool,

    /// 临时缓冲区借用轮数
    #[arg(long, default_value = "3")]
    pub rounds: usize,
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== PhysGrid 运行 ===");

    let mut config = load_config(args.config.as_deref())?;
    if args.f32 {
        config.backend.precision = Precision::F32;
    }
    info!("后端: {}, 精度: {}", config.backend.backend, config.backend.precision);

    let cg = Arc::new(ComputationalGrid::new(config.domain.clone()).context("无法构建计算网格")?);
    let component = ComputationalGridComponent::new(cg.clone(), config.backend.clone())
        .context("无法创建网格组件")?;

    let start = Instant::now();
    let field = match &args.data {
        Some(path) => read_field(&args, path, &cg, &component)?,
        None => constant_field(&args, &component)?,
    };
    info!("场: {}", field);
    print_summary(&field)?;

    let pool = TemporaryStoragePool::new();
    let session = pool.session();
    for round in 0..args.rounds {
        let guard = component
            .temporaries(
                session.pool(),
                &[(&[i(), j(), k()], DType::Float), (&[i(), j()], DType::Int)],
            )
            .context("无法获取临时缓冲区")?;
        info!(
            "第 {} 轮: {} 个临时缓冲区, 累计分配 {}",
            round + 1,
            guard.len(),
            session.pool().allocation_count()
        );
    }
    info!("缓冲池缓存 {} 个缓冲区", session.pool().cached_count());
    drop(session);

    info!("=== 运行完成 ({:.3} ms) ===", start.elapsed().as_secs_f64() * 1000.0);
    Ok(())
}

fn constant_field(args: &RunArgs, component: &ComputationalGridComponent) -> Result<Field> {
    let grid = component.computational_grid().grid(&[i(), j(), k()])?;
    let mut field = allocate_field(
        component.backend(),
        grid,
        &[],
        "1",
        component.scalar_type(DType::Float),
    )?;
    let scalar = Buffer::from(ArrayD::from_elem(IxDyn(&[1, 1, 1]), args.value));
    assign(&mut field, &scalar).context("平铺赋值失败")?;
    Ok(field)
}

fn read_field(
    args: &RunArgs,
    path: &Path,
    cg: &Arc<ComputationalGrid>,
    component: &ComputationalGridComponent,
) -> Result<Field> {
    let source = MemorySource::from_file(path)
        .with_context(|| format!("无法读取数据文件 {}", path.display()))?;
    info!("数据文件包含 {} 个数据集", source.len());

    let source_dims = parse_dims(&args.source_dims)?;
    let model_dims = [i(), j(), k()];
    let dims_map: Vec<Dim> = model_dims
        .iter()
        .map(|&d| {
            if source_dims.iter().any(|s| s.axis() == d.axis()) {
                Dim::from(d)
            } else {
                Dim::Expanded
            }
        })
        .collect();
    let layout = SourceLayout::new(
        args.dataset.clone(),
        source_dims.iter().map(|&d| Dim::from(d)),
        dims_map,
    );

    let reader = FieldReader::new(
        source,
        cg.clone(),
        component.backend_handle(),
        component.config().clone(),
    );
    let field = reader
        .get_field(&model_dims, "1", &[], DType::Float, &layout)
        .with_context(|| format!("无法读取数据集 {}", args.dataset))?;
    Ok(field)
}

fn parse_dims(list: &str) -> Result<Vec<DimSymbol>> {
    list.split(',')
        .map(|name| match name.trim().to_uppercase().as_str() {
            "I" => Ok(i()),
            "J" => Ok(j()),
            "K" => Ok(k()),
            other => bail!("未知维度 {}", other),
        })
        .collect()
}

fn print_summary(field: &Field) -> Result<()> {
    let values = field.cast(ScalarType::F64);
    let view = values.view::<f64>()?;
    let n = view.len().max(1) as f64;
    let min = view.iter().copied().fold(f64::INFINITY, f64::min);
    let max = view.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = view.sum() / n;
    println!("维度: {:?}", field.dims());
    println!("存储形状: {:?}", field.buffer().shape());
    println!("逻辑形状: {:?}", field.attrs().view_shape);
    println!("min={:.6} max={:.6} mean={:.6}", min, max, mean);
    Ok(())
}
