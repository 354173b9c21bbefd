// crates/pg_storage/src/allocator.rs

//! 场分配与赋值
//!
//! 缓冲区形状 = 网格存储形状 + 数据维度大小。赋值只写入逻辑区域，
//! 源数组比逻辑区域小时沿各轴平铺后截断。

use ndarray::{ArrayViewD, ArrayViewMutD};
use pg_foundation::{ensure, PgError, PgResult, ScalarType};
use pg_grid::{DataDim, Grid};
use smallvec::SmallVec;

use crate::backend::StorageBackend;
use crate::buffer::Buffer;
use crate::element::Element;
use crate::field::{Field, FieldAttrs};

/// 分配零初始化缓冲区
pub fn allocate_buffer(
    backend: &dyn StorageBackend,
    grid: &Grid,
    data_dims: &[DataDim],
    scalar: ScalarType,
) -> Buffer {
    let shape: Vec<usize> = grid
        .storage_shape()
        .iter()
        .copied()
        .chain(data_dims.iter().map(|d| d.size()))
        .collect();
    log::debug!("{} 分配 {} 缓冲区 shape={:?}", backend.name(), scalar, shape);
    backend.zeros(scalar, &shape)
}

/// 把已有缓冲区包装为场
///
/// 缓冲区在网格维度之后的秩必须等于数据维度个数，且每个轴都要容纳逻辑区域。
pub fn field_from_buffer(
    buffer: Buffer,
    grid: &Grid,
    units: &str,
    data_dims: &[DataDim],
) -> PgResult<Field> {
    let trailing = buffer.ndim().saturating_sub(grid.ndim());
    ensure!(
        buffer.ndim() >= grid.ndim() && trailing == data_dims.len(),
        PgError::rank_mismatch("buffer", grid.ndim() + data_dims.len(), buffer.ndim())
    );

    let view_slice: Vec<_> = grid
        .storage_view_slice()
        .iter()
        .cloned()
        .chain(data_dims.iter().map(|d| 0..d.size()))
        .collect();
    for (axis, (range, &len)) in view_slice.iter().zip(buffer.shape()).enumerate() {
        ensure!(
            range.end <= len,
            PgError::invalid_config(
                format!("buffer.shape[{}]", axis),
                len.to_string(),
                format!("不足以容纳逻辑区域 {:?}", range)
            )
        );
    }

    let dims = grid
        .dim_names()
        .iter()
        .copied()
        .chain(data_dims.iter().map(|d| d.label()))
        .collect();
    let coords = grid
        .coords()
        .iter()
        .cloned()
        .chain(data_dims.iter().map(|d| d.coords()))
        .collect();
    let attrs = FieldAttrs {
        units: units.to_string(),
        view_shape: grid
            .shape()
            .iter()
            .copied()
            .chain(data_dims.iter().map(|d| d.size()))
            .collect(),
        view_slice,
        origin: grid
            .storage_origin()
            .iter()
            .copied()
            .chain(data_dims.iter().map(|_| 0))
            .collect(),
    };

    Ok(Field {
        buffer,
        dims,
        coords,
        attrs,
    })
}

/// 分配零初始化的场
pub fn allocate_field(
    backend: &dyn StorageBackend,
    grid: &Grid,
    data_dims: &[DataDim],
    units: &str,
    scalar: ScalarType,
) -> PgResult<Field> {
    let buffer = allocate_buffer(backend, grid, data_dims, scalar);
    field_from_buffer(buffer, grid, units, data_dims)
}

/// 把源数组写入场的逻辑区域
///
/// 源与场的秩必须相同。每个轴上源数组被平铺 `(view - 1) / src + 1` 次，
/// 截断到逻辑形状后写入；源的标量类型按 `as` 转换为场的类型。
pub fn assign(field: &mut Field, source: &Buffer) -> PgResult<()> {
    let view_shape = field.attrs().view_shape.clone();
    ensure!(
        source.ndim() == view_shape.len(),
        PgError::rank_mismatch("source", view_shape.len(), source.ndim())
    );
    ensure!(
        view_shape.iter().product::<usize>() == 0 || !source.is_empty(),
        PgError::invalid_config(
            "source.shape",
            format!("{:?}", source.shape()),
            "源数组为空，无法平铺"
        )
    );

    let source = source.clone().cast(field.scalar_type());
    match &source {
        Buffer::Bool(_) => tile_into::<bool>(field.view_mut()?, source.view()?),
        Buffer::I32(_) => tile_into::<i32>(field.view_mut()?, source.view()?),
        Buffer::I64(_) => tile_into::<i64>(field.view_mut()?, source.view()?),
        Buffer::F32(_) => tile_into::<f32>(field.view_mut()?, source.view()?),
        Buffer::F64(_) => tile_into::<f64>(field.view_mut()?, source.view()?),
    }
    Ok(())
}

/// 平铺并截断：目标位置 `idx` 取源位置 `idx % src_shape`
fn tile_into<T: Element>(mut dst: ArrayViewMutD<'_, T>, src: ArrayViewD<'_, T>) {
    let src_shape = src.shape().to_vec();
    for (idx, value) in dst.indexed_iter_mut() {
        let src_idx: SmallVec<[usize; 6]> = (0..src_shape.len())
            .map(|axis| idx[axis] % src_shape[axis])
            .collect();
        *value = src[src_idx.as_slice()];
    }
}
