// crates/pg_grid/src/dimension.rs

//! 维度符号
//!
//! 维度符号是一个轴的抽象描述：名称、所在空间轴、交错偏移和遍历方向。
//! 例如 `K` 表示垂直方向的质量层，`K - 0.5` 表示半层（层界面）。
//!
//! 符号经过驻留：相同的 (名称, 轴, 偏移, 方向) 只对应一个实例，
//! [`DimSymbol`] 只是指向该实例的 4 字节句柄。因此
//!
//! - 句柄相等 ⟺ 四元组相等（按值相等与按身份相等一致）
//! - 句柄可直接作为哈希表的键，网格表和缓冲池都依赖这一点
//!
//! # 示例
//!
//! ```
//! use pg_grid::dimension::{k, Axis, DimSymbol, Direction};
//!
//! let half = k().shift(-0.5).unwrap();
//! assert_eq!(half.to_string(), "K - 0.5");
//! assert_eq!(half, DimSymbol::make("K", Axis::Z, -0.5, Direction::Forward).unwrap());
//! assert_eq!(half.shift(0.5).unwrap(), k());
//! assert!(half.shift(-0.5).is_err());
//! ```

use pg_config::{AxisExtent, DomainConfig};
use pg_foundation::{require, GlobalInterner, PgError, PgResult};
use std::fmt;
use std::ops::Neg;

use crate::concrete::ConcreteDim;

// ============================================================================
// 轴、方向、偏移
// ============================================================================

/// 空间轴
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    /// 第一水平方向
    X = 0,
    /// 第二水平方向
    Y = 1,
    /// 垂直方向
    Z = 2,
}

impl Axis {
    /// 轴编号
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// 从编号构造
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Axis::X),
            1 => Some(Axis::Y),
            2 => Some(Axis::Z),
            _ => None,
        }
    }

    /// 该轴在计算域中的范围
    pub fn extent(self, domain: &DomainConfig) -> PgResult<AxisExtent> {
        let extent = require!(
            domain.extent(self.index()),
            PgError::internal(format!("计算域缺少第 {} 轴", self.index()))
        );
        Ok(extent)
    }
}

/// 遍历方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// +1
    #[default]
    Forward,
    /// -1
    Backward,
}

impl Direction {
    /// 符号 (+1 / -1)
    #[inline]
    pub const fn sign(self) -> isize {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }

    /// 反向
    #[inline]
    pub const fn flip(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }

    /// 从符号构造，只接受 +1 / -1
    pub fn from_sign(sign: i32) -> Option<Self> {
        match sign {
            1 => Some(Direction::Forward),
            -1 => Some(Direction::Backward),
            _ => None,
        }
    }
}

/// 交错偏移，以半步为单位存储，保证哈希与比较是精确的
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Offset(i8);

impl Offset {
    /// -0.5
    pub const MINUS_HALF: Offset = Offset(-1);
    /// 0（单元中心）
    pub const ZERO: Offset = Offset(0);
    /// +0.5
    pub const PLUS_HALF: Offset = Offset(1);

    /// 从实数构造，只接受 -0.5、0、0.5
    pub fn from_value(value: f64) -> Option<Self> {
        let half_steps = value * 2.0;
        if half_steps == -1.0 {
            Some(Self::MINUS_HALF)
        } else if half_steps == 0.0 {
            Some(Self::ZERO)
        } else if half_steps == 1.0 {
            Some(Self::PLUS_HALF)
        } else {
            None
        }
    }

    /// 实数值
    #[inline]
    pub fn value(self) -> f64 {
        f64::from(self.0) * 0.5
    }

    /// 是否位于半步（交错）位置
    #[inline]
    pub const fn is_staggered(self) -> bool {
        self.0 != 0
    }
}

// ============================================================================
// 维度符号
// ============================================================================

#[derive(Debug, PartialEq, Eq, Hash)]
struct SymbolKey {
    name: String,
    axis: Axis,
    offset: Offset,
    direction: Direction,
}

static SYMBOLS: GlobalInterner<SymbolKey> = GlobalInterner::new();
static LABELS: GlobalInterner<String> = GlobalInterner::new();

/// 驻留维度标签文本
pub(crate) fn intern_label(text: String) -> &'static str {
    LABELS.resolve(LABELS.intern(text))
}

/// 驻留的维度符号句柄
///
/// 相等与哈希都按句柄进行；由于驻留保证了值与句柄一一对应，
/// 这与按 (名称, 轴, 偏移, 方向) 比较完全等价。
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DimSymbol {
    id: u32,
}

impl DimSymbol {
    /// 返回四元组对应的规范实例
    ///
    /// 偏移必须是 -0.5、0 或 0.5 之一。
    pub fn make(name: &str, axis: Axis, offset: f64, direction: Direction) -> PgResult<Self> {
        let offset = require!(Offset::from_value(offset), PgError::invalid_offset(name, offset));
        Ok(Self::intern(name.to_string(), axis, offset, direction))
    }

    /// 单元中心、正向的符号
    pub fn new(name: &str, axis: Axis) -> Self {
        Self::intern(name.to_string(), axis, Offset::ZERO, Direction::Forward)
    }

    fn intern(name: String, axis: Axis, offset: Offset, direction: Direction) -> Self {
        let id = SYMBOLS.intern(SymbolKey {
            name,
            axis,
            offset,
            direction,
        });
        Self { id }
    }

    #[inline]
    fn key(&self) -> &'static SymbolKey {
        SYMBOLS.resolve(self.id)
    }

    /// 驻留表中的句柄值
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// 名称
    pub fn name(&self) -> &'static str {
        &self.key().name
    }

    /// 维度标签，与 `Display` 一致，例如 `K - 0.5`
    ///
    /// 网格和场用它标记各轴，因此半层与质量层的标签不同。
    pub fn label(&self) -> &'static str {
        intern_label(self.to_string())
    }

    /// 空间轴
    pub fn axis(&self) -> Axis {
        self.key().axis
    }

    /// 交错偏移
    pub fn offset(&self) -> Offset {
        self.key().offset
    }

    /// 遍历方向
    pub fn direction(&self) -> Direction {
        self.key().direction
    }

    /// 是否位于半步位置
    pub fn is_staggered(&self) -> bool {
        self.offset().is_staggered()
    }

    /// 平移偏移，方向保持不变
    ///
    /// 结果偏移必须仍是合法半步值，否则返回 [`PgError::InvalidOffset`]。
    pub fn shift(&self, delta: f64) -> PgResult<Self> {
        let key = self.key();
        Self::make(&key.name, key.axis, key.offset.value() + delta, key.direction)
    }

    /// 翻转方向
    pub fn negate(&self) -> Self {
        let key = self.key();
        Self::intern(key.name.clone(), key.axis, key.offset, key.direction.flip())
    }

    /// 在计算域上具体化
    pub fn concretize(&self, domain: &DomainConfig) -> PgResult<ConcreteDim> {
        let extent = self.axis().extent(domain)?;
        Ok(ConcreteDim::new(*self, extent.bounds, extent.size))
    }
}

impl Neg for DimSymbol {
    type Output = DimSymbol;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

impl fmt::Display for DimSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = self.key();
        let offset = key.offset.value();
        if offset > 0.0 {
            write!(f, "{} + {}", key.name, offset)
        } else if offset < 0.0 {
            write!(f, "{} - {}", key.name, -offset)
        } else {
            f.write_str(&key.name)
        }
    }
}

impl fmt::Debug for DimSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction() {
            Direction::Forward => write!(f, "DimSymbol({})", self),
            Direction::Backward => write!(f, "DimSymbol(-({}))", self),
        }
    }
}

/// 第一水平方向，质量点
pub fn i() -> DimSymbol {
    DimSymbol::new("I", Axis::X)
}

/// 水平方向压缩成一列（列数沿 x 轴排布）
pub fn ij() -> DimSymbol {
    DimSymbol::new("IJ", Axis::X)
}

/// 第二水平方向，质量点
pub fn j() -> DimSymbol {
    DimSymbol::new("J", Axis::Y)
}

/// 垂直方向，质量层
pub fn k() -> DimSymbol {
    DimSymbol::new("K", Axis::Z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning_identity() {
        let a = DimSymbol::make("K", Axis::Z, 0.5, Direction::Forward).unwrap();
        let b = DimSymbol::make("K", Axis::Z, 0.5, Direction::Forward).unwrap();
        assert_eq!(a.id(), b.id());
        assert!(std::ptr::eq(a.name(), b.name()));
        assert_eq!(k(), DimSymbol::new("K", Axis::Z));
    }

    #[test]
    fn test_distinct_tuples_distinct_symbols() {
        assert_ne!(i(), ij());
        assert_ne!(i(), DimSymbol::new("I", Axis::Y));
        assert_ne!(k(), -k());
        assert_ne!(k(), k().shift(0.5).unwrap());
    }

    #[test]
    fn test_shift_composition() {
        let x = k();
        let two_steps = x.shift(0.5).unwrap().shift(-1.0).unwrap();
        assert_eq!(two_steps, x.shift(-0.5).unwrap());
        assert_eq!(x.shift(-0.5).unwrap().shift(0.5).unwrap(), x);
    }

    #[test]
    fn test_shift_keeps_direction() {
        let back = -k();
        let shifted = back.shift(-0.5).unwrap();
        assert_eq!(shifted.direction(), Direction::Backward);
        assert_eq!(shifted.offset(), Offset::MINUS_HALF);
    }

    #[test]
    fn test_invalid_offsets() {
        assert!(matches!(k().shift(1.0), Err(PgError::InvalidOffset { .. })));
        assert!(k().shift(0.25).is_err());
        assert!(DimSymbol::make("K", Axis::Z, 1.5, Direction::Forward).is_err());
    }

    #[test]
    fn test_negation_involutive() {
        let x = j().shift(0.5).unwrap();
        assert_eq!(-(-x), x);
        assert_eq!(x.negate().negate().id(), x.id());
        assert_eq!((-x).offset(), x.offset());
        assert_eq!((-x).direction(), Direction::Backward);
    }

    #[test]
    fn test_display() {
        assert_eq!(k().to_string(), "K");
        assert_eq!(k().shift(0.5).unwrap().to_string(), "K + 0.5");
        assert_eq!(k().shift(-0.5).unwrap().to_string(), "K - 0.5");
        assert_eq!((-i()).to_string(), "I");
        assert_eq!(format!("{:?}", -i()), "DimSymbol(-(I))");
    }

    #[test]
    fn test_labels_distinguish_offsets() {
        let half = k().shift(-0.5).unwrap();
        assert_eq!(k().label(), "K");
        assert_eq!(half.label(), "K - 0.5");
        assert_ne!(k().label(), half.label());
        assert!(std::ptr::eq(half.label(), half.label()));
    }

    #[test]
    fn test_symbols_usable_as_keys() {
        let mut map = std::collections::HashMap::new();
        map.insert(k().shift(-0.5).unwrap(), "half levels");
        let lookup = DimSymbol::make("K", Axis::Z, -0.5, Direction::Forward).unwrap();
        assert_eq!(map.get(&lookup), Some(&"half levels"));
    }

    #[test]
    fn test_offset_values() {
        assert_eq!(Offset::from_value(-0.5), Some(Offset::MINUS_HALF));
        assert_eq!(Offset::from_value(0.0), Some(Offset::ZERO));
        assert_eq!(Offset::from_value(-0.0), Some(Offset::ZERO));
        assert_eq!(Offset::from_value(0.75), None);
        assert_eq!(Offset::PLUS_HALF.value(), 0.5);
        assert!(!Offset::ZERO.is_staggered());
    }

    #[test]
    fn test_axis_and_direction() {
        assert_eq!(Axis::from_index(2), Some(Axis::Z));
        assert_eq!(Axis::from_index(3), None);
        assert_eq!(Direction::from_sign(-1), Some(Direction::Backward));
        assert_eq!(Direction::from_sign(0), None);
        assert_eq!(Direction::Backward.sign(), -1);
    }
}
