//! Floating-Point Unit (FPU).
//!
//! This module implements the F and D arithmetic of a hart: arithmetic, fused
//! multiply-add, sign injection, compares, classification and conversions.
//!
//! Every operation is computed on the host in double precision together with an
//! error term that carries the sign of `exact - computed`. The final rounding
//! step uses that term to honour all five rounding modes and to raise the
//! inexact, overflow and underflow flags.
//!
//! Operations are organized into submodules:
//! - [`nan_handling`]: NaN boxing/unboxing and canonical NaN propagation.
//! - [`rounding_modes`]: The `frm`/`rm` rounding directions.
//! - [`exception_flags`]: The `fflags` accrued exception set.

/// NaN boxing, unboxing, and canonical NaN propagation.
pub mod nan_handling;

/// Rounding mode definitions.
pub mod rounding_modes;

/// Floating-point exception flag types.
pub mod exception_flags;

use std::num::FpCategory;

use self::exception_flags::FpFlags;
use self::nan_handling::{
    CANONICAL_NAN_F32, CANONICAL_NAN_F64, box_f32, fmax_f64, fmin_f64, is_snan_f32, is_snan_f64,
    unbox_f32,
};
use self::rounding_modes::RoundingMode;

/// Bit mask for the sign bit in a 32-bit IEEE 754 float (bit 31).
const F32_SIGN_BIT: u32 = 0x8000_0000;

/// Bit mask for the sign bit in a 64-bit IEEE 754 float (bit 63).
const F64_SIGN_BIT: u64 = 0x8000_0000_0000_0000;

/// Below this magnitude the error term of a double-precision product or
/// quotient can underflow.
const F64_ERR_LIMIT: f64 = pow2(-968);

/// Exponent of the power of two each operand of a tiny product or quotient is
/// scaled by.
const TINY_SCALE: i32 = 600;

/// `2^exp` for a normal exponent.
const fn pow2(exp: i32) -> f64 {
    f64::from_bits(((exp + 1023) as u64) << 52)
}

/// Operand and result format of an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Precision {
    /// Single precision (F), NaN-boxed in the register file.
    Single,
    /// Double precision (D).
    Double,
}

/// Integer side of an `fcvt`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntFormat {
    /// Signed 32-bit.
    W,
    /// Unsigned 32-bit.
    WU,
    /// Signed 64-bit.
    L,
    /// Unsigned 64-bit.
    LU,
}

/// Operations with floating-point operands and, except for compares, a
/// floating-point result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FpOp {
    /// `a + b`.
    Add,
    /// `a - b`.
    Sub,
    /// `a * b`.
    Mul,
    /// `a / b`.
    Div,
    /// `sqrt(a)`.
    Sqrt,
    /// minimumNumber.
    Min,
    /// maximumNumber.
    Max,
    /// `a * b + c`.
    MAdd,
    /// `a * b - c`.
    MSub,
    /// `-(a * b) + c`.
    NMSub,
    /// `-(a * b) - c`.
    NMAdd,
    /// Magnitude of `a`, sign of `b`.
    SgnJ,
    /// Magnitude of `a`, negated sign of `b`.
    SgnJN,
    /// Magnitude of `a`, sign of `a` XOR sign of `b`.
    SgnJX,
    /// `a == b`, integer result.
    Eq,
    /// `a < b`, integer result.
    Lt,
    /// `a <= b`, integer result.
    Le,
}

/// Floating-Point Unit.
#[derive(Clone, Copy, Debug, Default)]
pub struct Fpu;

impl Fpu {
    /// Executes `op` on register images `a`, `b` and `c` (`c` is only read by the
    /// fused forms).
    ///
    /// # Returns
    ///
    /// The result register image (NaN-boxed for single precision, `0`/`1` for
    /// compares) and the exception flags the operation raises.
    pub fn execute(
        op: FpOp,
        prec: Precision,
        a: u64,
        b: u64,
        c: u64,
        rm: RoundingMode,
    ) -> (u64, FpFlags) {
        let (x, y) = (Operand::unpack(prec, a), Operand::unpack(prec, b));

        match op {
            FpOp::SgnJ | FpOp::SgnJN | FpOp::SgnJX => (sign_inject(op, prec, a, b), FpFlags::NONE),
            FpOp::Eq => {
                let flags = if x.snan || y.snan { FpFlags::NV } else { FpFlags::NONE };
                (u64::from(x.val == y.val), flags)
            }
            FpOp::Lt | FpOp::Le => {
                let flags = if x.val.is_nan() || y.val.is_nan() {
                    FpFlags::NV
                } else {
                    FpFlags::NONE
                };
                let res = if op == FpOp::Lt { x.val < y.val } else { x.val <= y.val };
                (u64::from(res), flags)
            }
            FpOp::Min | FpOp::Max => {
                let flags = if x.snan || y.snan { FpFlags::NV } else { FpFlags::NONE };
                let res = if op == FpOp::Min {
                    fmin_f64(x.val, y.val)
                } else {
                    fmax_f64(x.val, y.val)
                };
                (pack_exact(prec, res), flags)
            }
            _ => arithmetic(op, prec, x, y, Operand::unpack(prec, c), rm),
        }
    }

    /// `fclass`: a one-hot mask of the class of `a`.
    pub fn classify(prec: Precision, a: u64) -> u64 {
        let (category, negative, snan) = match prec {
            Precision::Single => {
                let f = unbox_f32(a);
                (f.classify(), f.is_sign_negative(), is_snan_f32(f))
            }
            Precision::Double => {
                let f = f64::from_bits(a);
                (f.classify(), f.is_sign_negative(), is_snan_f64(f))
            }
        };

        let bit = match (category, negative) {
            (FpCategory::Infinite, true) => 0,
            (FpCategory::Normal, true) => 1,
            (FpCategory::Subnormal, true) => 2,
            (FpCategory::Zero, true) => 3,
            (FpCategory::Zero, false) => 4,
            (FpCategory::Subnormal, false) => 5,
            (FpCategory::Normal, false) => 6,
            (FpCategory::Infinite, false) => 7,
            (FpCategory::Nan, _) if snan => 8,
            (FpCategory::Nan, _) => 9,
        };
        1 << bit
    }

    /// `fcvt.{w,wu,l,lu}.{s,d}`: converts `a` to an integer, saturating out-of-range
    /// inputs and NaN.
    ///
    /// # Returns
    ///
    /// The integer sign-extended to 64 bits (32-bit results, including `wu`, are
    /// sign-extended from bit 31) and the raised flags.
    pub fn to_int(prec: Precision, a: u64, fmt: IntFormat, rm: RoundingMode) -> (u64, FpFlags) {
        let x = Operand::unpack(prec, a).val;

        let (min, max) = match fmt {
            IntFormat::W => (i32::MIN as i64 as u64, i32::MAX as u64),
            IntFormat::WU => (0, u64::MAX),
            IntFormat::L => (i64::MIN as u64, i64::MAX as u64),
            IntFormat::LU => (0, u64::MAX),
        };
        if x.is_nan() {
            return (max, FpFlags::NV);
        }

        let r = rm.round_integral(x);
        let in_range = match fmt {
            IntFormat::W => (-2_147_483_648.0..=2_147_483_647.0).contains(&r),
            IntFormat::WU => r > -1.0 && r <= 4_294_967_295.0,
            IntFormat::L => r >= -9_223_372_036_854_775_808.0 && r < 9_223_372_036_854_775_808.0,
            IntFormat::LU => r > -1.0 && r < 18_446_744_073_709_551_616.0,
        };
        if !in_range {
            return (if x.is_sign_negative() { min } else { max }, FpFlags::NV);
        }

        let val = match fmt {
            IntFormat::W => r as i32 as i64 as u64,
            IntFormat::WU => r as u32 as i32 as i64 as u64,
            IntFormat::L => r as i64 as u64,
            IntFormat::LU => r as u64,
        };
        (val, if r == x { FpFlags::NONE } else { FpFlags::NX })
    }

    /// `fcvt.{s,d}.{w,wu,l,lu}`: converts the integer in `val` to `prec`.
    pub fn from_int(prec: Precision, val: u64, fmt: IntFormat, rm: RoundingMode) -> (u64, FpFlags) {
        let v: i128 = match fmt {
            IntFormat::W => i128::from(val as i32),
            IntFormat::WU => i128::from(val as u32),
            IntFormat::L => i128::from(val as i64),
            IntFormat::LU => i128::from(val),
        };
        let value = v as f64;
        let err = (v - value as i128) as f64;
        round(prec, Exact { value, err }, rm)
    }

    /// `fcvt.s.d` / `fcvt.d.s`: converts `a` to the precision `to`.
    pub fn convert(to: Precision, a: u64, rm: RoundingMode) -> (u64, FpFlags) {
        let from = match to {
            Precision::Single => Precision::Double,
            Precision::Double => Precision::Single,
        };
        let x = Operand::unpack(from, a);
        if x.val.is_nan() {
            let flags = if x.snan { FpFlags::NV } else { FpFlags::NONE };
            return (canonical_nan(to), flags);
        }
        if x.val.is_infinite() {
            return (pack_exact(to, x.val), FpFlags::NONE);
        }
        round(to, Exact { value: x.val, err: 0.0 }, rm)
    }
}

/// An operand widened to `f64`, with its signaling state taken before widening.
#[derive(Clone, Copy, Debug)]
struct Operand {
    val: f64,
    snan: bool,
}

impl Operand {
    fn unpack(prec: Precision, bits: u64) -> Self {
        match prec {
            Precision::Single => {
                let f = unbox_f32(bits);
                Self {
                    val: f64::from(f),
                    snan: is_snan_f32(f),
                }
            }
            Precision::Double => {
                let f = f64::from_bits(bits);
                Self {
                    val: f,
                    snan: is_snan_f64(f),
                }
            }
        }
    }
}

/// A result as the nearest `f64` plus `err`, whose sign is the sign of
/// `exact - value` (zero when `value` is exact).
#[derive(Clone, Copy, Debug)]
struct Exact {
    value: f64,
    err: f64,
}

/// `a + b` with the rounding error of the sum.
fn two_sum(a: f64, b: f64) -> Exact {
    let value = a + b;
    let bb = value - a;
    let err = (a - (value - bb)) + (b - bb);
    Exact { value, err }
}

fn canonical_nan(prec: Precision) -> u64 {
    match prec {
        Precision::Single => box_f32(f32::from_bits(CANONICAL_NAN_F32)),
        Precision::Double => CANONICAL_NAN_F64,
    }
}

/// Packs a value that is exactly representable in `prec` (an infinity, a zero, or
/// an operand passed through).
fn pack_exact(prec: Precision, val: f64) -> u64 {
    if val.is_nan() {
        return canonical_nan(prec);
    }
    match prec {
        Precision::Single => box_f32(val as f32),
        Precision::Double => val.to_bits(),
    }
}

fn sign_inject(op: FpOp, prec: Precision, a: u64, b: u64) -> u64 {
    let inject = |mag: u64, sign: u64, bit: u64| match op {
        FpOp::SgnJ => (mag & !bit) | (sign & bit),
        FpOp::SgnJN => (mag & !bit) | (!sign & bit),
        _ => mag ^ (sign & bit),
    };
    match prec {
        Precision::Single => {
            let (fa, fb) = (unbox_f32(a).to_bits(), unbox_f32(b).to_bits());
            let bits = inject(u64::from(fa), u64::from(fb), u64::from(F32_SIGN_BIT));
            box_f32(f32::from_bits(bits as u32))
        }
        Precision::Double => inject(a, b, F64_SIGN_BIT),
    }
}

/// Add, subtract, multiply, divide, square root and the fused forms.
fn arithmetic(
    op: FpOp,
    prec: Precision,
    x: Operand,
    y: Operand,
    z: Operand,
    rm: RoundingMode,
) -> (u64, FpFlags) {
    let fused = matches!(op, FpOp::MAdd | FpOp::MSub | FpOp::NMSub | FpOp::NMAdd);
    let operands: &[Operand] = match op {
        FpOp::Sqrt => &[x],
        _ if fused => &[x, y, z],
        _ => &[x, y],
    };

    // Negating before the operation is exact and covers every fused variant.
    let (a, b, c) = match op {
        FpOp::MSub => (x.val, y.val, -z.val),
        FpOp::NMSub => (-x.val, y.val, z.val),
        FpOp::NMAdd => (-x.val, y.val, -z.val),
        FpOp::Sub => (x.val, -y.val, 0.0),
        _ => (x.val, y.val, z.val),
    };

    let zero_times_inf =
        fused && ((a == 0.0 && b.is_infinite()) || (a.is_infinite() && b == 0.0));
    if operands.iter().any(|o| o.val.is_nan()) {
        let flags = if operands.iter().any(|o| o.snan) || zero_times_inf {
            FpFlags::NV
        } else {
            FpFlags::NONE
        };
        return (canonical_nan(prec), flags);
    }

    let host = match op {
        FpOp::Add | FpOp::Sub => a + b,
        FpOp::Mul => a * b,
        FpOp::Div => a / b,
        FpOp::Sqrt => a.sqrt(),
        _ => a.mul_add(b, c),
    };
    if host.is_nan() {
        return (canonical_nan(prec), FpFlags::NV);
    }
    if op == FpOp::Div && b == 0.0 && a.is_finite() {
        return (pack_exact(prec, host), FpFlags::DZ);
    }
    if operands.iter().any(|o| o.val.is_infinite()) {
        return (pack_exact(prec, host), FpFlags::NONE);
    }

    if prec == Precision::Double
        && matches!(op, FpOp::Mul | FpOp::Div)
        && host.abs() < F64_ERR_LIMIT
    {
        return tiny_f64(op, a, b, host, rm);
    }

    let exact = match op {
        FpOp::Add | FpOp::Sub => two_sum(a, b),
        FpOp::Mul => Exact {
            value: host,
            err: a.mul_add(b, -host),
        },
        FpOp::Div => Exact {
            value: host,
            err: (-host).mul_add(b, a) / b,
        },
        FpOp::Sqrt => Exact {
            value: host,
            err: if host == 0.0 {
                0.0
            } else {
                (-host).mul_add(host, a) / (2.0 * host)
            },
        },
        _ => {
            let product = a * b;
            let product_err = a.mul_add(b, -product);
            let sum = two_sum(product, c);
            Exact {
                value: host,
                err: ((sum.value - host) + sum.err) + product_err,
            }
        }
    };

    // An exact zero sum of opposite-signed terms is -0 only when rounding down.
    if rm == RoundingMode::Rdn && exact.value == 0.0 && exact.err == 0.0 {
        let terms = match op {
            FpOp::Add | FpOp::Sub => Some((a, b)),
            _ if fused => Some((a * b, c)),
            _ => None,
        };
        if let Some((p, q)) = terms
            && (p.is_sign_negative() || q.is_sign_negative())
        {
            return (pack_exact(prec, -0.0), FpFlags::NONE);
        }
    }

    round(prec, exact, rm)
}

/// Double-precision product or quotient whose magnitude is below
/// [`F64_ERR_LIMIT`].
///
/// Both operands are rescaled so the result is `2^(2 * TINY_SCALE)` times the
/// exact one and its error term is representable. Results that stay below
/// `2^-1021` are rounded on the uniform subnormal grid of `2^-1074`.
fn tiny_f64(op: FpOp, a: f64, b: f64, host: f64, rm: RoundingMode) -> (u64, FpFlags) {
    let up = pow2(TINY_SCALE);
    let down = pow2(-TINY_SCALE);
    let scaled = if op == FpOp::Mul {
        let (x, y) = (a * up, b * up);
        let value = x * y;
        Exact {
            value,
            err: x.mul_add(y, -value),
        }
    } else {
        let (x, y) = (a * up, b * down);
        let value = x / y;
        Exact {
            value,
            err: (-value).mul_add(y, x) / y,
        }
    };

    if scaled.value.abs() >= pow2(2 * TINY_SCALE - 1021) {
        let (val, flags) = round_to::<f64>(scaled, rm);
        return ((val * down * down).to_bits(), flags);
    }

    let step = pow2(2 * TINY_SCALE - 1074);
    let q = scaled.value / step;
    let err = scaled.err / step;
    let mut n = q.floor();
    let mut frac = q - n;
    if frac == 0.0 && err == 0.0 {
        return (grid_bits(n, host.is_sign_negative()), FpFlags::NONE);
    }
    if frac == 0.0 && err < 0.0 {
        n -= 1.0;
        frac = 1.0;
    }

    // The exact result lies strictly between `n` and `n + 1` grid steps.
    let positive = n >= 0.0;
    let above_half = frac > 0.5 || (frac == 0.5 && err > 0.0);
    let tie = frac == 0.5 && err == 0.0;
    let round_up = match rm {
        RoundingMode::Rdn => false,
        RoundingMode::Rup => true,
        RoundingMode::Rtz => !positive,
        RoundingMode::Rne => above_half || (tie && n % 2.0 != 0.0),
        RoundingMode::Rmm => above_half || (tie && positive),
    };
    let m = if round_up { n + 1.0 } else { n };

    let min_normal = pow2(52);
    let tiny = if positive { n < min_normal } else { -n <= min_normal };
    let flags = if tiny { FpFlags::NX | FpFlags::UF } else { FpFlags::NX };
    (grid_bits(m, !positive), flags)
}

/// Bits of `units * 2^-1074` for an integral `|units| <= 2^53`.
fn grid_bits(units: f64, negative: bool) -> u64 {
    let sign = if negative { F64_SIGN_BIT } else { 0 };
    units.abs() as u64 | sign
}

/// Rounds `exact` to `prec` in direction `rm`.
fn round(prec: Precision, exact: Exact, rm: RoundingMode) -> (u64, FpFlags) {
    match prec {
        Precision::Single => {
            let (val, flags) = round_to::<f32>(exact, rm);
            (box_f32(val), flags)
        }
        Precision::Double => {
            let (val, flags) = round_to::<f64>(exact, rm);
            (val.to_bits(), flags)
        }
    }
}

/// A binary interchange format results are rounded to.
trait Format: Copy {
    /// Smallest positive normal value.
    const MIN_POSITIVE: f64;
    /// Nearest value to `v`, ties to even.
    fn nearest(v: f64) -> Self;
    fn widen(self) -> f64;
    /// Largest finite value, or infinity, with the given sign.
    fn extreme(negative: bool, infinite: bool) -> Self;
    /// Adjacent representable value towards `+inf` (`up`) or `-inf`.
    fn step(self, up: bool) -> Self;
}

impl Format for f32 {
    const MIN_POSITIVE: f64 = f32::MIN_POSITIVE as f64;

    fn nearest(v: f64) -> Self {
        v as Self
    }

    fn widen(self) -> f64 {
        f64::from(self)
    }

    fn extreme(negative: bool, infinite: bool) -> Self {
        let mag = if infinite { Self::INFINITY } else { Self::MAX };
        if negative { -mag } else { mag }
    }

    fn step(self, up: bool) -> Self {
        if self.is_nan() || (self.is_infinite() && (self > 0.0) == up) {
            return self;
        }
        if self == 0.0 {
            let tiny = Self::from_bits(1);
            return if up { tiny } else { -tiny };
        }
        let bits = self.to_bits();
        Self::from_bits(if (self > 0.0) == up { bits + 1 } else { bits - 1 })
    }
}

impl Format for f64 {
    const MIN_POSITIVE: f64 = f64::MIN_POSITIVE;

    fn nearest(v: f64) -> Self {
        v
    }

    fn widen(self) -> f64 {
        self
    }

    fn extreme(negative: bool, infinite: bool) -> Self {
        let mag = if infinite { Self::INFINITY } else { Self::MAX };
        if negative { -mag } else { mag }
    }

    fn step(self, up: bool) -> Self {
        if self.is_nan() || (self.is_infinite() && (self > 0.0) == up) {
            return self;
        }
        if self == 0.0 {
            let tiny = Self::from_bits(1);
            return if up { tiny } else { -tiny };
        }
        let bits = self.to_bits();
        Self::from_bits(if (self > 0.0) == up { bits + 1 } else { bits - 1 })
    }
}

fn round_to<T: Format>(exact: Exact, rm: RoundingMode) -> (T, FpFlags) {
    let r = T::nearest(exact.value);
    let negative = exact.value.is_sign_negative();

    if r.widen().is_infinite() {
        let infinite = match rm {
            RoundingMode::Rne | RoundingMode::Rmm => true,
            RoundingMode::Rtz => false,
            RoundingMode::Rdn => negative,
            RoundingMode::Rup => !negative,
        };
        return (T::extreme(negative, infinite), FpFlags::OF | FpFlags::NX);
    }

    let d = (exact.value - r.widen()) + exact.err;
    if d == 0.0 {
        return (r, FpFlags::NONE);
    }

    let up = d > 0.0;
    let neighbour = r.step(up);
    let half = (neighbour.widen() - r.widen()).abs() / 2.0;
    let away_from_zero = r.widen() == 0.0 || up == (r.widen() > 0.0);
    let take = match rm {
        RoundingMode::Rne => d.abs() > half,
        RoundingMode::Rmm => d.abs() > half || (d.abs() == half && away_from_zero),
        RoundingMode::Rtz => !away_from_zero,
        RoundingMode::Rdn => !up,
        RoundingMode::Rup => up,
    };
    let result = if take { neighbour } else { r };

    let mut flags = FpFlags::NX;
    let mag = result.widen().abs();
    if mag.is_infinite() {
        flags |= FpFlags::OF;
    } else if mag < T::MIN_POSITIVE || (mag == T::MIN_POSITIVE && exact.value.abs() < T::MIN_POSITIVE) {
        flags |= FpFlags::UF;
    }
    (result, flags)
}
