//! # FPU Tests
//!
//! Rounding, exception flags, NaN handling, classification and conversions of
//! the floating-point unit, independent of any hart.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use rvdiff_core::core::units::fpu::exception_flags::FpFlags;
use rvdiff_core::core::units::fpu::nan_handling::{CANONICAL_NAN_F64, box_f32, unbox_f32};
use rvdiff_core::core::units::fpu::rounding_modes::RoundingMode;
use rvdiff_core::core::units::fpu::{FpOp, Fpu, IntFormat, Precision};

const D: Precision = Precision::Double;
const S: Precision = Precision::Single;
const RNE: RoundingMode = RoundingMode::Rne;

const SNAN_F64: u64 = 0x7FF0_0000_0000_0001;
const SNAN_F32: u32 = 0x7F80_0001;
const CANONICAL_NAN_F32_BOXED: u64 = 0xFFFF_FFFF_7FC0_0000;

fn d(v: f64) -> u64 {
    v.to_bits()
}

fn s(v: f32) -> u64 {
    box_f32(v)
}

fn binary(op: FpOp, prec: Precision, a: u64, b: u64, rm: RoundingMode) -> (u64, FpFlags) {
    Fpu::execute(op, prec, a, b, 0, rm)
}

// ══════════════════════════════════════════════════════════
// Rounding and flags
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::rne(RoundingMode::Rne, f64::INFINITY)]
#[case::rmm(RoundingMode::Rmm, f64::INFINITY)]
#[case::rtz(RoundingMode::Rtz, f64::MAX)]
#[case::rdn(RoundingMode::Rdn, f64::MAX)]
#[case::rup(RoundingMode::Rup, f64::INFINITY)]
fn test_overflow_depends_on_direction(#[case] rm: RoundingMode, #[case] expected: f64) {
    let (res, flags) = binary(FpOp::Mul, D, d(f64::MAX), d(2.0), rm);
    assert_eq!(res, d(expected));
    assert_eq!(flags, FpFlags::OF | FpFlags::NX);
}

#[test]
fn test_single_overflow_is_detected_after_narrowing() {
    let (res, flags) = binary(FpOp::Mul, S, s(f32::MAX), s(2.0), RNE);
    assert_eq!(res, s(f32::INFINITY));
    assert_eq!(flags, FpFlags::OF | FpFlags::NX);
}

#[test]
fn test_tiny_inexact_result_underflows() {
    let (res, flags) = binary(FpOp::Mul, S, s(1e-30), s(1e-30), RNE);
    assert_eq!(res, s(0.0));
    assert_eq!(flags, FpFlags::UF | FpFlags::NX);

    let (res, flags) = binary(FpOp::Mul, D, d(1e-300), d(1e-300), RoundingMode::Rup);
    assert_eq!(res, 1, "rounds up to the smallest subnormal");
    assert_eq!(flags, FpFlags::UF | FpFlags::NX);
}

#[test]
fn test_exact_subnormal_does_not_underflow() {
    let (res, flags) = binary(FpOp::Mul, D, d(f64::MIN_POSITIVE), d(0.5), RNE);
    assert_eq!(res, d(f64::MIN_POSITIVE / 2.0));
    assert_eq!(flags, FpFlags::NONE);
}

#[rstest]
#[case::rne(RoundingMode::Rne, 0.0)]
#[case::rdn(RoundingMode::Rdn, -0.0)]
fn test_exact_zero_sum_sign(#[case] rm: RoundingMode, #[case] expected: f64) {
    let (res, flags) = binary(FpOp::Add, D, d(1.5), d(-1.5), rm);
    assert_eq!(res, d(expected));
    assert_eq!(flags, FpFlags::NONE);
}

#[rstest]
#[case::finite(1.0, f64::INFINITY, FpFlags::DZ)]
#[case::infinite(f64::INFINITY, f64::INFINITY, FpFlags::NONE)]
#[case::zero(0.0, f64::NAN, FpFlags::NV)]
fn test_division_by_zero(#[case] dividend: f64, #[case] expected: f64, #[case] flags: FpFlags) {
    let (res, raised) = binary(FpOp::Div, D, d(dividend), d(0.0), RNE);
    let expected = if expected.is_nan() {
        CANONICAL_NAN_F64
    } else {
        d(expected)
    };
    assert_eq!(res, expected);
    assert_eq!(raised, flags);
}

#[test]
fn test_sqrt_of_negative_is_invalid() {
    let (res, flags) = Fpu::execute(FpOp::Sqrt, D, d(-4.0), 0, 0, RNE);
    assert_eq!(res, CANONICAL_NAN_F64);
    assert_eq!(flags, FpFlags::NV);

    let (res, flags) = Fpu::execute(FpOp::Sqrt, D, d(-0.0), 0, 0, RNE);
    assert_eq!(res, d(-0.0));
    assert_eq!(flags, FpFlags::NONE);
}

#[test]
fn test_fused_multiply_add_rounds_once() {
    // 1 + 2^-30 squared is 1 + 2^-29 + 2^-60; subtracting 1 + 2^-29 leaves 2^-60 only
    // when the product is not rounded first.
    let a = 1.0 + 2f64.powi(-30);
    let c = -(1.0 + 2f64.powi(-29));
    let (res, flags) = Fpu::execute(FpOp::MAdd, D, d(a), d(a), d(c), RNE);
    assert_eq!(res, d(2f64.powi(-60)));
    assert_eq!(flags, FpFlags::NONE);
}

#[test]
fn test_fused_zero_times_infinity_is_invalid() {
    let (res, flags) = Fpu::execute(
        FpOp::MAdd,
        D,
        d(0.0),
        d(f64::INFINITY),
        d(f64::NAN),
        RNE,
    );
    assert_eq!(res, CANONICAL_NAN_F64);
    assert_eq!(flags, FpFlags::NV);
}

// ══════════════════════════════════════════════════════════
// NaN handling
// ══════════════════════════════════════════════════════════

#[test]
fn test_improperly_boxed_single_is_canonical_nan() {
    assert!(unbox_f32(0x0000_0000_3F80_0000).is_nan());
    assert_eq!(unbox_f32(0xFFFF_FFFF_3F80_0000), 1.0);

    let (res, flags) = binary(FpOp::Add, S, 0x3F80_0000, s(1.0), RNE);
    assert_eq!(res, CANONICAL_NAN_F32_BOXED);
    assert_eq!(flags, FpFlags::NONE);
}

#[test]
fn test_signaling_nan_operand_is_invalid() {
    let (res, flags) = binary(FpOp::Add, D, SNAN_F64, d(1.0), RNE);
    assert_eq!(res, CANONICAL_NAN_F64);
    assert_eq!(flags, FpFlags::NV);

    let (res, flags) = binary(FpOp::Mul, S, s(f32::from_bits(SNAN_F32)), s(1.0), RNE);
    assert_eq!(res, CANONICAL_NAN_F32_BOXED);
    assert_eq!(flags, FpFlags::NV);
}

#[rstest]
#[case::negative_zero_first(FpOp::Min, d(-0.0), d(0.0), d(-0.0), FpFlags::NONE)]
#[case::negative_zero_second(FpOp::Min, d(0.0), d(-0.0), d(-0.0), FpFlags::NONE)]
#[case::positive_zero(FpOp::Max, d(-0.0), d(0.0), d(0.0), FpFlags::NONE)]
#[case::quiet_nan(FpOp::Min, CANONICAL_NAN_F64, d(1.0), d(1.0), FpFlags::NONE)]
#[case::signaling_nan(FpOp::Max, SNAN_F64, d(1.0), d(1.0), FpFlags::NV)]
#[case::both_nan(FpOp::Max, SNAN_F64, CANONICAL_NAN_F64, CANONICAL_NAN_F64, FpFlags::NV)]
fn test_min_max(
    #[case] op: FpOp,
    #[case] a: u64,
    #[case] b: u64,
    #[case] expected: u64,
    #[case] flags: FpFlags,
) {
    assert_eq!(binary(op, D, a, b, RNE), (expected, flags));
}

#[rstest]
#[case::eq_quiet(FpOp::Eq, CANONICAL_NAN_F64, 0, FpFlags::NONE)]
#[case::eq_signaling(FpOp::Eq, SNAN_F64, 0, FpFlags::NV)]
#[case::lt_quiet(FpOp::Lt, CANONICAL_NAN_F64, 0, FpFlags::NV)]
#[case::le_quiet(FpOp::Le, CANONICAL_NAN_F64, 0, FpFlags::NV)]
#[case::le_ordered(FpOp::Le, d(-0.0), 1, FpFlags::NONE)]
fn test_compare(#[case] op: FpOp, #[case] a: u64, #[case] expected: u64, #[case] flags: FpFlags) {
    assert_eq!(binary(op, D, a, d(0.0), RNE), (expected, flags));
}

#[test]
fn test_sign_injection_ignores_nan() {
    let (res, flags) = binary(FpOp::SgnJN, D, SNAN_F64, d(1.0), RNE);
    assert_eq!(res, SNAN_F64 | (1 << 63));
    assert_eq!(flags, FpFlags::NONE);

    let (res, _) = binary(FpOp::SgnJX, S, s(-2.0), s(-1.0), RNE);
    assert_eq!(res, s(2.0));
}

// ══════════════════════════════════════════════════════════
// Classification
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::negative_infinity(d(f64::NEG_INFINITY), 0)]
#[case::negative_normal(d(-1.0), 1)]
#[case::negative_subnormal(d(-f64::MIN_POSITIVE / 2.0), 2)]
#[case::negative_zero(d(-0.0), 3)]
#[case::positive_zero(d(0.0), 4)]
#[case::positive_subnormal(d(f64::MIN_POSITIVE / 2.0), 5)]
#[case::positive_normal(d(1.0), 6)]
#[case::positive_infinity(d(f64::INFINITY), 7)]
#[case::signaling_nan(SNAN_F64, 8)]
#[case::quiet_nan(CANONICAL_NAN_F64, 9)]
fn test_classify_double(#[case] bits: u64, #[case] class: u32) {
    assert_eq!(Fpu::classify(D, bits), 1 << class);
}

#[test]
fn test_classify_single_unboxes() {
    assert_eq!(Fpu::classify(S, s(f32::from_bits(SNAN_F32))), 1 << 8);
    assert_eq!(Fpu::classify(S, 0x3F80_0000), 1 << 9);
}

// ══════════════════════════════════════════════════════════
// Conversions
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::wu_negative_fraction(-0.5, IntFormat::WU, RoundingMode::Rtz, 0, FpFlags::NX)]
#[case::wu_negative(-1.0, IntFormat::WU, RoundingMode::Rtz, 0, FpFlags::NV)]
#[case::wu_sign_extends(3e9, IntFormat::WU, RNE, 0xFFFF_FFFF_B2D0_5E00, FpFlags::NONE)]
#[case::w_rounds_half_even(-2.5, IntFormat::W, RNE, (-2_i64) as u64, FpFlags::NX)]
#[case::w_rmm(-2.5, IntFormat::W, RoundingMode::Rmm, (-3_i64) as u64, FpFlags::NX)]
#[case::l_edge(-9_223_372_036_854_775_808.0, IntFormat::L, RNE, i64::MIN as u64, FpFlags::NONE)]
#[case::l_overflow(9_223_372_036_854_775_808.0, IntFormat::L, RNE, i64::MAX as u64, FpFlags::NV)]
#[case::lu_overflow(18_446_744_073_709_551_616.0, IntFormat::LU, RNE, u64::MAX, FpFlags::NV)]
#[case::lu_nan(f64::NAN, IntFormat::LU, RNE, u64::MAX, FpFlags::NV)]
fn test_to_int(
    #[case] val: f64,
    #[case] fmt: IntFormat,
    #[case] rm: RoundingMode,
    #[case] expected: u64,
    #[case] flags: FpFlags,
) {
    assert_eq!(Fpu::to_int(D, d(val), fmt, rm), (expected, flags));
}

#[test]
fn test_from_int_rounds_wide_integers() {
    let (res, flags) = Fpu::from_int(D, i64::MAX as u64, IntFormat::L, RNE);
    assert_eq!(res, d(9_223_372_036_854_775_808.0));
    assert_eq!(flags, FpFlags::NX);

    let (res, flags) = Fpu::from_int(D, i64::MAX as u64, IntFormat::L, RoundingMode::Rtz);
    assert_eq!(res, d(9_223_372_036_854_774_784.0));
    assert_eq!(flags, FpFlags::NX);

    let (res, flags) = Fpu::from_int(S, 16_777_217, IntFormat::W, RNE);
    assert_eq!(res, s(16_777_216.0));
    assert_eq!(flags, FpFlags::NX);

    let (res, flags) = Fpu::from_int(D, 0xFFFF_FFFF, IntFormat::WU, RNE);
    assert_eq!(res, d(4_294_967_295.0));
    assert_eq!(flags, FpFlags::NONE);
}

#[test]
fn test_precision_conversion() {
    assert_eq!(Fpu::convert(D, s(1.5), RNE), (d(1.5), FpFlags::NONE));
    assert_eq!(
        Fpu::convert(S, SNAN_F64, RNE),
        (CANONICAL_NAN_F32_BOXED, FpFlags::NV)
    );
    assert_eq!(
        Fpu::convert(S, d(1e300), RNE),
        (s(f32::INFINITY), FpFlags::OF | FpFlags::NX)
    );
    assert_eq!(
        Fpu::convert(S, d(1e300), RoundingMode::Rtz),
        (s(f32::MAX), FpFlags::OF | FpFlags::NX)
    );
}

#[test]
fn test_rounding_mode_field() {
    assert_eq!(RoundingMode::from_bits(0b100), Some(RoundingMode::Rmm));
    assert_eq!(RoundingMode::from_bits(0b101), None);
    assert_eq!(RoundingMode::from_bits(0b111), None);
}

// ══════════════════════════════════════════════════════════
// Agreement with host IEEE arithmetic
// ══════════════════════════════════════════════════════════

fn finite_f32() -> impl Strategy<Value = f32> {
    any::<f32>().prop_filter("finite", |v| v.is_finite())
}

fn finite_f64() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("finite", |v| v.is_finite())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn test_single_arithmetic_matches_host(a in finite_f32(), b in finite_f32()) {
        for (op, host) in [(FpOp::Add, a + b), (FpOp::Mul, a * b), (FpOp::Div, a / b)] {
            if host.is_finite() && b != 0.0 {
                let (res, _) = binary(op, S, s(a), s(b), RNE);
                prop_assert_eq!(res, s(host), "{:?} {} {}", op, a, b);
            }
        }
    }

    #[test]
    fn test_double_multiply_matches_host(a in finite_f64(), b in finite_f64()) {
        let host = a * b;
        if host.is_finite() {
            let (res, flags) = binary(FpOp::Mul, D, d(a), d(b), RNE);
            prop_assert_eq!(res, d(host));
            // The host residual is itself exact only well above the subnormal range.
            if host.abs() > 1e-290 {
                prop_assert_eq!(flags.contains(FpFlags::NX), a.mul_add(b, -host) != 0.0);
            }
        }
    }

    #[test]
    fn test_double_quotient_matches_host(a in finite_f64(), b in finite_f64()) {
        let host = a / b;
        if host.is_finite() && b != 0.0 {
            let (res, _) = binary(FpOp::Div, D, d(a), d(b), RNE);
            prop_assert_eq!(res, d(host));
        }
    }
}
