//! NaN boxing, unboxing, and canonical NaN propagation.
//!
//! Single-precision values live in 64-bit registers "NaN-boxed": the upper
//! 32 bits are all ones.
//!
//! - **Boxing** ([`box_f32`]): sets the upper 32 bits when an f32 result is written.
//! - **Unboxing** ([`unbox_f32`]): a register whose upper half is not all ones reads
//!   as the canonical NaN.
//! - **Canonicalization**: every NaN an arithmetic operation produces is the
//!   canonical quiet NaN; payloads are never propagated.

/// Canonical quiet NaN (single precision).
pub const CANONICAL_NAN_F32: u32 = 0x7fc0_0000;

/// Canonical quiet NaN (double precision).
pub const CANONICAL_NAN_F64: u64 = 0x7ff8_0000_0000_0000;

/// Upper half of a NaN-boxed single.
pub const NAN_BOX_MASK: u64 = 0xFFFF_FFFF_0000_0000;

/// NaN-boxes the bits of `f`.
#[inline]
pub const fn box_f32(f: f32) -> u64 {
    (f.to_bits() as u64) | NAN_BOX_MASK
}

/// Unboxes a single-precision operand.
#[inline]
pub const fn unbox_f32(val: u64) -> f32 {
    if (val & NAN_BOX_MASK) == NAN_BOX_MASK {
        f32::from_bits(val as u32)
    } else {
        f32::from_bits(CANONICAL_NAN_F32)
    }
}

/// True for a signaling NaN: quiet bit clear, non-zero payload.
#[inline]
pub const fn is_snan_f32(f: f32) -> bool {
    let bits = f.to_bits();
    (bits & 0x7F80_0000) == 0x7F80_0000 && (bits & 0x007F_FFFF) != 0 && (bits & 0x0040_0000) == 0
}

/// True for a signaling NaN: quiet bit clear, non-zero payload.
#[inline]
pub const fn is_snan_f64(f: f64) -> bool {
    let bits = f.to_bits();
    (bits & 0x7FF0_0000_0000_0000) == 0x7FF0_0000_0000_0000
        && (bits & 0x000F_FFFF_FFFF_FFFF) != 0
        && (bits & 0x0008_0000_0000_0000) == 0
}

/// IEEE 754-2019 minimumNumber: a single NaN operand yields the other one, and
/// `-0.0` orders below `+0.0`.
pub fn fmin_f64(a: f64, b: f64) -> f64 {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => f64::from_bits(CANONICAL_NAN_F64),
        (true, false) => b,
        (false, true) => a,
        (false, false) if a == b => {
            if a.is_sign_negative() { a } else { b }
        }
        (false, false) => a.min(b),
    }
}

/// IEEE 754-2019 maximumNumber: a single NaN operand yields the other one, and
/// `+0.0` orders above `-0.0`.
pub fn fmax_f64(a: f64, b: f64) -> f64 {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => f64::from_bits(CANONICAL_NAN_F64),
        (true, false) => b,
        (false, true) => a,
        (false, false) if a == b => {
            if a.is_sign_positive() { a } else { b }
        }
        (false, false) => a.max(b),
    }
}
