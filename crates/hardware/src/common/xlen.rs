//! Register width (XLEN) handling.
//!
//! The model keeps every integer register in a `u64`. On RV32 harts the value is
//! held sign-extended from bit 31, while the PC and CSRs are held zero-extended.
//! `Xlen` centralises those conversions.

use super::constants::{CAUSE_INTERRUPT_BIT, CAUSE_INTERRUPT_BIT_32};

/// Native integer register width of a hart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Xlen {
    /// 32-bit hart (RV32).
    X32,
    /// 64-bit hart (RV64).
    X64,
}

impl Xlen {
    /// Width in bits.
    pub const fn bits(self) -> u32 {
        match self {
            Self::X32 => 32,
            Self::X64 => 64,
        }
    }

    /// Mask covering the low `bits()` bits.
    pub const fn mask(self) -> u64 {
        match self {
            Self::X32 => 0xFFFF_FFFF,
            Self::X64 => u64::MAX,
        }
    }

    /// Sign-extends `val` from XLEN to 64 bits (register representation).
    #[inline(always)]
    pub const fn sext(self, val: u64) -> u64 {
        match self {
            Self::X32 => val as u32 as i32 as i64 as u64,
            Self::X64 => val,
        }
    }

    /// Zero-extends `val` from XLEN to 64 bits (PC and CSR representation).
    #[inline(always)]
    pub const fn zext(self, val: u64) -> u64 {
        val & self.mask()
    }

    /// Shift-amount mask for register shifts.
    pub const fn shamt_mask(self) -> u64 {
        (self.bits() - 1) as u64
    }

    /// Interrupt flag of `mcause`/`scause` at this width.
    pub const fn cause_interrupt_bit(self) -> u64 {
        match self {
            Self::X32 => CAUSE_INTERRUPT_BIT_32,
            Self::X64 => CAUSE_INTERRUPT_BIT,
        }
    }

    /// Encoding of this width in the `misa.MXL`/`mstatus.xXL` fields.
    pub const fn mxl(self) -> u64 {
        match self {
            Self::X32 => 1,
            Self::X64 => 2,
        }
    }
}

impl std::fmt::Display for Xlen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RV{}", self.bits())
    }
}
