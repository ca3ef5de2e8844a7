//! RISC-V Floating-Point Register File.
//!
//! This module implements the floating-point register file. It performs the following:
//! 1. **Storage:** Maintains 32 registers (`f0`-`f31`) as raw 64-bit patterns, so NaN
//!    payloads and single-precision NaN boxes survive untouched.
//! 2. **Debugging:** Dumps the register state through `tracing`.

use crate::isa::abi;

/// Number of architectural floating-point registers.
pub const NUM_FPRS: usize = 32;

/// Floating-Point Register file.
///
/// Single-precision values are held NaN-boxed (upper 32 bits all ones).
/// Out-of-range indices read as zero and ignore writes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fpr {
    fregs: [u64; NUM_FPRS],
}

impl Fpr {
    /// Creates a register file with every register set to `+0.0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the raw bits of register `idx`.
    #[inline(always)]
    pub fn read(&self, idx: usize) -> u64 {
        self.fregs.get(idx).copied().unwrap_or(0)
    }

    /// Writes the raw bits of register `idx`.
    #[inline(always)]
    pub fn write(&mut self, idx: usize, val: u64) {
        if let Some(reg) = self.fregs.get_mut(idx) {
            *reg = val;
        }
    }

    /// Dumps all registers at `info` level, four per line.
    pub fn dump(&self) {
        for i in (0..NUM_FPRS).step_by(4) {
            let line = (i..i + 4)
                .map(|r| format!("{:>4} = {:#018x}", abi::fp_name(r), self.read(r)))
                .collect::<Vec<_>>()
                .join("  ");
            tracing::info!("{line}");
        }
    }
}
