//! RISC-V General-Purpose Register File.
//!
//! This module implements the integer register file. It performs the following:
//! 1. **Storage:** Maintains 32 integer registers (`x0`-`x31`); RVE harts use the low 16.
//! 2. **Invariant Enforcement:** Ensures that register `x0` is hardwired to zero.
//! 3. **Debugging:** Dumps the register state through `tracing`.

use crate::isa::abi;

/// Number of architectural integer registers.
pub const NUM_GPRS: usize = 32;

/// General-Purpose Register file.
///
/// Values are stored in their 64-bit register representation (sign-extended
/// from bit 31 on RV32 harts). Out-of-range indices read as zero and ignore
/// writes; the executor rejects them before they get here.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Gpr {
    regs: [u64; NUM_GPRS],
}

impl Gpr {
    /// Creates a register file with every register set to zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads register `idx`. `x0` always reads zero.
    #[inline(always)]
    pub fn read(&self, idx: usize) -> u64 {
        if idx == 0 {
            0
        } else {
            self.regs.get(idx).copied().unwrap_or(0)
        }
    }

    /// Writes register `idx`. Writes to `x0` are discarded.
    #[inline(always)]
    pub fn write(&mut self, idx: usize, val: u64) {
        if idx != 0
            && let Some(reg) = self.regs.get_mut(idx)
        {
            *reg = val;
        }
    }

    /// Dumps the first `count` registers at `info` level, four per line.
    pub fn dump(&self, count: usize) {
        let count = count.min(NUM_GPRS);
        for i in (0..count).step_by(4) {
            let line = (i..(i + 4).min(count))
                .map(|r| format!("{:>4} = {:#018x}", abi::name(r), self.read(r)))
                .collect::<Vec<_>>()
                .join("  ");
            tracing::info!("{line}");
        }
    }
}
