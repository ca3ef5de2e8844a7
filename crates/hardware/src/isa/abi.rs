//! RISC-V ABI register names.
//!
//! Used when dumping architectural state for a failed comparison.

/// ABI mnemonic of each integer register, indexed by register number.
pub const ABI_NAMES: [&str; 32] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

/// ABI mnemonic of each floating-point register, indexed by register number.
pub const FP_ABI_NAMES: [&str; 32] = [
    "ft0", "ft1", "ft2", "ft3", "ft4", "ft5", "ft6", "ft7", "fs0", "fs1", "fa0", "fa1", "fa2",
    "fa3", "fa4", "fa5", "fa6", "fa7", "fs2", "fs3", "fs4", "fs5", "fs6", "fs7", "fs8", "fs9",
    "fs10", "fs11", "ft8", "ft9", "ft10", "ft11",
];

/// Register x0 (hardwired zero).
pub const REG_ZERO: usize = 0;
/// Register x1 (return address, ra).
pub const REG_RA: usize = 1;
/// Register x2 (stack pointer, sp).
pub const REG_SP: usize = 2;
/// Register x10 (first argument, a0).
pub const REG_A0: usize = 10;

/// ABI name of register `idx`, or `"?"` when out of range.
pub fn name(idx: usize) -> &'static str {
    ABI_NAMES.get(idx).copied().unwrap_or("?")
}

/// ABI name of floating-point register `idx`, or `"?"` when out of range.
pub fn fp_name(idx: usize) -> &'static str {
    FP_ABI_NAMES.get(idx).copied().unwrap_or("?")
}
