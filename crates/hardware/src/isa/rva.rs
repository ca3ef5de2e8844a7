//! RISC-V Atomic Extension (A).
//!
//! Every AMO shares `OP_AMO`; `funct3` gives the width and bits 31-27 the operation.
//! The aq/rl ordering bits have no effect on a single in-order hart.

/// Atomic memory operation opcode.
pub const OP_AMO: u32 = 0b010_1111;

/// 32-bit operation width.
pub const WIDTH_W: u32 = 0b010;

/// 64-bit operation width (RV64 only).
pub const WIDTH_D: u32 = 0b011;

/// Operation selectors (bits 31-27).
pub mod funct5 {
    /// Atomic add.
    pub const AMOADD: u32 = 0b00000;
    /// Atomic swap.
    pub const AMOSWAP: u32 = 0b00001;
    /// Load-reserved.
    pub const LR: u32 = 0b00010;
    /// Store-conditional.
    pub const SC: u32 = 0b00011;
    /// Atomic XOR.
    pub const AMOXOR: u32 = 0b00100;
    /// Atomic OR.
    pub const AMOOR: u32 = 0b01000;
    /// Atomic AND.
    pub const AMOAND: u32 = 0b01100;
    /// Atomic signed minimum.
    pub const AMOMIN: u32 = 0b10000;
    /// Atomic signed maximum.
    pub const AMOMAX: u32 = 0b10100;
    /// Atomic unsigned minimum.
    pub const AMOMINU: u32 = 0b11000;
    /// Atomic unsigned maximum.
    pub const AMOMAXU: u32 = 0b11100;
}
