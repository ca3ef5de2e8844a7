//! RISC-V Multiply/Divide Extension (M).
//!
//! M instructions live under `OP_REG`/`OP_REG_32` with `funct7 == 1`.

/// `funct7` selecting the M extension.
pub const FUNCT7_MULDIV: u32 = 0b000_0001;

/// Operation selectors (bits 14-12).
pub mod funct3 {
    /// Low XLEN bits of the product.
    pub const MUL: u32 = 0b000;
    /// High bits, signed by signed.
    pub const MULH: u32 = 0b001;
    /// High bits, signed by unsigned.
    pub const MULHSU: u32 = 0b010;
    /// High bits, unsigned by unsigned.
    pub const MULHU: u32 = 0b011;
    /// Signed division.
    pub const DIV: u32 = 0b100;
    /// Unsigned division.
    pub const DIVU: u32 = 0b101;
    /// Signed remainder.
    pub const REM: u32 = 0b110;
    /// Unsigned remainder.
    pub const REMU: u32 = 0b111;
}
