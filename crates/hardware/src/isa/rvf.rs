//! RISC-V Floating-Point Extensions (F and D).
//!
//! Both precisions share the major opcodes. Loads and stores select the width in
//! `funct3`; OP-FP and the fused multiply-add opcodes select the format in bits
//! 26-25 (`fmt`) and, for OP-FP, the operation in bits 31-27.

/// Floating-point load (FLW, FLD).
pub const OP_LOAD_FP: u32 = 0b000_0111;

/// Floating-point store (FSW, FSD).
pub const OP_STORE_FP: u32 = 0b010_0111;

/// Floating-point arithmetic, compares, conversions and moves.
pub const OP_FP: u32 = 0b101_0011;

/// Fused multiply-add (`rs1 * rs2 + rs3`).
pub const OP_FMADD: u32 = 0b100_0011;

/// Fused multiply-subtract (`rs1 * rs2 - rs3`).
pub const OP_FMSUB: u32 = 0b100_0111;

/// Negated fused multiply-subtract (`-(rs1 * rs2) + rs3`).
pub const OP_FNMSUB: u32 = 0b100_1011;

/// Negated fused multiply-add (`-(rs1 * rs2) - rs3`).
pub const OP_FNMADD: u32 = 0b100_1111;

/// 32-bit load/store width (FLW, FSW).
pub const WIDTH_W: u32 = 0b010;

/// 64-bit load/store width (FLD, FSD).
pub const WIDTH_D: u32 = 0b011;

/// Single-precision format.
pub const FMT_S: u32 = 0b00;

/// Double-precision format.
pub const FMT_D: u32 = 0b01;

/// Rounding-mode field value that selects `frm`.
pub const RM_DYNAMIC: u32 = 0b111;

/// OP-FP operation selectors (bits 31-27).
pub mod funct5 {
    /// Add.
    pub const FADD: u32 = 0b00000;
    /// Subtract.
    pub const FSUB: u32 = 0b00001;
    /// Multiply.
    pub const FMUL: u32 = 0b00010;
    /// Divide.
    pub const FDIV: u32 = 0b00011;
    /// Sign injection (FSGNJ, FSGNJN, FSGNJX).
    pub const FSGNJ: u32 = 0b00100;
    /// Minimum/maximum.
    pub const FMIN_MAX: u32 = 0b00101;
    /// Precision conversion (FCVT.S.D, FCVT.D.S).
    pub const FCVT_FMT: u32 = 0b01000;
    /// Square root.
    pub const FSQRT: u32 = 0b01011;
    /// Compare (FEQ, FLT, FLE).
    pub const FCMP: u32 = 0b10100;
    /// Float to integer (FCVT.W/WU/L/LU).
    pub const FCVT_INT_FP: u32 = 0b11000;
    /// Integer to float (FCVT.S/D.W/WU/L/LU).
    pub const FCVT_FP_INT: u32 = 0b11010;
    /// Move to integer register, or classify.
    pub const FMV_X_CLASS: u32 = 0b11100;
    /// Move from integer register.
    pub const FMV_F_X: u32 = 0b11110;
}

/// `funct3` selectors within an OP-FP group.
pub mod funct3 {
    /// Copy sign.
    pub const FSGNJ: u32 = 0b000;
    /// Copy negated sign.
    pub const FSGNJN: u32 = 0b001;
    /// XOR signs.
    pub const FSGNJX: u32 = 0b010;

    /// Minimum.
    pub const FMIN: u32 = 0b000;
    /// Maximum.
    pub const FMAX: u32 = 0b001;

    /// Less than or equal.
    pub const FLE: u32 = 0b000;
    /// Less than.
    pub const FLT: u32 = 0b001;
    /// Equal.
    pub const FEQ: u32 = 0b010;

    /// Raw bit move to an integer register.
    pub const FMV_X: u32 = 0b000;
    /// Classify.
    pub const FCLASS: u32 = 0b001;
}

/// `rs2` selectors of the integer conversions.
pub mod cvt {
    /// Signed 32-bit.
    pub const W: usize = 0b00;
    /// Unsigned 32-bit.
    pub const WU: usize = 0b01;
    /// Signed 64-bit (RV64 only).
    pub const L: usize = 0b10;
    /// Unsigned 64-bit (RV64 only).
    pub const LU: usize = 0b11;
}
