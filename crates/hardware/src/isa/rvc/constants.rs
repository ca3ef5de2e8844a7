//! Quadrant and `funct3` slots of the compressed encoding space.
//!
//! Bits `[1:0]` pick the quadrant and bits `[15:13]` the slot. On RV32 the
//! `ld`/`sd` slots hold the single-precision loads and stores (`c.flw`/`c.fsw`).

/// `[1:0] = 00`: stack-pointer-relative and register-based loads/stores.
pub const QUADRANT_0: u16 = 0b00;
/// `[1:0] = 01`: immediates, ALU operations and control transfer.
pub const QUADRANT_1: u16 = 0b01;
/// `[1:0] = 10`: `sp`-based loads/stores, shifts, moves and jumps through registers.
pub const QUADRANT_2: u16 = 0b10;

/// Quadrant 0 slots.
pub mod q0 {
    /// `c.addi4spn`.
    pub const C_ADDI4SPN: u16 = 0b000;
    /// `c.fld`.
    pub const C_FLD: u16 = 0b001;
    /// `c.lw`.
    pub const C_LW: u16 = 0b010;
    /// `c.ld` on RV64, `c.flw` on RV32.
    pub const C_LD_FLW: u16 = 0b011;
    /// `c.fsd`.
    pub const C_FSD: u16 = 0b101;
    /// `c.sw`.
    pub const C_SW: u16 = 0b110;
    /// `c.sd` on RV64, `c.fsw` on RV32.
    pub const C_SD_FSW: u16 = 0b111;
}

/// Quadrant 1 slots.
pub mod q1 {
    /// `c.addi`, or `c.nop` with `rd = x0`.
    pub const C_ADDI: u16 = 0b000;
    /// `c.addiw` on RV64, `c.jal` on RV32.
    pub const C_ADDIW_JAL: u16 = 0b001;
    /// `c.li`.
    pub const C_LI: u16 = 0b010;
    /// `c.addi16sp` with `rd = sp`, `c.lui` otherwise.
    pub const C_LUI_ADDI16SP: u16 = 0b011;
    /// `c.srli`, `c.srai`, `c.andi` and the two-register ALU group.
    pub const C_MISC_ALU: u16 = 0b100;
    /// `c.j`.
    pub const C_J: u16 = 0b101;
    /// `c.beqz`.
    pub const C_BEQZ: u16 = 0b110;
    /// `c.bnez`.
    pub const C_BNEZ: u16 = 0b111;
}

/// Quadrant 2 slots.
pub mod q2 {
    /// `c.slli`.
    pub const C_SLLI: u16 = 0b000;
    /// `c.fldsp`.
    pub const C_FLDSP: u16 = 0b001;
    /// `c.lwsp`.
    pub const C_LWSP: u16 = 0b010;
    /// `c.ldsp` on RV64, `c.flwsp` on RV32.
    pub const C_LDSP_FLWSP: u16 = 0b011;
    /// `c.jr`, `c.mv`, `c.ebreak`, `c.jalr` and `c.add`.
    pub const C_MISC_ALU: u16 = 0b100;
    /// `c.fsdsp`.
    pub const C_FSDSP: u16 = 0b101;
    /// `c.swsp`.
    pub const C_SWSP: u16 = 0b110;
    /// `c.sdsp` on RV64, `c.fswsp` on RV32.
    pub const C_SDSP_FSWSP: u16 = 0b111;
}
