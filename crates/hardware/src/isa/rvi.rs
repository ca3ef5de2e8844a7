//! RISC-V Base Integer Instruction Set (I/E).
//!
//! The E base shares every encoding with I; it only narrows the register file,
//! which the executor enforces.

/// Major opcodes (bits 6-0).
pub mod opcodes {
    /// LB, LH, LW, LD, LBU, LHU, LWU.
    pub const OP_LOAD: u32 = 0b000_0011;
    /// FENCE, FENCE.I.
    pub const OP_MISC_MEM: u32 = 0b000_1111;
    /// ADDI, SLTI, ANDI, SLLI, ...
    pub const OP_IMM: u32 = 0b001_0011;
    /// AUIPC.
    pub const OP_AUIPC: u32 = 0b001_0111;
    /// ADDIW, SLLIW, SRLIW, SRAIW (RV64 only).
    pub const OP_IMM_32: u32 = 0b001_1011;
    /// SB, SH, SW, SD.
    pub const OP_STORE: u32 = 0b010_0011;
    /// ADD, SUB, SLL, ... and the M extension.
    pub const OP_REG: u32 = 0b011_0011;
    /// LUI.
    pub const OP_LUI: u32 = 0b011_0111;
    /// ADDW, SUBW, ... and MULW/DIVW (RV64 only).
    pub const OP_REG_32: u32 = 0b011_1011;
    /// BEQ, BNE, BLT, BGE, BLTU, BGEU.
    pub const OP_BRANCH: u32 = 0b110_0011;
    /// JALR.
    pub const OP_JALR: u32 = 0b110_0111;
    /// JAL.
    pub const OP_JAL: u32 = 0b110_1111;
}

/// Minor opcodes (bits 14-12).
pub mod funct3 {
    /// Load byte.
    pub const LB: u32 = 0b000;
    /// Load halfword.
    pub const LH: u32 = 0b001;
    /// Load word.
    pub const LW: u32 = 0b010;
    /// Load doubleword (RV64 only).
    pub const LD: u32 = 0b011;
    /// Load byte unsigned.
    pub const LBU: u32 = 0b100;
    /// Load halfword unsigned.
    pub const LHU: u32 = 0b101;
    /// Load word unsigned (RV64 only).
    pub const LWU: u32 = 0b110;

    /// Store byte.
    pub const SB: u32 = 0b000;
    /// Store halfword.
    pub const SH: u32 = 0b001;
    /// Store word.
    pub const SW: u32 = 0b010;
    /// Store doubleword (RV64 only).
    pub const SD: u32 = 0b011;

    /// Branch if equal.
    pub const BEQ: u32 = 0b000;
    /// Branch if not equal.
    pub const BNE: u32 = 0b001;
    /// Branch if less than.
    pub const BLT: u32 = 0b100;
    /// Branch if greater or equal.
    pub const BGE: u32 = 0b101;
    /// Branch if less than, unsigned.
    pub const BLTU: u32 = 0b110;
    /// Branch if greater or equal, unsigned.
    pub const BGEU: u32 = 0b111;

    /// ADD/SUB/ADDI.
    pub const ADD_SUB: u32 = 0b000;
    /// SLL/SLLI.
    pub const SLL: u32 = 0b001;
    /// SLT/SLTI.
    pub const SLT: u32 = 0b010;
    /// SLTU/SLTIU.
    pub const SLTU: u32 = 0b011;
    /// XOR/XORI.
    pub const XOR: u32 = 0b100;
    /// SRL/SRA and their immediate forms.
    pub const SRL_SRA: u32 = 0b101;
    /// OR/ORI.
    pub const OR: u32 = 0b110;
    /// AND/ANDI.
    pub const AND: u32 = 0b111;

    /// FENCE.
    pub const FENCE: u32 = 0b000;
    /// FENCE.I.
    pub const FENCE_I: u32 = 0b001;
}

/// Function codes in bits 31-25.
pub mod funct7 {
    /// ADD, SRL and most R-type operations.
    pub const DEFAULT: u32 = 0b000_0000;
    /// SUB and SRA.
    pub const ALT: u32 = 0b010_0000;
}
