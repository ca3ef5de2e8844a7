//! RISC-V Instruction Decoder.
//!
//! Splits a 32-bit encoding into a [`Decoded`] record. The immediate is
//! reassembled according to the format the major opcode implies (I, S, B, U, J)
//! and sign-extended to 64 bits; XLEN truncation is the executor's concern.

use crate::isa::instruction::{Decoded, InstructionBits};
use crate::isa::rvf;
use crate::isa::rvi::opcodes;

/// Decodes `inst` into its component fields.
pub fn decode(inst: u32) -> Decoded {
    let opcode = inst.opcode();
    let imm = match opcode {
        opcodes::OP_IMM
        | opcodes::OP_IMM_32
        | opcodes::OP_LOAD
        | opcodes::OP_JALR
        | rvf::OP_LOAD_FP => i_imm(inst),
        opcodes::OP_STORE | rvf::OP_STORE_FP => s_imm(inst),
        opcodes::OP_BRANCH => b_imm(inst),
        opcodes::OP_LUI | opcodes::OP_AUIPC => u_imm(inst),
        opcodes::OP_JAL => j_imm(inst),
        _ => 0,
    };

    Decoded {
        raw: inst,
        opcode,
        rd: inst.rd(),
        rs1: inst.rs1(),
        rs2: inst.rs2(),
        funct3: inst.funct3(),
        funct7: inst.funct7(),
        imm,
    }
}

/// Extracts `width` bits of `inst` starting at `lo`.
#[inline(always)]
const fn bits(inst: u32, lo: u32, width: u32) -> u32 {
    (inst >> lo) & ((1 << width) - 1)
}

/// Sign-extends the low `width` bits of `val`.
#[inline(always)]
const fn sext(val: u32, width: u32) -> i64 {
    let shift = 32 - width;
    ((val << shift) as i32 >> shift) as i64
}

/// `imm[11:0] | rs1 | funct3 | rd | opcode`
const fn i_imm(inst: u32) -> i64 {
    (inst as i32 >> 20) as i64
}

/// `imm[11:5] | rs2 | rs1 | funct3 | imm[4:0] | opcode`
const fn s_imm(inst: u32) -> i64 {
    sext((bits(inst, 25, 7) << 5) | bits(inst, 7, 5), 12)
}

/// `imm[12|10:5] | rs2 | rs1 | funct3 | imm[4:1|11] | opcode`
const fn b_imm(inst: u32) -> i64 {
    let imm = (bits(inst, 31, 1) << 12)
        | (bits(inst, 7, 1) << 11)
        | (bits(inst, 25, 6) << 5)
        | (bits(inst, 8, 4) << 1);
    sext(imm, 13)
}

/// `imm[31:12] | rd | opcode`
const fn u_imm(inst: u32) -> i64 {
    (inst & 0xFFFF_F000) as i32 as i64
}

/// `imm[20|10:1|11|19:12] | rd | opcode`
const fn j_imm(inst: u32) -> i64 {
    let imm = (bits(inst, 31, 1) << 20)
        | (bits(inst, 12, 8) << 12)
        | (bits(inst, 20, 1) << 11)
        | (bits(inst, 21, 10) << 1);
    sext(imm, 21)
}
