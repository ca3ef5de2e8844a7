//! Compressed Instruction Expansion.
//!
//! Converts a 16-bit RVC encoding into the 32-bit instruction it stands for, so
//! the executor only ever sees the base formats. Floating-point forms expand
//! regardless of F/D; the executor rejects them on harts without F. Reserved
//! encodings expand to `None`, which the caller reports as an illegal instruction.

use super::constants::{QUADRANT_0, QUADRANT_1, QUADRANT_2, q0, q1, q2};
use crate::common::Xlen;
use crate::isa::abi::{REG_RA, REG_SP, REG_ZERO};
use crate::isa::privileged::opcodes::EBREAK;
use crate::isa::rvf;
use crate::isa::rvi::{funct3, funct7, opcodes};

const SP: u32 = REG_SP as u32;
const RA: u32 = REG_RA as u32;
const ZERO: u32 = REG_ZERO as u32;

/// Expands a 16-bit RVC instruction for a hart of width `xlen`.
///
/// # Returns
///
/// The equivalent 32-bit encoding, or `None` for reserved and unsupported encodings.
pub fn expand(inst: u16, xlen: Xlen) -> Option<u32> {
    let rv64 = xlen == Xlen::X64;
    let slot = (inst >> 13) & 0x7;

    match inst & 0x3 {
        QUADRANT_0 => quadrant0(inst, slot, rv64),
        QUADRANT_1 => quadrant1(inst, slot, rv64),
        QUADRANT_2 => quadrant2(inst, slot, rv64),
        _ => None,
    }
}

fn quadrant0(inst: u16, slot: u16, rv64: bool) -> Option<u32> {
    let rs1 = creg(inst, 7);
    let rd_rs2 = creg(inst, 2);

    match slot {
        q0::C_ADDI4SPN => {
            let imm = (field(inst, 11, 2) << 4)
                | (field(inst, 7, 4) << 6)
                | (field(inst, 6, 1) << 2)
                | (field(inst, 5, 1) << 3);
            // Covers the all-zero halfword.
            (imm != 0).then(|| i_type(imm as i32, SP, funct3::ADD_SUB, rd_rs2, opcodes::OP_IMM))
        }
        q0::C_FLD => {
            Some(i_type(ld_offset(inst), rs1, rvf::WIDTH_D, rd_rs2, rvf::OP_LOAD_FP))
        }
        q0::C_LW => Some(i_type(lw_offset(inst), rs1, funct3::LW, rd_rs2, opcodes::OP_LOAD)),
        q0::C_LD_FLW if rv64 => {
            Some(i_type(ld_offset(inst), rs1, funct3::LD, rd_rs2, opcodes::OP_LOAD))
        }
        q0::C_LD_FLW => {
            Some(i_type(lw_offset(inst), rs1, rvf::WIDTH_W, rd_rs2, rvf::OP_LOAD_FP))
        }
        q0::C_FSD => Some(s_type(ld_offset(inst), rd_rs2, rs1, rvf::WIDTH_D, rvf::OP_STORE_FP)),
        q0::C_SW => Some(s_type(lw_offset(inst), rd_rs2, rs1, funct3::SW, opcodes::OP_STORE)),
        q0::C_SD_FSW if rv64 => {
            Some(s_type(ld_offset(inst), rd_rs2, rs1, funct3::SD, opcodes::OP_STORE))
        }
        q0::C_SD_FSW => {
            Some(s_type(lw_offset(inst), rd_rs2, rs1, rvf::WIDTH_W, rvf::OP_STORE_FP))
        }
        _ => None,
    }
}

fn quadrant1(inst: u16, slot: u16, rv64: bool) -> Option<u32> {
    let rd = field(inst, 7, 5);
    let imm6 = sext(field(inst, 2, 5) | (field(inst, 12, 1) << 5), 6);

    match slot {
        q1::C_ADDI => Some(i_type(imm6, rd, funct3::ADD_SUB, rd, opcodes::OP_IMM)),
        q1::C_ADDIW_JAL if rv64 => {
            (rd != 0).then(|| i_type(imm6, rd, funct3::ADD_SUB, rd, opcodes::OP_IMM_32))
        }
        q1::C_ADDIW_JAL => Some(j_type(cj_offset(inst), RA)),
        q1::C_LI => Some(i_type(imm6, ZERO, funct3::ADD_SUB, rd, opcodes::OP_IMM)),
        q1::C_LUI_ADDI16SP if rd == SP => {
            let imm = sext(
                (field(inst, 12, 1) << 9)
                    | (field(inst, 6, 1) << 4)
                    | (field(inst, 5, 1) << 6)
                    | (field(inst, 3, 2) << 7)
                    | (field(inst, 2, 1) << 5),
                10,
            );
            (imm != 0).then(|| i_type(imm, SP, funct3::ADD_SUB, SP, opcodes::OP_IMM))
        }
        q1::C_LUI_ADDI16SP => {
            (imm6 != 0).then(|| ((imm6 as u32) << 12) | (rd << 7) | opcodes::OP_LUI)
        }
        q1::C_MISC_ALU => misc_alu(inst, rv64),
        q1::C_J => Some(j_type(cj_offset(inst), ZERO)),
        q1::C_BEQZ => Some(b_type(cb_offset(inst), creg(inst, 7), funct3::BEQ)),
        q1::C_BNEZ => Some(b_type(cb_offset(inst), creg(inst, 7), funct3::BNE)),
        _ => None,
    }
}

/// C.SRLI, C.SRAI, C.ANDI, C.SUB, C.XOR, C.OR, C.AND, C.SUBW, C.ADDW.
fn misc_alu(inst: u16, rv64: bool) -> Option<u32> {
    let rd = creg(inst, 7);
    let rs2 = creg(inst, 2);
    let high = field(inst, 12, 1);

    match field(inst, 10, 2) {
        0 | 1 => {
            if high == 1 && !rv64 {
                return None;
            }
            let shamt = (high << 5) | field(inst, 2, 5);
            let f7 = if field(inst, 10, 2) == 1 { funct7::ALT } else { funct7::DEFAULT };
            Some(r_type(f7, shamt, rd, funct3::SRL_SRA, rd, opcodes::OP_IMM))
        }
        2 => {
            let imm = sext(field(inst, 2, 5) | (high << 5), 6);
            Some(i_type(imm, rd, funct3::AND, rd, opcodes::OP_IMM))
        }
        _ => match (high, field(inst, 5, 2)) {
            (0, 0) => Some(r_type(funct7::ALT, rs2, rd, funct3::ADD_SUB, rd, opcodes::OP_REG)),
            (0, 1) => Some(r_type(funct7::DEFAULT, rs2, rd, funct3::XOR, rd, opcodes::OP_REG)),
            (0, 2) => Some(r_type(funct7::DEFAULT, rs2, rd, funct3::OR, rd, opcodes::OP_REG)),
            (0, 3) => Some(r_type(funct7::DEFAULT, rs2, rd, funct3::AND, rd, opcodes::OP_REG)),
            (1, 0) if rv64 => {
                Some(r_type(funct7::ALT, rs2, rd, funct3::ADD_SUB, rd, opcodes::OP_REG_32))
            }
            (1, 1) if rv64 => {
                Some(r_type(funct7::DEFAULT, rs2, rd, funct3::ADD_SUB, rd, opcodes::OP_REG_32))
            }
            _ => None,
        },
    }
}

fn quadrant2(inst: u16, slot: u16, rv64: bool) -> Option<u32> {
    let rd = field(inst, 7, 5);
    let rs2 = field(inst, 2, 5);
    let high = field(inst, 12, 1);

    match slot {
        q2::C_SLLI => {
            if high == 1 && !rv64 {
                return None;
            }
            let shamt = (high << 5) | rs2;
            Some(r_type(funct7::DEFAULT, shamt, rd, funct3::SLL, rd, opcodes::OP_IMM))
        }
        q2::C_FLDSP => {
            let imm = ldsp_offset(inst);
            Some(i_type(imm, SP, rvf::WIDTH_D, rd, rvf::OP_LOAD_FP))
        }
        q2::C_LWSP => {
            (rd != 0).then(|| i_type(lwsp_offset(inst), SP, funct3::LW, rd, opcodes::OP_LOAD))
        }
        q2::C_LDSP_FLWSP if rv64 => {
            (rd != 0).then(|| i_type(ldsp_offset(inst), SP, funct3::LD, rd, opcodes::OP_LOAD))
        }
        q2::C_LDSP_FLWSP => {
            Some(i_type(lwsp_offset(inst), SP, rvf::WIDTH_W, rd, rvf::OP_LOAD_FP))
        }
        q2::C_MISC_ALU => match (high, rd, rs2) {
            (0, 0, 0) => None,
            (0, _, 0) => Some(i_type(0, rd, funct3::ADD_SUB, ZERO, opcodes::OP_JALR)),
            (0, _, _) => Some(r_type(funct7::DEFAULT, rs2, ZERO, funct3::ADD_SUB, rd, opcodes::OP_REG)),
            (_, 0, 0) => Some(EBREAK),
            (_, _, 0) => Some(i_type(0, rd, funct3::ADD_SUB, RA, opcodes::OP_JALR)),
            _ => Some(r_type(funct7::DEFAULT, rs2, rd, funct3::ADD_SUB, rd, opcodes::OP_REG)),
        },
        q2::C_FSDSP => Some(s_type(sdsp_offset(inst), rs2, SP, rvf::WIDTH_D, rvf::OP_STORE_FP)),
        q2::C_SWSP => Some(s_type(swsp_offset(inst), rs2, SP, funct3::SW, opcodes::OP_STORE)),
        q2::C_SDSP_FSWSP if rv64 => {
            Some(s_type(sdsp_offset(inst), rs2, SP, funct3::SD, opcodes::OP_STORE))
        }
        q2::C_SDSP_FSWSP => {
            Some(s_type(swsp_offset(inst), rs2, SP, rvf::WIDTH_W, rvf::OP_STORE_FP))
        }
        _ => None,
    }
}

/// `width` bits of `inst` starting at `lo`.
#[inline(always)]
const fn field(inst: u16, lo: u32, width: u32) -> u32 {
    ((inst as u32) >> lo) & ((1 << width) - 1)
}

/// One of the eight popular registers (x8-x15) encoded in 3 bits at `lo`.
#[inline(always)]
const fn creg(inst: u16, lo: u32) -> u32 {
    8 + field(inst, lo, 3)
}

/// Sign-extends the low `bits` bits of `val`.
const fn sext(val: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    (val << shift) as i32 >> shift
}

/// Word offset of C.LW/C.SW.
const fn lw_offset(inst: u16) -> i32 {
    ((field(inst, 10, 3) << 3) | (field(inst, 6, 1) << 2) | (field(inst, 5, 1) << 6)) as i32
}

/// Doubleword offset of C.LD/C.SD.
const fn ld_offset(inst: u16) -> i32 {
    ((field(inst, 10, 3) << 3) | (field(inst, 5, 2) << 6)) as i32
}

/// Word offset of C.LWSP/C.FLWSP.
const fn lwsp_offset(inst: u16) -> i32 {
    ((field(inst, 12, 1) << 5) | (field(inst, 4, 3) << 2) | (field(inst, 2, 2) << 6)) as i32
}

/// Doubleword offset of C.LDSP/C.FLDSP.
const fn ldsp_offset(inst: u16) -> i32 {
    ((field(inst, 12, 1) << 5) | (field(inst, 5, 2) << 3) | (field(inst, 2, 3) << 6)) as i32
}

/// Word offset of C.SWSP/C.FSWSP.
const fn swsp_offset(inst: u16) -> i32 {
    ((field(inst, 9, 4) << 2) | (field(inst, 7, 2) << 6)) as i32
}

/// Doubleword offset of C.SDSP/C.FSDSP.
const fn sdsp_offset(inst: u16) -> i32 {
    ((field(inst, 10, 3) << 3) | (field(inst, 7, 3) << 6)) as i32
}

/// Jump offset of C.J/C.JAL.
const fn cj_offset(inst: u16) -> i32 {
    sext(
        (field(inst, 12, 1) << 11)
            | (field(inst, 11, 1) << 4)
            | (field(inst, 9, 2) << 8)
            | (field(inst, 8, 1) << 10)
            | (field(inst, 7, 1) << 6)
            | (field(inst, 6, 1) << 7)
            | (field(inst, 3, 3) << 1)
            | (field(inst, 2, 1) << 5),
        12,
    )
}

/// Branch offset of C.BEQZ/C.BNEZ.
const fn cb_offset(inst: u16) -> i32 {
    sext(
        (field(inst, 12, 1) << 8)
            | (field(inst, 10, 2) << 3)
            | (field(inst, 5, 2) << 6)
            | (field(inst, 3, 2) << 1)
            | (field(inst, 2, 1) << 5),
        9,
    )
}

const fn r_type(f7: u32, rs2: u32, rs1: u32, f3: u32, rd: u32, opcode: u32) -> u32 {
    (f7 << 25) | (rs2 << 20) | (rs1 << 15) | (f3 << 12) | (rd << 7) | opcode
}

const fn i_type(imm: i32, rs1: u32, f3: u32, rd: u32, opcode: u32) -> u32 {
    (((imm as u32) & 0xFFF) << 20) | (rs1 << 15) | (f3 << 12) | (rd << 7) | opcode
}

const fn s_type(imm: i32, rs2: u32, rs1: u32, f3: u32, opcode: u32) -> u32 {
    let imm = imm as u32;
    (((imm >> 5) & 0x7F) << 25)
        | (rs2 << 20)
        | (rs1 << 15)
        | (f3 << 12)
        | ((imm & 0x1F) << 7)
        | opcode
}

/// Branch comparing `rs1` against x0.
const fn b_type(imm: i32, rs1: u32, f3: u32) -> u32 {
    let imm = imm as u32;
    (((imm >> 12) & 1) << 31)
        | (((imm >> 5) & 0x3F) << 25)
        | (ZERO << 20)
        | (rs1 << 15)
        | (f3 << 12)
        | (((imm >> 1) & 0xF) << 8)
        | (((imm >> 11) & 1) << 7)
        | opcodes::OP_BRANCH
}

const fn j_type(imm: i32, rd: u32) -> u32 {
    let imm = imm as u32;
    (((imm >> 20) & 1) << 31)
        | (((imm >> 1) & 0x3FF) << 21)
        | (((imm >> 11) & 1) << 20)
        | (((imm >> 12) & 0xFF) << 12)
        | (rd << 7)
        | opcodes::OP_JAL
}
