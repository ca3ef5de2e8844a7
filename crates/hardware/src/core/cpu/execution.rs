//! Instruction Fetch and Execution.
//!
//! This module implements the single-step execution cycle of a hart. It performs the following:
//! 1. **Interrupts:** A pending and enabled interrupt is taken before anything is fetched.
//! 2. **Fetch:** Reads one or two 16-bit parcels through the MMU and expands RVC encodings.
//! 3. **Execute:** RV32/RV64 I or E, M, A, F, D, Zicsr, Zifencei and the privileged instructions.
//!    Registers and the PC are only updated when the instruction completes without a trap.
//! 4. **Counters:** `mcycle` advances every step, `minstret` on every retired instruction.

use super::Cpu;
use crate::common::constants::{
    COMPRESSED_INSTRUCTION_MASK, INSTRUCTION_SIZE_16, INSTRUCTION_SIZE_32,
    UNCOMPRESSED_INSTRUCTION_VALUE,
};
use crate::common::{AccessType, Trap, Xlen};
use crate::core::arch::csr::{MSTATUS_TVM, MSTATUS_TW};
use crate::core::arch::mode::PrivilegeMode;
use crate::isa::decode::decode;
use crate::isa::instruction::{Decoded, InstructionBits};
use crate::isa::privileged::opcodes as sys;
use crate::isa::rva::{self, funct5 as amo};
use crate::isa::rvc::expand::expand;
use crate::isa::rvi::{funct3, funct7, opcodes};
use crate::isa::rvf;
use crate::isa::rvm;
use crate::soc::interconnect::Bus;

/// Result of a single step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// One instruction retired.
    Retired,
    /// A trap or interrupt was taken; the PC now points at the handler.
    Trapped(Trap),
}

/// A fetched instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fetched {
    /// 32-bit encoding (RVC already expanded).
    pub inst: u32,
    /// Bits as fetched, reported in `xtval` when the instruction is illegal.
    pub raw: u32,
    /// Length in bytes (2 or 4).
    pub len: u64,
}

/// Sign-extends the low 32 bits of `val`.
#[inline(always)]
pub(super) const fn sext32(val: u64) -> u64 {
    val as u32 as i32 as i64 as u64
}

/// Sign-extends the low `bytes` bytes of `val`.
#[inline(always)]
const fn sext_bytes(val: u64, bytes: usize) -> u64 {
    let shift = 64 - 8 * bytes as u32;
    (((val << shift) as i64) >> shift) as u64
}

impl Cpu {
    /// Executes one step: takes a pending interrupt, or fetches and executes one
    /// instruction, taking its trap if it raises one.
    pub fn step(&mut self, bus: &mut Bus) -> StepOutcome {
        self.csrs.mcycle = self.csrs.mcycle.wrapping_add(1);

        let pc = self.pc;
        if let Some(irq) = self.pending_interrupt() {
            self.take_trap(irq, pc);
            return StepOutcome::Trapped(irq);
        }

        self.minstret_written = false;
        let result = match self.fetch(bus) {
            Ok(fetched) => {
                tracing::trace!(
                    pc = format_args!("{pc:#x}"),
                    inst = format_args!("{:#010x}", fetched.raw),
                    "step"
                );
                self.execute(bus, fetched)
            }
            Err(trap) => Err(trap),
        };

        match result {
            Ok(next_pc) => {
                self.pc = next_pc;
                if !self.minstret_written {
                    self.csrs.minstret = self.csrs.minstret.wrapping_add(1);
                }
                StepOutcome::Retired
            }
            Err(trap) => {
                self.take_trap(trap, pc);
                StepOutcome::Trapped(trap)
            }
        }
    }

    /// Fetches the instruction at the current PC.
    ///
    /// # Errors
    ///
    /// Instruction-misaligned (PC not 4-byte aligned without C), instruction
    /// page/access faults, or illegal-instruction for a reserved RVC encoding.
    pub fn fetch(&mut self, bus: &mut Bus) -> Result<Fetched, Trap> {
        let pc = self.pc;
        if !self.isa.c && pc & 3 != 0 {
            return Err(Trap::InstructionAddressMisaligned(pc));
        }

        let lo = self.fetch_parcel(bus, pc)?;
        if lo & COMPRESSED_INSTRUCTION_MASK == UNCOMPRESSED_INSTRUCTION_VALUE {
            let hi = self.fetch_parcel(bus, pc.wrapping_add(2))?;
            let inst = u32::from(lo) | (u32::from(hi) << 16);
            return Ok(Fetched {
                inst,
                raw: inst,
                len: INSTRUCTION_SIZE_32,
            });
        }

        let raw = u32::from(lo);
        if !self.isa.c {
            return Err(Trap::IllegalInstruction(raw));
        }
        let inst = expand(lo, self.xlen()).ok_or(Trap::IllegalInstruction(raw))?;
        Ok(Fetched {
            inst,
            raw,
            len: INSTRUCTION_SIZE_16,
        })
    }

    /// Executes a fetched instruction at the current PC.
    ///
    /// # Returns
    ///
    /// The address of the next instruction, or the trap the instruction raises.
    pub fn execute(&mut self, bus: &mut Bus, fetched: Fetched) -> Result<u64, Trap> {
        let d = decode(fetched.inst);
        let raw = fetched.raw;
        let illegal = Trap::IllegalInstruction(raw);
        let pc = self.pc;
        let xlen = self.xlen();
        let next = xlen.zext(pc.wrapping_add(fetched.len));

        match d.opcode {
            opcodes::OP_LUI => {
                let rd = self.gpr(d.rd, raw)?;
                self.write_reg(rd, d.imm as u64);
                Ok(next)
            }
            opcodes::OP_AUIPC => {
                let rd = self.gpr(d.rd, raw)?;
                self.write_reg(rd, pc.wrapping_add(d.imm as u64));
                Ok(next)
            }
            opcodes::OP_JAL => {
                let rd = self.gpr(d.rd, raw)?;
                let target = self.jump_target(pc.wrapping_add(d.imm as u64))?;
                self.write_reg(rd, next);
                Ok(target)
            }
            opcodes::OP_JALR => {
                if d.funct3 != 0 {
                    return Err(illegal);
                }
                let rd = self.gpr(d.rd, raw)?;
                let base = self.read_reg(self.gpr(d.rs1, raw)?);
                let target = self.jump_target(base.wrapping_add(d.imm as u64) & !1)?;
                self.write_reg(rd, next);
                Ok(target)
            }
            opcodes::OP_BRANCH => self.exec_branch(&d, raw, pc, next),
            opcodes::OP_LOAD => self.exec_load(bus, &d, raw, next),
            opcodes::OP_STORE => self.exec_store(bus, &d, raw, next),
            opcodes::OP_IMM => self.exec_op_imm(&d, raw, next),
            opcodes::OP_IMM_32 if xlen == Xlen::X64 => self.exec_op_imm_32(&d, raw, next),
            opcodes::OP_REG => self.exec_op(&d, raw, next),
            opcodes::OP_REG_32 if xlen == Xlen::X64 => self.exec_op_32(&d, raw, next),
            opcodes::OP_MISC_MEM => match d.funct3 {
                funct3::FENCE | funct3::FENCE_I => Ok(next),
                _ => Err(illegal),
            },
            rva::OP_AMO if self.isa.a => self.exec_amo(bus, &d, raw, next),
            rvf::OP_LOAD_FP if self.fp_enabled() => self.exec_fp_load(bus, &d, raw, next),
            rvf::OP_STORE_FP if self.fp_enabled() => self.exec_fp_store(bus, &d, raw, next),
            rvf::OP_FP if self.fp_enabled() => self.exec_op_fp(&d, raw, next),
            rvf::OP_FMADD | rvf::OP_FMSUB | rvf::OP_FNMSUB | rvf::OP_FNMADD
                if self.fp_enabled() =>
            {
                self.exec_fma(&d, raw, next)
            }
            sys::OP_SYSTEM => self.exec_system(&d, raw, pc, next),
            _ => Err(illegal),
        }
    }

    /// Checks that `idx` names an architectural register (x0-x15 on RVE).
    pub(super) fn gpr(&self, idx: usize, raw: u32) -> Result<usize, Trap> {
        if idx < self.isa.gpr_count() {
            Ok(idx)
        } else {
            Err(Trap::IllegalInstruction(raw))
        }
    }

    /// Truncates a jump target and checks its alignment.
    fn jump_target(&self, target: u64) -> Result<u64, Trap> {
        let target = self.xlen().zext(target);
        if !self.isa.c && target & 3 != 0 {
            Err(Trap::InstructionAddressMisaligned(target))
        } else {
            Ok(target)
        }
    }

    fn exec_branch(&mut self, d: &Decoded, raw: u32, pc: u64, next: u64) -> Result<u64, Trap> {
        let a = self.read_reg(self.gpr(d.rs1, raw)?);
        let b = self.read_reg(self.gpr(d.rs2, raw)?);

        let taken = match d.funct3 {
            funct3::BEQ => a == b,
            funct3::BNE => a != b,
            funct3::BLT => (a as i64) < (b as i64),
            funct3::BGE => (a as i64) >= (b as i64),
            funct3::BLTU => a < b,
            funct3::BGEU => a >= b,
            _ => return Err(Trap::IllegalInstruction(raw)),
        };

        if taken {
            self.jump_target(pc.wrapping_add(d.imm as u64))
        } else {
            Ok(next)
        }
    }

    fn exec_load(&mut self, bus: &mut Bus, d: &Decoded, raw: u32, next: u64) -> Result<u64, Trap> {
        let rv64 = self.xlen() == Xlen::X64;
        let (size, signed) = match d.funct3 {
            funct3::LB => (1, true),
            funct3::LH => (2, true),
            funct3::LW => (4, true),
            funct3::LD if rv64 => (8, true),
            funct3::LBU => (1, false),
            funct3::LHU => (2, false),
            funct3::LWU if rv64 => (4, false),
            _ => return Err(Trap::IllegalInstruction(raw)),
        };

        let rd = self.gpr(d.rd, raw)?;
        let addr = self
            .read_reg(self.gpr(d.rs1, raw)?)
            .wrapping_add(d.imm as u64);
        let val = self.load(bus, addr, size)?;
        self.write_reg(rd, if signed { sext_bytes(val, size) } else { val });
        Ok(next)
    }

    fn exec_store(&mut self, bus: &mut Bus, d: &Decoded, raw: u32, next: u64) -> Result<u64, Trap> {
        let size = match d.funct3 {
            funct3::SB => 1,
            funct3::SH => 2,
            funct3::SW => 4,
            funct3::SD if self.xlen() == Xlen::X64 => 8,
            _ => return Err(Trap::IllegalInstruction(raw)),
        };

        let addr = self
            .read_reg(self.gpr(d.rs1, raw)?)
            .wrapping_add(d.imm as u64);
        let val = self.read_reg(self.gpr(d.rs2, raw)?);
        self.store(bus, addr, size, val)?;
        Ok(next)
    }

    /// Decodes the shift amount of SLLI/SRLI/SRAI, which is 6 bits wide on RV64.
    ///
    /// # Returns
    ///
    /// `(shamt, arithmetic)`, or an illegal-instruction trap for reserved upper bits
    /// (including `shamt[5]` on RV32).
    fn shift_imm(&self, raw: u32) -> Result<(u32, bool), Trap> {
        let (width, alt) = match self.xlen() {
            Xlen::X64 => (6, funct7::ALT >> 1),
            Xlen::X32 => (5, funct7::ALT),
        };
        let shamt = (raw >> 20) & ((1 << width) - 1);
        match raw >> (20 + width) {
            0 => Ok((shamt, false)),
            upper if upper == alt => Ok((shamt, true)),
            _ => Err(Trap::IllegalInstruction(raw)),
        }
    }

    fn exec_op_imm(&mut self, d: &Decoded, raw: u32, next: u64) -> Result<u64, Trap> {
        let rd = self.gpr(d.rd, raw)?;
        let a = self.read_reg(self.gpr(d.rs1, raw)?);
        let imm = d.imm as u64;
        let xlen = self.xlen();

        let val = match d.funct3 {
            funct3::ADD_SUB => a.wrapping_add(imm),
            funct3::SLT => u64::from((a as i64) < (imm as i64)),
            funct3::SLTU => u64::from(a < imm),
            funct3::XOR => a ^ imm,
            funct3::OR => a | imm,
            funct3::AND => a & imm,
            funct3::SLL => match self.shift_imm(d.raw)? {
                (shamt, false) => a << shamt,
                _ => return Err(Trap::IllegalInstruction(raw)),
            },
            funct3::SRL_SRA => match self.shift_imm(d.raw)? {
                (shamt, true) => ((a as i64) >> shamt) as u64,
                (shamt, false) => xlen.zext(a) >> shamt,
            },
            _ => return Err(Trap::IllegalInstruction(raw)),
        };

        self.write_reg(rd, val);
        Ok(next)
    }

    fn exec_op_imm_32(&mut self, d: &Decoded, raw: u32, next: u64) -> Result<u64, Trap> {
        let rd = self.gpr(d.rd, raw)?;
        let a = self.read_reg(self.gpr(d.rs1, raw)?);
        let shamt = d.rs2 as u32;

        let val = match (d.funct3, d.funct7) {
            (funct3::ADD_SUB, _) => sext32(a.wrapping_add(d.imm as u64)),
            (funct3::SLL, funct7::DEFAULT) => sext32(u64::from((a as u32) << shamt)),
            (funct3::SRL_SRA, funct7::DEFAULT) => sext32(u64::from((a as u32) >> shamt)),
            (funct3::SRL_SRA, funct7::ALT) => ((a as i32) >> shamt) as i64 as u64,
            _ => return Err(Trap::IllegalInstruction(raw)),
        };

        self.write_reg(rd, val);
        Ok(next)
    }

    fn exec_op(&mut self, d: &Decoded, raw: u32, next: u64) -> Result<u64, Trap> {
        let rd = self.gpr(d.rd, raw)?;
        let a = self.read_reg(self.gpr(d.rs1, raw)?);
        let b = self.read_reg(self.gpr(d.rs2, raw)?);
        let xlen = self.xlen();
        let shamt = b & xlen.shamt_mask();

        let val = match (d.funct7, d.funct3) {
            (funct7::DEFAULT, funct3::ADD_SUB) => a.wrapping_add(b),
            (funct7::ALT, funct3::ADD_SUB) => a.wrapping_sub(b),
            (funct7::DEFAULT, funct3::SLL) => a << shamt,
            (funct7::DEFAULT, funct3::SLT) => u64::from((a as i64) < (b as i64)),
            (funct7::DEFAULT, funct3::SLTU) => u64::from(a < b),
            (funct7::DEFAULT, funct3::XOR) => a ^ b,
            (funct7::DEFAULT, funct3::SRL_SRA) => xlen.zext(a) >> shamt,
            (funct7::ALT, funct3::SRL_SRA) => ((a as i64) >> shamt) as u64,
            (funct7::DEFAULT, funct3::OR) => a | b,
            (funct7::DEFAULT, funct3::AND) => a & b,
            (rvm::FUNCT7_MULDIV, op) if self.isa.m => muldiv(op, a, b, xlen),
            _ => return Err(Trap::IllegalInstruction(raw)),
        };

        self.write_reg(rd, val);
        Ok(next)
    }

    fn exec_op_32(&mut self, d: &Decoded, raw: u32, next: u64) -> Result<u64, Trap> {
        let rd = self.gpr(d.rd, raw)?;
        let a = self.read_reg(self.gpr(d.rs1, raw)?);
        let b = self.read_reg(self.gpr(d.rs2, raw)?);
        let shamt = (b & 0x1F) as u32;
        let (a32, b32) = (a as u32, b as u32);

        let val = match (d.funct7, d.funct3) {
            (funct7::DEFAULT, funct3::ADD_SUB) => sext32(a.wrapping_add(b)),
            (funct7::ALT, funct3::ADD_SUB) => sext32(a.wrapping_sub(b)),
            (funct7::DEFAULT, funct3::SLL) => sext32(u64::from(a32 << shamt)),
            (funct7::DEFAULT, funct3::SRL_SRA) => sext32(u64::from(a32 >> shamt)),
            (funct7::ALT, funct3::SRL_SRA) => ((a32 as i32) >> shamt) as i64 as u64,
            (rvm::FUNCT7_MULDIV, op) if self.isa.m => match op {
                rvm::funct3::MUL => sext32(a.wrapping_mul(b)),
                rvm::funct3::DIV => match b32 as i32 {
                    0 => u64::MAX,
                    divisor => (a32 as i32).wrapping_div(divisor) as i64 as u64,
                },
                rvm::funct3::DIVU => match b32 {
                    0 => u64::MAX,
                    divisor => sext32(u64::from(a32 / divisor)),
                },
                rvm::funct3::REM => match b32 as i32 {
                    0 => sext32(a),
                    divisor => (a32 as i32).wrapping_rem(divisor) as i64 as u64,
                },
                rvm::funct3::REMU => match b32 {
                    0 => sext32(a),
                    divisor => sext32(u64::from(a32 % divisor)),
                },
                _ => return Err(Trap::IllegalInstruction(raw)),
            },
            _ => return Err(Trap::IllegalInstruction(raw)),
        };

        self.write_reg(rd, val);
        Ok(next)
    }

    fn exec_amo(&mut self, bus: &mut Bus, d: &Decoded, raw: u32, next: u64) -> Result<u64, Trap> {
        let size = match d.funct3 {
            rva::WIDTH_W => 4,
            rva::WIDTH_D if self.xlen() == Xlen::X64 => 8,
            _ => return Err(Trap::IllegalInstruction(raw)),
        };
        let op = d.raw.funct5();
        let known = matches!(
            op,
            amo::LR
                | amo::SC
                | amo::AMOSWAP
                | amo::AMOADD
                | amo::AMOXOR
                | amo::AMOAND
                | amo::AMOOR
                | amo::AMOMIN
                | amo::AMOMAX
                | amo::AMOMINU
                | amo::AMOMAXU
        );
        if !known || (op == amo::LR && d.rs2 != 0) {
            return Err(Trap::IllegalInstruction(raw));
        }
        let rd = self.gpr(d.rd, raw)?;
        let addr = self.xlen().zext(self.read_reg(self.gpr(d.rs1, raw)?));
        let src = self.read_reg(self.gpr(d.rs2, raw)?);
        let extend = |v: u64| if size == 4 { sext32(v) } else { v };

        match op {
            amo::LR => {
                let paddr = self.translate_atomic(bus, addr, size, AccessType::Read)?;
                let val = bus
                    .read(paddr, size)
                    .ok_or(Trap::LoadAccessFault(addr))?;
                self.load_reservation = Some((addr, size));
                self.write_reg(rd, extend(val));
            }
            amo::SC => {
                let paddr = self.translate_atomic(bus, addr, size, AccessType::Write)?;
                let reserved = self.load_reservation.take() == Some((addr, size));
                if reserved {
                    bus.write(paddr, size, src)
                        .ok_or(Trap::StoreAccessFault(addr))?;
                }
                self.write_reg(rd, u64::from(!reserved));
            }
            op => {
                let paddr = self.translate_atomic(bus, addr, size, AccessType::Write)?;
                let old = extend(
                    bus.read(paddr, size)
                        .ok_or(Trap::StoreAccessFault(addr))?,
                );
                let new = amo_result(op, old, extend(src)).ok_or(Trap::IllegalInstruction(raw))?;
                bus.write(paddr, size, new)
                    .ok_or(Trap::StoreAccessFault(addr))?;
                self.write_reg(rd, old);
            }
        }
        Ok(next)
    }

    fn exec_system(&mut self, d: &Decoded, raw: u32, pc: u64, next: u64) -> Result<u64, Trap> {
        let illegal = Trap::IllegalInstruction(raw);
        let mstatus = self.csrs.mstatus;

        match d.funct3 {
            sys::PRIV => match d.raw {
                sys::ECALL => Err(match self.privilege {
                    PrivilegeMode::User => Trap::EnvironmentCallFromUMode,
                    PrivilegeMode::Supervisor => Trap::EnvironmentCallFromSMode,
                    PrivilegeMode::Machine => Trap::EnvironmentCallFromMMode,
                }),
                sys::EBREAK => Err(Trap::Breakpoint(pc)),
                sys::MRET => self.mret(raw).map(|epc| self.xlen().zext(epc)),
                sys::SRET => self.sret(raw).map(|epc| self.xlen().zext(epc)),
                sys::WFI => match self.privilege {
                    PrivilegeMode::User => Err(illegal),
                    PrivilegeMode::Supervisor if mstatus & MSTATUS_TW != 0 => Err(illegal),
                    _ => Ok(next),
                },
                _ if d.funct7 == sys::SFENCE_VMA_FUNCT7 && d.rd == 0 => match self.privilege {
                    PrivilegeMode::User => Err(illegal),
                    PrivilegeMode::Supervisor if mstatus & MSTATUS_TVM != 0 => Err(illegal),
                    _ => {
                        self.mmu.flush_tlbs();
                        Ok(next)
                    }
                },
                _ => Err(illegal),
            },
            sys::CSRRW | sys::CSRRS | sys::CSRRC | sys::CSRRWI | sys::CSRRSI | sys::CSRRCI => {
                self.exec_csr(d, raw, next)
            }
            _ => Err(illegal),
        }
    }

    fn exec_csr(&mut self, d: &Decoded, raw: u32, next: u64) -> Result<u64, Trap> {
        let illegal = Trap::IllegalInstruction(raw);
        let rd = self.gpr(d.rd, raw)?;
        let immediate = matches!(d.funct3, sys::CSRRWI | sys::CSRRSI | sys::CSRRCI);
        let src = if immediate {
            d.rs1 as u64
        } else {
            self.read_reg(self.gpr(d.rs1, raw)?)
        };

        let swap = matches!(d.funct3, sys::CSRRW | sys::CSRRWI);
        let write = swap || d.rs1 != 0;
        let addr = d.raw.csr();
        if !self.csr_accessible(addr, write) {
            return Err(illegal);
        }

        let old = self.csr_read(addr).ok_or(illegal)?;
        if write {
            let new = match d.funct3 {
                sys::CSRRW | sys::CSRRWI => src,
                sys::CSRRS | sys::CSRRSI => old | src,
                _ => old & !src,
            };
            self.csr_write(addr, new).ok_or(illegal)?;
        }

        self.write_reg(rd, old);
        Ok(next)
    }
}

/// M-extension result for OP (funct7 = MULDIV) at the given XLEN.
fn muldiv(op: u32, a: u64, b: u64, xlen: Xlen) -> u64 {
    let bits = xlen.bits();
    let (ua, ub) = (xlen.zext(a), xlen.zext(b));
    let (sa, sb) = (a as i64, b as i64);

    match op {
        rvm::funct3::MUL => a.wrapping_mul(b),
        rvm::funct3::MULH => ((i128::from(sa) * i128::from(sb)) >> bits) as u64,
        rvm::funct3::MULHSU => ((i128::from(sa) * i128::from(ub)) >> bits) as u64,
        rvm::funct3::MULHU => ((u128::from(ua) * u128::from(ub)) >> bits) as u64,
        rvm::funct3::DIV => match sb {
            0 => u64::MAX,
            _ => sa.wrapping_div(sb) as u64,
        },
        rvm::funct3::DIVU => match ub {
            0 => u64::MAX,
            _ => ua / ub,
        },
        rvm::funct3::REM => match sb {
            0 => a,
            _ => sa.wrapping_rem(sb) as u64,
        },
        _ => match ub {
            0 => a,
            _ => ua % ub,
        },
    }
}

/// New memory value of a read-modify-write AMO; both operands are sign-extended
/// to 64 bits, which keeps signed and unsigned orderings of word operands intact.
fn amo_result(op: u32, old: u64, src: u64) -> Option<u64> {
    Some(match op {
        amo::AMOSWAP => src,
        amo::AMOADD => old.wrapping_add(src),
        amo::AMOXOR => old ^ src,
        amo::AMOAND => old & src,
        amo::AMOOR => old | src,
        amo::AMOMIN => (old as i64).min(src as i64) as u64,
        amo::AMOMAX => (old as i64).max(src as i64) as u64,
        amo::AMOMINU => old.min(src),
        amo::AMOMAXU => old.max(src),
        _ => return None,
    })
}
