//! Floating-Point Instruction Execution.
//!
//! This module executes the F and D instructions of a hart. It performs the following:
//! 1. **Gating:** Every instruction is illegal while `mstatus.FS` is Off, D instructions
//!    without D, and the 64-bit integer forms on RV32.
//! 2. **Loads/Stores:** `flw` NaN-boxes the loaded word; `fsw`/`fsd` store raw register bits.
//! 3. **Arithmetic:** OP-FP and the fused multiply-add opcodes through the [`Fpu`].
//! 4. **State:** Register writes and raised flags mark `mstatus.FS` Dirty; flags accrue
//!    into `fflags`.

use super::Cpu;
use super::execution::sext32;
use crate::common::{Trap, Xlen};
use crate::core::units::fpu::exception_flags::FpFlags;
use crate::core::units::fpu::nan_handling::NAN_BOX_MASK;
use crate::core::units::fpu::rounding_modes::RoundingMode;
use crate::core::units::fpu::{FpOp, Fpu, IntFormat, Precision};
use crate::isa::instruction::{Decoded, InstructionBits};
use crate::isa::rvf::{self, cvt, funct3, funct5};
use crate::soc::interconnect::Bus;

impl Cpu {
    /// Reads FPR `idx` as a raw register image.
    pub fn read_freg(&self, idx: usize) -> u64 {
        self.fregs.read(idx)
    }

    /// Writes FPR `idx` and marks the floating-point state dirty.
    pub fn write_freg(&mut self, idx: usize, val: u64) {
        self.fregs.write(idx, val);
        self.set_fs_dirty();
    }

    /// Accrues `flags` into `fflags`.
    fn accrue(&mut self, flags: FpFlags) {
        if !flags.is_empty() {
            self.csrs.fflags |= u64::from(flags.bits());
            self.set_fs_dirty();
        }
    }

    /// Precision selected by a load/store width.
    fn fp_width(&self, width: u32, raw: u32) -> Result<Precision, Trap> {
        match width {
            rvf::WIDTH_W => Ok(Precision::Single),
            rvf::WIDTH_D if self.isa.d => Ok(Precision::Double),
            _ => Err(Trap::IllegalInstruction(raw)),
        }
    }

    /// Precision selected by the `fmt` field (bits 26-25).
    fn fp_format(&self, fmt: u32, raw: u32) -> Result<Precision, Trap> {
        match fmt {
            rvf::FMT_S => Ok(Precision::Single),
            rvf::FMT_D if self.isa.d => Ok(Precision::Double),
            _ => Err(Trap::IllegalInstruction(raw)),
        }
    }

    /// Resolves the `rm` field, reading `frm` for the dynamic selector.
    ///
    /// # Errors
    ///
    /// Illegal-instruction for a reserved `rm`, or a dynamic `rm` while `frm`
    /// holds a reserved value.
    fn rounding_mode(&self, rm: u32, raw: u32) -> Result<RoundingMode, Trap> {
        let bits = if rm == rvf::RM_DYNAMIC {
            self.csrs.frm
        } else {
            u64::from(rm)
        };
        RoundingMode::from_bits(bits as u8).ok_or(Trap::IllegalInstruction(raw))
    }

    /// Integer format selected by the `rs2` field of an `fcvt`.
    fn int_format(&self, sel: usize, raw: u32) -> Result<IntFormat, Trap> {
        let rv64 = self.xlen() == Xlen::X64;
        match sel {
            cvt::W => Ok(IntFormat::W),
            cvt::WU => Ok(IntFormat::WU),
            cvt::L if rv64 => Ok(IntFormat::L),
            cvt::LU if rv64 => Ok(IntFormat::LU),
            _ => Err(Trap::IllegalInstruction(raw)),
        }
    }

    pub(super) fn exec_fp_load(
        &mut self,
        bus: &mut Bus,
        d: &Decoded,
        raw: u32,
        next: u64,
    ) -> Result<u64, Trap> {
        let prec = self.fp_width(d.funct3, raw)?;
        let addr = self
            .read_reg(self.gpr(d.rs1, raw)?)
            .wrapping_add(d.imm as u64);
        let val = match prec {
            Precision::Single => self.load(bus, addr, 4)? | NAN_BOX_MASK,
            Precision::Double => self.load(bus, addr, 8)?,
        };
        self.write_freg(d.rd, val);
        Ok(next)
    }

    pub(super) fn exec_fp_store(
        &mut self,
        bus: &mut Bus,
        d: &Decoded,
        raw: u32,
        next: u64,
    ) -> Result<u64, Trap> {
        let size = match self.fp_width(d.funct3, raw)? {
            Precision::Single => 4,
            Precision::Double => 8,
        };
        let addr = self
            .read_reg(self.gpr(d.rs1, raw)?)
            .wrapping_add(d.imm as u64);
        self.store(bus, addr, size, self.fregs.read(d.rs2))?;
        Ok(next)
    }

    pub(super) fn exec_fma(&mut self, d: &Decoded, raw: u32, next: u64) -> Result<u64, Trap> {
        let prec = self.fp_format(d.funct7 & 0b11, raw)?;
        let rm = self.rounding_mode(d.funct3, raw)?;
        let op = match d.opcode {
            rvf::OP_FMADD => FpOp::MAdd,
            rvf::OP_FMSUB => FpOp::MSub,
            rvf::OP_FNMSUB => FpOp::NMSub,
            _ => FpOp::NMAdd,
        };
        let rs3 = d.raw.funct5() as usize;

        let (res, flags) = Fpu::execute(
            op,
            prec,
            self.fregs.read(d.rs1),
            self.fregs.read(d.rs2),
            self.fregs.read(rs3),
            rm,
        );
        self.write_freg(d.rd, res);
        self.accrue(flags);
        Ok(next)
    }

    pub(super) fn exec_op_fp(&mut self, d: &Decoded, raw: u32, next: u64) -> Result<u64, Trap> {
        let illegal = Trap::IllegalInstruction(raw);
        let prec = self.fp_format(d.funct7 & 0b11, raw)?;
        let rv64 = self.xlen() == Xlen::X64;
        let a = self.fregs.read(d.rs1);
        let b = self.fregs.read(d.rs2);

        match d.funct7 >> 2 {
            funct5::FADD | funct5::FSUB | funct5::FMUL | funct5::FDIV => {
                let op = match d.funct7 >> 2 {
                    funct5::FADD => FpOp::Add,
                    funct5::FSUB => FpOp::Sub,
                    funct5::FMUL => FpOp::Mul,
                    _ => FpOp::Div,
                };
                let rm = self.rounding_mode(d.funct3, raw)?;
                let (res, flags) = Fpu::execute(op, prec, a, b, 0, rm);
                self.write_freg(d.rd, res);
                self.accrue(flags);
            }
            funct5::FSQRT if d.rs2 == 0 => {
                let rm = self.rounding_mode(d.funct3, raw)?;
                let (res, flags) = Fpu::execute(FpOp::Sqrt, prec, a, 0, 0, rm);
                self.write_freg(d.rd, res);
                self.accrue(flags);
            }
            funct5::FSGNJ | funct5::FMIN_MAX => {
                let op = match (d.funct7 >> 2, d.funct3) {
                    (funct5::FSGNJ, funct3::FSGNJ) => FpOp::SgnJ,
                    (funct5::FSGNJ, funct3::FSGNJN) => FpOp::SgnJN,
                    (funct5::FSGNJ, funct3::FSGNJX) => FpOp::SgnJX,
                    (funct5::FMIN_MAX, funct3::FMIN) => FpOp::Min,
                    (funct5::FMIN_MAX, funct3::FMAX) => FpOp::Max,
                    _ => return Err(illegal),
                };
                let (res, flags) = Fpu::execute(op, prec, a, b, 0, RoundingMode::default());
                self.write_freg(d.rd, res);
                self.accrue(flags);
            }
            funct5::FCVT_FMT => {
                let valid = matches!(
                    (prec, d.rs2),
                    (Precision::Single, 1) | (Precision::Double, 0)
                );
                if !valid || !self.isa.d {
                    return Err(illegal);
                }
                let rm = self.rounding_mode(d.funct3, raw)?;
                let (res, flags) = Fpu::convert(prec, a, rm);
                self.write_freg(d.rd, res);
                self.accrue(flags);
            }
            funct5::FCMP => {
                let op = match d.funct3 {
                    funct3::FEQ => FpOp::Eq,
                    funct3::FLT => FpOp::Lt,
                    funct3::FLE => FpOp::Le,
                    _ => return Err(illegal),
                };
                let rd = self.gpr(d.rd, raw)?;
                let (res, flags) = Fpu::execute(op, prec, a, b, 0, RoundingMode::default());
                self.write_reg(rd, res);
                self.accrue(flags);
            }
            funct5::FCVT_INT_FP => {
                let fmt = self.int_format(d.rs2, raw)?;
                let rm = self.rounding_mode(d.funct3, raw)?;
                let rd = self.gpr(d.rd, raw)?;
                let (res, flags) = Fpu::to_int(prec, a, fmt, rm);
                self.write_reg(rd, res);
                self.accrue(flags);
            }
            funct5::FCVT_FP_INT => {
                let fmt = self.int_format(d.rs2, raw)?;
                let rm = self.rounding_mode(d.funct3, raw)?;
                let val = self.read_reg(self.gpr(d.rs1, raw)?);
                let (res, flags) = Fpu::from_int(prec, val, fmt, rm);
                self.write_freg(d.rd, res);
                self.accrue(flags);
            }
            funct5::FMV_X_CLASS if d.rs2 == 0 => {
                let rd = self.gpr(d.rd, raw)?;
                let res = match (d.funct3, prec) {
                    (funct3::FMV_X, Precision::Single) => sext32(a),
                    (funct3::FMV_X, Precision::Double) if rv64 => a,
                    (funct3::FCLASS, _) => Fpu::classify(prec, a),
                    _ => return Err(illegal),
                };
                self.write_reg(rd, res);
            }
            funct5::FMV_F_X if d.rs2 == 0 && d.funct3 == 0 => {
                let val = self.read_reg(self.gpr(d.rs1, raw)?);
                let res = match prec {
                    Precision::Single => (val & 0xFFFF_FFFF) | NAN_BOX_MASK,
                    Precision::Double if rv64 => val,
                    Precision::Double => return Err(illegal),
                };
                self.write_freg(d.rd, res);
            }
            _ => return Err(illegal),
        }
        Ok(next)
    }
}
