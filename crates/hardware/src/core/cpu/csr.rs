//! Control and Status Register (CSR) Access.
//!
//! This module implements the CSR file of a hart. It provides:
//! 1. **Access Checks:** Privilege level (address bits 9:8), read-only (bits 11:10), counter
//!    enables, `mstatus.TVM` and `mstatus.FS` for the floating-point CSRs.
//! 2. **Reads:** Views such as `sstatus`, `sie` and `sip` derived from their machine registers.
//! 3. **WARL Writes:** Masking of writable fields and legalisation of `MPP`, `satp` and `tselect`.
//! 4. **FP State:** `fflags`, `frm` and `fcsr`, and the `FS`/`SD` dirty tracking in `mstatus`.

use super::Cpu;
use crate::common::Xlen;
use crate::core::arch::csr::{
    CYCLE, CYCLEH, FCSR, FFLAGS, FRM, MSTATUS_FS, MSTATUS_FS_DIRTY, MSTATUS_FS_OFF, MSTATUS_SD_32,
    MSTATUS_SD_64, HPMCOUNTER3, HPMCOUNTER3H, HPMCOUNTER31, HPMCOUNTER31H, INSTRET, INSTRETH,
    M_INTERRUPTS, MARCHID, MCAUSE, MCONFIGPTR, MCOUNTEREN, MCOUNTINHIBIT, MCYCLE, MCYCLEH,
    MEDELEG, MEDELEG_MASK, MEPC, MHARTID, MHPMCOUNTER3, MHPMCOUNTER3H, MHPMCOUNTER31,
    MHPMCOUNTER31H, MHPMEVENT3, MHPMEVENT31, MIDELEG, MIE, MIMPID, MINSTRET, MINSTRETH, MIP,
    MIP_SSIP, MISA, MSCRATCH, MSTATUS, MSTATUS_MIE, MSTATUS_MPIE, MSTATUS_MPP,
    MSTATUS_MPP_SHIFT, MSTATUS_MPRV, MSTATUS_MXR, MSTATUS_SIE, MSTATUS_SPIE, MSTATUS_SPP,
    MSTATUS_SUM, MSTATUS_TSR, MSTATUS_TVM, MSTATUS_TW, MSTATUSH, MTVAL, MTVEC, MVENDORID,
    PMPADDR0, PMPADDR63, PMPCFG0, PMPCFG15, S_INTERRUPTS, SATP, SATP_MODE_BARE, SATP_MODE_SV39,
    SATP32_ASID_MASK, SATP32_MODE, SATP32_PPN_MASK, SATP64_ASID_MASK, SATP64_MODE_SHIFT,
    SATP64_PPN_MASK, SCAUSE, SCOUNTEREN, SEPC, SIE, SIP, SSCRATCH, SSTATUS, SSTATUS_MASK, STVAL,
    STVEC, TDATA1, TDATA2, TDATA3, TSELECT,
};
use crate::core::arch::mode::PrivilegeMode;

/// Counter-enable bit for `cycle`.
const COUNTEREN_CY: u64 = 1 << 0;
/// Counter-enable bit for `instret`.
const COUNTEREN_IR: u64 = 1 << 2;

impl Cpu {
    /// Returns true when the current privilege mode may access `addr`.
    ///
    /// # Arguments
    ///
    /// * `addr` - 12-bit CSR address.
    /// * `write` - The instruction writes the CSR (CSRRW, or CSRRS/CSRRC with a non-zero source).
    pub fn csr_accessible(&self, addr: u32, write: bool) -> bool {
        let required = u64::from((addr >> 8) & 3);
        if self.privilege.to_bits() < required {
            return false;
        }
        if write && (addr >> 10) & 3 == 3 {
            return false;
        }
        if addr == SATP
            && self.privilege == PrivilegeMode::Supervisor
            && self.csrs.mstatus & MSTATUS_TVM != 0
        {
            return false;
        }
        if matches!(addr, FFLAGS | FRM | FCSR) && !self.fp_enabled() {
            return false;
        }

        let counter_bit = match addr {
            CYCLE | CYCLEH => COUNTEREN_CY,
            INSTRET | INSTRETH => COUNTEREN_IR,
            HPMCOUNTER3..=HPMCOUNTER31 => 1 << (addr - CYCLE),
            HPMCOUNTER3H..=HPMCOUNTER31H => 1 << (addr - CYCLEH),
            _ => return true,
        };
        match self.privilege {
            PrivilegeMode::Machine => true,
            PrivilegeMode::Supervisor => self.csrs.mcounteren & counter_bit != 0,
            PrivilegeMode::User => {
                self.csrs.mcounteren & counter_bit != 0
                    && (!self.privileges.supervisor || self.csrs.scounteren & counter_bit != 0)
            }
        }
    }

    /// Reads CSR `addr` without privilege checks.
    ///
    /// # Returns
    ///
    /// The value zero-extended from XLEN, or `None` for CSRs that do not exist on
    /// this hart (which the executor turns into an illegal-instruction trap).
    pub fn csr_read(&self, addr: u32) -> Option<u64> {
        let c = &self.csrs;
        let rv32 = self.xlen() == Xlen::X32;
        let supervisor = self.privileges.supervisor;

        let val = match addr {
            MVENDORID
            | MARCHID
            | MIMPID
            | MCONFIGPTR
            | MCOUNTINHIBIT
            | MHPMEVENT3..=MHPMEVENT31
            | MHPMCOUNTER3..=MHPMCOUNTER31
            | HPMCOUNTER3..=HPMCOUNTER31 => 0,
            MHARTID => self.hart_id,

            FFLAGS if self.isa.f => c.fflags,
            FRM if self.isa.f => c.frm,
            FCSR if self.isa.f => (c.frm << 5) | c.fflags,

            MSTATUS => c.mstatus,
            MSTATUSH if rv32 => 0,
            MISA => c.misa,
            MEDELEG => c.medeleg,
            MIDELEG => c.mideleg,
            MIE => c.mie,
            MTVEC => c.mtvec,
            MCOUNTEREN => c.mcounteren,

            MSCRATCH => c.mscratch,
            MEPC => c.mepc,
            MCAUSE => c.mcause,
            MTVAL => c.mtval,
            MIP => c.mip,

            PMPCFG0..=PMPCFG15 => {
                let reg = (addr - PMPCFG0) as usize;
                if !rv32 && reg % 2 == 1 {
                    return None;
                }
                self.mmu.pmp.read_cfg_reg(reg)
            }
            PMPADDR0..=PMPADDR63 => self.mmu.pmp.get_addr((addr - PMPADDR0) as usize),

            TSELECT => self.triggers.select as u64,
            TDATA1 | TDATA2 | TDATA3 => self.selected_tdata((addr - TDATA1) as usize),

            SSTATUS if supervisor => c.mstatus & SSTATUS_MASK,
            SIE if supervisor => c.mie & c.mideleg,
            STVEC if supervisor => c.stvec,
            SCOUNTEREN if supervisor => c.scounteren,
            SSCRATCH if supervisor => c.sscratch,
            SEPC if supervisor => c.sepc,
            SCAUSE if supervisor => c.scause,
            STVAL if supervisor => c.stval,
            SIP if supervisor => c.mip & c.mideleg,
            SATP if supervisor => c.satp,

            MCYCLE | CYCLE => c.mcycle,
            MINSTRET | INSTRET => c.minstret,
            MCYCLEH | CYCLEH if rv32 => c.mcycle >> 32,
            MINSTRETH | INSTRETH if rv32 => c.minstret >> 32,
            MHPMCOUNTER3H..=MHPMCOUNTER31H | HPMCOUNTER3H..=HPMCOUNTER31H if rv32 => 0,

            _ => return None,
        };
        Some(self.xlen().zext(val))
    }

    /// Writes CSR `addr` without privilege checks, applying its WARL rules.
    ///
    /// Read-only registers that exist accept and discard the write; this is the path
    /// used by harnesses restoring a CSR snapshot.
    ///
    /// # Returns
    ///
    /// `None` for CSRs that do not exist on this hart.
    pub fn csr_write(&mut self, addr: u32, val: u64) -> Option<()> {
        let xlen = self.xlen();
        let rv32 = xlen == Xlen::X32;
        let supervisor = self.privileges.supervisor;
        let val = xlen.zext(val);
        let epc_mask = if self.isa.c { !1 } else { !3 };
        let c = &mut self.csrs;

        match addr {
            MVENDORID
            | MARCHID
            | MIMPID
            | MCONFIGPTR
            | MHARTID
            | MISA
            | MCOUNTINHIBIT
            | MHPMEVENT3..=MHPMEVENT31
            | MHPMCOUNTER3..=MHPMCOUNTER31 => {}

            FFLAGS if self.isa.f => {
                c.fflags = val & 0x1F;
                self.set_fs_dirty();
            }
            FRM if self.isa.f => {
                c.frm = val & 0x7;
                self.set_fs_dirty();
            }
            FCSR if self.isa.f => {
                c.fflags = val & 0x1F;
                c.frm = (val >> 5) & 0x7;
                self.set_fs_dirty();
            }

            MSTATUS => self.write_mstatus(val),
            MSTATUSH if rv32 => {}
            MEDELEG => {
                if supervisor {
                    c.medeleg = val & MEDELEG_MASK;
                }
            }
            MIDELEG => {
                if supervisor {
                    c.mideleg = val & S_INTERRUPTS;
                }
            }
            MIE => {
                let mask = if supervisor {
                    M_INTERRUPTS | S_INTERRUPTS
                } else {
                    M_INTERRUPTS
                };
                c.mie = val & mask;
            }
            MTVEC => c.mtvec = val & !2,
            MCOUNTEREN => c.mcounteren = val & 0xFFFF_FFFF,

            MSCRATCH => c.mscratch = val,
            MEPC => c.mepc = val & epc_mask,
            MCAUSE => c.mcause = val,
            MTVAL => c.mtval = val,
            MIP => {
                let mask = if supervisor { S_INTERRUPTS } else { 0 };
                c.mip = (c.mip & !mask) | (val & mask);
            }

            PMPCFG0..=PMPCFG15 => {
                let reg = (addr - PMPCFG0) as usize;
                if !rv32 && reg % 2 == 1 {
                    return None;
                }
                self.mmu.pmp.write_cfg_reg(reg, val);
                self.mmu.flush_tlbs();
            }
            PMPADDR0..=PMPADDR63 => {
                self.mmu.pmp.set_addr((addr - PMPADDR0) as usize, val);
                self.mmu.flush_tlbs();
            }

            TSELECT => {
                if (val as usize) < self.triggers.data.len() {
                    self.triggers.select = val as usize;
                } else {
                    tracing::warn!(tselect = val, "tselect beyond trigger count, ignored");
                }
            }
            TDATA1 | TDATA2 | TDATA3 => {
                let which = (addr - TDATA1) as usize;
                if let Some(slot) = self
                    .triggers
                    .data
                    .get_mut(self.triggers.select)
                    .and_then(|t| t.get_mut(which))
                {
                    *slot = val;
                }
            }

            SSTATUS if supervisor => {
                let merged = (c.mstatus & !SSTATUS_MASK) | (val & SSTATUS_MASK);
                self.write_mstatus(merged);
            }
            SIE if supervisor => c.mie = (c.mie & !c.mideleg) | (val & c.mideleg),
            STVEC if supervisor => c.stvec = val & !2,
            SCOUNTEREN if supervisor => c.scounteren = val & 0xFFFF_FFFF,
            SSCRATCH if supervisor => c.sscratch = val,
            SEPC if supervisor => c.sepc = val & epc_mask,
            SCAUSE if supervisor => c.scause = val,
            STVAL if supervisor => c.stval = val,
            SIP if supervisor => {
                let mask = MIP_SSIP & c.mideleg;
                c.mip = (c.mip & !mask) | (val & mask);
            }
            SATP if supervisor => self.write_satp(val),

            MCYCLE => {
                c.mcycle = if rv32 {
                    (c.mcycle & !0xFFFF_FFFF) | val
                } else {
                    val
                };
            }
            MCYCLEH if rv32 => c.mcycle = (c.mcycle & 0xFFFF_FFFF) | (val << 32),
            MINSTRET => {
                c.minstret = if rv32 {
                    (c.minstret & !0xFFFF_FFFF) | val
                } else {
                    val
                };
                self.minstret_written = true;
            }
            MINSTRETH if rv32 => {
                c.minstret = (c.minstret & 0xFFFF_FFFF) | (val << 32);
                self.minstret_written = true;
            }
            MHPMCOUNTER3H..=MHPMCOUNTER31H if rv32 => {}

            _ => return None,
        }
        Some(())
    }

    fn selected_tdata(&self, which: usize) -> u64 {
        self.triggers
            .data
            .get(self.triggers.select)
            .and_then(|t| t.get(which))
            .copied()
            .unwrap_or(0)
    }

    /// Writes `mstatus`, keeping read-only fields and the previous `MPP` when the
    /// requested mode is not implemented.
    fn write_mstatus(&mut self, val: u64) {
        let s = self.privileges.supervisor;
        let u = self.privileges.user;

        let mut writable = MSTATUS_MIE | MSTATUS_MPIE;
        if self.isa.f {
            writable |= MSTATUS_FS;
        }
        if u {
            writable |= MSTATUS_MPRV | MSTATUS_TW;
        }
        if s {
            writable |= MSTATUS_SIE
                | MSTATUS_SPIE
                | MSTATUS_SPP
                | MSTATUS_SUM
                | MSTATUS_MXR
                | MSTATUS_TVM
                | MSTATUS_TSR;
        }

        let old = self.csrs.mstatus;
        let mut new = (old & !writable) | (val & writable);

        let mpp = (val & MSTATUS_MPP) >> MSTATUS_MPP_SHIFT;
        if PrivilegeMode::from_bits(mpp).is_some_and(|mode| self.privileges.supports(mode)) {
            new = (new & !MSTATUS_MPP) | (mpp << MSTATUS_MPP_SHIFT);
        } else {
            tracing::warn!(mpp, "unsupported mstatus.MPP, keeping previous value");
        }

        if (old ^ new) & (MSTATUS_MPRV | MSTATUS_SUM | MSTATUS_MXR) != 0 {
            self.mmu.flush_tlbs();
        }
        self.csrs.mstatus = self.with_sd(new);
    }

    /// True when floating-point instructions and CSRs may execute
    /// (F implemented and `mstatus.FS` not Off).
    pub fn fp_enabled(&self) -> bool {
        self.isa.f && self.csrs.mstatus & MSTATUS_FS != MSTATUS_FS_OFF
    }

    /// Sets `mstatus.FS` to Dirty after a change to the floating-point state.
    pub fn set_fs_dirty(&mut self) {
        let mstatus = self.csrs.mstatus | MSTATUS_FS_DIRTY;
        self.csrs.mstatus = self.with_sd(mstatus);
    }

    /// `mstatus` with its summary bit recomputed from `FS`.
    fn with_sd(&self, mstatus: u64) -> u64 {
        let sd = match self.xlen() {
            Xlen::X64 => MSTATUS_SD_64,
            Xlen::X32 => MSTATUS_SD_32,
        };
        if mstatus & MSTATUS_FS == MSTATUS_FS_DIRTY {
            mstatus | sd
        } else {
            mstatus & !sd
        }
    }

    /// Writes `satp`. Unsupported translation modes leave the register unchanged.
    fn write_satp(&mut self, val: u64) {
        let legal = match self.xlen() {
            Xlen::X64 => {
                let mode = val >> SATP64_MODE_SHIFT;
                (mode == SATP_MODE_BARE || mode == SATP_MODE_SV39).then(|| {
                    (mode << SATP64_MODE_SHIFT)
                        | (val & SATP64_ASID_MASK)
                        | (val & SATP64_PPN_MASK)
                })
            }
            Xlen::X32 => Some(val & (SATP32_MODE | SATP32_ASID_MASK | SATP32_PPN_MASK)),
        };

        match legal {
            Some(satp) => {
                self.csrs.satp = satp;
                self.mmu.flush_tlbs();
                tracing::debug!(satp = format_args!("{satp:#x}"), "satp written");
            }
            None => tracing::warn!(satp = format_args!("{val:#x}"), "unsupported satp mode, ignored"),
        }
    }
}
