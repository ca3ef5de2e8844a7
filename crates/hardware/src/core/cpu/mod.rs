//! CPU Core Definition and Initialization.
//!
//! This module defines the central `Cpu` structure, which holds the complete
//! architectural state of one hart. It coordinates the following:
//! 1. **State Management:** Maintains integer and floating-point registers, program counter,
//!    CSRs and privilege mode.
//! 2. **Memory Path:** Owns the MMU (TLBs and PMP); the physical bus is passed in per call.
//! 3. **Execution:** Single-step fetch, decode and execute with precise traps.

/// Control and Status Register access and management.
pub mod csr;

/// Instruction fetch and execution.
pub mod execution;

/// Floating-point instruction execution.
pub mod float;

/// Memory access handling and load/store operations.
pub mod memory;

/// Trap and exception handling logic.
pub mod trap;

use crate::common::{ConfigError, Xlen};
use crate::config::Config;
use crate::core::arch::csr::{
    Csrs, MSTATUS_FS_INITIAL, MSTATUS_MPP, MSTATUS_MPP_SHIFT, MSTATUS_SXL_SHIFT,
    MSTATUS_UXL_SHIFT,
};
use crate::core::arch::fpr::Fpr;
use crate::core::arch::gpr::Gpr;
use crate::core::arch::misa::Isa;
use crate::core::arch::mode::{PrivilegeMode, PrivilegeSet};
use crate::core::units::mmu::Mmu;

/// Debug trigger registers selected through `tselect`.
///
/// Triggers are storage only: no breakpoint or watchpoint ever fires.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Triggers {
    /// Current `tselect` value.
    pub select: usize,
    /// `tdata1..3` of each trigger.
    pub data: Vec<[u64; 3]>,
}

impl Triggers {
    /// Creates `count` cleared triggers.
    pub fn new(count: usize) -> Self {
        Self {
            select: 0,
            data: vec![[0; 3]; count],
        }
    }
}

/// Architectural state of one RISC-V hart.
///
/// The physical bus is not owned by the hart; every operation that touches
/// memory borrows it from the [`Simulator`](crate::sim::Simulator).
#[derive(Clone, Debug)]
pub struct Cpu {
    /// General Purpose Registers, in 64-bit representation.
    pub regs: Gpr,
    /// Floating-point registers, raw 64-bit (singles NaN-boxed).
    pub fregs: Fpr,
    /// Program Counter (zero-extended on RV32).
    pub pc: u64,
    /// Control and Status Registers.
    pub csrs: Csrs,
    /// Current Privilege Mode (M, S, U).
    pub privilege: PrivilegeMode,
    /// Load Reservation address and width in bytes (for LR/SC).
    pub load_reservation: Option<(u64, usize)>,
    /// Memory Management Unit.
    pub mmu: Mmu,
    /// Implemented ISA.
    pub isa: Isa,
    /// Implemented privilege modes.
    pub privileges: PrivilegeSet,
    /// Split misaligned loads/stores instead of trapping.
    pub misaligned: bool,
    /// Value of `mhartid`.
    pub hart_id: u64,
    /// Debug trigger storage.
    pub triggers: Triggers,
    /// Set when the executing instruction wrote `minstret`, suppressing its increment.
    minstret_written: bool,
}

impl Cpu {
    /// Creates a hart in its reset state: machine mode, `pc = config.start_pc`.
    ///
    /// # Errors
    ///
    /// Returns the `ConfigError` of an invalid ISA or privilege string.
    pub fn new(config: &Config, hart_id: usize) -> Result<Self, ConfigError> {
        let isa = config.parsed_isa()?;
        let privileges = config.parsed_privileges()?;

        let mut csrs = Csrs {
            misa: isa.misa(privileges),
            ..Csrs::default()
        };
        csrs.mstatus = (privileges.lowest().to_bits() << MSTATUS_MPP_SHIFT) & MSTATUS_MPP;
        if isa.xlen == Xlen::X64 {
            if privileges.user {
                csrs.mstatus |= 2 << MSTATUS_UXL_SHIFT;
            }
            if privileges.supervisor {
                csrs.mstatus |= 2 << MSTATUS_SXL_SHIFT;
            }
        }
        if isa.f {
            csrs.mstatus |= MSTATUS_FS_INITIAL;
        }

        Ok(Self {
            regs: Gpr::new(),
            fregs: Fpr::new(),
            pc: isa.xlen.zext(config.start_pc),
            csrs,
            privilege: PrivilegeMode::Machine,
            load_reservation: None,
            mmu: Mmu::new(config.tlb_size, config.pmp_regions, isa.xlen),
            isa,
            privileges,
            misaligned: config.misaligned,
            hart_id: hart_id as u64,
            triggers: Triggers::new(config.trigger_count),
            minstret_written: false,
        })
    }

    /// Register width of this hart.
    #[inline(always)]
    pub const fn xlen(&self) -> Xlen {
        self.isa.xlen
    }

    /// Reads GPR `idx`, sign-extended to 64 bits on RV32.
    pub fn read_reg(&self, idx: usize) -> u64 {
        self.regs.read(idx)
    }

    /// Writes GPR `idx`, sign-extending from XLEN. `x0` and registers beyond the
    /// architectural count (x16+ on RVE) are left untouched.
    pub fn write_reg(&mut self, idx: usize, val: u64) {
        if idx < self.isa.gpr_count() {
            self.regs.write(idx, self.xlen().sext(val));
        }
    }

    /// Sets the PC, truncated to XLEN.
    pub fn set_pc(&mut self, pc: u64) {
        self.pc = self.xlen().zext(pc);
    }

    /// Dumps PC, privilege, the architectural GPRs and, with F, the FPRs and
    /// `fcsr` at `info` level.
    pub fn dump_state(&self) {
        tracing::info!(pc = format_args!("{:#x}", self.pc), privilege = %self.privilege, "hart {}", self.hart_id);
        self.regs.dump(self.isa.gpr_count());
        if self.isa.f {
            self.fregs.dump();
            tracing::info!(
                frm = self.csrs.frm,
                fflags = format_args!("{:#07b}", self.csrs.fflags),
                "fcsr"
            );
        }
    }
}
