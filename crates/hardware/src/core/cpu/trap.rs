//! Trap Handling Logic.
//!
//! This module implements the trap and exception handling logic for the CPU. It performs
//! the following:
//! 1. **Trap Dispatch:** Identifies the trap cause and determines the appropriate handler mode.
//! 2. **Delegation:** Handles the delegation of traps from Machine mode to Supervisor mode.
//! 3. **Context Saving:** Updates CSRs (`mepc`, `mcause`, `mtval`, etc.) and modifies privilege state.
//! 4. **Return Handling:** Implements `MRET` and `SRET` instructions for returning from trap handlers.
//! 5. **Interrupt Selection:** Finds the pending-and-enabled interrupt to take at a step boundary.

use super::Cpu;
use crate::common::Trap;
use crate::core::arch::csr::{
    MSTATUS_MIE, MSTATUS_MPIE, MSTATUS_MPP, MSTATUS_MPP_SHIFT, MSTATUS_MPRV, MSTATUS_SIE,
    MSTATUS_SPIE, MSTATUS_SPP, MSTATUS_TSR, TVEC_MODE_MASK, TVEC_VECTORED,
};
use crate::core::arch::mode::PrivilegeMode;
use crate::core::arch::trap::highest_priority;

/// Handler address for `tvec`: the base, plus `4 * code` for interrupts in vectored mode.
const fn trap_vector(tvec: u64, is_interrupt: bool, code: u64) -> u64 {
    let base = tvec & !TVEC_MODE_MASK;
    if is_interrupt && tvec & TVEC_MODE_MASK == TVEC_VECTORED {
        base.wrapping_add(code.wrapping_mul(4))
    } else {
        base
    }
}

impl Cpu {
    /// Takes a trap (exception or interrupt) at `epc`.
    ///
    /// The trap goes to S-mode when the hart is in S or U mode, S-mode exists and the
    /// cause is delegated in `medeleg`/`mideleg`; otherwise to M-mode. The handler
    /// mode's `xepc`, `xcause`, `xtval` and `mstatus` stack are updated and the PC is
    /// set to the handler address.
    ///
    /// # Arguments
    ///
    /// * `trap` - The trap to deliver.
    /// * `epc` - The Exception Program Counter (PC where the trap occurred).
    pub fn take_trap(&mut self, trap: Trap, epc: u64) {
        self.load_reservation = None;

        let xlen = self.xlen();
        let is_interrupt = trap.is_interrupt();
        let code = trap.code();
        let cause = trap.cause(xlen);
        let tval = xlen.zext(trap.tval());
        let epc = xlen.zext(epc);

        let deleg = if is_interrupt {
            self.csrs.mideleg
        } else {
            self.csrs.medeleg
        };
        let to_supervisor = self.privileges.supervisor
            && self.privilege <= PrivilegeMode::Supervisor
            && code < 64
            && (deleg >> code) & 1 != 0;

        let prev = self.privilege;
        let mut mstatus = self.csrs.mstatus;

        if to_supervisor {
            self.csrs.sepc = epc;
            self.csrs.scause = cause;
            self.csrs.stval = tval;

            mstatus &= !(MSTATUS_SPIE | MSTATUS_SPP);
            if mstatus & MSTATUS_SIE != 0 {
                mstatus |= MSTATUS_SPIE;
            }
            if prev == PrivilegeMode::Supervisor {
                mstatus |= MSTATUS_SPP;
            }
            mstatus &= !MSTATUS_SIE;

            self.privilege = PrivilegeMode::Supervisor;
            self.pc = xlen.zext(trap_vector(self.csrs.stvec, is_interrupt, code));
        } else {
            self.csrs.mepc = epc;
            self.csrs.mcause = cause;
            self.csrs.mtval = tval;

            mstatus &= !(MSTATUS_MPIE | MSTATUS_MPP);
            if mstatus & MSTATUS_MIE != 0 {
                mstatus |= MSTATUS_MPIE;
            }
            mstatus |= prev.to_bits() << MSTATUS_MPP_SHIFT;
            mstatus &= !MSTATUS_MIE;

            self.privilege = PrivilegeMode::Machine;
            self.pc = xlen.zext(trap_vector(self.csrs.mtvec, is_interrupt, code));
        }
        self.csrs.mstatus = mstatus;

        tracing::debug!(
            %trap,
            epc = format_args!("{epc:#x}"),
            from = %prev,
            to = %self.privilege,
            handler = format_args!("{:#x}", self.pc),
            "trap taken"
        );
    }

    /// Returns from an M-mode handler (MRET).
    ///
    /// # Returns
    ///
    /// The return address (`mepc`), or an illegal-instruction trap outside M-mode.
    pub fn mret(&mut self, raw: u32) -> Result<u64, Trap> {
        if self.privilege != PrivilegeMode::Machine {
            return Err(Trap::IllegalInstruction(raw));
        }

        let mut mstatus = self.csrs.mstatus;
        let target = PrivilegeMode::from_bits((mstatus & MSTATUS_MPP) >> MSTATUS_MPP_SHIFT)
            .unwrap_or(PrivilegeMode::Machine);

        mstatus &= !(MSTATUS_MIE | MSTATUS_MPP);
        if mstatus & MSTATUS_MPIE != 0 {
            mstatus |= MSTATUS_MIE;
        }
        mstatus |= MSTATUS_MPIE;
        mstatus |= self.privileges.lowest().to_bits() << MSTATUS_MPP_SHIFT;
        if target != PrivilegeMode::Machine {
            mstatus &= !MSTATUS_MPRV;
        }

        self.csrs.mstatus = mstatus;
        self.privilege = target;
        tracing::trace!(to = %target, "mret");
        Ok(self.csrs.mepc)
    }

    /// Returns from an S-mode handler (SRET).
    ///
    /// # Returns
    ///
    /// The return address (`sepc`), or an illegal-instruction trap in U-mode or in
    /// S-mode with `mstatus.TSR` set.
    pub fn sret(&mut self, raw: u32) -> Result<u64, Trap> {
        let allowed = match self.privilege {
            PrivilegeMode::Machine => true,
            PrivilegeMode::Supervisor => self.csrs.mstatus & MSTATUS_TSR == 0,
            PrivilegeMode::User => false,
        };
        if !allowed || !self.privileges.supervisor {
            return Err(Trap::IllegalInstruction(raw));
        }

        let mut mstatus = self.csrs.mstatus;
        let target = if mstatus & MSTATUS_SPP != 0 {
            PrivilegeMode::Supervisor
        } else {
            PrivilegeMode::User
        };

        mstatus &= !(MSTATUS_SIE | MSTATUS_SPP | MSTATUS_MPRV);
        if mstatus & MSTATUS_SPIE != 0 {
            mstatus |= MSTATUS_SIE;
        }
        mstatus |= MSTATUS_SPIE;

        self.csrs.mstatus = mstatus;
        self.privilege = target;
        tracing::trace!(to = %target, "sret");
        Ok(self.csrs.sepc)
    }

    /// Returns the highest-priority interrupt that is both pending and enabled.
    ///
    /// M-level interrupts are enabled below M-mode, or in M-mode with `mstatus.MIE`.
    /// Delegated interrupts are enabled below S-mode, or in S-mode with `mstatus.SIE`.
    pub fn pending_interrupt(&self) -> Option<Trap> {
        let pending = self.csrs.mip & self.csrs.mie;
        if pending == 0 {
            return None;
        }

        let mstatus = self.csrs.mstatus;
        let m_enabled = self.privilege < PrivilegeMode::Machine || mstatus & MSTATUS_MIE != 0;
        let s_enabled = self.privilege < PrivilegeMode::Supervisor
            || (self.privilege == PrivilegeMode::Supervisor && mstatus & MSTATUS_SIE != 0);

        let mut enabled = 0;
        if m_enabled {
            enabled |= pending & !self.csrs.mideleg;
        }
        if s_enabled {
            enabled |= pending & self.csrs.mideleg;
        }
        highest_priority(enabled)
    }
}
