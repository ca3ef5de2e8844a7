//! The reference-model handle.
//!
//! A [`RefModel`] owns one [`Simulator`] and the index of the hart it drives
//! (always hart 0). Every difftest operation is a method on it; the C ABI in
//! [`ffi`](crate::ffi) only converts raw pointers and forwards here.

use rvdiff_core::Simulator;
use rvdiff_core::common::Trap;
use rvdiff_core::config::Config;
use rvdiff_core::core::Cpu;
use rvdiff_core::core::arch::csr::{
    M_INTERRUPTS, MCAUSE, MEDELEG, MEPC, MIDELEG, MIE, MSCRATCH, MSTATUS, MTVAL, MTVEC,
    S_INTERRUPTS, SATP, SCAUSE, SEPC, SSCRATCH, SSTATUS_MASK, STVAL, STVEC,
};
use rvdiff_core::core::arch::mode::PrivilegeMode;
use tracing::{debug, info};

use crate::config::difftest_config;
use crate::context::{
    CsrContext, DiffContext, Direction, XLEN, reg_to_word, word_to_addr, word_to_reg,
};
use crate::error::{DifftestError, Result};

/// Hart every difftest operation targets.
const DIFFTEST_HART: usize = 0;

/// A reference simulator attached to hart 0.
#[derive(Debug)]
pub struct RefModel {
    sim: Simulator,
    hart: usize,
}

impl RefModel {
    /// Builds a reference model from `config` and attaches to hart 0.
    ///
    /// # Errors
    ///
    /// * `DifftestError::Config` when the configuration is invalid.
    /// * `DifftestError::ContractViolation` when its XLEN differs from this build's `Word`.
    /// * `DifftestError::Sim` when guest memory cannot be allocated.
    pub fn new(config: Config) -> Result<Self> {
        if config.parsed_isa()?.xlen != XLEN {
            return Err(DifftestError::ContractViolation(
                "configured XLEN does not match the difftest word width",
            ));
        }

        let sim = Simulator::new(config)?;
        let mut model = Self {
            sim,
            hart: DIFFTEST_HART,
        };
        model.attach()?;
        info!(isa = %model.sim.config().isa, "difftest reference ready");
        Ok(model)
    }

    /// Builds a reference model from [`difftest_config`].
    ///
    /// # Errors
    ///
    /// See [`RefModel::new`].
    pub fn with_defaults() -> Result<Self> {
        Self::new(difftest_config())
    }

    /// Re-binds the handle to hart 0. Idempotent; state is preserved.
    ///
    /// # Errors
    ///
    /// `DifftestError::NoSuchHart` when the simulator has no harts.
    pub fn attach(&mut self) -> Result<()> {
        if self.sim.get_core(DIFFTEST_HART).is_none() {
            return Err(DifftestError::NoSuchHart(DIFFTEST_HART));
        }
        self.hart = DIFFTEST_HART;
        debug!(hart = self.hart, "attached");
        Ok(())
    }

    /// The attached hart.
    ///
    /// # Errors
    ///
    /// `DifftestError::NoSuchHart` if the hart vanished (never happens after `attach`).
    pub fn core(&self) -> Result<&Cpu> {
        self.sim
            .get_core(self.hart)
            .ok_or(DifftestError::NoSuchHart(self.hart))
    }

    fn core_mut(&mut self) -> Result<&mut Cpu> {
        self.sim
            .get_core_mut(self.hart)
            .ok_or(DifftestError::NoSuchHart(self.hart))
    }

    /// Copies `buf` into reference memory at `addr`, one byte at a time through
    /// the hart's store path (translation and PMP of the current mode apply).
    ///
    /// # Errors
    ///
    /// * `DifftestError::ContractViolation` for `Direction::ToDut`, which is unsupported.
    /// * `DifftestError::Trap` when a byte store faults; earlier bytes stay written.
    pub fn memcpy(&mut self, addr: u64, buf: &[u8], direction: Direction) -> Result<()> {
        if direction == Direction::ToDut {
            return Err(DifftestError::ContractViolation(
                "memcpy from the reference to the DUT is not supported",
            ));
        }

        let hart = self.hart;
        let (cpu, bus) = self
            .sim
            .core_and_bus(hart)
            .ok_or(DifftestError::NoSuchHart(hart))?;
        for (offset, &byte) in (0u64..).zip(buf) {
            cpu.store(bus, addr.wrapping_add(offset), 1, u64::from(byte))?;
        }
        debug!(addr = format_args!("{addr:#x}"), len = buf.len(), "memcpy to ref");
        Ok(())
    }

    /// Reads reference memory at `addr` into `buf` through the hart's load path.
    ///
    /// # Errors
    ///
    /// `DifftestError::Trap` when a byte load faults.
    pub fn read_memory(&mut self, addr: u64, buf: &mut [u8]) -> Result<()> {
        let hart = self.hart;
        let (cpu, bus) = self
            .sim
            .core_and_bus(hart)
            .ok_or(DifftestError::NoSuchHart(hart))?;
        for (offset, byte) in (0u64..).zip(buf.iter_mut()) {
            *byte = cpu.load(bus, addr.wrapping_add(offset), 1)? as u8;
        }
        Ok(())
    }

    /// Copies the GPRs and PC between `ctx` and the hart.
    ///
    /// `ToRef` sign-extends every word into the hart (writes to `x0` are dropped);
    /// `ToDut` truncates the hart's registers into `ctx`.
    ///
    /// # Errors
    ///
    /// `DifftestError::NoSuchHart` only.
    pub fn regcpy(&mut self, ctx: &mut DiffContext, direction: Direction) -> Result<()> {
        match direction {
            Direction::ToRef => {
                let cpu = self.core_mut()?;
                for (idx, &word) in ctx.gpr.iter().enumerate() {
                    cpu.write_reg(idx, word_to_reg(word));
                }
                cpu.set_pc(word_to_addr(ctx.pc));
            }
            Direction::ToDut => {
                let cpu = self.core()?;
                for (idx, slot) in ctx.gpr.iter_mut().enumerate() {
                    *slot = reg_to_word(cpu.read_reg(idx));
                }
                ctx.pc = reg_to_word(cpu.pc);
            }
        }
        Ok(())
    }

    /// Copies the CSR snapshot between `ctx` and the hart.
    ///
    /// `ToRef` goes through the CSRs' WARL write rules; `sstatus` is a view of
    /// `mstatus` and is not written back. `mip` is taken verbatim (M and S bits) so
    /// a harness can mirror interrupt lines it models itself.
    ///
    /// # Errors
    ///
    /// `DifftestError::ContractViolation` for an invalid `mode` value.
    pub fn csrcpy(&mut self, ctx: &mut CsrContext, direction: Direction) -> Result<()> {
        match direction {
            Direction::ToDut => {
                let cpu = self.core()?;
                let c = &cpu.csrs;
                *ctx = CsrContext {
                    mode: reg_to_word(cpu.privilege.to_bits()),
                    mstatus: reg_to_word(c.mstatus),
                    sstatus: reg_to_word(c.mstatus & SSTATUS_MASK),
                    mepc: reg_to_word(c.mepc),
                    sepc: reg_to_word(c.sepc),
                    mtval: reg_to_word(c.mtval),
                    stval: reg_to_word(c.stval),
                    mtvec: reg_to_word(c.mtvec),
                    stvec: reg_to_word(c.stvec),
                    mcause: reg_to_word(c.mcause),
                    scause: reg_to_word(c.scause),
                    satp: reg_to_word(c.satp),
                    mip: reg_to_word(c.mip),
                    mie: reg_to_word(c.mie),
                    mscratch: reg_to_word(c.mscratch),
                    sscratch: reg_to_word(c.sscratch),
                    mideleg: reg_to_word(c.mideleg),
                    medeleg: reg_to_word(c.medeleg),
                };
            }
            Direction::ToRef => {
                let mode = PrivilegeMode::from_bits(word_to_addr(ctx.mode))
                    .filter(|m| word_to_addr(ctx.mode) == m.to_bits())
                    .ok_or(DifftestError::ContractViolation(
                        "invalid privilege mode in CSR snapshot",
                    ))?;

                let cpu = self.core_mut()?;
                let writes = [
                    (MSTATUS, ctx.mstatus),
                    (MEPC, ctx.mepc),
                    (SEPC, ctx.sepc),
                    (MTVAL, ctx.mtval),
                    (STVAL, ctx.stval),
                    (MTVEC, ctx.mtvec),
                    (STVEC, ctx.stvec),
                    (MCAUSE, ctx.mcause),
                    (SCAUSE, ctx.scause),
                    (SATP, ctx.satp),
                    (MIE, ctx.mie),
                    (MSCRATCH, ctx.mscratch),
                    (SSCRATCH, ctx.sscratch),
                    (MIDELEG, ctx.mideleg),
                    (MEDELEG, ctx.medeleg),
                ];
                for (addr, word) in writes {
                    if cpu.csr_write(addr, word_to_addr(word)).is_none() {
                        debug!(
                            csr = format_args!("{addr:#x}"),
                            "CSR absent on this hart, skipped"
                        );
                    }
                }
                cpu.csrs.mip = word_to_addr(ctx.mip) & (M_INTERRUPTS | S_INTERRUPTS);
                cpu.privilege = mode;
            }
        }
        Ok(())
    }

    /// Steps the hart exactly `n` times.
    ///
    /// # Returns
    ///
    /// The number of retired instructions (steps that did not take a trap).
    ///
    /// # Errors
    ///
    /// `DifftestError::NoSuchHart` only.
    pub fn exec(&mut self, n: u64) -> Result<u64> {
        Ok(self.sim.step(self.hart, n)?)
    }

    /// Delivers the trap with cause `no` at the current PC.
    ///
    /// The top bit at the hart's XLEN (or bit 63) marks an interrupt. Delegation,
    /// `xepc`/`xcause`/`xtval`/`mstatus` updates and vectored offsets follow the
    /// normal trap path.
    ///
    /// # Errors
    ///
    /// `DifftestError::NoSuchHart` only.
    pub fn raise_intr(&mut self, no: u64) -> Result<()> {
        let cpu = self.core()?;
        let trap = Trap::from_cause(no, cpu.xlen());
        let pc = cpu.pc;
        debug!(cause = format_args!("{no:#x}"), %trap, "raise_intr");
        Ok(self.sim.take_trap(self.hart, trap, pc)?)
    }

    /// Logs the PC, privilege mode, GPRs and FP state at `info` level.
    pub fn display(&self) {
        if let Ok(cpu) = self.core() {
            cpu.dump_state();
        }
    }

    /// `minstret` of the attached hart.
    pub fn instret(&self) -> u64 {
        self.core().map_or(0, |cpu| cpu.csrs.minstret)
    }

    /// The underlying simulator.
    pub const fn simulator(&self) -> &Simulator {
        &self.sim
    }

    /// The underlying simulator, mutably.
    pub const fn simulator_mut(&mut self) -> &mut Simulator {
        &mut self.sim
    }
}
