//! Simulator: owns the harts and the physical bus side-by-side.
//!
//! Harts do not hold a reference to the bus; every stepping or memory operation
//! borrows the hart and the bus as two disjoint fields of the simulator.

use crate::common::{PhysAddr, SimError, Trap};
use crate::config::Config;
use crate::core::{Cpu, StepOutcome};
use crate::soc::Memory;
use crate::soc::interconnect::Bus;
use crate::soc::memory::buffer::DramBuffer;

/// Top-level simulator: hart architectural state plus the physical memory bus.
#[derive(Debug)]
pub struct Simulator {
    config: Config,
    bus: Bus,
    harts: Vec<Cpu>,
}

impl Simulator {
    /// Builds a simulator: validates `config`, maps every memory region and
    /// creates one hart per configured hart id.
    ///
    /// # Errors
    ///
    /// `SimError::Config` for an invalid configuration, `SimError::Allocation` when a
    /// RAM region cannot be reserved.
    pub fn new(config: Config) -> Result<Self, SimError> {
        config.validate()?;

        let mut bus = Bus::new();
        for region in &config.memory {
            let buffer = DramBuffer::new(region.size as usize).map_err(|source| {
                SimError::Allocation {
                    size: region.size,
                    source,
                }
            })?;
            bus.add_device(Box::new(Memory::new(buffer, region.base)));
        }

        let harts = config
            .hart_ids
            .iter()
            .map(|&id| Cpu::new(&config, id))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(
            isa = %config.isa,
            privileges = %config.privileges,
            harts = harts.len(),
            regions = config.memory.len(),
            "simulator constructed"
        );

        Ok(Self { config, bus, harts })
    }

    /// The configuration this simulator was built from.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The physical bus.
    pub const fn bus(&self) -> &Bus {
        &self.bus
    }

    /// The physical bus, mutably (bypasses translation and PMP).
    pub const fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    /// Number of harts.
    pub fn hart_count(&self) -> usize {
        self.harts.len()
    }

    /// Hart `idx`, if it exists.
    pub fn get_core(&self, idx: usize) -> Option<&Cpu> {
        self.harts.get(idx)
    }

    /// Hart `idx`, mutably.
    pub fn get_core_mut(&mut self, idx: usize) -> Option<&mut Cpu> {
        self.harts.get_mut(idx)
    }

    /// Hart `idx` together with the bus, for operations that access memory.
    pub fn core_and_bus(&mut self, idx: usize) -> Option<(&mut Cpu, &mut Bus)> {
        self.harts.get_mut(idx).map(|cpu| (cpu, &mut self.bus))
    }

    /// Steps hart `idx` exactly `n` times.
    ///
    /// # Returns
    ///
    /// The number of steps that retired an instruction; the rest took a trap.
    ///
    /// # Errors
    ///
    /// `SimError::NoSuchHart` for an unknown index.
    pub fn step(&mut self, idx: usize, n: u64) -> Result<u64, SimError> {
        let (cpu, bus) = self.core_and_bus(idx).ok_or(SimError::NoSuchHart(idx))?;
        let mut retired = 0;
        for _ in 0..n {
            if cpu.step(bus) == StepOutcome::Retired {
                retired += 1;
            }
        }
        Ok(retired)
    }

    /// Delivers `trap` to hart `idx` as if raised at `epc`.
    ///
    /// # Errors
    ///
    /// `SimError::NoSuchHart` for an unknown index.
    pub fn take_trap(&mut self, idx: usize, trap: Trap, epc: u64) -> Result<(), SimError> {
        let cpu = self.get_core_mut(idx).ok_or(SimError::NoSuchHart(idx))?;
        cpu.take_trap(trap, epc);
        Ok(())
    }

    /// Copies `data` into physical memory at `paddr`, bypassing translation.
    ///
    /// # Returns
    ///
    /// `None` when the range is not backed by a single RAM region.
    pub fn load_image(&mut self, paddr: u64, data: &[u8]) -> Option<()> {
        self.bus.write_bytes(PhysAddr::new(paddr), data)
    }
}
