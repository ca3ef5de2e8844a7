use rvdiff_core::Simulator;
use rvdiff_core::config::{Config, MemoryRegionConfig};
use rvdiff_core::core::arch::csr::{PMPADDR0, PMPCFG0};
use rvdiff_core::core::{Cpu, StepOutcome};
use rvdiff_core::soc::Bus;

/// Base of the harness RAM region and reset PC.
pub const RAM_BASE: u64 = 0x8000_0000;

/// Size of the harness RAM region (4 MiB).
pub const RAM_SIZE: u64 = 0x40_0000;

pub struct TestContext {
    pub sim: Simulator,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// An RV64IMAFDC/MSU hart on a small RAM region.
    pub fn new() -> Self {
        Self::with_isa("RV64IMAFDC")
    }

    /// An RV32IMAFDC/MSU hart on a small RAM region.
    pub fn rv32() -> Self {
        Self::with_isa("RV32IMAFDC")
    }

    pub fn with_isa(isa: &str) -> Self {
        Self::with_config(Config {
            isa: isa.to_owned(),
            memory: vec![MemoryRegionConfig {
                base: RAM_BASE,
                size: RAM_SIZE,
            }],
            ..Config::default()
        })
    }

    pub fn with_config(config: Config) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter("trace")
            .try_init();
        let sim = Simulator::new(config).expect("test simulator");
        Self { sim }
    }

    /// Convenience accessor for hart 0.
    pub fn cpu(&self) -> &Cpu {
        self.sim.get_core(0).expect("hart 0")
    }

    /// Mutable convenience accessor for hart 0.
    pub fn cpu_mut(&mut self) -> &mut Cpu {
        self.sim.get_core_mut(0).expect("hart 0")
    }

    /// Hart 0 together with the bus.
    pub fn parts(&mut self) -> (&mut Cpu, &mut Bus) {
        self.sim.core_and_bus(0).expect("hart 0")
    }

    /// Load a sequence of 32-bit instructions at `RAM_BASE` and set the PC there.
    pub fn load_program(self, instructions: &[u32]) -> Self {
        self.load_program_at(RAM_BASE, instructions)
    }

    /// Load a sequence of 32-bit instructions at `addr` and set the PC.
    pub fn load_program_at(mut self, addr: u64, instructions: &[u32]) -> Self {
        let image: Vec<u8> = instructions.iter().flat_map(|i| i.to_le_bytes()).collect();
        self.sim.load_image(addr, &image).expect("program fits in RAM");
        self.cpu_mut().set_pc(addr);
        self
    }

    /// Grant S/U-mode full access through PMP entry 0 (NAPOT over all memory).
    pub fn open_pmp(mut self) -> Self {
        let cpu = self.cpu_mut();
        cpu.csr_write(PMPADDR0, u64::MAX).expect("pmpaddr0");
        cpu.csr_write(PMPCFG0, 0x1F).expect("pmpcfg0");
        self
    }

    /// Step hart 0 once.
    pub fn step(&mut self) -> StepOutcome {
        let (cpu, bus) = self.parts();
        cpu.step(bus)
    }

    /// Step hart 0 `n` times, returning the number of retired instructions.
    pub fn run(&mut self, n: u64) -> u64 {
        self.sim.step(0, n).expect("hart 0")
    }

    /// Set a general-purpose register value.
    pub fn set_reg(&mut self, reg: usize, val: u64) {
        self.cpu_mut().write_reg(reg, val);
    }

    /// Read a general-purpose register value.
    pub fn get_reg(&self, reg: usize) -> u64 {
        self.cpu().read_reg(reg)
    }

    /// Read a floating-point register image.
    pub fn get_freg(&self, reg: usize) -> u64 {
        self.cpu().read_freg(reg)
    }

    /// Physical read that bypasses translation.
    pub fn read_phys(&mut self, addr: u64, size: usize) -> u64 {
        self.sim
            .bus_mut()
            .read(rvdiff_core::common::PhysAddr::new(addr), size)
            .expect("backed address")
    }

    /// Physical write that bypasses translation.
    pub fn write_phys(&mut self, addr: u64, size: usize, val: u64) {
        self.sim
            .bus_mut()
            .write(rvdiff_core::common::PhysAddr::new(addr), size, val)
            .expect("backed address");
    }
}
