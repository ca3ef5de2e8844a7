//! Functional RISC-V reference model.
//!
//! This crate implements the golden-model side of a differential-testing pair:
//! 1. **Core:** Hart state (GPRs, PC, CSRs, privilege), single-step executor and trap delivery.
//! 2. **Memory:** MMU with Sv32/Sv39 translation, TLBs and configurable PMP.
//! 3. **ISA:** Decoding and execution for RV32/RV64 I/E with M, A, C, Zicsr and Zifencei.
//! 4. **SoC:** Physical bus and mmap-backed RAM regions.
//! 5. **Simulation:** Configuration and the `Simulator` that owns harts and bus.

/// Common types and constants (addresses, traps, access types, XLEN).
pub mod common;
/// Model configuration (defaults, JSON loading, validation).
pub mod config;
/// CPU core (arch state, execution, MMU).
pub mod core;
/// Instruction set (decode, RVC expansion, ABI names, opcode tables).
pub mod isa;
/// Simulator: harts plus the physical bus.
pub mod sim;
/// System-on-chip (bus, RAM, device trait).
pub mod soc;

/// Root configuration type; use `Config::default()` or `Config::from_json`.
pub use crate::config::Config;
/// Hart architectural state.
pub use crate::core::Cpu;
/// Top-level simulator; construct with `Simulator::new`.
pub use crate::sim::Simulator;
