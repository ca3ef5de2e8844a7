//! # Unit Components
//!
//! Central hub for the per-component unit tests of the engine: shared types,
//! the hart core, the ISA tables, the SoC bus and the simulator.



/// Unit tests for the hart: architectural state, execution, CSRs, traps and the MMU.
pub mod core;

/// Unit tests for decoding and compressed-instruction expansion.
pub mod isa;


/// Unit tests for the bus and RAM devices.
pub mod soc;
