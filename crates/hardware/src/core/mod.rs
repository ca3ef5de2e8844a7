//! The hart.
//!
//! A hart is its architectural state plus a step function; it owns no memory and
//! borrows the bus for every access.

/// Architectural definitions: CSR map, register file, `misa`, privilege modes.
pub mod arch;

/// Hart state, executor, CSR semantics and trap delivery.
pub mod cpu;

/// Memory management: TLB, page-table walker, PMP.
pub mod units;

pub use self::cpu::Cpu;
pub use self::cpu::execution::StepOutcome;
