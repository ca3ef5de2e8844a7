//! # Hart Core Tests

/// Privilege modes, ISA parsing and the register file.
pub mod arch;
/// Execution, memory access and trap delivery.
pub mod cpu;
/// CSR access control and WARL behaviour.
pub mod csr;
/// MMU units.
pub mod units;
