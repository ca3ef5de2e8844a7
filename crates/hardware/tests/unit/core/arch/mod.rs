//! # Architectural State Tests

/// Register file.
pub mod gpr;
/// ISA string parsing and `misa`.
pub mod isa;
/// Privilege modes.
pub mod mode;
