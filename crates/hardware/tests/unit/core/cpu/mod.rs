//! # Hart Execution Tests

/// Integer, M, A and Zicsr instruction semantics.
pub mod execution;
/// Trap delivery, returns and interrupts.
pub mod trap_handling;
