//! # Execution Unit Tests

/// Floating-point arithmetic, rounding and flags.
pub mod fpu;
/// Translation, TLBs and PMP.
pub mod mmu;
