//! Functional units.
//!
//! The reference model is a single-step functional hart: the memory management
//! unit is the only unit with state of its own, and the FPU is a set of pure
//! functions over register images.

/// Floating-Point Unit (F and D arithmetic, conversions, flags).
pub mod fpu;

/// Memory Management Unit with TLBs, page table walker and PMP.
pub mod mmu;
