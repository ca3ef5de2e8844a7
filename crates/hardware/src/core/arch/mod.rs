//! RISC-V architecture-specific components.
//!
//! This module contains the implementation of core RISC-V architectural elements.
//! It includes the following modules:
//! 1. **CSRs:** Control and Status Register addresses, field masks and storage.
//! 2. **GPRs:** General-Purpose Register file implementation.
//! 3. **FPRs:** Floating-Point Register file implementation.
//! 4. **ISA:** ISA-string parsing and the `misa` encoding.
//! 5. **Modes:** Privilege mode definitions and the implemented-mode set.
//! 6. **Traps:** Interrupt priority selection.

/// Control and Status Register (CSR) definitions and storage.
pub mod csr;

/// Floating-Point Register file implementation.
pub mod fpr;

/// General-Purpose Register file implementation.
pub mod gpr;

/// ISA description and `misa` encoding.
pub mod misa;

/// Privilege mode definitions.
pub mod mode;

/// Interrupt priority selection.
pub mod trap;
