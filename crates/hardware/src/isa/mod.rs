//! Instruction Set Architecture (ISA) Definitions.
//!
//! Contains opcodes, function codes, and decoding logic, organized by RISC-V
//! extension. Encodings are shared between RV32 and RV64; instructions that only
//! exist on RV64 are marked as such and rejected by the executor on RV32 harts.
//!
//! # Extensions
//!
//! * `rvi`: Base Integer Instruction Set (RV32I/RV64I, and RVE which reuses it).
//! * `rvm`: Integer Multiplication and Division.
//! * `rva`: Atomic Instructions.
//! * `rvc`: Compressed Instructions.
//! * `rvf`: Single- and Double-Precision Floating-Point (F, D).
//! * `privileged`: Privileged Architecture (trap causes, system instructions).

/// ABI register names.
pub mod abi;

/// Instruction decoding for the 32-bit instruction formats.
pub mod decode;

/// Instruction field extraction.
pub mod instruction;

/// Privileged architecture definitions (trap causes, system instructions).
pub mod privileged;

/// Atomic memory operations extension.
pub mod rva;

/// Base integer instruction set.
pub mod rvi;

/// Integer multiply/divide extension.
pub mod rvm;

/// Compressed instruction extension (16-bit encodings).
pub mod rvc;

/// Floating-point extensions (F and D).
pub mod rvf;
