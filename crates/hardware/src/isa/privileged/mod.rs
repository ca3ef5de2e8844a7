//! Privileged-architecture encodings.
//!
//! Everything the executor needs to recognise system instructions and to encode
//! `xcause` values: the SYSTEM major opcode with its fixed encodings and the
//! exception/interrupt code tables.

/// `xcause` exception and interrupt codes.
pub mod cause;

/// SYSTEM-opcode encodings (environment calls, trap returns, WFI, fences, Zicsr).
pub mod opcodes;
