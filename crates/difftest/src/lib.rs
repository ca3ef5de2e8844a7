//! NEMU-compatible difftest reference model.
//!
//! This crate wraps the `rvdiff-core` engine in the reference-model interface a
//! differential-testing harness expects:
//! 1. **Rust API:** An explicitly owned [`RefModel`] handle with typed register and CSR
//!    snapshots ([`DiffContext`], [`CsrContext`]) and bounds-checked memory slices.
//! 2. **C ABI:** The `difftest_*` symbols ([`ffi`]) over a single process-wide handle,
//!    built into a `cdylib`/`staticlib` that DUT harnesses load.
//! 3. **Build flavours:** Cargo features `rv32` (32-bit `word_t`) and `rve` (16 GPRs).

/// Compile-time reference configuration.
pub mod config;
/// Register and CSR snapshot layouts shared with the DUT.
pub mod context;
/// Error type of the Rust API.
pub mod error;
/// `difftest_*` C ABI.
pub mod ffi;
/// Log subscriber installation.
pub mod logging;
/// The reference-model handle.
pub mod refmodel;

pub use crate::context::{
    CsrContext, DIFFTEST_TO_DUT, DIFFTEST_TO_REF, DiffContext, Direction, NR_GPR, PAddr, Word,
};
pub use crate::error::{DifftestError, Result};
pub use crate::refmodel::RefModel;
