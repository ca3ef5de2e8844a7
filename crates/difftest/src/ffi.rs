//! `difftest_*` C ABI.
//!
//! The harness drives one process-wide [`RefModel`] through these symbols. Every
//! entry point locks the handle, forwards to the Rust API and aborts the process
//! on error.

use std::ffi::{c_int, c_void};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, error};

use crate::context::{CsrContext, DiffContext, Direction, PAddr, word_to_addr};
use crate::error::{DifftestError, Result};
use crate::logging;
use crate::refmodel::RefModel;

static REF: Mutex<Option<Box<RefModel>>> = Mutex::new(None);

fn fatal(op: &str, err: &DifftestError) -> ! {
    error!(op, %err, "difftest aborted");
    std::process::abort()
}

fn with_model<T>(op: &str, f: impl FnOnce(&mut RefModel) -> Result<T>) -> T {
    let mut guard = REF.lock().unwrap_or_else(PoisonError::into_inner);
    let result = guard
        .as_deref_mut()
        .ok_or(DifftestError::ContractViolation(
            "difftest_init has not been called",
        ))
        .and_then(f);
    match result {
        Ok(val) => val,
        Err(err) => fatal(op, &err),
    }
}

/// Copies `n` bytes from the DUT buffer `buf` into reference memory at `addr`.
///
/// Only `direction == DIFFTEST_TO_REF` is supported; the other direction aborts.
///
/// # Safety
///
/// `buf` must be valid for reads of `n` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn difftest_memcpy(
    addr: PAddr,
    buf: *mut c_void,
    n: usize,
    direction: bool,
) {
    with_model("difftest_memcpy", |model| {
        let direction = Direction::from(direction);
        if n == 0 {
            return model.memcpy(word_to_addr(addr), &[], direction);
        }
        if buf.is_null() {
            return Err(DifftestError::ContractViolation("null memcpy buffer"));
        }
        // SAFETY: non-null and valid for `n` bytes per the caller contract.
        let bytes = unsafe { std::slice::from_raw_parts(buf.cast::<u8>(), n) };
        model.memcpy(word_to_addr(addr), bytes, direction)
    });
}

/// Copies the GPRs and PC between `dut` (a `DiffContext`) and the reference.
///
/// # Safety
///
/// `dut` must point to a properly aligned `DiffContext`, writable when
/// `direction == DIFFTEST_TO_DUT`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn difftest_regcpy(dut: *mut c_void, direction: bool) {
    with_model("difftest_regcpy", |model| {
        // SAFETY: aligned and exclusively borrowed for the call per the caller contract.
        let ctx = unsafe { dut.cast::<DiffContext>().as_mut() }
            .ok_or(DifftestError::ContractViolation("null register context"))?;
        model.regcpy(ctx, Direction::from(direction))
    });
}

/// Copies the CSR snapshot between `dut` (a `CsrContext`) and the reference.
///
/// # Safety
///
/// `dut` must point to a properly aligned `CsrContext`, writable when
/// `direction == DIFFTEST_TO_DUT`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn difftest_csrcpy(dut: *mut c_void, direction: bool) {
    with_model("difftest_csrcpy", |model| {
        // SAFETY: aligned and exclusively borrowed for the call per the caller contract.
        let ctx = unsafe { dut.cast::<CsrContext>().as_mut() }
            .ok_or(DifftestError::ContractViolation("null CSR context"))?;
        model.csrcpy(ctx, Direction::from(direction))
    });
}

/// Steps the reference `n` times.
#[unsafe(no_mangle)]
pub extern "C" fn difftest_exec(n: u64) {
    let retired = with_model("difftest_exec", |model| model.exec(n));
    debug!(steps = n, retired, "exec");
}

/// Takes the trap with cause `no` at the reference's current PC.
#[unsafe(no_mangle)]
pub extern "C" fn difftest_raise_intr(no: u64) {
    with_model("difftest_raise_intr", |model| model.raise_intr(no));
}

/// Logs the reference's PC, privilege mode and registers.
#[unsafe(no_mangle)]
pub extern "C" fn difftest_display() {
    with_model("difftest_display", |model| {
        model.display();
        Ok(())
    });
}

/// Creates the reference model on first call and re-attaches to hart 0 on
/// every later one. `port` is accepted for ABI compatibility and ignored.
#[unsafe(no_mangle)]
pub extern "C" fn difftest_init(port: c_int) {
    logging::init();
    debug!(port, "difftest_init (port unused)");

    let mut guard = REF.lock().unwrap_or_else(PoisonError::into_inner);
    let result = match guard.as_deref_mut() {
        Some(model) => model.attach(),
        None => RefModel::with_defaults().map(|model| {
            *guard = Some(Box::new(model));
        }),
    };
    if let Err(err) = result {
        fatal("difftest_init", &err);
    }
}
