//! Shared test infrastructure.

#![allow(dead_code)]

/// Simulator-backed test harness.
pub mod harness;
