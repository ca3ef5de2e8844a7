//! Simulation driver.
//!
//! Provides the [`Simulator`], which owns the harts and the physical bus and
//! drives execution one step at a time.

/// Simulator construction and stepping.
pub mod simulator;

pub use simulator::Simulator;
