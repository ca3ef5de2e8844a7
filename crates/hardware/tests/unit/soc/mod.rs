//! # SoC Components

/// Bus routing and range checks.
pub mod interconnect;
/// RAM device and its backing buffer.
pub mod memory;
