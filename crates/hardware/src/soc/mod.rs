//! Physical address space.
//!
//! A [`Bus`] of non-overlapping [`Device`]s; the only built-in device is the RAM
//! [`Memory`], one per configured region.

/// Address routing.
pub mod interconnect;

/// RAM regions.
pub mod memory;

/// The bus-attached device interface.
pub mod traits;

pub use interconnect::Bus;
pub use memory::Memory;
pub use traits::Device;
