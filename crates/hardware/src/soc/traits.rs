//! Device trait for bus-attached components.
//!
//! This module defines the `Device` trait implemented by everything the bus routes to. It provides:
//! 1. **Identification:** `name` and `address_range` for bus routing.
//! 2. **Access:** Little-endian byte-slice reads and writes at device-relative offsets.
//!
//! The bus only forwards accesses that lie entirely inside `address_range`, so
//! implementors may assume `offset + len <= size`.

/// A component mapped into the physical address space.
pub trait Device: Send {
    /// Returns a short name for this device (e.g., `"DRAM"`).
    fn name(&self) -> &str;

    /// Returns `(base_address, size_in_bytes)` of the mapped region.
    fn address_range(&self) -> (u64, u64);

    /// Fills `buf` with the bytes starting at `offset`.
    fn read_bytes(&mut self, offset: u64, buf: &mut [u8]);

    /// Stores `data` starting at `offset`.
    fn write_bytes(&mut self, offset: u64, data: &[u8]);
}
