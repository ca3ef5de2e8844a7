//! Physical System Memory (DRAM).
//!
//! This module implements the RAM device. It provides:
//! 1. **Buffer:** Backing storage (`DramBuffer`) for RAM contents.
//! 2. **Memory:** Device implementation that maps the buffer at a physical base address.

/// DRAM buffer implementation (mmap-backed on Unix).
pub mod buffer;

use self::buffer::DramBuffer;
use crate::soc::traits::Device;

/// A RAM region mapped at a fixed physical base.
#[derive(Debug)]
pub struct Memory {
    buffer: DramBuffer,
    base_addr: u64,
}

impl Memory {
    /// Maps `buffer` at `base_addr`.
    pub const fn new(buffer: DramBuffer, base_addr: u64) -> Self {
        Self { buffer, base_addr }
    }

    /// Copies `data` into memory at `offset` bytes from the base.
    ///
    /// Returns false, leaving memory untouched, when the data would not fit.
    pub fn load(&mut self, data: &[u8], offset: usize) -> bool {
        let Some(dst) = offset
            .checked_add(data.len())
            .and_then(|end| self.buffer.as_mut_slice().get_mut(offset..end))
        else {
            return false;
        };
        dst.copy_from_slice(data);
        true
    }
}

impl Device for Memory {
    fn name(&self) -> &str {
        "DRAM"
    }

    fn address_range(&self) -> (u64, u64) {
        (self.base_addr, self.buffer.len() as u64)
    }

    fn read_bytes(&mut self, offset: u64, buf: &mut [u8]) {
        let start = offset as usize;
        if let Some(src) = self.buffer.as_slice().get(start..start + buf.len()) {
            buf.copy_from_slice(src);
        }
    }

    fn write_bytes(&mut self, offset: u64, data: &[u8]) {
        let _ = self.load(data, offset as usize);
    }
}
