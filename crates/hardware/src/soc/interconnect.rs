//! System interconnect (bus) for physical memory access.
//!
//! This module implements the bus that routes physical address accesses to devices. It provides:
//! 1. **Device registration:** Devices are added by address range and kept sorted for lookup.
//! 2. **Access routing:** Sized little-endian reads and writes, with a last-device hint.
//! 3. **Fault reporting:** Accesses that are not fully backed by one device are rejected, which
//!    the hart turns into an access fault.

use super::traits::Device;
use crate::common::PhysAddr;

/// System bus; routes accesses by physical address.
pub struct Bus {
    /// Registered devices, sorted by base address.
    devices: Vec<Box<dyn Device>>,
    last_device_idx: usize,
}

impl std::fmt::Debug for Bus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.devices.iter().map(|d| (d.name().to_string(), d.address_range())))
            .finish()
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    /// Creates an empty bus; add devices with `add_device`.
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
            last_device_idx: 0,
        }
    }

    /// Registers a device; devices are sorted by base address for lookup.
    pub fn add_device(&mut self, dev: Box<dyn Device>) {
        let (base, size) = dev.address_range();
        tracing::debug!(name = dev.name(), base = format_args!("{base:#x}"), size, "bus: device attached");
        self.devices.push(dev);
        self.devices.sort_by_key(|d| d.address_range().0);
        self.last_device_idx = 0;
    }

    /// Returns the registered devices' `(name, base, size)`.
    pub fn devices(&self) -> impl Iterator<Item = (&str, u64, u64)> {
        self.devices.iter().map(|d| {
            let (base, size) = d.address_range();
            (d.name(), base, size)
        })
    }

    /// Returns whether `[paddr, paddr + len)` is backed by a single device.
    pub fn is_valid_range(&self, paddr: u64, len: u64) -> bool {
        self.devices
            .iter()
            .any(|d| Self::contains(d.address_range(), paddr, len))
    }

    fn contains((start, size): (u64, u64), paddr: u64, len: u64) -> bool {
        paddr >= start
            && paddr
                .checked_add(len)
                .is_some_and(|end| end <= start.saturating_add(size))
    }

    fn find_device(&mut self, paddr: u64, len: u64) -> Option<(&mut Box<dyn Device>, u64)> {
        let hinted = self
            .devices
            .get(self.last_device_idx)
            .is_some_and(|d| Self::contains(d.address_range(), paddr, len));

        if !hinted {
            self.last_device_idx = self
                .devices
                .iter()
                .position(|d| Self::contains(d.address_range(), paddr, len))?;
        }

        let dev = self.devices.get_mut(self.last_device_idx)?;
        let offset = paddr - dev.address_range().0;
        Some((dev, offset))
    }

    /// Reads `buf.len()` bytes at `paddr`. Returns `None` when the range is not backed.
    pub fn read_bytes(&mut self, paddr: PhysAddr, buf: &mut [u8]) -> Option<()> {
        let (dev, offset) = self.find_device(paddr.val(), buf.len() as u64)?;
        dev.read_bytes(offset, buf);
        Some(())
    }

    /// Writes `data` at `paddr`. Returns `None` when the range is not backed.
    pub fn write_bytes(&mut self, paddr: PhysAddr, data: &[u8]) -> Option<()> {
        let (dev, offset) = self.find_device(paddr.val(), data.len() as u64)?;
        dev.write_bytes(offset, data);
        Some(())
    }

    /// Reads a little-endian value of `size` bytes (1, 2, 4 or 8), zero-extended.
    pub fn read(&mut self, paddr: PhysAddr, size: usize) -> Option<u64> {
        let mut bytes = [0u8; 8];
        self.read_bytes(paddr, bytes.get_mut(..size)?)?;
        Some(u64::from_le_bytes(bytes))
    }

    /// Writes the low `size` bytes (1, 2, 4 or 8) of `val`, little-endian.
    pub fn write(&mut self, paddr: PhysAddr, size: usize, val: u64) -> Option<()> {
        let bytes = val.to_le_bytes();
        self.write_bytes(paddr, bytes.get(..size)?)
    }
}
