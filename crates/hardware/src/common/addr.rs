//! Physical and Virtual Address types.
//!
//! This module defines strong types for physical and virtual addresses to prevent
//! accidental mixing of address spaces. It provides the following:
//! 1. **Type Safety:** Distinguishes between virtual and physical address spaces at compile time.
//! 2. **Address Manipulation:** Page offsets and per-level virtual page numbers for the walker.
//! 3. **MMU Integration:** Acts as the primary interface for memory translation operations.

use super::constants::{PAGE_OFFSET_MASK, PAGE_SHIFT};

/// A virtual address in the RISC-V address space.
///
/// Virtual addresses are produced by software and must be translated to physical
/// addresses through the MMU before they reach the bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtAddr(pub u64);

/// A physical address in the RISC-V address space.
///
/// Physical addresses are what the bus routes on, after translation and PMP checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysAddr(pub u64);

impl VirtAddr {
    /// Creates a new virtual address from a raw 64-bit value.
    #[inline(always)]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the raw 64-bit address value.
    #[inline(always)]
    pub const fn val(&self) -> u64 {
        self.0
    }

    /// Extracts the page offset (lower 12 bits) from the virtual address.
    pub const fn page_offset(&self) -> u64 {
        self.0 & PAGE_OFFSET_MASK
    }

    /// Returns the full virtual page number (address without the page offset).
    pub const fn page_number(&self) -> u64 {
        self.0 >> PAGE_SHIFT
    }

    /// Extracts the VPN field used to index the page table at `level`.
    ///
    /// # Arguments
    ///
    /// * `level` - Page table level, 0 being the leaf level.
    /// * `bits_per_level` - Width of each VPN field (10 for Sv32, 9 for Sv39).
    ///
    /// # Returns
    ///
    /// The index into the page table at that level.
    pub const fn vpn(&self, level: u32, bits_per_level: u32) -> u64 {
        let shift = PAGE_SHIFT as u32 + level * bits_per_level;
        (self.0 >> shift) & ((1 << bits_per_level) - 1)
    }
}

impl PhysAddr {
    /// Creates a new physical address from a raw 64-bit value.
    #[inline(always)]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the raw 64-bit address value.
    #[inline(always)]
    pub const fn val(&self) -> u64 {
        self.0
    }

    /// Builds a physical address from a physical page number and a page offset.
    pub const fn from_ppn(ppn: u64, offset: u64) -> Self {
        Self((ppn << PAGE_SHIFT) | (offset & PAGE_OFFSET_MASK))
    }
}

impl std::fmt::Display for VirtAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl std::fmt::Display for PhysAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
