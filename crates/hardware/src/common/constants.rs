//! Architectural constants shared by the engine.
//!
//! Paging geometry, instruction-length encoding, the `xcause` interrupt flag
//! and the default RAM placement of a difftest reference.

/// Base page size (4 KiB) for Sv32 and Sv39.
pub const PAGE_SIZE: u64 = 1 << PAGE_SHIFT;

/// log2 of [`PAGE_SIZE`].
pub const PAGE_SHIFT: u64 = 12;

/// In-page offset bits of an address.
pub const PAGE_OFFSET_MASK: u64 = PAGE_SIZE - 1;

/// Length in bytes of an RVC parcel.
pub const INSTRUCTION_SIZE_16: u64 = 2;

/// Length in bytes of a full-width instruction.
pub const INSTRUCTION_SIZE_32: u64 = 4;

/// Low two bits of the first parcel, which select the encoding length.
pub const COMPRESSED_INSTRUCTION_MASK: u16 = 0b11;

/// Length bits of a 32-bit instruction; any other value is an RVC quadrant.
pub const UNCOMPRESSED_INSTRUCTION_VALUE: u16 = 0b11;

/// `xcause` interrupt flag on RV64.
pub const CAUSE_INTERRUPT_BIT: u64 = 1 << 63;

/// `xcause` interrupt flag on RV32.
pub const CAUSE_INTERRUPT_BIT_32: u64 = 1 << 31;

/// Reset PC and base of the default RAM region.
pub const DRAM_BASE: u64 = 0x8000_0000;

/// Size of the default RAM region (128 MiB).
pub const DRAM_SIZE: u64 = 0x0800_0000;
