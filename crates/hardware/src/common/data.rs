//! Memory Access Types.
//!
//! This module defines the classification of memory accesses used throughout the model.
//! These types are used for the following:
//! 1. **Permission Validation:** Checking Read/Write/Execute (RWX) permissions in the MMU and PMP.
//! 2. **Fault Generation:** Determining the correct page-fault, access-fault or misaligned trap.

use super::error::Trap;

/// Type of memory access operation.
///
/// Used to distinguish between instruction fetches, data loads, and data stores
/// for proper memory management and permission enforcement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessType {
    /// Instruction fetch access. Requires Execute (X) permission.
    Fetch,

    /// Data read access. Requires Read (R) permission, or X with `mstatus.MXR`.
    Read,

    /// Data write access, including AMOs and store-conditionals.
    /// Requires Write (W) permission.
    Write,
}

impl AccessType {
    /// Page-fault trap matching this access kind.
    pub const fn page_fault(self, addr: u64) -> Trap {
        match self {
            Self::Fetch => Trap::InstructionPageFault(addr),
            Self::Read => Trap::LoadPageFault(addr),
            Self::Write => Trap::StorePageFault(addr),
        }
    }

    /// Access-fault trap matching this access kind.
    pub const fn access_fault(self, addr: u64) -> Trap {
        match self {
            Self::Fetch => Trap::InstructionAccessFault(addr),
            Self::Read => Trap::LoadAccessFault(addr),
            Self::Write => Trap::StoreAccessFault(addr),
        }
    }

    /// Address-misaligned trap matching this access kind.
    pub const fn misaligned(self, addr: u64) -> Trap {
        match self {
            Self::Fetch => Trap::InstructionAddressMisaligned(addr),
            Self::Read => Trap::LoadAddressMisaligned(addr),
            Self::Write => Trap::StoreAddressMisaligned(addr),
        }
    }
}
