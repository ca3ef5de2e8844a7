//! Physical Memory Protection (PMP).
//!
//! This module implements RISC-V Physical Memory Protection, which restricts
//! physical memory access based on the current privilege mode and a set of
//! configuration (`pmpcfg`) and address (`pmpaddr`) registers. The number of
//! implemented entries is configurable (0 to 64); unimplemented entries read
//! as zero and ignore writes.
//!
//! PMP supports three address-matching modes:
//! - **TOR** (Top of Range): region is `[pmpaddr[i-1], pmpaddr[i])`.
//! - **NA4**: Naturally aligned 4-byte region.
//! - **NAPOT**: Naturally aligned power-of-two region.

use crate::common::{AccessType, Xlen};
use crate::core::arch::mode::PrivilegeMode;

/// Architectural maximum number of PMP entries.
pub const PMP_MAX_ENTRIES: usize = 64;

const A_SHIFT: u8 = 3;
const A_MASK: u8 = 0x3;

const PMP_R: u8 = 1 << 0;
const PMP_W: u8 = 1 << 1;
const PMP_X: u8 = 1 << 2;
const PMP_L: u8 = 1 << 7;

/// Writable bits of a configuration byte (bits 6:5 are reserved).
const CFG_WRITABLE: u8 = PMP_R | PMP_W | PMP_X | (A_MASK << A_SHIFT) | PMP_L;

/// Implemented bits of `pmpaddr` on RV64 (physical address bits 55:2).
const ADDR_MASK_64: u64 = (1 << 54) - 1;

/// Address matching mode extracted from pmpcfg.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PmpAddrMatch {
    /// Entry disabled.
    Off = 0,
    /// Top of Range: region is `[pmpaddr[i-1], pmpaddr[i])`.
    Tor = 1,
    /// Naturally aligned 4-byte region.
    Na4 = 2,
    /// Naturally aligned power-of-two region.
    Napot = 3,
}

impl PmpAddrMatch {
    /// Decodes the 2-bit A field of a pmpcfg byte.
    pub const fn from_cfg(cfg: u8) -> Self {
        match (cfg >> A_SHIFT) & A_MASK {
            0 => Self::Off,
            1 => Self::Tor,
            2 => Self::Na4,
            _ => Self::Napot,
        }
    }
}

/// Result of a PMP permission check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PmpResult {
    /// Access is permitted.
    Allow,
    /// Access is denied by a matching (or partially matching) entry.
    Deny,
    /// No entry matched; S and U accesses are denied when any entry is implemented.
    NoMatch,
}

/// One PMP entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PmpEntry {
    /// Configuration byte.
    pub cfg: u8,
    /// Raw pmpaddr value (byte address >> 2).
    pub addr: u64,
}

impl PmpEntry {
    /// Returns the address-matching mode.
    pub const fn match_mode(&self) -> PmpAddrMatch {
        PmpAddrMatch::from_cfg(self.cfg)
    }

    /// Returns true if the L (lock) bit is set.
    pub const fn is_locked(&self) -> bool {
        self.cfg & PMP_L != 0
    }

    /// Returns true if the entry grants `access`.
    pub const fn permits(&self, access: AccessType) -> bool {
        let bit = match access {
            AccessType::Read => PMP_R,
            AccessType::Write => PMP_W,
            AccessType::Fetch => PMP_X,
        };
        self.cfg & bit != 0
    }
}

/// Physical Memory Protection unit.
#[derive(Clone, Debug)]
pub struct Pmp {
    entries: Vec<PmpEntry>,
    xlen: Xlen,
}

impl Pmp {
    /// Creates a PMP unit with `count` implemented entries, all disabled.
    ///
    /// `count` is clamped to [`PMP_MAX_ENTRIES`].
    pub fn new(count: usize, xlen: Xlen) -> Self {
        Self {
            entries: vec![PmpEntry::default(); count.min(PMP_MAX_ENTRIES)],
            xlen,
        }
    }

    /// Number of implemented entries.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Returns the entries for inspection.
    pub fn entries(&self) -> &[PmpEntry] {
        &self.entries
    }

    /// Reads the configuration byte of entry `idx` (zero when unimplemented).
    pub fn get_cfg(&self, idx: usize) -> u8 {
        self.entries.get(idx).map_or(0, |e| e.cfg)
    }

    /// Writes the configuration byte of entry `idx`.
    ///
    /// Ignored for locked or unimplemented entries. The reserved W-without-R
    /// combination is stored with W cleared.
    pub fn set_cfg(&mut self, idx: usize, cfg: u8) {
        let Some(entry) = self.entries.get_mut(idx) else {
            return;
        };
        if entry.is_locked() {
            return;
        }
        let mut cfg = cfg & CFG_WRITABLE;
        if cfg & PMP_R == 0 {
            cfg &= !PMP_W;
        }
        entry.cfg = cfg;
    }

    /// Reads the address register of entry `idx` (zero when unimplemented).
    pub fn get_addr(&self, idx: usize) -> u64 {
        self.entries.get(idx).map_or(0, |e| e.addr)
    }

    /// Writes the address register of entry `idx`.
    ///
    /// Ignored when the entry is locked, or when the next entry is a locked TOR
    /// entry that uses this address as its bottom.
    pub fn set_addr(&mut self, idx: usize, addr: u64) {
        let next_locks = self
            .entries
            .get(idx + 1)
            .is_some_and(|n| n.is_locked() && n.match_mode() == PmpAddrMatch::Tor);
        let mask = match self.xlen {
            Xlen::X32 => 0xFFFF_FFFF,
            Xlen::X64 => ADDR_MASK_64,
        };
        if let Some(entry) = self.entries.get_mut(idx)
            && !entry.is_locked()
            && !next_locks
        {
            entry.addr = addr & mask;
        }
    }

    /// Reads `pmpcfg<reg>`. On RV64 only even registers exist and each packs eight
    /// entries; on RV32 each register packs four.
    pub fn read_cfg_reg(&self, reg: usize) -> u64 {
        let per_reg = self.cfgs_per_reg();
        (0..per_reg).fold(0, |acc, i| {
            acc | (u64::from(self.get_cfg(reg * 4 + i)) << (i * 8))
        })
    }

    /// Writes `pmpcfg<reg>`, byte by byte.
    pub fn write_cfg_reg(&mut self, reg: usize, val: u64) {
        for i in 0..self.cfgs_per_reg() {
            self.set_cfg(reg * 4 + i, (val >> (i * 8)) as u8);
        }
    }

    const fn cfgs_per_reg(&self) -> usize {
        match self.xlen {
            Xlen::X32 => 4,
            Xlen::X64 => 8,
        }
    }

    /// Byte range `[lo, hi)` covered by entry `idx`, or `None` if it matches nothing.
    fn range(&self, idx: usize) -> Option<(u64, u64)> {
        let entry = self.entries.get(idx)?;
        match entry.match_mode() {
            PmpAddrMatch::Off => None,
            PmpAddrMatch::Tor => {
                let lo = idx.checked_sub(1).map_or(0, |p| self.get_addr(p) << 2);
                let hi = entry.addr << 2;
                (lo < hi).then_some((lo, hi))
            }
            PmpAddrMatch::Na4 => {
                let base = entry.addr << 2;
                Some((base, base + 4))
            }
            PmpAddrMatch::Napot => {
                let trailing = entry.addr.trailing_ones();
                let size = 1u64.checked_shl(trailing + 3).unwrap_or(0);
                if size == 0 {
                    return Some((0, u64::MAX));
                }
                let base = (entry.addr << 2) & !(size - 1);
                Some((base, base.saturating_add(size)))
            }
        }
    }

    /// Checks an access of `size` bytes at physical address `addr`.
    ///
    /// Entries are searched in order; the first one that overlaps the access decides.
    /// An access only partially covered by that entry is denied. Machine mode bypasses
    /// unlocked entries and is allowed when nothing matches.
    pub fn check(
        &self,
        addr: u64,
        size: u64,
        access: AccessType,
        privilege: PrivilegeMode,
    ) -> PmpResult {
        let end = addr.saturating_add(size);
        let machine = privilege == PrivilegeMode::Machine;

        for idx in 0..self.entries.len() {
            let Some((lo, hi)) = self.range(idx) else {
                continue;
            };
            let overlaps = addr < hi && end > lo;
            if !overlaps {
                continue;
            }
            if addr < lo || end > hi {
                return PmpResult::Deny;
            }

            let entry = &self.entries[idx];
            if machine && !entry.is_locked() {
                return PmpResult::Allow;
            }
            return if entry.permits(access) {
                PmpResult::Allow
            } else {
                PmpResult::Deny
            };
        }

        if machine { PmpResult::Allow } else { PmpResult::NoMatch }
    }

    /// Convenience wrapper: true when the access is allowed, treating an unmatched
    /// S/U access as denied whenever at least one entry is implemented.
    pub fn allows(&self, addr: u64, size: u64, access: AccessType, privilege: PrivilegeMode) -> bool {
        match self.check(addr, size, access, privilege) {
            PmpResult::Allow => true,
            PmpResult::Deny => false,
            PmpResult::NoMatch => self.entries.is_empty(),
        }
    }
}
