//! Translation Lookaside Buffer (TLB).
//!
//! A direct-mapped cache of leaf translations. It stores the mapping between
//! Virtual Page Numbers (VPN) and 4 KiB Physical Page Numbers (PPN), along with
//! the permission bits needed to re-check an access without walking the tables.

/// Default number of entries in each TLB.
pub const DEFAULT_TLB_SIZE: usize = 64;

/// Permission bits cached with a translation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TlbPerms {
    /// Readable.
    pub r: bool,
    /// Writable. Only cached once the PTE's dirty bit is set, so the first store
    /// to a clean page misses and lets the walker set D.
    pub w: bool,
    /// Executable.
    pub x: bool,
    /// Accessible from user mode.
    pub u: bool,
}

#[derive(Clone, Copy, Debug, Default)]
struct TlbEntry {
    vpn: u64,
    ppn: u64,
    perms: TlbPerms,
    valid: bool,
}

/// Translation Lookaside Buffer.
#[derive(Clone, Debug)]
pub struct Tlb {
    entries: Vec<TlbEntry>,
    mask: usize,
}

impl Default for Tlb {
    fn default() -> Self {
        Self::new(DEFAULT_TLB_SIZE)
    }
}

impl Tlb {
    /// Creates a TLB with `size` entries, rounded up to a power of two.
    pub fn new(size: usize) -> Self {
        let size = size.max(1).next_power_of_two();
        Self {
            entries: vec![TlbEntry::default(); size],
            mask: size - 1,
        }
    }

    /// Looks up `vpn`, returning the cached PPN and permissions on a hit.
    #[inline(always)]
    pub fn lookup(&self, vpn: u64) -> Option<(u64, TlbPerms)> {
        self.entries
            .get((vpn as usize) & self.mask)
            .filter(|e| e.valid && e.vpn == vpn)
            .map(|e| (e.ppn, e.perms))
    }

    /// Caches a translation built from a leaf PTE's flag bits.
    pub fn insert(&mut self, vpn: u64, ppn: u64, pte_flags: u64) {
        let bit = |n: u32| (pte_flags >> n) & 1 != 0;
        let dirty = bit(7);
        let perms = TlbPerms {
            r: bit(1),
            w: bit(2) && dirty,
            x: bit(3),
            u: bit(4),
        };
        if let Some(slot) = self.entries.get_mut((vpn as usize) & self.mask) {
            *slot = TlbEntry {
                vpn,
                ppn,
                perms,
                valid: true,
            };
        }
    }

    /// Invalidates every entry (SFENCE.VMA, `satp` writes).
    pub fn flush(&mut self) {
        for e in &mut self.entries {
            e.valid = false;
        }
    }
}
