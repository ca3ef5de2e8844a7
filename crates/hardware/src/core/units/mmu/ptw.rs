//! Hardware Page Table Walker (PTW) for Sv32 and Sv39.
//!
//! This module implements the page table walking algorithm. It traverses the
//! multi-level page table rooted at `satp.PPN`, checks the leaf permissions,
//! updates the Accessed/Dirty bits in memory, and fills the TLB. Every PTE read
//! is itself subject to PMP as a supervisor-mode access.

use super::{Mmu, Translation};
use crate::common::{AccessType, PAGE_SHIFT, PhysAddr, Trap, VirtAddr};
use crate::core::arch::mode::PrivilegeMode;
use crate::soc::interconnect::Bus;

const PTE_V: u64 = 1 << 0;
const PTE_R: u64 = 1 << 1;
const PTE_W: u64 = 1 << 2;
const PTE_X: u64 = 1 << 3;
const PTE_U: u64 = 1 << 4;
const PTE_A: u64 = 1 << 6;
const PTE_D: u64 = 1 << 7;
const PTE_PPN_SHIFT: u64 = 10;

/// Sv39 PTE bits 63:54 (Svpbmt/Svnapot and reserved) must be zero.
const SV39_RESERVED: u64 = 0x3FF << 54;

/// Geometry of a paging scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PagingScheme {
    /// Number of table levels.
    pub levels: u32,
    /// Width of each VPN field.
    pub vpn_bits: u32,
    /// Size of a PTE in bytes.
    pub pte_size: usize,
    /// Width of the PTE's PPN field.
    pub ppn_bits: u32,
    /// PTE bits that must be zero.
    pub reserved: u64,
}

/// Sv32: two levels of 4-byte PTEs, 10-bit VPN fields, 34-bit physical addresses.
pub const SV32: PagingScheme = PagingScheme {
    levels: 2,
    vpn_bits: 10,
    pte_size: 4,
    ppn_bits: 22,
    reserved: 0,
};

/// Sv39: three levels of 8-byte PTEs, 9-bit VPN fields, 56-bit physical addresses.
pub const SV39: PagingScheme = PagingScheme {
    levels: 3,
    vpn_bits: 9,
    pte_size: 8,
    ppn_bits: 44,
    reserved: SV39_RESERVED,
};

/// A raw Page Table Entry.
#[derive(Clone, Copy, Debug)]
struct Pte(u64);

impl Pte {
    const fn has(self, bit: u64) -> bool {
        self.0 & bit != 0
    }

    const fn ppn(self, scheme: &PagingScheme) -> u64 {
        (self.0 >> PTE_PPN_SHIFT) & ((1 << scheme.ppn_bits) - 1)
    }

    /// V=0, or the reserved W-without-R encoding, or reserved bits set.
    const fn is_invalid(self, scheme: &PagingScheme) -> bool {
        !self.has(PTE_V) || (!self.has(PTE_R) && self.has(PTE_W)) || self.0 & scheme.reserved != 0
    }

    /// A valid entry with R=W=X=0 points to the next level.
    const fn is_pointer(self) -> bool {
        !self.has(PTE_R) && !self.has(PTE_W) && !self.has(PTE_X)
    }
}

/// Leaf permission check shared by the walker and TLB hits.
pub(super) fn leaf_permits(
    r: bool,
    w: bool,
    x: bool,
    u: bool,
    access: AccessType,
    ctx: &Translation,
) -> bool {
    let kind_ok = match access {
        AccessType::Fetch => x,
        AccessType::Read => r || (x && ctx.mxr),
        AccessType::Write => w,
    };
    let mode_ok = match ctx.privilege {
        PrivilegeMode::User => u,
        PrivilegeMode::Supervisor => !u || (ctx.sum && access != AccessType::Fetch),
        PrivilegeMode::Machine => true,
    };
    kind_ok && mode_ok
}

/// Walks the page table for `vaddr`.
///
/// # Returns
///
/// The physical address, or the page fault (bad entry, permission) or access fault
/// (PMP-denied or unbacked PTE) to raise.
pub fn page_table_walk(
    mmu: &mut Mmu,
    vaddr: VirtAddr,
    access: AccessType,
    ctx: &Translation,
    scheme: &PagingScheme,
    bus: &mut Bus,
) -> Result<PhysAddr, Trap> {
    let page_fault = access.page_fault(vaddr.val());
    let access_fault = access.access_fault(vaddr.val());
    let pte_size = scheme.pte_size as u64;

    let mut table = ctx.root_ppn << PAGE_SHIFT;

    for level in (0..scheme.levels).rev() {
        let pte_addr = table + vaddr.vpn(level, scheme.vpn_bits) * pte_size;

        if !mmu
            .pmp
            .allows(pte_addr, pte_size, AccessType::Read, PrivilegeMode::Supervisor)
        {
            return Err(access_fault);
        }
        let pte = Pte(bus
            .read(PhysAddr::new(pte_addr), scheme.pte_size)
            .ok_or(access_fault)?);

        if pte.is_invalid(scheme) {
            return Err(page_fault);
        }

        if pte.is_pointer() {
            if level == 0 {
                return Err(page_fault);
            }
            table = pte.ppn(scheme) << PAGE_SHIFT;
            continue;
        }

        if !leaf_permits(
            pte.has(PTE_R),
            pte.has(PTE_W),
            pte.has(PTE_X),
            pte.has(PTE_U),
            access,
            ctx,
        ) {
            return Err(page_fault);
        }

        // Superpage PPN fields below this level must be zero.
        let low_ppn_mask = (1u64 << (level * scheme.vpn_bits)) - 1;
        if pte.ppn(scheme) & low_ppn_mask != 0 {
            return Err(page_fault);
        }

        let mut updated = pte.0 | PTE_A;
        if access == AccessType::Write {
            updated |= PTE_D;
        }
        if updated != pte.0 {
            if !mmu
                .pmp
                .allows(pte_addr, pte_size, AccessType::Write, PrivilegeMode::Supervisor)
            {
                return Err(access_fault);
            }
            bus.write(PhysAddr::new(pte_addr), scheme.pte_size, updated)
                .ok_or(access_fault)?;
        }

        let ppn = pte.ppn(scheme) | (vaddr.page_number() & low_ppn_mask);
        let paddr = PhysAddr::from_ppn(ppn, vaddr.page_offset());

        let tlb = if access == AccessType::Fetch {
            &mut mmu.itlb
        } else {
            &mut mmu.dtlb
        };
        tlb.insert(vaddr.page_number(), ppn, updated);

        tracing::trace!(%vaddr, %paddr, level, "ptw: leaf");
        return Ok(paddr);
    }

    Err(page_fault)
}
