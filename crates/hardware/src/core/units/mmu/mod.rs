//! Memory Management Unit (MMU).
//!
//! This module implements virtual-to-physical address translation and physical
//! memory protection. It supports Bare, Sv32 (RV32) and Sv39 (RV64) translation,
//! caches leaf translations in separate instruction and data TLBs, and applies
//! PMP to every final physical address and to page-table reads.

/// Physical Memory Protection (PMP).
pub mod pmp;

/// Page table walker for Sv32 and Sv39.
pub mod ptw;

/// Translation Lookaside Buffer (TLB).
pub mod tlb;

use self::pmp::Pmp;
use self::ptw::{PagingScheme, SV32, SV39};
use self::tlb::Tlb;
use crate::common::{AccessType, PhysAddr, Trap, VirtAddr, Xlen};
use crate::core::arch::csr::{
    MSTATUS_MXR, MSTATUS_SUM, SATP_MODE_SV39, SATP32_MODE, SATP32_PPN_MASK, SATP64_MODE_SHIFT,
    SATP64_PPN_MASK,
};
use crate::core::arch::mode::PrivilegeMode;
use crate::soc::interconnect::Bus;

/// Translation state of the hart for one access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Translation {
    /// Effective privilege (already adjusted for `mstatus.MPRV`).
    pub privilege: PrivilegeMode,
    /// Active paging scheme, `None` for Bare.
    pub scheme: Option<PagingScheme>,
    /// Root page table PPN from `satp`.
    pub root_ppn: u64,
    /// `mstatus.SUM`.
    pub sum: bool,
    /// `mstatus.MXR`.
    pub mxr: bool,
    /// Hart width; bare addresses are truncated to it.
    pub xlen: Xlen,
}

impl Translation {
    /// Builds the translation state from `satp`, `mstatus` and the effective privilege.
    pub const fn new(xlen: Xlen, satp: u64, mstatus: u64, privilege: PrivilegeMode) -> Self {
        let (scheme, root_ppn) = match xlen {
            Xlen::X64 => (
                if satp >> SATP64_MODE_SHIFT == SATP_MODE_SV39 {
                    Some(SV39)
                } else {
                    None
                },
                satp & SATP64_PPN_MASK,
            ),
            Xlen::X32 => (
                if satp & SATP32_MODE != 0 { Some(SV32) } else { None },
                satp & SATP32_PPN_MASK,
            ),
        };
        Self {
            privilege,
            scheme,
            root_ppn,
            sum: mstatus & MSTATUS_SUM != 0,
            mxr: mstatus & MSTATUS_MXR != 0,
            xlen,
        }
    }
}

/// Memory Management Unit.
#[derive(Clone, Debug)]
pub struct Mmu {
    /// Data TLB for load/store translation.
    pub dtlb: Tlb,
    /// Instruction TLB for fetch translation.
    pub itlb: Tlb,
    /// Physical memory protection registers.
    pub pmp: Pmp,
}

impl Mmu {
    /// Creates an MMU with `tlb_size`-entry TLBs and `pmp_regions` PMP entries.
    pub fn new(tlb_size: usize, pmp_regions: usize, xlen: Xlen) -> Self {
        Self {
            dtlb: Tlb::new(tlb_size),
            itlb: Tlb::new(tlb_size),
            pmp: Pmp::new(pmp_regions, xlen),
        }
    }

    /// Invalidates both TLBs.
    pub fn flush_tlbs(&mut self) {
        self.itlb.flush();
        self.dtlb.flush();
    }

    /// Translates `vaddr` and checks PMP for an access of `size` bytes.
    ///
    /// Machine mode and Bare `satp` bypass translation. On a TLB hit whose cached
    /// permissions refuse the access the walk is redone, so dirty-bit updates and
    /// the precise fault come from the page tables.
    ///
    /// # Errors
    ///
    /// Page faults for translation failures, access faults for PMP denial.
    pub fn translate(
        &mut self,
        vaddr: VirtAddr,
        size: u64,
        access: AccessType,
        ctx: &Translation,
        bus: &mut Bus,
    ) -> Result<PhysAddr, Trap> {
        let vaddr = VirtAddr::new(ctx.xlen.zext(vaddr.val()));

        let paddr = match ctx.scheme {
            Some(scheme) if ctx.privilege != PrivilegeMode::Machine => {
                self.translate_paged(vaddr, access, ctx, &scheme, bus)?
            }
            _ => PhysAddr::new(vaddr.val()),
        };

        if self.pmp.allows(paddr.val(), size, access, ctx.privilege) {
            Ok(paddr)
        } else {
            Err(access.access_fault(vaddr.val()))
        }
    }

    fn translate_paged(
        &mut self,
        vaddr: VirtAddr,
        access: AccessType,
        ctx: &Translation,
        scheme: &PagingScheme,
        bus: &mut Bus,
    ) -> Result<PhysAddr, Trap> {
        if scheme.levels == SV39.levels {
            // Bits 63:39 must replicate bit 38.
            let top = (vaddr.val() as i64) >> 38;
            if top != 0 && top != -1 {
                return Err(access.page_fault(vaddr.val()));
            }
        }

        let tlb = if access == AccessType::Fetch {
            &self.itlb
        } else {
            &self.dtlb
        };
        if let Some((ppn, perms)) = tlb.lookup(vaddr.page_number())
            && ptw::leaf_permits(perms.r, perms.w, perms.x, perms.u, access, ctx)
        {
            return Ok(PhysAddr::from_ppn(ppn, vaddr.page_offset()));
        }

        ptw::page_table_walk(self, vaddr, access, ctx, scheme, bus)
    }
}
