//! Memory Access Path.
//!
//! This module implements the hart's view of memory: every access is translated
//! by the MMU, checked by PMP and then routed to the physical bus. It provides:
//! 1. **Effective Privilege:** `mstatus.MPRV` makes loads and stores use `mstatus.MPP`.
//! 2. **Alignment:** Misaligned accesses trap, or are split into bytes when the hart
//!    is configured to support them.
//! 3. **Atomics:** Translation of AMO and LR/SC addresses, which must always be aligned.

use super::Cpu;
use crate::common::{AccessType, PhysAddr, Trap, VirtAddr};
use crate::core::arch::csr::{MSTATUS_MPP, MSTATUS_MPP_SHIFT, MSTATUS_MPRV};
use crate::core::arch::mode::PrivilegeMode;
use crate::core::units::mmu::Translation;
use crate::soc::interconnect::Bus;

impl Cpu {
    /// Privilege used for translation and PMP of an access.
    pub fn effective_privilege(&self, access: AccessType) -> PrivilegeMode {
        let mstatus = self.csrs.mstatus;
        if access != AccessType::Fetch && mstatus & MSTATUS_MPRV != 0 {
            PrivilegeMode::from_bits((mstatus & MSTATUS_MPP) >> MSTATUS_MPP_SHIFT)
                .unwrap_or(self.privilege)
        } else {
            self.privilege
        }
    }

    /// Translates `vaddr` for an access of `size` bytes and checks PMP.
    ///
    /// # Errors
    ///
    /// The page fault or access fault the access raises.
    pub fn translate(
        &mut self,
        vaddr: u64,
        size: u64,
        access: AccessType,
        bus: &mut Bus,
    ) -> Result<PhysAddr, Trap> {
        let ctx = Translation::new(
            self.xlen(),
            self.csrs.satp,
            self.csrs.mstatus,
            self.effective_privilege(access),
        );
        self.mmu
            .translate(VirtAddr::new(vaddr), size, access, &ctx, bus)
    }

    /// Loads `size` bytes (1, 2, 4 or 8) from `vaddr`, zero-extended.
    ///
    /// # Errors
    ///
    /// Load address-misaligned, page-fault or access-fault traps.
    pub fn load(&mut self, bus: &mut Bus, vaddr: u64, size: usize) -> Result<u64, Trap> {
        let vaddr = self.xlen().zext(vaddr);
        if vaddr % size as u64 != 0 {
            if !self.misaligned {
                return Err(Trap::LoadAddressMisaligned(vaddr));
            }
            let mut val = 0;
            for i in (0..size).rev() {
                let byte_addr = self.xlen().zext(vaddr.wrapping_add(i as u64));
                let byte = self.load(bus, byte_addr, 1)?;
                val = (val << 8) | byte;
            }
            return Ok(val);
        }

        let paddr = self.translate(vaddr, size as u64, AccessType::Read, bus)?;
        bus.read(paddr, size).ok_or(Trap::LoadAccessFault(vaddr))
    }

    /// Stores the low `size` bytes of `val` to `vaddr`.
    ///
    /// A split misaligned store translates every byte before writing any, so a
    /// fault leaves memory unchanged.
    ///
    /// # Errors
    ///
    /// Store address-misaligned, page-fault or access-fault traps.
    pub fn store(&mut self, bus: &mut Bus, vaddr: u64, size: usize, val: u64) -> Result<(), Trap> {
        let vaddr = self.xlen().zext(vaddr);
        if vaddr % size as u64 != 0 {
            if !self.misaligned {
                return Err(Trap::StoreAddressMisaligned(vaddr));
            }
            let mut targets = Vec::with_capacity(size);
            for i in 0..size {
                let byte_addr = self.xlen().zext(vaddr.wrapping_add(i as u64));
                let paddr = self.translate(byte_addr, 1, AccessType::Write, bus)?;
                if !bus.is_valid_range(paddr.val(), 1) {
                    return Err(Trap::StoreAccessFault(byte_addr));
                }
                targets.push(paddr);
            }
            for (i, paddr) in targets.into_iter().enumerate() {
                bus.write(paddr, 1, val >> (8 * i))
                    .ok_or(Trap::StoreAccessFault(vaddr))?;
            }
            return Ok(());
        }

        let paddr = self.translate(vaddr, size as u64, AccessType::Write, bus)?;
        bus.write(paddr, size, val)
            .ok_or(Trap::StoreAccessFault(vaddr))
    }

    /// Fetches the 16-bit parcel at `vaddr`.
    ///
    /// # Errors
    ///
    /// Instruction page-fault or access-fault traps.
    pub fn fetch_parcel(&mut self, bus: &mut Bus, vaddr: u64) -> Result<u16, Trap> {
        let vaddr = self.xlen().zext(vaddr);
        let paddr = self.translate(vaddr, 2, AccessType::Fetch, bus)?;
        bus.read(paddr, 2)
            .map(|v| v as u16)
            .ok_or(Trap::InstructionAccessFault(vaddr))
    }

    /// Translates the address of an AMO, LR or SC of `size` bytes.
    ///
    /// Atomics never split: a misaligned address always traps. LR is checked as a
    /// load, everything else as a store.
    ///
    /// # Errors
    ///
    /// Address-misaligned, page-fault or access-fault traps.
    pub fn translate_atomic(
        &mut self,
        bus: &mut Bus,
        vaddr: u64,
        size: usize,
        access: AccessType,
    ) -> Result<PhysAddr, Trap> {
        let vaddr = self.xlen().zext(vaddr);
        if vaddr % size as u64 != 0 {
            return Err(access.misaligned(vaddr));
        }
        let paddr = self.translate(vaddr, size as u64, access, bus)?;
        if bus.is_valid_range(paddr.val(), size as u64) {
            Ok(paddr)
        } else {
            Err(access.access_fault(vaddr))
        }
    }
}
