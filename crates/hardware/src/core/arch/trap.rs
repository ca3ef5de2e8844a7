//! Interrupt selection.
//!
//! Maps pending-and-enabled `mip` bits to the interrupt a hart must take, in the
//! architectural priority order.

use crate::common::error::Trap;
use crate::core::arch::csr;

/// Interrupt bits in decreasing priority: MEI, MSI, MTI, SEI, SSI, STI.
pub const INTERRUPT_PRIORITY: [(u64, Trap); 6] = [
    (csr::MIP_MEIP, Trap::MachineExternalInterrupt),
    (csr::MIP_MSIP, Trap::MachineSoftwareInterrupt),
    (csr::MIP_MTIP, Trap::MachineTimerInterrupt),
    (csr::MIP_SEIP, Trap::SupervisorExternalInterrupt),
    (csr::MIP_SSIP, Trap::SupervisorSoftwareInterrupt),
    (csr::MIP_STIP, Trap::SupervisorTimerInterrupt),
];

/// Returns the highest-priority interrupt in `bits`, if any.
pub fn highest_priority(bits: u64) -> Option<Trap> {
    INTERRUPT_PRIORITY
        .iter()
        .find(|(bit, _)| bits & bit != 0)
        .map(|&(_, trap)| trap)
}
