//! Trap and error definitions.
//!
//! This module defines the error handling and trap mechanisms for the model. It provides:
//! 1. **Trap Representation:** All synchronous exceptions and asynchronous interrupts,
//!    with conversion to and from raw `xcause` values.
//! 2. **Configuration Errors:** Rejections raised while parsing ISA/privilege strings
//!    and validating the memory layout.
//! 3. **Engine Errors:** Failures of the simulator as a whole (allocation, bad hart index).

use std::fmt;

use super::xlen::Xlen;
use crate::isa::privileged::cause::{exception, interrupt};

/// RISC-V trap types representing exceptions and interrupts.
///
/// Traps cause the hart to transfer control to a trap handler. This enum covers
/// all standard traps of the privileged architecture. Variants carrying a `u64`
/// store the value destined for `xtval`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trap {
    /// Instruction address misaligned; carries the misaligned target.
    InstructionAddressMisaligned(u64),

    /// Instruction fetch violated PMP or hit unbacked memory; carries the address.
    InstructionAccessFault(u64),

    /// Invalid or unimplemented encoding; carries the instruction bits.
    IllegalInstruction(u32),

    /// `EBREAK` executed; carries the PC.
    Breakpoint(u64),

    /// Misaligned load; carries the address.
    LoadAddressMisaligned(u64),

    /// Load violated PMP or hit unbacked memory; carries the address.
    LoadAccessFault(u64),

    /// Misaligned store or AMO; carries the address.
    StoreAddressMisaligned(u64),

    /// Store/AMO violated PMP or hit unbacked memory; carries the address.
    StoreAccessFault(u64),

    /// `ECALL` from user mode.
    EnvironmentCallFromUMode,

    /// `ECALL` from supervisor mode.
    EnvironmentCallFromSMode,

    /// `ECALL` from machine mode.
    EnvironmentCallFromMMode,

    /// Fetch translation failed; carries the virtual address.
    InstructionPageFault(u64),

    /// Load translation failed; carries the virtual address.
    LoadPageFault(u64),

    /// Store/AMO translation failed; carries the virtual address.
    StorePageFault(u64),

    /// User software interrupt.
    UserSoftwareInterrupt,

    /// Supervisor software interrupt.
    SupervisorSoftwareInterrupt,

    /// Machine software interrupt.
    MachineSoftwareInterrupt,

    /// User timer interrupt.
    UserTimerInterrupt,

    /// Supervisor timer interrupt.
    SupervisorTimerInterrupt,

    /// Machine timer interrupt.
    MachineTimerInterrupt,

    /// User external interrupt.
    UserExternalInterrupt,

    /// Supervisor external interrupt.
    SupervisorExternalInterrupt,

    /// Machine external interrupt.
    MachineExternalInterrupt,

    /// Exception with a code that has no named variant (reserved or custom causes).
    RequestedTrap(u64),

    /// Interrupt with a code that has no named variant (platform or custom causes).
    RequestedInterrupt(u64),
}

impl Trap {
    /// Builds a trap from a raw cause value, as written by a harness.
    ///
    /// The interrupt flag is the top bit at the hart's XLEN; bit 63 is accepted on
    /// RV32 as well so that 64-bit harness constants keep working.
    ///
    /// # Arguments
    ///
    /// * `cause` - Raw `xcause`-style value.
    /// * `xlen` - Width of the hart the trap is destined for.
    ///
    /// # Returns
    ///
    /// The matching named variant, or `RequestedTrap`/`RequestedInterrupt` for unnamed codes.
    /// Exceptions that carry a trap value are built with a value of zero.
    pub const fn from_cause(cause: u64, xlen: Xlen) -> Self {
        let flags = xlen.cause_interrupt_bit() | (1 << 63);
        let is_interrupt = cause & flags != 0;
        let code = cause & !flags;

        if is_interrupt {
            match code {
                0 => Self::UserSoftwareInterrupt,
                1 => Self::SupervisorSoftwareInterrupt,
                3 => Self::MachineSoftwareInterrupt,
                4 => Self::UserTimerInterrupt,
                5 => Self::SupervisorTimerInterrupt,
                7 => Self::MachineTimerInterrupt,
                8 => Self::UserExternalInterrupt,
                9 => Self::SupervisorExternalInterrupt,
                11 => Self::MachineExternalInterrupt,
                other => Self::RequestedInterrupt(other),
            }
        } else {
            match code {
                exception::INSTRUCTION_ADDRESS_MISALIGNED => Self::InstructionAddressMisaligned(0),
                exception::INSTRUCTION_ACCESS_FAULT => Self::InstructionAccessFault(0),
                exception::ILLEGAL_INSTRUCTION => Self::IllegalInstruction(0),
                exception::BREAKPOINT => Self::Breakpoint(0),
                exception::LOAD_ADDRESS_MISALIGNED => Self::LoadAddressMisaligned(0),
                exception::LOAD_ACCESS_FAULT => Self::LoadAccessFault(0),
                exception::STORE_ADDRESS_MISALIGNED => Self::StoreAddressMisaligned(0),
                exception::STORE_ACCESS_FAULT => Self::StoreAccessFault(0),
                exception::ENVIRONMENT_CALL_FROM_U_MODE => Self::EnvironmentCallFromUMode,
                exception::ENVIRONMENT_CALL_FROM_S_MODE => Self::EnvironmentCallFromSMode,
                exception::ENVIRONMENT_CALL_FROM_M_MODE => Self::EnvironmentCallFromMMode,
                exception::INSTRUCTION_PAGE_FAULT => Self::InstructionPageFault(0),
                exception::LOAD_PAGE_FAULT => Self::LoadPageFault(0),
                exception::STORE_PAGE_FAULT => Self::StorePageFault(0),
                other => Self::RequestedTrap(other),
            }
        }
    }

    /// Returns true for asynchronous interrupts.
    pub const fn is_interrupt(&self) -> bool {
        matches!(
            self,
            Self::UserSoftwareInterrupt
                | Self::SupervisorSoftwareInterrupt
                | Self::MachineSoftwareInterrupt
                | Self::UserTimerInterrupt
                | Self::SupervisorTimerInterrupt
                | Self::MachineTimerInterrupt
                | Self::UserExternalInterrupt
                | Self::SupervisorExternalInterrupt
                | Self::MachineExternalInterrupt
                | Self::RequestedInterrupt(_)
        )
    }

    /// Exception or interrupt code, without the interrupt flag.
    pub const fn code(&self) -> u64 {
        match self {
            Self::InstructionAddressMisaligned(_) => exception::INSTRUCTION_ADDRESS_MISALIGNED,
            Self::InstructionAccessFault(_) => exception::INSTRUCTION_ACCESS_FAULT,
            Self::IllegalInstruction(_) => exception::ILLEGAL_INSTRUCTION,
            Self::Breakpoint(_) => exception::BREAKPOINT,
            Self::LoadAddressMisaligned(_) => exception::LOAD_ADDRESS_MISALIGNED,
            Self::LoadAccessFault(_) => exception::LOAD_ACCESS_FAULT,
            Self::StoreAddressMisaligned(_) => exception::STORE_ADDRESS_MISALIGNED,
            Self::StoreAccessFault(_) => exception::STORE_ACCESS_FAULT,
            Self::EnvironmentCallFromUMode => exception::ENVIRONMENT_CALL_FROM_U_MODE,
            Self::EnvironmentCallFromSMode => exception::ENVIRONMENT_CALL_FROM_S_MODE,
            Self::EnvironmentCallFromMMode => exception::ENVIRONMENT_CALL_FROM_M_MODE,
            Self::InstructionPageFault(_) => exception::INSTRUCTION_PAGE_FAULT,
            Self::LoadPageFault(_) => exception::LOAD_PAGE_FAULT,
            Self::StorePageFault(_) => exception::STORE_PAGE_FAULT,
            Self::UserSoftwareInterrupt => interrupt::USER_SOFTWARE,
            Self::SupervisorSoftwareInterrupt => interrupt::SUPERVISOR_SOFTWARE,
            Self::MachineSoftwareInterrupt => interrupt::MACHINE_SOFTWARE,
            Self::UserTimerInterrupt => interrupt::USER_TIMER,
            Self::SupervisorTimerInterrupt => interrupt::SUPERVISOR_TIMER,
            Self::MachineTimerInterrupt => interrupt::MACHINE_TIMER,
            Self::UserExternalInterrupt => interrupt::USER_EXTERNAL,
            Self::SupervisorExternalInterrupt => interrupt::SUPERVISOR_EXTERNAL,
            Self::MachineExternalInterrupt => interrupt::MACHINE_EXTERNAL,
            Self::RequestedTrap(code) | Self::RequestedInterrupt(code) => *code,
        }
    }

    /// Full `xcause` value at the given width (code plus interrupt flag).
    pub const fn cause(&self, xlen: Xlen) -> u64 {
        if self.is_interrupt() {
            xlen.cause_interrupt_bit() | self.code()
        } else {
            self.code()
        }
    }

    /// Value written to `xtval` when this trap is taken.
    pub const fn tval(&self) -> u64 {
        match self {
            Self::InstructionAddressMisaligned(a)
            | Self::InstructionAccessFault(a)
            | Self::Breakpoint(a)
            | Self::LoadAddressMisaligned(a)
            | Self::LoadAccessFault(a)
            | Self::StoreAddressMisaligned(a)
            | Self::StoreAccessFault(a)
            | Self::InstructionPageFault(a)
            | Self::LoadPageFault(a)
            | Self::StorePageFault(a) => *a,
            Self::IllegalInstruction(bits) => *bits as u64,
            _ => 0,
        }
    }
}

impl fmt::Display for Trap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InstructionAddressMisaligned(addr) => {
                write!(f, "InstructionAddressMisaligned({addr:#x})")
            }
            Self::InstructionAccessFault(addr) => write!(f, "InstructionAccessFault({addr:#x})"),
            Self::IllegalInstruction(inst) => write!(f, "IllegalInstruction({inst:#x})"),
            Self::Breakpoint(pc) => write!(f, "Breakpoint({pc:#x})"),
            Self::LoadAddressMisaligned(addr) => write!(f, "LoadAddressMisaligned({addr:#x})"),
            Self::LoadAccessFault(addr) => write!(f, "LoadAccessFault({addr:#x})"),
            Self::StoreAddressMisaligned(addr) => write!(f, "StoreAddressMisaligned({addr:#x})"),
            Self::StoreAccessFault(addr) => write!(f, "StoreAccessFault({addr:#x})"),
            Self::EnvironmentCallFromUMode => write!(f, "EnvironmentCallFromUMode"),
            Self::EnvironmentCallFromSMode => write!(f, "EnvironmentCallFromSMode"),
            Self::EnvironmentCallFromMMode => write!(f, "EnvironmentCallFromMMode"),
            Self::InstructionPageFault(addr) => write!(f, "InstructionPageFault({addr:#x})"),
            Self::LoadPageFault(addr) => write!(f, "LoadPageFault({addr:#x})"),
            Self::StorePageFault(addr) => write!(f, "StorePageFault({addr:#x})"),
            Self::UserSoftwareInterrupt => write!(f, "UserSoftwareInterrupt"),
            Self::SupervisorSoftwareInterrupt => write!(f, "SupervisorSoftwareInterrupt"),
            Self::MachineSoftwareInterrupt => write!(f, "MachineSoftwareInterrupt"),
            Self::UserTimerInterrupt => write!(f, "UserTimerInterrupt"),
            Self::SupervisorTimerInterrupt => write!(f, "SupervisorTimerInterrupt"),
            Self::MachineTimerInterrupt => write!(f, "MachineTimerInterrupt"),
            Self::UserExternalInterrupt => write!(f, "UserExternalInterrupt"),
            Self::SupervisorExternalInterrupt => write!(f, "SupervisorExternalInterrupt"),
            Self::MachineExternalInterrupt => write!(f, "MachineExternalInterrupt"),
            Self::RequestedTrap(code) => write!(f, "RequestedTrap({code})"),
            Self::RequestedInterrupt(code) => write!(f, "RequestedInterrupt({code})"),
        }
    }
}

impl std::error::Error for Trap {}

/// Rejections raised while turning a [`Config`](crate::config::Config) into a running model.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The ISA string does not start with `RV32`/`RV64` followed by a base.
    #[error("invalid ISA string {0:?}")]
    InvalidIsa(String),

    /// The ISA string names an extension the model does not implement.
    #[error("unsupported ISA extension {extension:?} in {isa:?}")]
    UnsupportedExtension {
        /// Full ISA string.
        isa: String,
        /// Offending extension name.
        extension: String,
    },

    /// The privilege-mode string is not a valid combination of M, S and U.
    #[error("invalid privilege modes {0:?} (expected M, MU or MSU)")]
    InvalidPrivilege(String),

    /// Only little-endian harts are modelled.
    #[error("unsupported endianness {0:?}")]
    UnsupportedEndianness(String),

    /// The hart list is empty.
    #[error("configuration declares no harts")]
    NoHarts,

    /// More PMP regions than the architecture allows.
    #[error("{0} PMP regions requested, at most 64 are supported")]
    InvalidPmpCount(usize),

    /// The memory layout is empty.
    #[error("configuration declares no memory regions")]
    EmptyMemory,

    /// A memory region has zero size or wraps the address space.
    #[error("memory region at {base:#x} has invalid size {size:#x}")]
    InvalidMemoryRegion {
        /// Region base address.
        base: u64,
        /// Region size in bytes.
        size: u64,
    },

    /// Two memory regions overlap.
    #[error("memory regions at {first:#x} and {second:#x} overlap")]
    OverlappingMemory {
        /// Base of the lower region.
        first: u64,
        /// Base of the overlapping region.
        second: u64,
    },

    /// The JSON document could not be parsed.
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of the simulator as a whole.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Host memory for a RAM region could not be reserved.
    #[error("cannot allocate {size:#x} bytes of guest memory: {source}")]
    Allocation {
        /// Requested size in bytes.
        size: u64,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// A hart index outside the configured hart list.
    #[error("no hart with index {0}")]
    NoSuchHart(usize),
}
