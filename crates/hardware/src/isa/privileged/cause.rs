//! `xcause` codes.
//!
//! Bare codes only. The interrupt flag sits in the top bit of the register at the
//! hart's XLEN and is added by [`Trap::cause`](crate::common::Trap::cause); codes
//! 2, 6 and 10 of the interrupt space are reserved and never raised.

/// Interrupt codes, also the bit positions in `mip`/`mie`.
pub mod interrupt {
    /// USI, only reachable as an injected cause.
    pub const USER_SOFTWARE: u64 = 0;
    /// SSI.
    pub const SUPERVISOR_SOFTWARE: u64 = 1;
    /// MSI.
    pub const MACHINE_SOFTWARE: u64 = 3;
    /// UTI, only reachable as an injected cause.
    pub const USER_TIMER: u64 = 4;
    /// STI.
    pub const SUPERVISOR_TIMER: u64 = 5;
    /// MTI.
    pub const MACHINE_TIMER: u64 = 7;
    /// UEI, only reachable as an injected cause.
    pub const USER_EXTERNAL: u64 = 8;
    /// SEI.
    pub const SUPERVISOR_EXTERNAL: u64 = 9;
    /// MEI.
    pub const MACHINE_EXTERNAL: u64 = 11;
}

/// Synchronous exception codes. 10 and 14 are reserved.
pub mod exception {
    /// Fetch from a misaligned PC.
    pub const INSTRUCTION_ADDRESS_MISALIGNED: u64 = 0;
    /// Fetch denied by PMP or unbacked.
    pub const INSTRUCTION_ACCESS_FAULT: u64 = 1;
    /// Undecodable or unprivileged instruction.
    pub const ILLEGAL_INSTRUCTION: u64 = 2;
    /// `ebreak`.
    pub const BREAKPOINT: u64 = 3;
    /// Misaligned load.
    pub const LOAD_ADDRESS_MISALIGNED: u64 = 4;
    /// Load denied by PMP or unbacked.
    pub const LOAD_ACCESS_FAULT: u64 = 5;
    /// Misaligned store, AMO or SC.
    pub const STORE_ADDRESS_MISALIGNED: u64 = 6;
    /// Store denied by PMP or unbacked.
    pub const STORE_ACCESS_FAULT: u64 = 7;
    /// `ecall` in U-mode.
    pub const ENVIRONMENT_CALL_FROM_U_MODE: u64 = 8;
    /// `ecall` in S-mode.
    pub const ENVIRONMENT_CALL_FROM_S_MODE: u64 = 9;
    /// `ecall` in M-mode; never delegable.
    pub const ENVIRONMENT_CALL_FROM_M_MODE: u64 = 11;
    /// Fetch translation fault.
    pub const INSTRUCTION_PAGE_FAULT: u64 = 12;
    /// Load translation fault.
    pub const LOAD_PAGE_FAULT: u64 = 13;
    /// Store/AMO translation fault.
    pub const STORE_PAGE_FAULT: u64 = 15;
}
