//! Control and Status Register (CSR) definitions and storage.
//!
//! This module defines the CSR subsystem's static layout. It provides:
//! 1. **Address Definitions:** Constants for the floating-point, machine, supervisor,
//!    counter, PMP and trigger CSRs the model implements.
//! 2. **Field Masks:** Bitmasks and shifts for status, interrupt and translation control.
//! 3. **Register Storage:** The `Csrs` struct holding the backing state. Views such as
//!    `sstatus`, `sie` and `sip` have no storage of their own; the access logic in
//!    `core::cpu::csr` computes them from the machine registers.

/// Machine vendor ID CSR address.
pub const MVENDORID: u32 = 0xF11;
/// Machine architecture ID CSR address.
pub const MARCHID: u32 = 0xF12;
/// Machine implementation ID CSR address.
pub const MIMPID: u32 = 0xF13;
/// Machine hardware thread ID CSR address.
pub const MHARTID: u32 = 0xF14;
/// Machine configuration pointer CSR address.
pub const MCONFIGPTR: u32 = 0xF15;

/// Floating-point accrued exceptions CSR address.
pub const FFLAGS: u32 = 0x001;
/// Floating-point dynamic rounding mode CSR address.
pub const FRM: u32 = 0x002;
/// Floating-point control and status CSR address (`frm` and `fflags` combined).
pub const FCSR: u32 = 0x003;

/// Machine status register CSR address.
pub const MSTATUS: u32 = 0x300;
/// Machine ISA register CSR address.
pub const MISA: u32 = 0x301;
/// Machine exception delegation register CSR address.
pub const MEDELEG: u32 = 0x302;
/// Machine interrupt delegation register CSR address.
pub const MIDELEG: u32 = 0x303;
/// Machine interrupt enable register CSR address.
pub const MIE: u32 = 0x304;
/// Machine trap vector base address register CSR address.
pub const MTVEC: u32 = 0x305;
/// Machine counter enable register CSR address.
pub const MCOUNTEREN: u32 = 0x306;
/// Upper half of `mstatus` (RV32 only).
pub const MSTATUSH: u32 = 0x310;
/// Machine counter-inhibit register CSR address.
pub const MCOUNTINHIBIT: u32 = 0x320;
/// First machine performance-monitoring event selector (`mhpmevent3`).
pub const MHPMEVENT3: u32 = 0x323;
/// Last machine performance-monitoring event selector (`mhpmevent31`).
pub const MHPMEVENT31: u32 = 0x33F;

/// Machine scratch register CSR address.
pub const MSCRATCH: u32 = 0x340;
/// Machine exception program counter CSR address.
pub const MEPC: u32 = 0x341;
/// Machine cause register CSR address.
pub const MCAUSE: u32 = 0x342;
/// Machine trap value register CSR address.
pub const MTVAL: u32 = 0x343;
/// Machine interrupt pending register CSR address.
pub const MIP: u32 = 0x344;

/// First PMP configuration register (`pmpcfg0`).
pub const PMPCFG0: u32 = 0x3A0;
/// Last PMP configuration register (`pmpcfg15`).
pub const PMPCFG15: u32 = 0x3AF;
/// First PMP address register (`pmpaddr0`).
pub const PMPADDR0: u32 = 0x3B0;
/// Last PMP address register (`pmpaddr63`).
pub const PMPADDR63: u32 = 0x3EF;

/// Debug trigger select register.
pub const TSELECT: u32 = 0x7A0;
/// First trigger data register.
pub const TDATA1: u32 = 0x7A1;
/// Second trigger data register.
pub const TDATA2: u32 = 0x7A2;
/// Third trigger data register.
pub const TDATA3: u32 = 0x7A3;

/// Supervisor status register CSR address.
pub const SSTATUS: u32 = 0x100;
/// Supervisor interrupt enable register CSR address.
pub const SIE: u32 = 0x104;
/// Supervisor trap vector base address register CSR address.
pub const STVEC: u32 = 0x105;
/// Supervisor counter enable register CSR address.
pub const SCOUNTEREN: u32 = 0x106;
/// Supervisor scratch register CSR address.
pub const SSCRATCH: u32 = 0x140;
/// Supervisor exception program counter CSR address.
pub const SEPC: u32 = 0x141;
/// Supervisor cause register CSR address.
pub const SCAUSE: u32 = 0x142;
/// Supervisor trap value register CSR address.
pub const STVAL: u32 = 0x143;
/// Supervisor interrupt pending register CSR address.
pub const SIP: u32 = 0x144;
/// Supervisor address translation and protection register CSR address.
pub const SATP: u32 = 0x180;

/// Machine cycle counter CSR address.
pub const MCYCLE: u32 = 0xB00;
/// Machine instructions retired counter CSR address.
pub const MINSTRET: u32 = 0xB02;
/// First machine performance counter (`mhpmcounter3`).
pub const MHPMCOUNTER3: u32 = 0xB03;
/// Last machine performance counter (`mhpmcounter31`).
pub const MHPMCOUNTER31: u32 = 0xB1F;
/// Upper half of `mcycle` (RV32 only).
pub const MCYCLEH: u32 = 0xB80;
/// Upper half of `minstret` (RV32 only).
pub const MINSTRETH: u32 = 0xB82;
/// Upper halves of the machine performance counters (RV32 only).
pub const MHPMCOUNTER3H: u32 = 0xB83;
/// Last upper-half machine performance counter (RV32 only).
pub const MHPMCOUNTER31H: u32 = 0xB9F;

/// Cycle counter CSR address (user-readable shadow of `mcycle`).
pub const CYCLE: u32 = 0xC00;
/// Real-time counter CSR address.
pub const TIME: u32 = 0xC01;
/// Instructions retired counter CSR address (user-readable shadow of `minstret`).
pub const INSTRET: u32 = 0xC02;
/// First user performance counter shadow (`hpmcounter3`).
pub const HPMCOUNTER3: u32 = 0xC03;
/// Last user performance counter shadow (`hpmcounter31`).
pub const HPMCOUNTER31: u32 = 0xC1F;
/// Upper half of `cycle` (RV32 only).
pub const CYCLEH: u32 = 0xC80;
/// Upper half of `time` (RV32 only).
pub const TIMEH: u32 = 0xC81;
/// Upper half of `instret` (RV32 only).
pub const INSTRETH: u32 = 0xC82;
/// First upper-half user performance counter shadow (RV32 only).
pub const HPMCOUNTER3H: u32 = 0xC83;
/// Last upper-half user performance counter shadow (RV32 only).
pub const HPMCOUNTER31H: u32 = 0xC9F;

/// Supervisor interrupt enable bit in `mstatus`.
pub const MSTATUS_SIE: u64 = 1 << 1;
/// Machine interrupt enable bit in `mstatus`.
pub const MSTATUS_MIE: u64 = 1 << 3;
/// Supervisor previous interrupt enable bit in `mstatus`.
pub const MSTATUS_SPIE: u64 = 1 << 5;
/// Machine previous interrupt enable bit in `mstatus`.
pub const MSTATUS_MPIE: u64 = 1 << 7;
/// Supervisor previous privilege bit in `mstatus`.
pub const MSTATUS_SPP: u64 = 1 << 8;
/// Machine previous privilege field in `mstatus`.
pub const MSTATUS_MPP: u64 = 3 << 11;
/// Bit shift of the MPP field.
pub const MSTATUS_MPP_SHIFT: u64 = 11;
/// Floating-point unit state field in `mstatus`.
pub const MSTATUS_FS: u64 = 3 << 13;
/// FS = Off: floating-point instructions and CSRs are illegal.
pub const MSTATUS_FS_OFF: u64 = 0 << 13;
/// FS = Initial.
pub const MSTATUS_FS_INITIAL: u64 = 1 << 13;
/// FS = Clean.
pub const MSTATUS_FS_CLEAN: u64 = 2 << 13;
/// FS = Dirty: floating-point state was modified.
pub const MSTATUS_FS_DIRTY: u64 = 3 << 13;
/// Modify-privilege bit in `mstatus`.
pub const MSTATUS_MPRV: u64 = 1 << 17;
/// Supervisor user-memory access bit in `mstatus`.
pub const MSTATUS_SUM: u64 = 1 << 18;
/// Make-executable-readable bit in `mstatus`.
pub const MSTATUS_MXR: u64 = 1 << 19;
/// Trap virtual memory bit in `mstatus`.
pub const MSTATUS_TVM: u64 = 1 << 20;
/// Timeout wait bit in `mstatus`.
pub const MSTATUS_TW: u64 = 1 << 21;
/// Trap SRET bit in `mstatus`.
pub const MSTATUS_TSR: u64 = 1 << 22;
/// Bit shift of the UXL field (RV64 only).
pub const MSTATUS_UXL_SHIFT: u64 = 32;
/// Bit shift of the SXL field (RV64 only).
pub const MSTATUS_SXL_SHIFT: u64 = 34;
/// Summary dirty bit of a 32-bit `mstatus`; set while FS is Dirty.
pub const MSTATUS_SD_32: u64 = 1 << 31;
/// Summary dirty bit of a 64-bit `mstatus`; set while FS is Dirty.
pub const MSTATUS_SD_64: u64 = 1 << 63;

/// Fields of `mstatus` that are visible through `sstatus`.
pub const SSTATUS_MASK: u64 = MSTATUS_SIE
    | MSTATUS_SPIE
    | MSTATUS_SPP
    | MSTATUS_FS
    | MSTATUS_SUM
    | MSTATUS_MXR
    | (3 << MSTATUS_UXL_SHIFT)
    | MSTATUS_SD_32
    | MSTATUS_SD_64;

/// Supervisor software interrupt bit in `mip`/`mie`.
pub const MIP_SSIP: u64 = 1 << 1;
/// Machine software interrupt bit in `mip`/`mie`.
pub const MIP_MSIP: u64 = 1 << 3;
/// Supervisor timer interrupt bit in `mip`/`mie`.
pub const MIP_STIP: u64 = 1 << 5;
/// Machine timer interrupt bit in `mip`/`mie`.
pub const MIP_MTIP: u64 = 1 << 7;
/// Supervisor external interrupt bit in `mip`/`mie`.
pub const MIP_SEIP: u64 = 1 << 9;
/// Machine external interrupt bit in `mip`/`mie`.
pub const MIP_MEIP: u64 = 1 << 11;

/// Supervisor-level interrupt bits.
pub const S_INTERRUPTS: u64 = MIP_SSIP | MIP_STIP | MIP_SEIP;
/// Machine-level interrupt bits.
pub const M_INTERRUPTS: u64 = MIP_MSIP | MIP_MTIP | MIP_MEIP;

/// Exceptions that `medeleg` may delegate: codes 0-15 except the M-mode ecall and reserved codes.
pub const MEDELEG_MASK: u64 = 0xFFFF & !((1 << 10) | (1 << 11) | (1 << 14));

/// Bit shift of the MODE field in a 64-bit `satp`.
pub const SATP64_MODE_SHIFT: u64 = 60;
/// Physical page number field of a 64-bit `satp`.
pub const SATP64_PPN_MASK: u64 = 0xFFF_FFFF_FFFF;
/// ASID field of a 64-bit `satp`.
pub const SATP64_ASID_MASK: u64 = 0xFFFF << 44;
/// MODE bit of a 32-bit `satp`.
pub const SATP32_MODE: u64 = 1 << 31;
/// Physical page number field of a 32-bit `satp`.
pub const SATP32_PPN_MASK: u64 = 0x3F_FFFF;
/// ASID field of a 32-bit `satp`.
pub const SATP32_ASID_MASK: u64 = 0x1FF << 22;
/// Bare (no translation) `satp` mode.
pub const SATP_MODE_BARE: u64 = 0;
/// Sv39 `satp` mode (64-bit encoding).
pub const SATP_MODE_SV39: u64 = 8;

/// Vectored-mode flag in `mtvec`/`stvec`.
pub const TVEC_VECTORED: u64 = 1;
/// Mode field of `mtvec`/`stvec`.
pub const TVEC_MODE_MASK: u64 = 3;

/// Backing storage for the CSRs of one hart.
///
/// Every value is held zero-extended to 64 bits; on RV32 harts only the low
/// 32 bits are ever set.
#[derive(Clone, Debug, Default)]
pub struct Csrs {
    /// Machine status register.
    pub mstatus: u64,
    /// Machine ISA register (read-only, derived from the configured ISA).
    pub misa: u64,
    /// Machine exception delegation.
    pub medeleg: u64,
    /// Machine interrupt delegation.
    pub mideleg: u64,
    /// Machine interrupt enable.
    pub mie: u64,
    /// Machine trap vector base address.
    pub mtvec: u64,
    /// Machine counter enable.
    pub mcounteren: u64,
    /// Machine scratch register.
    pub mscratch: u64,
    /// Machine exception program counter.
    pub mepc: u64,
    /// Machine trap cause.
    pub mcause: u64,
    /// Machine trap value.
    pub mtval: u64,
    /// Machine interrupt pending.
    pub mip: u64,
    /// Supervisor trap vector base address.
    pub stvec: u64,
    /// Supervisor counter enable.
    pub scounteren: u64,
    /// Supervisor scratch register.
    pub sscratch: u64,
    /// Supervisor exception program counter.
    pub sepc: u64,
    /// Supervisor trap cause.
    pub scause: u64,
    /// Supervisor trap value.
    pub stval: u64,
    /// Supervisor address translation and protection.
    pub satp: u64,
    /// Machine cycle counter (full 64 bits on every XLEN).
    pub mcycle: u64,
    /// Machine instructions-retired counter (full 64 bits on every XLEN).
    pub minstret: u64,
    /// Floating-point accrued exceptions (5 bits).
    pub fflags: u64,
    /// Floating-point dynamic rounding mode (3 bits).
    pub frm: u64,
}
