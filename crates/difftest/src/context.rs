//! Snapshot layouts exchanged with the DUT.
//!
//! The structures here are `#[repr(C)]` and match the C declarations harnesses use:
//! `struct { word_t gpr[NR_GPR]; word_t pc; }` for registers and eighteen `word_t`
//! CSR slots for [`CsrContext`].

use rvdiff_core::common::Xlen;

/// Register width of the DUT interface (`word_t`).
#[cfg(feature = "rv32")]
pub type Word = u32;
/// Register width of the DUT interface (`word_t`).
#[cfg(not(feature = "rv32"))]
pub type Word = u64;

/// Physical address type of `difftest_memcpy` (`paddr_t`).
pub type PAddr = Word;

/// Number of general-purpose registers in a [`DiffContext`].
#[cfg(feature = "rve")]
pub const NR_GPR: usize = 16;
/// Number of general-purpose registers in a [`DiffContext`].
#[cfg(not(feature = "rve"))]
pub const NR_GPR: usize = 32;

/// XLEN the reference hart must have for this build.
#[cfg(feature = "rv32")]
pub const XLEN: Xlen = Xlen::X32;
/// XLEN the reference hart must have for this build.
#[cfg(not(feature = "rv32"))]
pub const XLEN: Xlen = Xlen::X64;

/// `direction` value copying from the reference to the DUT.
pub const DIFFTEST_TO_DUT: bool = false;
/// `direction` value copying from the DUT to the reference.
pub const DIFFTEST_TO_REF: bool = true;

/// Direction of a copy operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Reference to DUT.
    ToDut,
    /// DUT to reference.
    ToRef,
}

impl From<bool> for Direction {
    fn from(direction: bool) -> Self {
        if direction == DIFFTEST_TO_REF {
            Self::ToRef
        } else {
            Self::ToDut
        }
    }
}

/// Architectural register snapshot: the GPRs followed by the PC.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiffContext {
    /// `x0`..`x{NR_GPR-1}`.
    pub gpr: [Word; NR_GPR],
    /// Program counter.
    pub pc: Word,
}

/// CSR snapshot in the slot order DUT harnesses compare.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CsrContext {
    /// Current privilege mode (0 = U, 1 = S, 3 = M).
    pub mode: Word,
    /// `mstatus`.
    pub mstatus: Word,
    /// `sstatus`.
    pub sstatus: Word,
    /// `mepc`.
    pub mepc: Word,
    /// `sepc`.
    pub sepc: Word,
    /// `mtval`.
    pub mtval: Word,
    /// `stval`.
    pub stval: Word,
    /// `mtvec`.
    pub mtvec: Word,
    /// `stvec`.
    pub stvec: Word,
    /// `mcause`.
    pub mcause: Word,
    /// `scause`.
    pub scause: Word,
    /// `satp`.
    pub satp: Word,
    /// `mip`.
    pub mip: Word,
    /// `mie`.
    pub mie: Word,
    /// `mscratch`.
    pub mscratch: Word,
    /// `sscratch`.
    pub sscratch: Word,
    /// `mideleg`.
    pub mideleg: Word,
    /// `medeleg`.
    pub medeleg: Word,
}

/// Widens a DUT word to the engine's 64-bit register representation.
#[inline(always)]
pub const fn word_to_reg(word: Word) -> u64 {
    XLEN.sext(word as u64)
}

/// Narrows an engine register value to a DUT word.
#[inline(always)]
pub const fn reg_to_word(val: u64) -> Word {
    val as Word
}

/// Zero-extends a DUT word (addresses, PC, CSR values).
#[inline(always)]
pub const fn word_to_addr(word: Word) -> u64 {
    word as u64
}
