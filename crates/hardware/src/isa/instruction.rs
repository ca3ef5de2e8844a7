//! Fixed-position instruction fields.
//!
//! The register and function fields sit at the same bit positions in every
//! 32-bit format, so they are extracted here once; immediates depend on the
//! format and are assembled by [`decode`](crate::isa::decode).

/// Extracts `width` bits of `inst` starting at bit `lo`.
#[inline(always)]
const fn field(inst: u32, lo: u32, width: u32) -> u32 {
    (inst >> lo) & ((1 << width) - 1)
}

/// Field accessors for a raw 32-bit instruction.
pub trait InstructionBits {
    /// Major opcode, `[6:0]`.
    fn opcode(&self) -> u32;
    /// `rd`, `[11:7]`.
    fn rd(&self) -> usize;
    /// `rs1`, `[19:15]`; the `uimm` of the Zicsr immediate forms.
    fn rs1(&self) -> usize;
    /// `rs2`, `[24:20]`.
    fn rs2(&self) -> usize;
    /// `funct3`, `[14:12]`.
    fn funct3(&self) -> u32;
    /// `funct7`, `[31:25]`.
    fn funct7(&self) -> u32;
    /// AMO operation, `[31:27]`.
    fn funct5(&self) -> u32;
    /// CSR address, `[31:20]`.
    fn csr(&self) -> u32;
}

impl InstructionBits for u32 {
    #[inline(always)]
    fn opcode(&self) -> u32 {
        field(*self, 0, 7)
    }

    #[inline(always)]
    fn rd(&self) -> usize {
        field(*self, 7, 5) as usize
    }

    #[inline(always)]
    fn rs1(&self) -> usize {
        field(*self, 15, 5) as usize
    }

    #[inline(always)]
    fn rs2(&self) -> usize {
        field(*self, 20, 5) as usize
    }

    #[inline(always)]
    fn funct3(&self) -> u32 {
        field(*self, 12, 3)
    }

    #[inline(always)]
    fn funct7(&self) -> u32 {
        field(*self, 25, 7)
    }

    #[inline(always)]
    fn funct5(&self) -> u32 {
        field(*self, 27, 5)
    }

    #[inline(always)]
    fn csr(&self) -> u32 {
        field(*self, 20, 12)
    }
}

/// A 32-bit instruction split into its fields, with the immediate of its
/// format already sign-extended (zero for R-type).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Decoded {
    /// Encoding after RVC expansion.
    pub raw: u32,
    /// Major opcode.
    pub opcode: u32,
    /// Destination register.
    pub rd: usize,
    /// First source register.
    pub rs1: usize,
    /// Second source register.
    pub rs2: usize,
    /// `funct3`.
    pub funct3: u32,
    /// `funct7`.
    pub funct7: u32,
    /// Immediate.
    pub imm: i64,
}
