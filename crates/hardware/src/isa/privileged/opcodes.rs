//! SYSTEM-opcode encodings.
//!
//! Instructions without register operands are matched on the whole word; Zicsr
//! instructions and SFENCE.VMA are matched on `funct3`/`funct7`.

/// Major opcode shared by every instruction in this module.
pub const OP_SYSTEM: u32 = 0b111_0011;

/// `funct3` of the instructions matched by full encoding and of SFENCE.VMA.
pub const PRIV: u32 = 0b000;

// Full encodings.

/// `ecall`: raises the environment-call exception of the current mode.
pub const ECALL: u32 = 0x0000_0073;
/// `ebreak`: raises a breakpoint with `xtval = pc`.
pub const EBREAK: u32 = 0x0010_0073;
/// `mret`: M-mode trap return.
pub const MRET: u32 = 0x3020_0073;
/// `sret`: S-mode trap return (illegal in U, and in S with `mstatus.TSR`).
pub const SRET: u32 = 0x1020_0073;
/// `wfi`: retires as a no-op (illegal in U, and in S with `mstatus.TW`).
pub const WFI: u32 = 0x1050_0073;

/// `funct7` of `sfence.vma`; `rs1`/`rs2` are ignored and all TLB entries dropped.
pub const SFENCE_VMA_FUNCT7: u32 = 0b000_1001;

// Zicsr `funct3` values. The immediate forms take a 5-bit zero-extended `uimm`
// from the `rs1` field.

/// `csrrw`.
pub const CSRRW: u32 = 0b001;
/// `csrrs`.
pub const CSRRS: u32 = 0b010;
/// `csrrc`.
pub const CSRRC: u32 = 0b011;
/// `csrrwi`.
pub const CSRRWI: u32 = 0b101;
/// `csrrsi`.
pub const CSRRSI: u32 = 0b110;
/// `csrrci`.
pub const CSRRCI: u32 = 0b111;
