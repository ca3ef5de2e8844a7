//! # Instruction Execution Tests
//!
//! Architectural results of the integer, M, A and Zicsr instructions, control
//! flow, compressed encodings and illegal-instruction reporting.

use pretty_assertions::assert_eq;
use rstest::rstest;
use rvdiff_core::common::Trap;
use rvdiff_core::core::StepOutcome;
use rvdiff_core::core::arch::csr::{MCAUSE, MEPC, MSCRATCH, MTVAL};
use rvdiff_core::core::arch::mode::PrivilegeMode;

use crate::common::builder::instruction::inst;
use crate::common::harness::{RAM_BASE, TestContext};

fn csr(ctx: &TestContext, addr: u32) -> u64 {
    ctx.cpu().csr_read(addr).unwrap()
}

// ══════════════════════════════════════════════════════════
// Integer ALU
// ══════════════════════════════════════════════════════════

#[test]
fn test_integer_alu() {
    let mut ctx = TestContext::new().load_program(&[
        inst().addi(1, 0, 5).build(),
        inst().addi(2, 0, -3).build(),
        inst().add(3, 1, 2).build(),
        inst().sub(4, 2, 1).build(),
        inst().slt(5, 2, 1).build(),
        inst().sltu(6, 2, 1).build(),
        inst().srai(7, 4, 2).build(),
    ]);

    assert_eq!(ctx.run(7), 7);
    assert_eq!(ctx.get_reg(3), 2);
    assert_eq!(ctx.get_reg(4) as i64, -8);
    assert_eq!(ctx.get_reg(5), 1);
    assert_eq!(ctx.get_reg(6), 0);
    assert_eq!(ctx.get_reg(7) as i64, -2);
    assert_eq!(ctx.cpu().pc, RAM_BASE + 28);
}

#[test]
fn test_writes_to_x0_are_discarded() {
    let mut ctx = TestContext::new().load_program(&[inst().addi(0, 0, 5).build()]);
    assert_eq!(ctx.step(), StepOutcome::Retired);
    assert_eq!(ctx.get_reg(0), 0);
}

#[test]
fn test_rv32_results_are_sign_extended() {
    let mut ctx = TestContext::rv32().load_program(&[
        inst().lui(1, 0x80000).build(),
        inst().srai(2, 1, 4).build(),
        inst().addi(3, 1, -1).build(),
    ]);

    assert_eq!(ctx.run(3), 3);
    assert_eq!(ctx.get_reg(1), 0xFFFF_FFFF_8000_0000);
    assert_eq!(ctx.get_reg(2), 0xFFFF_FFFF_F800_0000);
    // 0x8000_0000 - 1 wraps to a positive 32-bit value.
    assert_eq!(ctx.get_reg(3), 0x7FFF_FFFF);
}

#[test]
fn test_rv32_shift_amounts_use_five_bits() {
    let mut ctx = TestContext::rv32().load_program(&[
        inst().addi(1, 0, 1).build(),
        inst().addi(2, 0, 33).build(),
        inst().sll(3, 1, 2).build(),
    ]);
    assert_eq!(ctx.run(3), 3);
    assert_eq!(ctx.get_reg(3), 2);
}

#[test]
fn test_word_ops_illegal_on_rv32() {
    let addw = inst().addw(1, 0, 0).build();
    let mut ctx = TestContext::rv32().load_program(&[addw]);
    assert_eq!(ctx.step(), StepOutcome::Trapped(Trap::IllegalInstruction(addw)));
    assert_eq!(csr(&ctx, MTVAL), u64::from(addw));
}

#[test]
fn test_word_ops_on_rv64() {
    let mut ctx = TestContext::new().load_program(&[
        inst().addi(1, 0, 0x7FF).build(),
        inst().slli(1, 1, 20).build(),
        inst().addw(2, 1, 1).build(),
        inst().addiw(3, 1, 0).build(),
    ]);

    assert_eq!(ctx.run(4), 4);
    assert_eq!(ctx.get_reg(1), 0x7FF0_0000);
    assert_eq!(ctx.get_reg(2), 0xFFFF_FFFF_FFE0_0000);
    assert_eq!(ctx.get_reg(3), 0x7FF0_0000);
}

// ══════════════════════════════════════════════════════════
// M extension
// ══════════════════════════════════════════════════════════

#[test]
fn test_division_by_zero() {
    let mut ctx = TestContext::new().load_program(&[
        inst().addi(1, 0, 7).build(),
        inst().div(3, 1, 2).build(),
        inst().divu(4, 1, 2).build(),
        inst().rem(5, 1, 2).build(),
    ]);

    assert_eq!(ctx.run(4), 4);
    assert_eq!(ctx.get_reg(3), u64::MAX);
    assert_eq!(ctx.get_reg(4), u64::MAX);
    assert_eq!(ctx.get_reg(5), 7);
}

#[test]
fn test_signed_overflow_and_high_multiply() {
    let mut ctx = TestContext::new().load_program(&[
        inst().addi(1, 0, -1).build(),
        inst().slli(2, 1, 63).build(),
        inst().div(3, 2, 1).build(),
        inst().rem(4, 2, 1).build(),
        inst().mulh(5, 2, 2).build(),
        inst().addi(6, 0, 7).build(),
        inst().mul(7, 6, 6).build(),
        inst().divw(8, 6, 1).build(),
    ]);

    assert_eq!(ctx.run(8), 8);
    assert_eq!(ctx.get_reg(3), 1 << 63);
    assert_eq!(ctx.get_reg(4), 0);
    assert_eq!(ctx.get_reg(5), 1 << 62);
    assert_eq!(ctx.get_reg(7), 49);
    assert_eq!(ctx.get_reg(8) as i64, -7);
}

#[test]
fn test_muldiv_illegal_without_m() {
    let mul = inst().mul(1, 2, 3).build();
    let mut ctx = TestContext::with_isa("RV64IAC").load_program(&[mul]);
    assert_eq!(ctx.step(), StepOutcome::Trapped(Trap::IllegalInstruction(mul)));
}

// ══════════════════════════════════════════════════════════
// A extension
// ══════════════════════════════════════════════════════════

#[test]
fn test_lr_sc_pair() {
    let data = RAM_BASE + 0x100;
    let mut ctx = TestContext::new().load_program(&[
        inst().lr_w(2, 1).build(),
        inst().sc_w(3, 1, 4).build(),
        inst().sc_w(5, 1, 4).build(),
    ]);
    ctx.write_phys(data, 4, 0x10);
    ctx.set_reg(1, data);
    ctx.set_reg(4, 0x55);

    assert_eq!(ctx.run(3), 3);
    assert_eq!(ctx.get_reg(2), 0x10);
    assert_eq!(ctx.get_reg(3), 0, "first sc succeeds");
    assert_eq!(ctx.get_reg(5), 1, "reservation is consumed");
    assert_eq!(ctx.read_phys(data, 4), 0x55);
}

#[test]
fn test_amo_read_modify_write() {
    let word = RAM_BASE + 0x100;
    let dword = RAM_BASE + 0x108;
    let mut ctx = TestContext::new().load_program(&[
        inst().amoswap_w(3, 1, 2).build(),
        inst().amoadd_d(6, 4, 5).build(),
    ]);
    ctx.write_phys(word, 4, 0x55);
    ctx.write_phys(dword, 8, 40);
    ctx.set_reg(1, word);
    ctx.set_reg(2, u64::MAX);
    ctx.set_reg(4, dword);
    ctx.set_reg(5, 2);

    assert_eq!(ctx.run(2), 2);
    assert_eq!(ctx.get_reg(3), 0x55);
    assert_eq!(ctx.read_phys(word, 4), 0xFFFF_FFFF);
    assert_eq!(ctx.get_reg(6), 40);
    assert_eq!(ctx.read_phys(dword, 8), 42);
}

#[test]
fn test_misaligned_atomic_always_traps() {
    let addr = RAM_BASE + 0x102;
    let mut ctx = TestContext::with_config(rvdiff_core::Config {
        misaligned: true,
        ..rvdiff_core::Config::default()
    })
    .load_program(&[inst().lr_w(2, 1).build()]);
    ctx.set_reg(1, addr);

    assert_eq!(
        ctx.step(),
        StepOutcome::Trapped(Trap::LoadAddressMisaligned(addr))
    );
}

#[test]
fn test_sc_of_a_different_width_fails() {
    let data = RAM_BASE + 0x100;
    let mut ctx = TestContext::new().load_program(&[
        inst().lr_w(2, 1).build(),
        inst().sc_d(3, 1, 4).build(),
    ]);
    ctx.write_phys(data, 8, 0x10);
    ctx.set_reg(1, data);
    ctx.set_reg(4, 0x55);

    assert_eq!(ctx.run(2), 2);
    assert_eq!(ctx.get_reg(3), 1, "width mismatch fails");
    assert_eq!(ctx.read_phys(data, 8), 0x10);
}

#[rstest]
#[case::funct5_00101(0b00101)]
#[case::funct5_11111(0b11111)]
fn test_reserved_amo_is_illegal_before_translation(#[case] op: u32) {
    let word = inst().amo_w(op, 2, 1, 3).build();
    let mut ctx = TestContext::new().load_program(&[word]);
    // Unbacked: any memory access would fault.
    ctx.set_reg(1, 0x10);

    assert_eq!(
        ctx.step(),
        StepOutcome::Trapped(Trap::IllegalInstruction(word))
    );
    assert_eq!(csr(&ctx, MTVAL), u64::from(word));
}

// ══════════════════════════════════════════════════════════
// Control flow
// ══════════════════════════════════════════════════════════

#[test]
fn test_branches_and_jal() {
    let mut ctx = TestContext::new().load_program(&[
        inst().addi(1, 0, 1).build(),
        inst().beq(1, 0, 8).build(),
        inst().bne(1, 0, 8).build(),
        inst().addi(2, 0, 99).build(),
        inst().jal(3, 8).build(),
        inst().addi(2, 0, 77).build(),
        inst().addi(4, 0, 5).build(),
    ]);

    assert_eq!(ctx.run(5), 5);
    assert_eq!(ctx.get_reg(2), 0);
    assert_eq!(ctx.get_reg(3), RAM_BASE + 20);
    assert_eq!(ctx.get_reg(4), 5);
    assert_eq!(ctx.cpu().pc, RAM_BASE + 28);
}

#[test]
fn test_blt_is_signed() {
    let mut ctx = TestContext::new().load_program(&[inst().blt(1, 2, 16).build()]);
    ctx.set_reg(1, u64::MAX);
    ctx.set_reg(2, 1);
    assert_eq!(ctx.step(), StepOutcome::Retired);
    assert_eq!(ctx.cpu().pc, RAM_BASE + 16);
}

#[test]
fn test_jalr_clears_low_bit() {
    let mut ctx = TestContext::new().load_program(&[inst().jalr(2, 1, 0).build()]);
    ctx.set_reg(1, RAM_BASE + 0x41);
    assert_eq!(ctx.step(), StepOutcome::Retired);
    assert_eq!(ctx.cpu().pc, RAM_BASE + 0x40);
    assert_eq!(ctx.get_reg(2), RAM_BASE + 4);
}

#[test]
fn test_misaligned_jump_without_compressed() {
    let mut ctx = TestContext::with_isa("RV64IM").load_program(&[inst().jal(1, 6).build()]);

    let target = RAM_BASE + 6;
    assert_eq!(
        ctx.step(),
        StepOutcome::Trapped(Trap::InstructionAddressMisaligned(target))
    );
    assert_eq!(csr(&ctx, MTVAL), target);
    assert_eq!(csr(&ctx, MEPC), RAM_BASE);
    assert_eq!(ctx.get_reg(1), 0, "link register untouched by a faulting jump");
}

// ══════════════════════════════════════════════════════════
// Compressed encodings
// ══════════════════════════════════════════════════════════

// c.li x1, 5 ; c.addi x1, 3
const C_LI_X1_5: u16 = 0x4095;
const C_ADDI_X1_3: u16 = 0x008D;

fn compressed_image(ctx: &mut TestContext, parcels: &[u16]) {
    let bytes: Vec<u8> = parcels.iter().flat_map(|p| p.to_le_bytes()).collect();
    ctx.sim.load_image(RAM_BASE, &bytes).unwrap();
}

#[test]
fn test_compressed_instructions_advance_by_two() {
    let mut ctx = TestContext::new();
    compressed_image(&mut ctx, &[C_LI_X1_5, C_ADDI_X1_3]);

    assert_eq!(ctx.run(2), 2);
    assert_eq!(ctx.get_reg(1), 8);
    assert_eq!(ctx.cpu().pc, RAM_BASE + 4);
}

#[test]
fn test_compressed_illegal_without_c() {
    let mut ctx = TestContext::with_isa("RV64IM");
    compressed_image(&mut ctx, &[C_LI_X1_5, C_ADDI_X1_3]);

    assert_eq!(
        ctx.step(),
        StepOutcome::Trapped(Trap::IllegalInstruction(u32::from(C_LI_X1_5)))
    );
    assert_eq!(csr(&ctx, MTVAL), u64::from(C_LI_X1_5));
}

// ══════════════════════════════════════════════════════════
// Illegal encodings
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::all_zero(0x0000_0000)]
#[case::all_ones(0xFFFF_FFFF)]
fn test_illegal_instruction_reports_bits(#[case] word: u32) {
    let mut ctx = TestContext::new().load_program(&[word]);
    let minstret_before = ctx.cpu().csrs.minstret;

    assert_eq!(ctx.step(), StepOutcome::Trapped(Trap::IllegalInstruction(word)));
    assert_eq!(csr(&ctx, MCAUSE), 2);
    assert_eq!(csr(&ctx, MTVAL), u64::from(word));
    assert_eq!(ctx.cpu().csrs.minstret, minstret_before);
}

#[test]
fn test_rve_rejects_upper_registers() {
    let addi = inst().addi(16, 0, 1).build();
    let mut ctx = TestContext::with_isa("RV32E").load_program(&[addi]);
    assert_eq!(ctx.step(), StepOutcome::Trapped(Trap::IllegalInstruction(addi)));
}

// ══════════════════════════════════════════════════════════
// Zicsr
// ══════════════════════════════════════════════════════════

#[test]
fn test_csr_read_write_forms() {
    let mut ctx = TestContext::new().load_program(&[
        inst().csrrw(1, MSCRATCH, 2).build(),
        inst().csrrs(3, MSCRATCH, 0).build(),
        inst().csrrwi(0, MSCRATCH, 5).build(),
        inst().csrrs(4, MSCRATCH, 0).build(),
    ]);
    ctx.set_reg(2, 0x1234);

    assert_eq!(ctx.run(4), 4);
    assert_eq!(ctx.get_reg(1), 0);
    assert_eq!(ctx.get_reg(3), 0x1234);
    assert_eq!(ctx.get_reg(4), 5);
}

#[rstest]
#[case::read_only_write(inst().csrrw(1, 0xF11, 2).build())]
#[case::time_not_implemented(inst().csrrs(1, 0xC01, 0).build())]
#[case::unknown_csr(inst().csrrs(1, 0x7C0, 0).build())]
fn test_csr_instruction_illegal(#[case] word: u32) {
    let mut ctx = TestContext::new().load_program(&[word]);
    assert_eq!(ctx.step(), StepOutcome::Trapped(Trap::IllegalInstruction(word)));
}

#[test]
fn test_machine_csr_from_user_mode_is_illegal() {
    let word = inst().csrrs(1, 0x300, 0).build();
    let mut ctx = TestContext::new().load_program(&[word]).open_pmp();
    ctx.cpu_mut().privilege = PrivilegeMode::User;

    assert_eq!(ctx.step(), StepOutcome::Trapped(Trap::IllegalInstruction(word)));
    assert_eq!(ctx.cpu().privilege, PrivilegeMode::Machine);
    assert_eq!(ctx.get_reg(1), 0);
}
