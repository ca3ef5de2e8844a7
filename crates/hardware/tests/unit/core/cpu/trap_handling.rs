//! # Trap Handling Tests
//!
//! Delegation, vectored dispatch, `xRET` and interrupt selection.

use pretty_assertions::assert_eq;
use rstest::rstest;
use rvdiff_core::common::Trap;
use rvdiff_core::core::StepOutcome;
use rvdiff_core::core::arch::csr::{
    MIP_MEIP, MIP_MTIP, MIP_STIP, MSTATUS_MIE, MSTATUS_MPIE, MSTATUS_MPP, MSTATUS_SIE,
    MSTATUS_SPP, MSTATUS_TSR, MSTATUS_TVM, MSTATUS_TW,
};
use rvdiff_core::core::arch::mode::PrivilegeMode;
use rvdiff_core::isa::privileged::opcodes::{ECALL, MRET, SRET, WFI};

use crate::common::harness::{RAM_BASE, TestContext};

const M_HANDLER: u64 = RAM_BASE + 0x100;
const S_HANDLER: u64 = RAM_BASE + 0x200;
const SFENCE_VMA: u32 = 0x1200_0073;

fn in_mode(program: &[u32], mode: PrivilegeMode) -> TestContext {
    let mut ctx = TestContext::new().load_program(program).open_pmp();
    let cpu = ctx.cpu_mut();
    cpu.csrs.mtvec = M_HANDLER;
    cpu.csrs.stvec = S_HANDLER;
    cpu.privilege = mode;
    ctx
}

// ══════════════════════════════════════════════════════════
// Synchronous traps
// ══════════════════════════════════════════════════════════

#[test]
fn test_ecall_from_machine() {
    let mut ctx = in_mode(&[ECALL], PrivilegeMode::Machine);
    ctx.cpu_mut().csrs.mstatus |= MSTATUS_MIE;

    assert_eq!(
        ctx.step(),
        StepOutcome::Trapped(Trap::EnvironmentCallFromMMode)
    );
    let cpu = ctx.cpu();
    assert_eq!(cpu.csrs.mcause, 11);
    assert_eq!(cpu.csrs.mepc, RAM_BASE);
    assert_eq!(cpu.pc, M_HANDLER);
    assert_eq!(cpu.csrs.mstatus & MSTATUS_MIE, 0);
    assert_ne!(cpu.csrs.mstatus & MSTATUS_MPIE, 0);
    assert_eq!(cpu.csrs.mstatus & MSTATUS_MPP, MSTATUS_MPP);
}

#[rstest]
#[case::from_user(PrivilegeMode::User, 8, 0)]
#[case::from_supervisor(PrivilegeMode::Supervisor, 9, MSTATUS_SPP)]
fn test_delegated_ecall_goes_to_supervisor(
    #[case] mode: PrivilegeMode,
    #[case] cause: u64,
    #[case] spp: u64,
) {
    let mut ctx = in_mode(&[ECALL], mode);
    ctx.cpu_mut().csrs.medeleg = (1 << 8) | (1 << 9);
    ctx.cpu_mut().csrs.mstatus |= MSTATUS_SIE;

    let _ = ctx.step();
    let cpu = ctx.cpu();
    assert_eq!(cpu.privilege, PrivilegeMode::Supervisor);
    assert_eq!(cpu.csrs.scause, cause);
    assert_eq!(cpu.csrs.sepc, RAM_BASE);
    assert_eq!(cpu.pc, S_HANDLER);
    assert_eq!(cpu.csrs.mstatus & MSTATUS_SPP, spp);
    assert_eq!(cpu.csrs.mstatus & MSTATUS_SIE, 0);
    assert_eq!(cpu.csrs.mcause, 0, "machine state untouched");
}

#[test]
fn test_delegation_never_lowers_privilege() {
    let mut ctx = in_mode(&[0], PrivilegeMode::Machine);
    ctx.cpu_mut().csrs.medeleg = 1 << 2;

    assert_eq!(ctx.step(), StepOutcome::Trapped(Trap::IllegalInstruction(0)));
    assert_eq!(ctx.cpu().privilege, PrivilegeMode::Machine);
    assert_eq!(ctx.cpu().csrs.mcause, 2);
    assert_eq!(ctx.cpu().csrs.scause, 0);
}

#[test]
fn test_vectored_mode_only_offsets_interrupts() {
    let mut ctx = in_mode(&[ECALL], PrivilegeMode::Machine);
    ctx.cpu_mut().csrs.mtvec = M_HANDLER | 1;

    let _ = ctx.step();
    assert_eq!(ctx.cpu().pc, M_HANDLER);

    ctx.cpu_mut().take_trap(Trap::MachineExternalInterrupt, RAM_BASE);
    assert_eq!(ctx.cpu().pc, M_HANDLER + 4 * 11);
}

#[test]
fn test_rv32_cause_uses_bit_31() {
    let mut ctx = TestContext::rv32();
    ctx.cpu_mut().take_trap(Trap::MachineTimerInterrupt, RAM_BASE);
    assert_eq!(ctx.cpu().csrs.mcause, (1 << 31) | 7);
}

// ══════════════════════════════════════════════════════════
// Trap returns
// ══════════════════════════════════════════════════════════

#[test]
fn test_mret_restores_previous_mode() {
    let mut ctx = in_mode(&[MRET], PrivilegeMode::Machine);
    let cpu = ctx.cpu_mut();
    cpu.csrs.mepc = RAM_BASE + 0x40;
    cpu.csrs.mstatus = (cpu.csrs.mstatus & !MSTATUS_MPP) | (1 << 11) | MSTATUS_MPIE;

    assert_eq!(ctx.step(), StepOutcome::Retired);
    let cpu = ctx.cpu();
    assert_eq!(cpu.privilege, PrivilegeMode::Supervisor);
    assert_eq!(cpu.pc, RAM_BASE + 0x40);
    assert_ne!(cpu.csrs.mstatus & MSTATUS_MIE, 0);
    assert_ne!(cpu.csrs.mstatus & MSTATUS_MPIE, 0);
    assert_eq!(cpu.csrs.mstatus & MSTATUS_MPP, 0, "MPP drops to U");
}

#[test]
fn test_sret_returns_to_user() {
    let mut ctx = in_mode(&[SRET], PrivilegeMode::Supervisor);
    ctx.cpu_mut().csrs.sepc = RAM_BASE + 0x80;

    assert_eq!(ctx.step(), StepOutcome::Retired);
    assert_eq!(ctx.cpu().privilege, PrivilegeMode::User);
    assert_eq!(ctx.cpu().pc, RAM_BASE + 0x80);
}

#[rstest]
#[case::mret_from_supervisor(MRET, PrivilegeMode::Supervisor, 0)]
#[case::sret_from_user(SRET, PrivilegeMode::User, 0)]
#[case::sret_with_tsr(SRET, PrivilegeMode::Supervisor, MSTATUS_TSR)]
#[case::wfi_from_user(WFI, PrivilegeMode::User, 0)]
#[case::wfi_with_tw(WFI, PrivilegeMode::Supervisor, MSTATUS_TW)]
#[case::sfence_from_user(SFENCE_VMA, PrivilegeMode::User, 0)]
#[case::sfence_with_tvm(SFENCE_VMA, PrivilegeMode::Supervisor, MSTATUS_TVM)]
fn test_privileged_instruction_illegal(
    #[case] word: u32,
    #[case] mode: PrivilegeMode,
    #[case] mstatus: u64,
) {
    let mut ctx = in_mode(&[word], mode);
    ctx.cpu_mut().csrs.mstatus |= mstatus;
    assert_eq!(ctx.step(), StepOutcome::Trapped(Trap::IllegalInstruction(word)));
}

#[rstest]
#[case::wfi(WFI)]
#[case::sfence(SFENCE_VMA)]
fn test_privileged_instruction_retires_in_supervisor(#[case] word: u32) {
    let mut ctx = in_mode(&[word], PrivilegeMode::Supervisor);
    assert_eq!(ctx.step(), StepOutcome::Retired);
    assert_eq!(ctx.cpu().pc, RAM_BASE + 4);
}

// ══════════════════════════════════════════════════════════
// Interrupts
// ══════════════════════════════════════════════════════════

#[test]
fn test_machine_interrupts_need_mie_in_machine_mode() {
    let mut ctx = in_mode(&[ECALL], PrivilegeMode::Machine);
    let cpu = ctx.cpu_mut();
    cpu.csrs.mip = MIP_MTIP;
    cpu.csrs.mie = MIP_MTIP;
    assert_eq!(ctx.cpu().pending_interrupt(), None);

    ctx.cpu_mut().csrs.mstatus |= MSTATUS_MIE;
    assert_eq!(
        ctx.cpu().pending_interrupt(),
        Some(Trap::MachineTimerInterrupt)
    );
}

#[test]
fn test_machine_interrupts_always_enabled_below_machine() {
    let mut ctx = in_mode(&[ECALL], PrivilegeMode::Supervisor);
    let cpu = ctx.cpu_mut();
    cpu.csrs.mip = MIP_MTIP;
    cpu.csrs.mie = MIP_MTIP;

    assert_eq!(
        ctx.step(),
        StepOutcome::Trapped(Trap::MachineTimerInterrupt)
    );
    assert_eq!(ctx.cpu().csrs.mepc, RAM_BASE);
    assert_eq!(ctx.cpu().privilege, PrivilegeMode::Machine);
    assert_eq!(ctx.cpu().csrs.minstret, 0);
}

#[test]
fn test_external_beats_timer() {
    let mut ctx = in_mode(&[ECALL], PrivilegeMode::User);
    let cpu = ctx.cpu_mut();
    cpu.csrs.mip = MIP_MTIP | MIP_MEIP;
    cpu.csrs.mie = MIP_MTIP | MIP_MEIP;

    assert_eq!(
        ctx.cpu().pending_interrupt(),
        Some(Trap::MachineExternalInterrupt)
    );
}

#[rstest]
#[case::machine_mode(PrivilegeMode::Machine, MSTATUS_SIE, None)]
#[case::supervisor_disabled(PrivilegeMode::Supervisor, 0, None)]
#[case::supervisor_enabled(PrivilegeMode::Supervisor, MSTATUS_SIE, Some(Trap::SupervisorTimerInterrupt))]
#[case::user_mode(PrivilegeMode::User, 0, Some(Trap::SupervisorTimerInterrupt))]
fn test_delegated_interrupt_enable(
    #[case] mode: PrivilegeMode,
    #[case] mstatus: u64,
    #[case] expected: Option<Trap>,
) {
    let mut ctx = in_mode(&[ECALL], mode);
    let cpu = ctx.cpu_mut();
    cpu.csrs.mideleg = MIP_STIP;
    cpu.csrs.mip = MIP_STIP;
    cpu.csrs.mie = MIP_STIP;
    cpu.csrs.mstatus |= mstatus;

    assert_eq!(ctx.cpu().pending_interrupt(), expected);
}

#[test]
fn test_delegated_interrupt_handled_in_supervisor() {
    let mut ctx = in_mode(&[ECALL], PrivilegeMode::User);
    let cpu = ctx.cpu_mut();
    cpu.csrs.mideleg = MIP_STIP;
    cpu.csrs.mip = MIP_STIP;
    cpu.csrs.mie = MIP_STIP;

    assert_eq!(
        ctx.step(),
        StepOutcome::Trapped(Trap::SupervisorTimerInterrupt)
    );
    assert_eq!(ctx.cpu().privilege, PrivilegeMode::Supervisor);
    assert_eq!(ctx.cpu().csrs.scause, (1 << 63) | 5);
    assert_eq!(ctx.cpu().pc, S_HANDLER);
}
