//! # General-Purpose Register Tests

use pretty_assertions::assert_eq;
use rvdiff_core::core::arch::gpr::Gpr;

#[test]
fn test_x0_hardwired_to_zero() {
    let mut regs = Gpr::new();
    regs.write(0, 0xDEAD);
    assert_eq!(regs.read(0), 0);
}

#[test]
fn test_write_then_read() {
    let mut regs = Gpr::new();
    for i in 1..32 {
        regs.write(i, i as u64 * 3);
    }
    for i in 1..32 {
        assert_eq!(regs.read(i), i as u64 * 3);
    }
}

#[test]
fn test_out_of_range_index_is_ignored() {
    let mut regs = Gpr::new();
    regs.write(40, 1);
    assert_eq!(regs.read(40), 0);
}
