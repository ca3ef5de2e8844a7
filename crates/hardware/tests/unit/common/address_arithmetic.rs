//! # Address Arithmetic Tests
//!
//! Page offsets, VPN slicing and PPN composition used by the page walker.

use pretty_assertions::assert_eq;
use rvdiff_core::common::{PhysAddr, VirtAddr};

#[test]
fn test_page_offset_and_number() {
    let va = VirtAddr::new(0x8000_1234);
    assert_eq!(va.page_offset(), 0x234);
    assert_eq!(va.page_number(), 0x80001);
}

#[test]
fn test_sv39_vpn_slices() {
    // vpn2 = 0x1, vpn1 = 0x2, vpn0 = 0x3
    let va = VirtAddr::new((1 << 30) | (2 << 21) | (3 << 12) | 0xABC);
    assert_eq!(va.vpn(2, 9), 1);
    assert_eq!(va.vpn(1, 9), 2);
    assert_eq!(va.vpn(0, 9), 3);
}

#[test]
fn test_sv32_vpn_slices() {
    let va = VirtAddr::new((0x155 << 22) | (0x2AA << 12));
    assert_eq!(va.vpn(1, 10), 0x155);
    assert_eq!(va.vpn(0, 10), 0x2AA);
}

#[test]
fn test_phys_from_ppn() {
    assert_eq!(PhysAddr::from_ppn(0x80002, 0x10).val(), 0x8000_2010);
}

#[test]
fn test_display_is_hex() {
    assert_eq!(PhysAddr::new(0x8000_0000).to_string(), "0x80000000");
}
