//! # Bus Interconnect Tests
//!
//! Routing of physical accesses to devices, with `mockall` devices standing in
//! for real peripherals.

use pretty_assertions::assert_eq;
use rstest::rstest;
use rvdiff_core::common::PhysAddr;
use rvdiff_core::soc::memory::buffer::DramBuffer;
use rvdiff_core::soc::{Bus, Memory};

use crate::common::mocks::device::mapped;

fn ram_bus() -> Bus {
    let mut bus = Bus::new();
    let buffer = DramBuffer::new(0x1000).expect("buffer");
    bus.add_device(Box::new(Memory::new(buffer, 0x8000_0000)));
    bus
}

// ══════════════════════════════════════════════════════════
// Routing
// ══════════════════════════════════════════════════════════

#[test]
fn test_write_routed_with_device_offset() {
    let mut dev = mapped("uart", 0x1000, 0x100);
    let _ = dev
        .expect_write_bytes()
        .withf(|offset, data| *offset == 0x10 && data == [0xDD, 0xCC, 0xBB, 0xAA])
        .times(1)
        .return_const(());

    let mut bus = Bus::new();
    bus.add_device(Box::new(dev));
    assert_eq!(bus.write(PhysAddr::new(0x1010), 4, 0xAABB_CCDD), Some(()));
}

#[test]
fn test_read_assembles_little_endian() {
    let mut dev = mapped("rom", 0x2000, 0x100);
    let _ = dev
        .expect_read_bytes()
        .withf(|offset, buf| *offset == 0x4 && buf.len() == 2)
        .times(1)
        .returning(|_, buf| buf.copy_from_slice(&[0x34, 0x12]));

    let mut bus = Bus::new();
    bus.add_device(Box::new(dev));
    assert_eq!(bus.read(PhysAddr::new(0x2004), 2), Some(0x1234));
}

#[test]
fn test_second_device_selected_by_address() {
    let low = mapped("low", 0x1000, 0x100);
    let mut high = mapped("high", 0x4000, 0x100);
    let _ = high
        .expect_write_bytes()
        .withf(|offset, data| *offset == 0 && data == [0x5A])
        .times(1)
        .return_const(());

    let mut bus = Bus::new();
    bus.add_device(Box::new(low));
    bus.add_device(Box::new(high));
    assert_eq!(bus.write(PhysAddr::new(0x4000), 1, 0x5A), Some(()));
}

// ══════════════════════════════════════════════════════════
// Unbacked accesses
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::below(0x0FFF, 1)]
#[case::past_end(0x1100, 1)]
#[case::crosses_end(0x10FE, 4)]
fn test_unbacked_access_never_reaches_device(#[case] addr: u64, #[case] size: usize) {
    // No read/write expectations: any call would panic.
    let mut bus = Bus::new();
    bus.add_device(Box::new(mapped("dev", 0x1000, 0x100)));

    assert_eq!(bus.read(PhysAddr::new(addr), size), None);
    assert_eq!(bus.write(PhysAddr::new(addr), size, 0), None);
}

#[test]
fn test_access_straddling_adjacent_devices_rejected() {
    let mut bus = Bus::new();
    bus.add_device(Box::new(mapped("a", 0x1000, 0x100)));
    bus.add_device(Box::new(mapped("b", 0x1100, 0x100)));

    assert_eq!(bus.read(PhysAddr::new(0x10FE), 4), None);
    assert!(!bus.is_valid_range(0x10FE, 4));
    assert!(bus.is_valid_range(0x10FC, 4));
    assert!(bus.is_valid_range(0x1100, 4));
}

#[test]
fn test_empty_bus_rejects_everything() {
    let mut bus = Bus::new();
    assert_eq!(bus.read(PhysAddr::new(0), 1), None);
    assert!(!bus.is_valid_range(0, 1));
}

#[test]
fn test_valid_range_rejects_address_wrap() {
    let bus = ram_bus();
    assert!(!bus.is_valid_range(u64::MAX, 2));
}

// ══════════════════════════════════════════════════════════
// Registration
// ══════════════════════════════════════════════════════════

#[test]
fn test_devices_listed_by_base() {
    let mut bus = Bus::new();
    bus.add_device(Box::new(mapped("high", 0x9000, 0x10)));
    bus.add_device(Box::new(mapped("low", 0x1000, 0x20)));

    let listed: Vec<_> = bus
        .devices()
        .map(|(name, base, size)| (name.to_owned(), base, size))
        .collect();
    assert_eq!(
        listed,
        vec![
            ("low".to_owned(), 0x1000, 0x20),
            ("high".to_owned(), 0x9000, 0x10)
        ]
    );
}

// ══════════════════════════════════════════════════════════
// RAM behind the bus
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::byte(1, 0xAB)]
#[case::half(2, 0xABCD)]
#[case::word(4, 0xDEAD_BEEF)]
#[case::double(8, 0x0123_4567_89AB_CDEF)]
fn test_ram_sized_round_trip(#[case] size: usize, #[case] val: u64) {
    let mut bus = ram_bus();
    assert_eq!(bus.write(PhysAddr::new(0x8000_0010), size, val), Some(()));
    assert_eq!(bus.read(PhysAddr::new(0x8000_0010), size), Some(val));
}

#[test]
fn test_ram_write_truncates_to_size() {
    let mut bus = ram_bus();
    bus.write(PhysAddr::new(0x8000_0000), 8, u64::MAX).expect("backed");
    bus.write(PhysAddr::new(0x8000_0000), 2, 0x1_2345).expect("backed");
    assert_eq!(bus.read(PhysAddr::new(0x8000_0000), 8), Some(0xFFFF_FFFF_FFFF_2345));
}

#[test]
fn test_oversized_access_rejected() {
    let mut bus = ram_bus();
    assert_eq!(bus.read(PhysAddr::new(0x8000_0000), 16), None);
}
