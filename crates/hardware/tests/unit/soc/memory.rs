//! # RAM Device Tests

use pretty_assertions::assert_eq;
use rvdiff_core::soc::memory::buffer::DramBuffer;
use rvdiff_core::soc::{Device, Memory};

#[test]
fn test_buffer_is_zeroed() {
    let buffer = DramBuffer::new(0x2000).expect("buffer");
    assert_eq!(buffer.len(), 0x2000);
    assert!(!buffer.is_empty());
    assert!(buffer.as_slice().iter().all(|&b| b == 0));
}

#[test]
fn test_zero_sized_buffer_rejected() {
    let err = DramBuffer::new(0).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
}

#[test]
fn test_buffer_mutable_view() {
    let mut buffer = DramBuffer::new(16).expect("buffer");
    buffer.as_mut_slice()[3] = 0x7F;
    assert_eq!(buffer.as_slice()[3], 0x7F);
}

#[test]
fn test_memory_reports_name_and_range() {
    let mem = Memory::new(DramBuffer::new(0x1000).expect("buffer"), 0x8000_0000);
    assert_eq!(mem.name(), "DRAM");
    assert_eq!(mem.address_range(), (0x8000_0000, 0x1000));
}

#[test]
fn test_load_then_read_back() {
    let mut mem = Memory::new(DramBuffer::new(0x100).expect("buffer"), 0x8000_0000);
    assert!(mem.load(&[1, 2, 3, 4], 0x10));

    let mut buf = [0u8; 4];
    mem.read_bytes(0x10, &mut buf);
    assert_eq!(buf, [1, 2, 3, 4]);
}

#[test]
fn test_load_past_end_leaves_memory_untouched() {
    let mut mem = Memory::new(DramBuffer::new(0x100).expect("buffer"), 0);
    assert!(!mem.load(&[0xFF; 4], 0xFE));
    assert!(!mem.load(&[0xFF], usize::MAX));

    let mut buf = [0xAAu8; 2];
    mem.read_bytes(0xFE, &mut buf);
    assert_eq!(buf, [0, 0]);
}

#[test]
fn test_load_exactly_to_end() {
    let mut mem = Memory::new(DramBuffer::new(0x100).expect("buffer"), 0);
    assert!(mem.load(&[0x11, 0x22], 0xFE));

    let mut buf = [0u8; 2];
    mem.read_bytes(0xFE, &mut buf);
    assert_eq!(buf, [0x11, 0x22]);
}

#[test]
fn test_device_write_bytes() {
    let mut mem = Memory::new(DramBuffer::new(0x100).expect("buffer"), 0);
    mem.write_bytes(8, &[0xEF, 0xBE]);

    let mut buf = [0u8; 2];
    mem.read_bytes(8, &mut buf);
    assert_eq!(buf, [0xEF, 0xBE]);
}
