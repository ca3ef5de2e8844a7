//! # Privilege Mode Tests

use pretty_assertions::assert_eq;
use rstest::rstest;
use rvdiff_core::core::arch::mode::{PrivilegeMode, PrivilegeSet};

#[rstest]
#[case(0, Some(PrivilegeMode::User))]
#[case(1, Some(PrivilegeMode::Supervisor))]
#[case(2, None)]
#[case(3, Some(PrivilegeMode::Machine))]
#[case(7, Some(PrivilegeMode::Machine))]
fn test_from_bits(#[case] bits: u64, #[case] expected: Option<PrivilegeMode>) {
    assert_eq!(PrivilegeMode::from_bits(bits), expected);
}

#[test]
fn test_ordering_follows_privilege() {
    assert!(PrivilegeMode::User < PrivilegeMode::Supervisor);
    assert!(PrivilegeMode::Supervisor < PrivilegeMode::Machine);
}

#[test]
fn test_display() {
    assert_eq!(PrivilegeMode::Supervisor.to_string(), "Supervisor");
}

#[rstest]
#[case("M", false, false)]
#[case("MU", false, true)]
#[case("msu", true, true)]
#[case("UMS", true, true)]
fn test_parse_set(#[case] text: &str, #[case] supervisor: bool, #[case] user: bool) {
    assert_eq!(
        PrivilegeSet::parse(text).unwrap(),
        PrivilegeSet { supervisor, user }
    );
}

#[test]
fn test_lowest_and_supports() {
    let machine_only = PrivilegeSet::parse("M").unwrap();
    assert_eq!(machine_only.lowest(), PrivilegeMode::Machine);
    assert!(!machine_only.supports(PrivilegeMode::User));
    assert!(machine_only.supports(PrivilegeMode::Machine));

    let full = PrivilegeSet::default();
    assert_eq!(full.lowest(), PrivilegeMode::User);
    assert!(full.supports(PrivilegeMode::Supervisor));
}
