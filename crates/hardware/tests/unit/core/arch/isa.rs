//! # ISA String and `misa` Tests

use pretty_assertions::assert_eq;
use rstest::rstest;
use rvdiff_core::common::Xlen;
use rvdiff_core::core::arch::misa::Isa;
use rvdiff_core::core::arch::mode::PrivilegeSet;

#[rstest]
#[case("RV64IMAC", Xlen::X64, false, "MAC")]
#[case("rv32i", Xlen::X32, false, "")]
#[case("RV32EC", Xlen::X32, true, "C")]
#[case("rv64ima_zicsr_zifencei", Xlen::X64, false, "MA")]
#[case("RV64IMACZicsr_Zifencei", Xlen::X64, false, "MAC")]
#[case("RV64IMAFDC", Xlen::X64, false, "MAFDC")]
#[case("RV32EMAFDC", Xlen::X32, true, "MAFDC")]
#[case("rv32imaf", Xlen::X32, false, "MAF")]
#[case("RV64GC", Xlen::X64, false, "MAFDC")]
fn test_parse(
    #[case] text: &str,
    #[case] xlen: Xlen,
    #[case] embedded: bool,
    #[case] extensions: &str,
) {
    let isa = Isa::parse(text).unwrap();
    let has = |letter| extensions.contains(letter);
    assert_eq!(
        isa,
        Isa {
            xlen,
            embedded,
            m: has('M'),
            a: has('A'),
            f: has('F'),
            d: has('D'),
            c: has('C'),
        }
    );
}

#[test]
fn test_double_requires_single() {
    assert!(Isa::parse("RV64IMADC").is_err());
}

#[test]
fn test_unknown_multi_letter_extension() {
    assert!(Isa::parse("RV64I_Zba").is_err());
}

#[test]
fn test_misa_rv64_msu() {
    let isa = Isa::parse("RV64IMAC").unwrap();
    let misa = isa.misa(PrivilegeSet::default());
    assert_eq!(misa >> 62, 2);
    let letters: String = (0..26u8)
        .filter(|bit| misa & (1 << bit) != 0)
        .map(|bit| char::from(b'A' + bit))
        .collect();
    assert_eq!(letters, "ACIMSU");
}

#[test]
fn test_misa_rv32e_machine_only() {
    let isa = Isa::parse("RV32EM").unwrap();
    let privileges = PrivilegeSet::parse("M").unwrap();
    let misa = isa.misa(privileges);
    assert_eq!(misa >> 30, 1);
    assert_ne!(misa & (1 << 4), 0);
    assert_eq!(misa & (1 << 8), 0);
    assert_eq!(misa & ((1 << 18) | (1 << 20)), 0);
}

#[test]
fn test_misa_reports_float_extensions() {
    let isa = Isa::parse("RV64IMAFDC").unwrap();
    let misa = isa.misa(PrivilegeSet::default());
    assert_ne!(misa & (1 << 3), 0, "D");
    assert_ne!(misa & (1 << 5), 0, "F");
}

#[rstest]
#[case("rv64imac", "RV64IMAC")]
#[case("rv32emafdc", "RV32EMAFDC")]
#[case("rv64g", "RV64IMAFD")]
fn test_display(#[case] text: &str, #[case] shown: &str) {
    assert_eq!(Isa::parse(text).unwrap().to_string(), shown);
}
