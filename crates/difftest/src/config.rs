//! Compile-time reference configuration.
//!
//! The DUT harness has no way to pass a configuration through `difftest_init`, so
//! the reference is described by the crate features it was built with.

use rvdiff_core::config::Config;

/// ISA string of this build.
#[cfg(all(feature = "rv32", feature = "rve"))]
pub const ISA: &str = "RV32EMAFDC";
/// ISA string of this build.
#[cfg(all(feature = "rv32", not(feature = "rve")))]
pub const ISA: &str = "RV32IMAFDC";
/// ISA string of this build.
#[cfg(all(not(feature = "rv32"), feature = "rve"))]
pub const ISA: &str = "RV64EMAFDC";
/// ISA string of this build.
#[cfg(all(not(feature = "rv32"), not(feature = "rve")))]
pub const ISA: &str = "RV64IMAFDC";

/// Privilege modes of the reference hart.
pub const PRIVILEGES: &str = "MSU";

/// PMP entries of the reference hart.
pub const PMP_REGIONS: usize = 16;

/// Debug triggers of the reference hart.
pub const TRIGGER_COUNT: usize = 4;

/// The configuration `difftest_init` builds: one little-endian hart (id 0) with
/// [`ISA`], [`PRIVILEGES`], no misaligned access support and no real-time CLINT,
/// on the default memory layout.
pub fn difftest_config() -> Config {
    Config {
        isa: ISA.to_owned(),
        privileges: PRIVILEGES.to_owned(),
        endianness: "little".to_owned(),
        misaligned: false,
        pmp_regions: PMP_REGIONS,
        trigger_count: TRIGGER_COUNT,
        hart_ids: vec![0],
        real_time_clint: false,
        ..Config::default()
    }
}
