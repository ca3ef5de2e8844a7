//! Configuration system for the reference model.
//!
//! This module defines the configuration record used to construct a [`Simulator`](crate::sim::Simulator).
//! It provides:
//! 1. **Defaults:** Baseline hart and memory parameters matching a NEMU difftest reference.
//! 2. **Structures:** The flat `Config` record and its memory layout list.
//! 3. **Validation:** Parsing of the ISA, privilege and endianness strings and memory layout checks.
//!
//! Configuration is built in code by the difftest adapter, or deserialized from JSON
//! for Rust-API users and tests.

use std::path::Path;

use serde::Deserialize;

use crate::common::ConfigError;
use crate::core::arch::misa::Isa;
use crate::core::arch::mode::PrivilegeSet;
use crate::core::units::mmu::pmp::PMP_MAX_ENTRIES;

/// Default configuration constants for the reference model.
mod defaults {
    /// Base address of main system RAM (2 GiB).
    pub const RAM_BASE: u64 = crate::common::constants::DRAM_BASE;

    /// Total size of main system RAM (128 MiB).
    pub const RAM_SIZE: u64 = crate::common::constants::DRAM_SIZE;

    /// ISA string of the default hart.
    pub const ISA: &str = "RV64IMAFDC";

    /// Implemented privilege modes.
    pub const PRIVILEGES: &str = "MSU";

    /// Data endianness.
    pub const ENDIANNESS: &str = "little";

    /// Number of PMP entries.
    pub const PMP_REGIONS: usize = 16;

    /// Number of debug triggers.
    pub const TRIGGER_COUNT: usize = 4;

    /// Entries per TLB.
    pub const TLB_SIZE: usize = crate::core::units::mmu::tlb::DEFAULT_TLB_SIZE;
}

/// Byte order of data accesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    /// Little-endian, the only order the engine implements.
    #[default]
    Little,
}

impl Endianness {
    /// Parses an endianness name (`"little"`, case-insensitive).
    ///
    /// # Errors
    ///
    /// `UnsupportedEndianness` for `"big"` and anything unrecognised.
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        if name.eq_ignore_ascii_case("little") {
            Ok(Self::Little)
        } else {
            Err(ConfigError::UnsupportedEndianness(name.to_owned()))
        }
    }
}

/// One contiguous RAM region of the physical memory layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MemoryRegionConfig {
    /// Physical base address.
    pub base: u64,
    /// Size in bytes.
    pub size: u64,
}

impl MemoryRegionConfig {
    /// Exclusive end address, `None` if the region wraps the address space.
    pub const fn end(&self) -> Option<u64> {
        self.base.checked_add(self.size)
    }
}

impl Default for MemoryRegionConfig {
    fn default() -> Self {
        Self {
            base: defaults::RAM_BASE,
            size: defaults::RAM_SIZE,
        }
    }
}

/// Root configuration record for one reference-model instance.
///
/// Immutable once a simulator has been built from it.
///
/// # Examples
///
/// ```
/// use rvdiff_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.isa, "RV64IMAFDC");
/// assert_eq!(config.pmp_regions, 16);
/// assert!(config.validate().is_ok());
/// ```
///
/// Deserializing from JSON:
///
/// ```
/// use rvdiff_core::config::Config;
///
/// let json = r#"{
///     "isa": "RV32IMC",
///     "priv": "MU",
///     "misaligned": true,
///     "memory": [{ "base": 2147483648, "size": 1048576 }]
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.privileges, "MU");
/// assert_eq!(config.memory[0].size, 0x10_0000);
/// assert_eq!(config.hart_ids, vec![0]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// ISA string, e.g. `RV64IMAFDC` or `RV32EMC`.
    #[serde(default = "Config::default_isa")]
    pub isa: String,

    /// Implemented privilege modes, e.g. `MSU`.
    #[serde(rename = "priv", default = "Config::default_privileges")]
    pub privileges: String,

    /// Data endianness name.
    #[serde(default = "Config::default_endianness")]
    pub endianness: String,

    /// Split misaligned loads/stores instead of raising address-misaligned exceptions.
    #[serde(default)]
    pub misaligned: bool,

    /// Number of implemented PMP entries (0..=64).
    #[serde(default = "Config::default_pmp_regions")]
    pub pmp_regions: usize,

    /// Number of debug triggers selectable through `tselect`.
    #[serde(default = "Config::default_trigger_count")]
    pub trigger_count: usize,

    /// `mhartid` of each hart; at least one.
    #[serde(default = "Config::default_hart_ids")]
    pub hart_ids: Vec<usize>,

    /// Drive the CLINT from wall-clock time. Accepted for compatibility; the
    /// engine models no CLINT.
    #[serde(default)]
    pub real_time_clint: bool,

    /// Physical RAM regions.
    #[serde(default = "Config::default_memory")]
    pub memory: Vec<MemoryRegionConfig>,

    /// Reset PC of every hart.
    #[serde(default = "Config::default_start_pc")]
    pub start_pc: u64,

    /// Entries in each of the instruction and data TLBs.
    #[serde(default = "Config::default_tlb_size")]
    pub tlb_size: usize,
}

impl Config {
    fn default_isa() -> String {
        defaults::ISA.to_owned()
    }

    fn default_privileges() -> String {
        defaults::PRIVILEGES.to_owned()
    }

    fn default_endianness() -> String {
        defaults::ENDIANNESS.to_owned()
    }

    const fn default_pmp_regions() -> usize {
        defaults::PMP_REGIONS
    }

    const fn default_trigger_count() -> usize {
        defaults::TRIGGER_COUNT
    }

    fn default_hart_ids() -> Vec<usize> {
        vec![0]
    }

    fn default_memory() -> Vec<MemoryRegionConfig> {
        vec![MemoryRegionConfig::default()]
    }

    const fn default_start_pc() -> u64 {
        defaults::RAM_BASE
    }

    const fn default_tlb_size() -> usize {
        defaults::TLB_SIZE
    }

    /// Parses a configuration from a JSON document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// `ConfigError::Json` on malformed input.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// `ConfigError::Io` if the file cannot be read, `ConfigError::Json` if it does not parse.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parsed ISA.
    ///
    /// # Errors
    ///
    /// `InvalidIsa` or `UnsupportedExtension`.
    pub fn parsed_isa(&self) -> Result<Isa, ConfigError> {
        Isa::parse(&self.isa)
    }

    /// Parsed privilege-mode set.
    ///
    /// # Errors
    ///
    /// `InvalidPrivilege`.
    pub fn parsed_privileges(&self) -> Result<PrivilegeSet, ConfigError> {
        PrivilegeSet::parse(&self.privileges)
    }

    /// Parsed endianness.
    ///
    /// # Errors
    ///
    /// `UnsupportedEndianness`.
    pub fn parsed_endianness(&self) -> Result<Endianness, ConfigError> {
        Endianness::parse(&self.endianness)
    }

    /// Checks every field a simulator depends on.
    ///
    /// # Errors
    ///
    /// The first problem found, in field order.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let _ = self.parsed_isa()?;
        let _ = self.parsed_privileges()?;
        let _ = self.parsed_endianness()?;

        if self.hart_ids.is_empty() {
            return Err(ConfigError::NoHarts);
        }
        if self.pmp_regions > PMP_MAX_ENTRIES {
            return Err(ConfigError::InvalidPmpCount(self.pmp_regions));
        }
        self.validate_memory()
    }

    fn validate_memory(&self) -> Result<(), ConfigError> {
        if self.memory.is_empty() {
            return Err(ConfigError::EmptyMemory);
        }
        for region in &self.memory {
            if region.size == 0 || region.end().is_none() {
                return Err(ConfigError::InvalidMemoryRegion {
                    base: region.base,
                    size: region.size,
                });
            }
        }

        let mut sorted = self.memory.clone();
        sorted.sort_by_key(|r| r.base);
        for pair in sorted.windows(2) {
            if let [a, b] = pair
                && a.end().is_some_and(|end| end > b.base)
            {
                return Err(ConfigError::OverlappingMemory {
                    first: a.base,
                    second: b.base,
                });
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            isa: Self::default_isa(),
            privileges: Self::default_privileges(),
            endianness: Self::default_endianness(),
            misaligned: false,
            pmp_regions: Self::default_pmp_regions(),
            trigger_count: Self::default_trigger_count(),
            hart_ids: Self::default_hart_ids(),
            real_time_clint: false,
            memory: Self::default_memory(),
            start_pc: Self::default_start_pc(),
            tlb_size: Self::default_tlb_size(),
        }
    }
}
