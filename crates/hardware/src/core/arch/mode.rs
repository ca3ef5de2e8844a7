//! RISC-V Privilege Modes.
//!
//! This module defines the privilege levels supported by the RISC-V architecture.
//! It implements the following:
//! 1. **Mode Classification:** User (U), Supervisor (S), and Machine (M) modes.
//! 2. **Configuration:** The set of modes a hart implements, parsed from strings like `"MSU"`.
//! 3. **Observability:** Human-readable naming and display formatting for privilege states.

use crate::common::ConfigError;

/// RISC-V privilege mode levels.
///
/// Ordered so that comparisons follow privilege: `User < Supervisor < Machine`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrivilegeMode {
    /// User mode (U-mode).
    User = 0,

    /// Supervisor mode (S-mode).
    Supervisor = 1,

    /// Machine mode (M-mode).
    Machine = 3,
}

impl PrivilegeMode {
    /// Decodes a 2-bit privilege field (`mstatus.MPP`). The reserved value 2 yields `None`.
    pub const fn from_bits(val: u64) -> Option<Self> {
        match val & 3 {
            0 => Some(Self::User),
            1 => Some(Self::Supervisor),
            3 => Some(Self::Machine),
            _ => None,
        }
    }

    /// Encodes the mode as a 2-bit privilege field.
    pub const fn to_bits(self) -> u64 {
        self as u64
    }

    /// Returns the human-readable name of the privilege mode.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Supervisor => "Supervisor",
            Self::Machine => "Machine",
        }
    }
}

impl std::fmt::Display for PrivilegeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The privilege modes a hart implements.
///
/// Machine mode is always present. Supervisor mode requires user mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PrivilegeSet {
    /// Supervisor mode is implemented.
    pub supervisor: bool,
    /// User mode is implemented.
    pub user: bool,
}

impl PrivilegeSet {
    /// Parses a mode string such as `"M"`, `"MU"` or `"MSU"` (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPrivilege` when M is missing, a letter repeats
    /// or is unknown, or S is requested without U.
    pub fn parse(modes: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidPrivilege(modes.to_string());
        let (mut m, mut s, mut u) = (false, false, false);

        for c in modes.chars() {
            let seen = match c.to_ascii_uppercase() {
                'M' => &mut m,
                'S' => &mut s,
                'U' => &mut u,
                _ => return Err(invalid()),
            };
            if *seen {
                return Err(invalid());
            }
            *seen = true;
        }

        if !m || (s && !u) {
            return Err(invalid());
        }
        Ok(Self {
            supervisor: s,
            user: u,
        })
    }

    /// Returns true when `mode` is implemented.
    pub const fn supports(&self, mode: PrivilegeMode) -> bool {
        match mode {
            PrivilegeMode::Machine => true,
            PrivilegeMode::Supervisor => self.supervisor,
            PrivilegeMode::User => self.user,
        }
    }

    /// The least-privileged implemented mode.
    pub const fn lowest(&self) -> PrivilegeMode {
        if self.user {
            PrivilegeMode::User
        } else {
            PrivilegeMode::Machine
        }
    }
}

impl Default for PrivilegeSet {
    fn default() -> Self {
        Self {
            supervisor: true,
            user: true,
        }
    }
}
