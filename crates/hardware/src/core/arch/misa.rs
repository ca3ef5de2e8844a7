//! ISA description and `misa` encoding.
//!
//! Parses ISA strings of the form `RV64IMAFDC` or `rv32emc_zicsr_zifencei` into an
//! [`Isa`], and builds the read-only `misa` value from it. `G` stands for
//! `IMAFD` with Zicsr and Zifencei. Q and vector extensions are not modelled and
//! are rejected at parse time.

use crate::common::{ConfigError, Xlen};
use crate::core::arch::mode::PrivilegeSet;

/// The instruction-set features a hart implements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Isa {
    /// Register width.
    pub xlen: Xlen,
    /// RVE base: only `x0`-`x15` exist.
    pub embedded: bool,
    /// M extension (multiply/divide).
    pub m: bool,
    /// A extension (atomics).
    pub a: bool,
    /// F extension (single-precision floating point).
    pub f: bool,
    /// D extension (double-precision floating point, requires F).
    pub d: bool,
    /// C extension (compressed instructions).
    pub c: bool,
}

impl Isa {
    /// Parses an ISA string (case-insensitive).
    ///
    /// # Errors
    ///
    /// * `ConfigError::InvalidIsa` when the `RV32`/`RV64` prefix or the I/E/G base is
    ///   missing, a letter repeats, or D is given without F.
    /// * `ConfigError::UnsupportedExtension` for extensions the model does not implement.
    pub fn parse(isa: &str) -> Result<Self, ConfigError> {
        let lower = isa.to_ascii_lowercase();
        let invalid = || ConfigError::InvalidIsa(isa.to_string());
        let unsupported = |ext: &str| ConfigError::UnsupportedExtension {
            isa: isa.to_string(),
            extension: ext.to_string(),
        };

        let mut parts = lower.split('_');
        let head = parts.next().unwrap_or_default();

        let (xlen, rest) = if let Some(rest) = head.strip_prefix("rv64") {
            (Xlen::X64, rest)
        } else if let Some(rest) = head.strip_prefix("rv32") {
            (Xlen::X32, rest)
        } else {
            return Err(invalid());
        };

        let mut letters = rest.chars();
        let (embedded, general) = match letters.next() {
            Some('i') => (false, false),
            Some('e') => (true, false),
            Some('g') => (false, true),
            _ => return Err(invalid()),
        };

        let mut parsed = Self {
            xlen,
            embedded,
            m: general,
            a: general,
            f: general,
            d: general,
            c: false,
        };

        for letter in letters {
            let flag = match letter {
                'm' => &mut parsed.m,
                'a' => &mut parsed.a,
                'f' => &mut parsed.f,
                'd' => &mut parsed.d,
                'c' => &mut parsed.c,
                // Zicsr and Zifencei may also be spelled without the separator.
                'z' => break,
                other => return Err(unsupported(&other.to_ascii_uppercase().to_string())),
            };
            if *flag {
                return Err(invalid());
            }
            *flag = true;
        }

        if parsed.d && !parsed.f {
            return Err(invalid());
        }

        let multi = rest.find('z').map(|pos| &rest[pos..]).into_iter();
        for ext in multi.chain(parts) {
            match ext {
                "zicsr" | "zifencei" | "zicsrzifencei" | "" => {}
                other => return Err(unsupported(other)),
            }
        }

        Ok(parsed)
    }

    /// Number of architectural integer registers (16 on RVE, 32 otherwise).
    pub const fn gpr_count(&self) -> usize {
        if self.embedded { 16 } else { 32 }
    }

    /// `misa` value for this ISA combined with the implemented privilege modes.
    pub fn misa(&self, privileges: PrivilegeSet) -> u64 {
        let letter = |c: u8| 1u64 << (c - b'A');
        let mut extensions = if self.embedded { letter(b'E') } else { letter(b'I') };
        if self.m {
            extensions |= letter(b'M');
        }
        if self.a {
            extensions |= letter(b'A');
        }
        if self.f {
            extensions |= letter(b'F');
        }
        if self.d {
            extensions |= letter(b'D');
        }
        if self.c {
            extensions |= letter(b'C');
        }
        if privileges.supervisor {
            extensions |= letter(b'S');
        }
        if privileges.user {
            extensions |= letter(b'U');
        }
        (self.xlen.mxl() << (self.xlen.bits() - 2)) | extensions
    }
}

impl std::fmt::Display for Isa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.xlen, if self.embedded { 'E' } else { 'I' })?;
        let letters = [
            (self.m, 'M'),
            (self.a, 'A'),
            (self.f, 'F'),
            (self.d, 'D'),
            (self.c, 'C'),
        ];
        for (present, letter) in letters {
            if present {
                write!(f, "{letter}")?;
            }
        }
        Ok(())
    }
}
