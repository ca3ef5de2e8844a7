//! Floating-point rounding modes.
//!
//! | Value | Mode | Description                             |
//! |-------|------|-----------------------------------------|
//! | 0b000 | RNE  | Round to Nearest, ties to Even          |
//! | 0b001 | RTZ  | Round towards Zero                      |
//! | 0b010 | RDN  | Round Down (towards -inf)               |
//! | 0b011 | RUP  | Round Up (towards +inf)                 |
//! | 0b100 | RMM  | Round to Nearest, ties to Max Magnitude |
//!
//! `0b101` and `0b110` are reserved. `0b111` in an instruction selects `frm`,
//! and is itself invalid as an `frm` value.

/// IEEE 754 rounding direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RoundingMode {
    /// Round to nearest, ties to even.
    #[default]
    Rne = 0b000,
    /// Round towards zero.
    Rtz = 0b001,
    /// Round down.
    Rdn = 0b010,
    /// Round up.
    Rup = 0b011,
    /// Round to nearest, ties away from zero.
    Rmm = 0b100,
}

impl RoundingMode {
    /// Decodes a 3-bit rounding-mode field.
    ///
    /// # Returns
    ///
    /// `None` for the reserved values and for the dynamic selector `0b111`.
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits & 0x7 {
            0b000 => Some(Self::Rne),
            0b001 => Some(Self::Rtz),
            0b010 => Some(Self::Rdn),
            0b011 => Some(Self::Rup),
            0b100 => Some(Self::Rmm),
            _ => None,
        }
    }

    /// Rounds `val` to an integral value in this direction.
    pub fn round_integral(self, val: f64) -> f64 {
        match self {
            Self::Rne => val.round_ties_even(),
            Self::Rtz => val.trunc(),
            Self::Rdn => val.floor(),
            Self::Rup => val.ceil(),
            Self::Rmm => val.round(),
        }
    }
}
