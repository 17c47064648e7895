//! # Print Density
//!
//! Zebra print heads come in a handful of fixed resolutions. The density
//! only matters for converting dots to physical size, e.g. when sizing the
//! preview label.
//!
//! | Density | DPI | Dots per mm |
//! |---------|-----|-------------|
//! | `Dpmm6` | 152 | 6 |
//! | `Dpmm8` | 203 | 8 |
//! | `Dpmm12` | 300 | 12 |
//! | `Dpmm24` | 600 | 24 |
//!
//! ## Calculations
//!
//! ```text
//! width_mm = round(width_dots / dots_per_mm)
//!
//! For 8 dpmm:
//!   300 dots / 8 = 37.5 → 38 mm
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ZplError;

/// Print head resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Density {
    Dpmm6,
    #[default]
    Dpmm8,
    Dpmm12,
    Dpmm24,
}

impl Density {
    /// All supported densities, lowest first.
    pub const ALL: [Density; 4] = [
        Density::Dpmm6,
        Density::Dpmm8,
        Density::Dpmm12,
        Density::Dpmm24,
    ];

    /// Dots per millimetre
    ///
    /// ## Example
    ///
    /// ```
    /// use image_to_zpl::printer::Density;
    ///
    /// assert_eq!(Density::default().dots_per_mm(), 8);
    /// ```
    #[inline]
    pub fn dots_per_mm(self) -> u32 {
        match self {
            Density::Dpmm6 => 6,
            Density::Dpmm8 => 8,
            Density::Dpmm12 => 12,
            Density::Dpmm24 => 24,
        }
    }

    /// Nominal dots per inch
    #[inline]
    pub fn dpi(self) -> u32 {
        match self {
            Density::Dpmm6 => 152,
            Density::Dpmm8 => 203,
            Density::Dpmm12 => 300,
            Density::Dpmm24 => 600,
        }
    }

    /// Convert dots to whole millimetres, rounding half up.
    #[inline]
    pub fn dots_to_mm(self, dots: u32) -> u32 {
        (dots as f64 / self.dots_per_mm() as f64).round() as u32
    }

    /// Look up a density by dots per millimetre.
    pub fn from_dots_per_mm(dpmm: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.dots_per_mm() == dpmm)
    }
}

impl FromStr for Density {
    type Err = ZplError;

    /// Parse `"8"`, `"8dpmm"` or `"203dpi"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let parsed = if let Some(dpi) = lower.strip_suffix("dpi") {
            dpi.trim()
                .parse::<u32>()
                .ok()
                .and_then(|dpi| Self::ALL.into_iter().find(|d| d.dpi() == dpi))
        } else {
            lower
                .strip_suffix("dpmm")
                .unwrap_or(&lower)
                .trim()
                .parse::<u32>()
                .ok()
                .and_then(Self::from_dots_per_mm)
        };

        parsed.ok_or_else(|| {
            ZplError::InvalidOption(format!(
                "unknown density '{}' (use 6, 8, 12 or 24 dots per mm)",
                s
            ))
        })
    }
}

impl fmt::Display for Density {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}dpmm", self.dots_per_mm())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_8_dpmm() {
        assert_eq!(Density::default(), Density::Dpmm8);
        assert_eq!(Density::default().dpi(), 203);
    }

    #[test]
    fn test_dots_to_mm_rounds() {
        let density = Density::Dpmm8;
        assert_eq!(density.dots_to_mm(150), 19); // 18.75
        assert_eq!(density.dots_to_mm(300), 38); // 37.5
        assert_eq!(density.dots_to_mm(0), 0);
    }

    #[test]
    fn test_parse() {
        assert_eq!("8".parse::<Density>().unwrap(), Density::Dpmm8);
        assert_eq!("12dpmm".parse::<Density>().unwrap(), Density::Dpmm12);
        assert_eq!("600dpi".parse::<Density>().unwrap(), Density::Dpmm24);
        assert!("7".parse::<Density>().is_err());
        assert!("300 dots".parse::<Density>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Density::Dpmm6.to_string(), "6dpmm");
    }
}
