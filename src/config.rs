//! # Conversion Configuration
//!
//! A [`Configuration`] is built fresh for every conversion request and never
//! mutated afterwards. It carries the target size of the resampled image,
//! the darkness threshold, the rotation and the payload encoding.
//!
//! ## Rotation
//!
//! | Rotation | Transform | Output size |
//! |----------|-----------|-------------|
//! | `None` | identity | `width × height` |
//! | `Left` | 90° counter-clockwise | `height × width` |
//! | `Right` | 90° clockwise | `height × width` |
//! | `Invert` | 180° | `width × height` |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ZplError;

/// Default darkness, matching the slider's initial position.
pub const DEFAULT_THRESHOLD: u8 = 50;

/// Largest accepted width or height in dots (about 33cm at 24 dpmm).
pub const MAX_DIMENSION: u32 = 8000;

/// Geometric transform applied to the resized image before thresholding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    #[default]
    None,
    /// 90° counter-clockwise
    Left,
    /// 90° clockwise
    Right,
    /// 180°
    Invert,
}

impl Rotation {
    /// Whether this rotation exchanges width and height.
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Rotation::Left | Rotation::Right)
    }

    /// Output dimensions for an input of `width × height`.
    pub fn output_dimensions(self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }
}

impl FromStr for Rotation {
    type Err = ZplError;

    /// Accepts the long names as well as the ZPL orientation letters
    /// (`N`, `L`, `R`, `I`). An empty string means no rotation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" | "n" => Ok(Rotation::None),
            "left" | "l" | "ccw" => Ok(Rotation::Left),
            "right" | "r" | "cw" => Ok(Rotation::Right),
            "invert" | "i" | "180" => Ok(Rotation::Invert),
            other => Err(ZplError::InvalidOption(format!(
                "unknown rotation '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rotation::None => "none",
            Rotation::Left => "left",
            Rotation::Right => "right",
            Rotation::Invert => "invert",
        };
        f.write_str(name)
    }
}

/// Payload representation inside the `^GFA` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Run-length, then zlib, then base64.
    #[default]
    Compressed,
    /// Run-length hex only (ZPL "ASCII compression").
    Ascii,
    /// zlib + base64 of the packed bytes, framed as `:Z64:<data>:<crc>`.
    Z64,
}

impl FromStr for Encoding {
    type Err = ZplError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "compressed" => Ok(Encoding::Compressed),
            "ascii" | "acs" => Ok(Encoding::Ascii),
            "z64" => Ok(Encoding::Z64),
            other => Err(ZplError::InvalidOption(format!(
                "unknown encoding '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Encoding::Compressed => "compressed",
            Encoding::Ascii => "ascii",
            Encoding::Z64 => "z64",
        };
        f.write_str(name)
    }
}

/// Parameters of a single conversion.
///
/// `width` and `height` are the size the source image is resampled to,
/// before rotation. `threshold` is the darkness in percent: 0 leaves every
/// pixel white, 100 turns every pixel black.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Configuration {
    pub width: u32,
    pub height: u32,
    pub threshold: u8,
    #[serde(default)]
    pub rotation: Rotation,
    #[serde(default)]
    pub encoding: Encoding,
}

impl Configuration {
    /// Create a configuration, clamping `threshold` to `0..=100`.
    pub fn new(width: u32, height: u32, threshold: u8, rotation: Rotation) -> Self {
        Self {
            width,
            height,
            threshold: threshold.min(100),
            rotation,
            encoding: Encoding::default(),
        }
    }

    /// Builder-style encoding override.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Reject zero-area sizes and sizes over [`MAX_DIMENSION`].
    ///
    /// The conversion core does not call this; a zero dimension there yields
    /// an empty bitmap. Callers at the input boundary (CLI, server, form)
    /// validate before converting.
    pub fn validate(&self) -> Result<(), ZplError> {
        if self.width == 0 || self.height == 0 {
            return Err(ZplError::InvalidDimension(format!(
                "{}x{} has zero area",
                self.width, self.height
            )));
        }
        if self.width > MAX_DIMENSION || self.height > MAX_DIMENSION {
            return Err(ZplError::InvalidDimension(format!(
                "{}x{} exceeds the {}-dot limit",
                self.width, self.height, MAX_DIMENSION
            )));
        }
        Ok(())
    }

    /// Dimensions of the bitmap after rotation.
    pub fn output_dimensions(&self) -> (u32, u32) {
        self.rotation.output_dimensions(self.width, self.height)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_clamped() {
        let cfg = Configuration::new(10, 10, 250, Rotation::None);
        assert_eq!(cfg.threshold, 100);
    }

    #[test]
    fn test_validate_rejects_zero_area() {
        assert!(Configuration::new(0, 10, 50, Rotation::None).validate().is_err());
        assert!(Configuration::new(10, 0, 50, Rotation::None).validate().is_err());
        assert!(Configuration::new(1, 1, 50, Rotation::None).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_oversized() {
        let max = MAX_DIMENSION;
        assert!(Configuration::new(max, max, 50, Rotation::None).validate().is_ok());
        assert!(matches!(
            Configuration::new(max + 1, 10, 50, Rotation::None).validate(),
            Err(ZplError::InvalidDimension(_))
        ));
        assert!(Configuration::new(10, 200_000, 50, Rotation::Left).validate().is_err());
    }

    #[test]
    fn test_output_dimensions_swap() {
        assert_eq!(Rotation::Left.output_dimensions(300, 150), (150, 300));
        assert_eq!(Rotation::Right.output_dimensions(300, 150), (150, 300));
        assert_eq!(Rotation::Invert.output_dimensions(300, 150), (300, 150));
        assert_eq!(Rotation::None.output_dimensions(300, 150), (300, 150));
    }

    #[test]
    fn test_rotation_parsing() {
        assert_eq!("L".parse::<Rotation>().unwrap(), Rotation::Left);
        assert_eq!("right".parse::<Rotation>().unwrap(), Rotation::Right);
        assert_eq!("I".parse::<Rotation>().unwrap(), Rotation::Invert);
        assert_eq!("".parse::<Rotation>().unwrap(), Rotation::None);
        assert!("sideways".parse::<Rotation>().is_err());
    }

    #[test]
    fn test_encoding_parsing() {
        assert_eq!("Z64".parse::<Encoding>().unwrap(), Encoding::Z64);
        assert_eq!("acs".parse::<Encoding>().unwrap(), Encoding::Ascii);
        assert_eq!(Encoding::default(), Encoding::Compressed);
        assert!("gzip".parse::<Encoding>().is_err());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Rotation::Invert).unwrap();
        assert_eq!(json, "\"invert\"");
        let enc: Encoding = serde_json::from_str("\"ascii\"").unwrap();
        assert_eq!(enc, Encoding::Ascii);
    }
}
