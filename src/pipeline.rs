//! # Conversion Pipeline
//!
//! Composes the stages into one pure function of (pixels, configuration):
//!
//! ```text
//! ensure_compressor_loaded ─┐
//!                           ▼
//! PixelBuffer ──► rasterize ──► Bitmap ──► graphics::encode ──► EncodedRaster
//! ```
//!
//! Nothing is cached between calls; every call allocates its own surface and
//! buffers, so calls may run in parallel.

use crate::config::Configuration;
use crate::error::ZplError;
use crate::protocol::deflate::{self, Compressor};
use crate::protocol::graphics::{self, EncodedRaster};
use crate::raster::{self, Bitmap, PixelBuffer};

/// Result of one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// Bitmap after rotation and thresholding.
    pub bitmap: Bitmap,
    /// Encoded `^GFA` field.
    pub raster: EncodedRaster,
}

impl Conversion {
    /// The `^GFA` command string.
    pub fn command(&self) -> String {
        self.raster.command()
    }
}

/// Convert an image into a `^GFA` field.
///
/// Returns `Ok(None)` when no image is loaded. The configuration is not
/// validated here; a zero dimension produces an empty field.
pub fn convert(
    image: Option<&PixelBuffer>,
    cfg: &Configuration,
) -> Result<Option<Conversion>, ZplError> {
    let Some(pixels) = image else {
        return Ok(None);
    };

    let compressor = deflate::ensure_compressor_loaded()?;
    convert_with(pixels, cfg, compressor).map(Some)
}

/// Convert with an explicitly loaded compressor.
pub fn convert_with(
    pixels: &PixelBuffer,
    cfg: &Configuration,
    compressor: &Compressor,
) -> Result<Conversion, ZplError> {
    let bitmap = raster::rasterize(pixels, cfg);
    let raster = graphics::encode(&bitmap, cfg.encoding, compressor)?;

    log::debug!(
        "converted {}x{} -> {}x{} ({}, darkness {}, {}): {} payload chars",
        pixels.width(),
        pixels.height(),
        bitmap.width(),
        bitmap.height(),
        cfg.rotation,
        cfg.threshold,
        cfg.encoding,
        raster.payload.len()
    );

    Ok(Conversion { bitmap, raster })
}

/// Convert and return only the command string.
pub fn convert_to_command(
    image: Option<&PixelBuffer>,
    cfg: &Configuration,
) -> Result<Option<String>, ZplError> {
    Ok(convert(image, cfg)?.map(|c| c.command()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Rotation;

    fn two_by_two() -> PixelBuffer {
        let white = [255u8, 255, 255, 255];
        let black = [0u8, 0, 0, 255];
        PixelBuffer::new(2, 2, [white, white, white, black].concat()).unwrap()
    }

    #[test]
    fn test_missing_input_yields_nothing() {
        let cfg = Configuration::new(2, 2, 50, Rotation::None);
        assert!(convert(None, &cfg).unwrap().is_none());
    }

    #[test]
    fn test_command_prefix() {
        let cfg = Configuration::new(2, 2, 50, Rotation::None);
        let command = convert_to_command(Some(&two_by_two()), &cfg)
            .unwrap()
            .unwrap();
        assert!(command.starts_with("^GFA,2,2,1,"), "{}", command);
    }

    #[test]
    fn test_zero_dimension_is_degenerate() {
        let cfg = Configuration::new(0, 2, 50, Rotation::None);
        let conversion = convert(Some(&two_by_two()), &cfg).unwrap().unwrap();
        assert!(conversion.bitmap.is_empty());
        assert_eq!(conversion.raster.total_byte_count, 0);
        assert!(conversion.command().starts_with("^GFA,0,0,0,"));
    }
}
