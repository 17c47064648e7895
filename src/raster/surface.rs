//! Off-screen drawing surface.
//!
//! The surface is created, drawn into and read back within a single call;
//! nothing outlives [`draw`]. Concurrent conversions each get their own.

use image::{RgbaImage, imageops, imageops::FilterType};

use super::PixelBuffer;

/// Filter used for resampling. Lanczos3 gives smooth downscales without the
/// blockiness of nearest-neighbour sampling.
pub const RESAMPLE_FILTER: FilterType = FilterType::Lanczos3;

/// Draw `pixels` scaled to `width × height` and read the RGBA result back.
///
/// Returns `None` for an empty source or a zero-area target.
pub fn draw(pixels: &PixelBuffer, width: u32, height: u32) -> Option<RgbaImage> {
    if width == 0 || height == 0 || pixels.width() == 0 || pixels.height() == 0 {
        return None;
    }

    let source = pixels.to_rgba_image()?;
    if source.dimensions() == (width, height) {
        return Some(source);
    }

    Some(imageops::resize(&source, width, height, RESAMPLE_FILTER))
}
