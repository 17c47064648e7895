//! # Previews
//!
//! Two ways to look at a result without a printer:
//!
//! - [`labelary_url`]: a link to the Labelary online viewer with the label
//!   sized from the configuration. The link is only built here; opening it is
//!   up to the caller.
//! - [`bitmap_to_png`]: the bitmap rendered as a black-on-white PNG.

use image::{GrayImage, ImageFormat, Luma};
use reqwest::Url;
use std::io::Cursor;
use std::path::Path;

use crate::config::Configuration;
use crate::error::ZplError;
use crate::printer::Density;
use crate::protocol::graphics::wrap_label;
use crate::raster::Bitmap;

/// Labelary web viewer.
pub const LABELARY_VIEWER: &str = "https://labelary.com/viewer.html";

/// Commands longer than this may be rejected by the viewer.
pub const VIEWER_COMMAND_LIMIT: usize = 8000;

/// Label size in millimetres for a configuration, accounting for rotation.
pub fn label_size_mm(cfg: &Configuration, density: Density) -> (u32, u32) {
    let (width, height) = cfg.output_dimensions();
    (density.dots_to_mm(width), density.dots_to_mm(height))
}

/// Build the viewer link for a `^GFA` command.
///
/// ## Example
///
/// ```
/// use image_to_zpl::config::{Configuration, Rotation};
/// use image_to_zpl::preview::labelary_url;
/// use image_to_zpl::printer::Density;
///
/// let cfg = Configuration::new(300, 150, 50, Rotation::Left);
/// let url = labelary_url("^GFA,1,1,1,00", &cfg, Density::Dpmm8).unwrap();
/// assert!(url.contains("width=19&height=38"));
/// ```
pub fn labelary_url(
    command: &str,
    cfg: &Configuration,
    density: Density,
) -> Result<String, ZplError> {
    let (width_mm, height_mm) = label_size_mm(cfg, density);
    let label = wrap_label(command);

    let url = Url::parse_with_params(
        LABELARY_VIEWER,
        &[
            ("density", density.dots_per_mm().to_string()),
            ("width", width_mm.to_string()),
            ("height", height_mm.to_string()),
            ("units", "mm".to_string()),
            ("index", "0".to_string()),
            ("zpl", label),
        ],
    )
    .map_err(|e| ZplError::InvalidOption(format!("Failed to build preview link: {}", e)))?;

    Ok(url.into())
}

/// Whether the viewer will likely refuse a command of this size.
pub fn exceeds_viewer_limit(command: &str) -> bool {
    command.len() > VIEWER_COMMAND_LIMIT
}

/// Render a bitmap as an 8-bit grayscale image (ink = 0, paper = 255).
pub fn bitmap_to_image(bitmap: &Bitmap) -> GrayImage {
    GrayImage::from_fn(bitmap.width(), bitmap.height(), |x, y| {
        if bitmap.get(x, y) {
            Luma([0u8])
        } else {
            Luma([255u8])
        }
    })
}

/// Encode a bitmap as PNG bytes.
pub fn bitmap_to_png(bitmap: &Bitmap) -> Result<Vec<u8>, ZplError> {
    let mut out = Cursor::new(Vec::new());
    bitmap_to_image(bitmap)
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| ZplError::Image(format!("Failed to encode PNG: {}", e)))?;
    Ok(out.into_inner())
}

/// Save a bitmap as a PNG file.
pub fn save_png(path: &Path, bitmap: &Bitmap) -> Result<(), ZplError> {
    bitmap_to_image(bitmap)
        .save(path)
        .map_err(|e| ZplError::Image(format!("Failed to save PNG: {}", e)))
}
