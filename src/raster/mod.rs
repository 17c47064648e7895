//! # Rasterizer
//!
//! Turns decoded RGBA pixels into a 1-bit-per-pixel [`Bitmap`].
//!
//! ## Pipeline
//!
//! ```text
//! PixelBuffer ──► resample (surface) ──► rotate ──► threshold ──► Bitmap
//!  w₀ × h₀          cfg.width × cfg.height                          w' × h'
//! ```
//!
//! - [`surface`]: scoped off-screen surface doing the high-quality resize
//! - [`threshold`]: alpha blending and luminance classification
//! - [`pack`]: MSB-first byte packing of bitmap rows
//!
//! ## Example
//!
//! ```
//! use image_to_zpl::config::{Configuration, Rotation};
//! use image_to_zpl::raster::{self, PixelBuffer};
//!
//! // 2×1 image: white, black
//! let pixels = PixelBuffer::new(2, 1, vec![255, 255, 255, 255, 0, 0, 0, 255]).unwrap();
//! let cfg = Configuration::new(2, 1, 50, Rotation::None);
//!
//! let bitmap = raster::rasterize(&pixels, &cfg);
//! assert_eq!(bitmap.bits(), &[false, true]);
//! ```

pub mod pack;
pub mod surface;
pub mod threshold;

use image::{DynamicImage, RgbaImage, imageops};

use crate::config::{Configuration, Rotation};
use crate::error::ZplError;

/// Read-only RGBA samples of a decoded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    samples: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw RGBA samples. `samples.len()` must be `4 * width * height`.
    pub fn new(width: u32, height: u32, samples: Vec<u8>) -> Result<Self, ZplError> {
        let expected = 4 * width as usize * height as usize;
        if samples.len() != expected {
            return Err(ZplError::Image(format!(
                "expected {} RGBA bytes for {}x{}, got {}",
                expected,
                width,
                height,
                samples.len()
            )));
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Convert any decoded image to RGBA samples.
    pub fn from_image(img: &DynamicImage) -> Self {
        let rgba = img.to_rgba8();
        Self {
            width: rgba.width(),
            height: rgba.height(),
            samples: rgba.into_raw(),
        }
    }

    /// Decode an encoded image file (PNG, JPEG, GIF, ...) from memory.
    pub fn decode(bytes: &[u8]) -> Result<Self, ZplError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| ZplError::Image(format!("Failed to decode image: {}", e)))?;
        Ok(Self::from_image(&img))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// `height / width` of the natural image, or 0 for an empty image.
    pub fn aspect_ratio(&self) -> f64 {
        if self.width == 0 {
            0.0
        } else {
            self.height as f64 / self.width as f64
        }
    }

    /// Copy the samples into an `RgbaImage` for the drawing surface.
    fn to_rgba_image(&self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.samples.clone())
    }
}

/// A monochrome image, one boolean per pixel, row-major. `true` is ink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Bitmap {
    /// All-white bitmap.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
        }
    }

    /// Build a bitmap from a per-pixel predicate.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> bool,
    {
        let mut bits = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                bits.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            bits,
        }
    }

    /// Wrap an existing bit vector. `bits.len()` must be `width * height`.
    pub fn from_bits(width: u32, height: u32, bits: Vec<bool>) -> Result<Self, ZplError> {
        if bits.len() != width as usize * height as usize {
            return Err(ZplError::InvalidDimension(format!(
                "{} bits cannot form a {}x{} bitmap",
                bits.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            bits,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Pixel at (x, y); out-of-range coordinates read as white.
    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.bits[y as usize * self.width as usize + x as usize]
    }

    /// Iterate over rows as bit slices.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        // chunks() panics on 0; a zero-width bitmap has no bits anyway
        self.bits.chunks(self.width.max(1) as usize)
    }

    /// Packed row length in bytes: `ceil(width / 8)`.
    pub fn row_bytes(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    /// Number of ink pixels.
    pub fn count_black(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }
}

/// Rasterize `pixels` according to `cfg`.
///
/// The image is resampled to `cfg.width × cfg.height`, rotated, then each
/// pixel is classified against the darkness level. A zero-area configuration
/// or an empty source yields an empty bitmap of the rotated size.
pub fn rasterize(pixels: &PixelBuffer, cfg: &Configuration) -> Bitmap {
    let (out_w, out_h) = cfg.output_dimensions();
    if cfg.width == 0 || cfg.height == 0 {
        return Bitmap {
            width: out_w,
            height: out_h,
            bits: Vec::new(),
        };
    }

    let Some(resized) = surface::draw(pixels, cfg.width, cfg.height) else {
        return Bitmap::new(out_w, out_h);
    };

    let rotated = rotate(resized, cfg.rotation);
    debug_assert_eq!(rotated.dimensions(), (out_w, out_h));

    let level = threshold::level(cfg.threshold);
    Bitmap::from_fn(out_w, out_h, |x, y| {
        threshold::is_black(rotated.get_pixel(x, y).0, level)
    })
}

/// Apply a rotation to an RGBA image.
pub fn rotate(img: RgbaImage, rotation: Rotation) -> RgbaImage {
    match rotation {
        Rotation::None => img,
        Rotation::Left => imageops::rotate270(&img),
        Rotation::Right => imageops::rotate90(&img),
        Rotation::Invert => imageops::rotate180(&img),
    }
}

// ============================================================================
// TESTS
// ============================================================================
