//! # Conversion Form State
//!
//! The settings a user edits around a conversion, independent of any UI
//! toolkit:
//!
//! - [`SizeSettings`]: width/height with an optional aspect-ratio lock
//! - [`ConversionForm`]: size, darkness, rotation, encoding and the last
//!   result
//!
//! ## Stale Results
//!
//! A result is tagged with the [`Configuration`] it was produced from. As
//! soon as any of its inputs (size, darkness, rotation, encoding) changes,
//! the current configuration no longer matches and the result is stale;
//! [`ConversionForm::result`] then returns `None`.
//!
//! ## Example
//!
//! ```
//! use image_to_zpl::form::SizeSettings;
//!
//! let mut size = SizeSettings::from_natural(400, 200);
//! assert!(size.lock);
//!
//! size.set_width(200);
//! assert_eq!(size.height, 100);
//!
//! size.set_lock(false);
//! size.set_width(300);
//! assert_eq!(size.height, 100);
//! ```

use crate::config::{Configuration, DEFAULT_THRESHOLD, Encoding, Rotation};
use crate::error::ZplError;
use crate::pipeline::{self, Conversion};
use crate::raster::PixelBuffer;

/// Output size with an optional lock to the source aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeSettings {
    pub width: u32,
    pub height: u32,
    /// When set, the height follows the width.
    pub lock: bool,
    /// `natural_height / natural_width`, 0 for an empty image.
    pub original_ratio: f64,
}

impl Default for SizeSettings {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            lock: true,
            original_ratio: 0.0,
        }
    }
}

impl SizeSettings {
    /// Settings for a freshly loaded image: natural size, locked.
    pub fn from_natural(width: u32, height: u32) -> Self {
        let original_ratio = if width != 0 {
            height as f64 / width as f64
        } else {
            0.0
        };
        Self {
            width,
            height,
            lock: true,
            original_ratio,
        }
    }

    /// Apply optional user overrides on top of the natural size, in the
    /// order a user would: lock toggle, then width, then height.
    pub fn resolve(
        natural_width: u32,
        natural_height: u32,
        width: Option<u32>,
        height: Option<u32>,
        lock: bool,
    ) -> Self {
        let mut size = Self::from_natural(natural_width, natural_height);
        size.set_lock(lock);
        if let Some(width) = width {
            size.set_width(width);
        }
        if let Some(height) = height {
            size.set_height(height);
        }
        size
    }

    /// Set the width; with the lock on, the height is recomputed.
    pub fn set_width(&mut self, width: u32) {
        self.width = width;
        if self.lock {
            self.height = self.locked_height();
        }
    }

    /// Set the height. Ignored while the lock is on.
    pub fn set_height(&mut self, height: u32) {
        if !self.lock {
            self.height = height;
        }
    }

    /// Toggle the lock; turning it on snaps the height to the ratio.
    pub fn set_lock(&mut self, lock: bool) {
        self.lock = lock;
        if lock {
            self.height = self.locked_height();
        }
    }

    fn locked_height(&self) -> u32 {
        (self.original_ratio * self.width as f64).round() as u32
    }
}

/// Everything needed to run a conversion, plus its latest result.
#[derive(Debug, Clone)]
pub struct ConversionForm {
    pub size: SizeSettings,
    pub darkness: u8,
    pub rotation: Rotation,
    pub encoding: Encoding,
    image: Option<PixelBuffer>,
    result: Option<(Configuration, Conversion)>,
}

impl Default for ConversionForm {
    fn default() -> Self {
        Self {
            size: SizeSettings::default(),
            darkness: DEFAULT_THRESHOLD,
            rotation: Rotation::None,
            encoding: Encoding::default(),
            image: None,
            result: None,
        }
    }
}

impl ConversionForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a new image. The size resets to the natural size, locked.
    pub fn load_image(&mut self, image: PixelBuffer) {
        self.size = SizeSettings::from_natural(image.width(), image.height());
        self.image = Some(image);
        self.result = None;
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// The configuration the current settings describe.
    pub fn configuration(&self) -> Configuration {
        Configuration::new(
            self.size.width,
            self.size.height,
            self.darkness,
            self.rotation,
        )
        .with_encoding(self.encoding)
    }

    /// Run the conversion and keep the result.
    ///
    /// Returns `Ok(None)` (and keeps the previous result) when no image is
    /// loaded. Zero dimensions are rejected with `InvalidDimension`.
    pub fn convert(&mut self) -> Result<Option<&Conversion>, ZplError> {
        let Some(image) = &self.image else {
            return Ok(None);
        };

        let cfg = self.configuration();
        cfg.validate()?;

        let Some(conversion) = pipeline::convert(Some(image), &cfg)? else {
            return Ok(None);
        };
        self.result = Some((cfg, conversion));
        Ok(self.result.as_ref().map(|(_, c)| c))
    }

    /// Whether a result exists but was produced from other settings.
    pub fn is_stale(&self) -> bool {
        match &self.result {
            Some((cfg, _)) => *cfg != self.configuration(),
            None => false,
        }
    }

    /// The latest result, unless the settings changed since.
    pub fn result(&self) -> Option<&Conversion> {
        match &self.result {
            Some((cfg, conversion)) if *cfg == self.configuration() => Some(conversion),
            _ => None,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
