//! # Luminance Thresholding
//!
//! Classifies an RGBA pixel as ink (black) or paper (white).
//!
//! ## Algorithm
//!
//! ```text
//! a     = alpha / 255
//! c'    = c * a + 255 * (1 - a)            (blend each channel onto white)
//! luma  = 0.30 R' + 0.59 G' + 0.11 B'      (0 = black, 255 = white)
//! level = darkness * 2.56                  (0 ..= 256)
//! black = luma < level
//! ```
//!
//! Darkness 0 gives level 0, which no luminance is below: everything is white.
//! Darkness 100 gives level 256, above the brightest possible luminance:
//! everything is black. In between the level grows linearly, so raising the
//! darkness can only turn white pixels black, never the reverse.
//!
//! Transparent pixels blend to white and therefore never print, except at
//! darkness 100.

/// Perceptual weights for R, G, B.
pub const LUMA_WEIGHTS: [f32; 3] = [0.30, 0.59, 0.11];

/// Luminance level for a darkness percentage (clamped to 100).
#[inline]
pub fn level(darkness: u8) -> f32 {
    darkness.min(100) as f32 * 2.56
}

/// Luminance of an RGBA pixel after blending it onto a white background.
#[inline]
pub fn luminance(rgba: [u8; 4]) -> f32 {
    let alpha = rgba[3] as f32 / 255.0;
    let background = 255.0 * (1.0 - alpha);

    rgba[..3]
        .iter()
        .zip(LUMA_WEIGHTS)
        .map(|(&c, w)| (c as f32 * alpha + background) * w)
        .sum()
}

/// Whether the pixel is darker than `level`.
#[inline]
pub fn is_black(rgba: [u8; 4], level: f32) -> bool {
    luminance(rgba) < level
}
