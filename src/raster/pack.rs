//! # Byte Packing
//!
//! Graphics data is packed as bytes where each bit represents one dot:
//! - Bit 7 (MSB) = leftmost dot
//! - Bit 0 (LSB) = rightmost dot
//! - 1 = black (print), 0 = white (no print)
//!
//! ```text
//! Byte value 0xF0 = 11110000 = ████░░░░
//! Byte value 0x0F = 00001111 = ░░░░████
//! Byte value 0x40 = 01000000 = ░█░░░░░░
//! ```
//!
//! Every row starts on a fresh byte; a row whose width is not a multiple of
//! 8 is padded with white bits on the right. The run-length stage relies on
//! this alignment because it works row by row.
//!
//! ## Example
//!
//! ```
//! use image_to_zpl::raster::pack::pack_row;
//!
//! // 12 pixels pack into 2 bytes (4 bits padding)
//! let row = vec![true; 12];
//! assert_eq!(pack_row(&row), vec![0xFF, 0xF0]);
//! ```

use super::Bitmap;
use crate::error::ZplError;

/// Pack a row of boolean pixel values into bytes, MSB first.
pub fn pack_row(pixels: &[bool]) -> Vec<u8> {
    let num_bytes = pixels.len().div_ceil(8);
    let mut bytes = vec![0u8; num_bytes];

    for (i, &pixel) in pixels.iter().enumerate() {
        if pixel {
            let byte_idx = i / 8;
            let bit_idx = 7 - (i % 8); // MSB first
            bytes[byte_idx] |= 1 << bit_idx;
        }
    }

    bytes
}

/// Pack a whole bitmap. Length is `ceil(width / 8) * height`.
pub fn pack(bitmap: &Bitmap) -> Vec<u8> {
    let mut data = Vec::with_capacity(bitmap.row_bytes() * bitmap.height() as usize);
    for row in bitmap.rows() {
        data.extend(pack_row(row));
    }
    data
}

/// Reverse of [`pack`]: expand `row_bytes`-wide packed rows into a bitmap of
/// the given pixel width. Padding bits are dropped; `width` must need
/// exactly `row_bytes` bytes.
pub fn unpack(data: &[u8], width: u32, row_bytes: usize) -> Result<Bitmap, ZplError> {
    if (width as usize).div_ceil(8) != row_bytes {
        return Err(ZplError::Decode(format!(
            "width {} does not match {} bytes per row",
            width, row_bytes
        )));
    }
    if row_bytes == 0 {
        return Bitmap::from_bits(width, 0, Vec::new());
    }
    if data.len() % row_bytes != 0 {
        return Err(ZplError::Decode(format!(
            "{} bytes is not a whole number of {}-byte rows",
            data.len(),
            row_bytes
        )));
    }

    let height = (data.len() / row_bytes) as u32;
    Ok(Bitmap::from_fn(width, height, |x, y| {
        let byte = data[y as usize * row_bytes + x as usize / 8];
        (byte >> (7 - (x % 8))) & 1 == 1
    }))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_row_8_pixels() {
        // All black
        assert_eq!(pack_row(&[true; 8]), vec![0xFF]);
        // All white
        assert_eq!(pack_row(&[false; 8]), vec![0x00]);
        // Alternating
        assert_eq!(
            pack_row(&[true, false, true, false, true, false, true, false]),
            vec![0xAA]
        );
    }

    #[test]
    fn test_pack_row_padding() {
        // 9 pixels should pad to 2 bytes
        let packed = pack_row(&[true; 9]);
        assert_eq!(packed, vec![0xFF, 0x80]);
    }

    #[test]
    fn test_pack_row_empty() {
        assert_eq!(pack_row(&[]), Vec::<u8>::new());
    }

    #[test]
    fn test_rows_do_not_share_bytes() {
        // 2×2 with only the bottom-right pixel set
        let bitmap = Bitmap::from_bits(2, 2, vec![false, false, false, true]).unwrap();
        assert_eq!(pack(&bitmap), vec![0x00, 0x40]);
    }

    #[test]
    fn test_pack_length() {
        let bitmap = Bitmap::new(17, 5);
        assert_eq!(pack(&bitmap).len(), 3 * 5);
    }

    #[test]
    fn test_unpack_drops_padding() {
        let bitmap = unpack(&[0xFF, 0xC0], 10, 2).unwrap();
        assert_eq!((bitmap.width(), bitmap.height()), (10, 1));
        assert_eq!(bitmap.count_black(), 10);
    }

    #[test]
    fn test_unpack_reverses_pack() {
        let bitmap = Bitmap::from_fn(13, 4, |x, y| (x * 3 + y) % 5 == 0);
        let packed = pack(&bitmap);
        assert_eq!(unpack(&packed, 13, bitmap.row_bytes()).unwrap(), bitmap);
    }

    #[test]
    fn test_unpack_rejects_ragged_data() {
        assert!(unpack(&[0, 0, 0], 16, 2).is_err());
        assert!(unpack(&[0, 0], 17, 2).is_err());
    }

    #[test]
    fn test_unpack_rejects_narrow_width() {
        // 3 pixels only need one of the two bytes per row
        assert!(unpack(&[0xFF, 0xFF], 3, 2).is_err());
        assert!(unpack(&[0xFF, 0xFF], 9, 2).is_ok());
    }
}
