//! # ZPL Run-Length Compression
//!
//! The printer's "ASCII compression" scheme for `^GF` hex data. Each packed
//! row is written as uppercase hex and then shortened with these tokens:
//!
//! | Token | Meaning |
//! |-------|---------|
//! | `G`..`Y` | repeat count 1..19 |
//! | `g`..`z` | repeat count 20, 40, ..., 400 |
//! | `,` | fill the rest of the row with `0` |
//! | `!` | fill the rest of the row with `F` |
//! | `:` | this row equals the previous row |
//!
//! Count tokens are summed and apply to the hex digit that follows them:
//!
//! ```text
//! 0000000000FF3C  (row of 7 bytes, 14 digits)
//!   → P0FF3C      (P = 10 zeros)
//! 000000FFFFFFFF
//!   → L0!         (L = 6 zeros, rest of row F)
//! 000000FFFFFFFF
//!   → :           (same as previous row)
//! ```
//!
//! Counts above 400 are written greedily, largest token first: 450 is
//! `zhP` (400 + 40 + 10).
//!
//! ## Example
//!
//! ```
//! use image_to_zpl::protocol::rle;
//!
//! let packed = [0x00, 0x00, 0x00, 0xFF, 0x00, 0x00, 0x00, 0xFF];
//! let compressed = rle::compress_rows(&packed, 4);
//! assert_eq!(compressed, b"L0!:".to_vec());
//! assert_eq!(rle::decompress_rows(&compressed, 4).unwrap(), packed.to_vec());
//! ```

use super::ascii;
use crate::error::ZplError;

/// Largest single count token (`z`).
pub const MAX_TOKEN_COUNT: usize = 400;

/// Runs shorter than this are left as literal digits.
const MIN_RUN: usize = 3;

/// Count tokens for a run of `count` identical digits.
///
/// Returns an empty vector for zero.
pub fn repeat_code(mut count: usize) -> Vec<u8> {
    let mut code = Vec::new();

    while count >= MAX_TOKEN_COUNT {
        code.push(b'z');
        count -= MAX_TOKEN_COUNT;
    }

    let twenties = count / 20;
    if twenties > 0 {
        code.push(b'g' + (twenties - 1) as u8);
    }

    let ones = count % 20;
    if ones > 0 {
        code.push(b'G' + (ones - 1) as u8);
    }

    code
}

/// Value of a count token, or `None` if `token` is not one.
#[inline]
pub fn token_count(token: u8) -> Option<usize> {
    match token {
        b'G'..=b'Y' => Some((token - b'G' + 1) as usize),
        b'g'..=b'z' => Some((token - b'g' + 1) as usize * 20),
        _ => None,
    }
}

/// Compress packed rows of `row_bytes` bytes each.
///
/// A trailing partial row is treated as a full row; callers always pass
/// whole rows.
pub fn compress_rows(packed: &[u8], row_bytes: usize) -> Vec<u8> {
    if row_bytes == 0 {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut previous: Option<&[u8]> = None;

    for row in packed.chunks(row_bytes) {
        if previous == Some(row) {
            out.push(b':');
        } else {
            encode_row(&ascii::to_hex(row), &mut out);
        }
        previous = Some(row);
    }

    out
}

/// Encode one row of hex digits.
fn encode_row(hex: &[u8], out: &mut Vec<u8>) {
    let mut i = 0;
    while i < hex.len() {
        let digit = hex[i];
        let run = hex[i..].iter().take_while(|&&d| d == digit).count();
        let reaches_end = i + run == hex.len();

        if reaches_end && run >= 2 && digit == b'0' {
            out.push(b',');
        } else if reaches_end && run >= 2 && digit == b'F' {
            out.push(b'!');
        } else if run >= MIN_RUN {
            out.extend(repeat_code(run));
            out.push(digit);
        } else {
            out.extend(std::iter::repeat_n(digit, run));
        }

        i += run;
    }
}

/// Expand run-length data back into packed rows of `row_bytes` bytes.
///
/// ASCII whitespace is ignored. The data must end on a row boundary.
pub fn decompress_rows(data: &[u8], row_bytes: usize) -> Result<Vec<u8>, ZplError> {
    if row_bytes == 0 {
        return if data.iter().all(u8::is_ascii_whitespace) {
            Ok(Vec::new())
        } else {
            Err(ZplError::Decode("row width is zero".to_string()))
        };
    }

    let row_digits = row_bytes
        .checked_mul(2)
        .ok_or_else(|| ZplError::Decode(format!("{} bytes per row is too wide", row_bytes)))?;
    let mut out = Vec::new();
    let mut row: Vec<u8> =
        Vec::with_capacity(row_digits.min(data.len().saturating_mul(MAX_TOKEN_COUNT)));
    let mut previous: Option<Vec<u8>> = None;
    let mut pending = 0usize;

    for (pos, &c) in data.iter().enumerate() {
        if c.is_ascii_whitespace() {
            continue;
        }

        if let Some(count) = token_count(c) {
            pending += count;
            continue;
        }

        match c {
            b',' | b'!' | b':' if pending > 0 => {
                return Err(ZplError::Decode(format!(
                    "count token before '{}' at offset {}",
                    c as char, pos
                )));
            }
            b',' | b'!' => {
                let fill = if c == b',' { b'0' } else { b'F' };
                row.resize(row_digits, fill);
            }
            b':' => {
                if !row.is_empty() {
                    return Err(ZplError::Decode(format!(
                        "row repeat in the middle of a row at offset {}",
                        pos
                    )));
                }
                let prev = previous.as_ref().ok_or_else(|| {
                    ZplError::Decode("row repeat with no previous row".to_string())
                })?;
                row.extend_from_slice(prev);
            }
            _ if ascii::hex_value(c).is_some() => {
                let count = pending.max(1);
                pending = 0;
                if row.len() + count > row_digits {
                    return Err(ZplError::Decode(format!(
                        "run of {} at offset {} overflows a {}-digit row",
                        count, pos, row_digits
                    )));
                }
                row.extend(std::iter::repeat_n(c.to_ascii_uppercase(), count));
            }
            _ => {
                return Err(ZplError::Decode(format!(
                    "unexpected character '{}' at offset {}",
                    c as char, pos
                )));
            }
        }

        if row.len() == row_digits {
            out.extend(ascii::from_hex(&row)?);
            previous = Some(std::mem::take(&mut row));
        }
    }

    if pending > 0 {
        return Err(ZplError::Decode("dangling count token".to_string()));
    }
    if !row.is_empty() {
        return Err(ZplError::Decode(format!(
            "incomplete final row ({} of {} digits)",
            row.len(),
            row_digits
        )));
    }

    Ok(out)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeat_code_small() {
        assert_eq!(repeat_code(1), b"G".to_vec());
        assert_eq!(repeat_code(19), b"Y".to_vec());
        assert_eq!(repeat_code(20), b"g".to_vec());
        assert_eq!(repeat_code(21), b"gG".to_vec());
        assert_eq!(repeat_code(0), Vec::<u8>::new());
    }

    #[test]
    fn test_repeat_code_large() {
        assert_eq!(repeat_code(400), b"z".to_vec());
        assert_eq!(repeat_code(419), b"zY".to_vec());
        assert_eq!(repeat_code(450), b"zhP".to_vec());
        assert_eq!(repeat_code(800), b"zz".to_vec());
    }

    #[test]
    fn test_repeat_code_sums_back() {
        for n in 1..2000 {
            let total: usize = repeat_code(n)
                .iter()
                .map(|&t| token_count(t).unwrap())
                .sum();
            assert_eq!(total, n);
        }
    }

    #[test]
    fn test_trailing_zeros_use_comma() {
        assert_eq!(compress_rows(&[0x00, 0x00], 2), b",".to_vec());
        assert_eq!(compress_rows(&[0x40, 0x00], 2), b"4,".to_vec());
    }

    #[test]
    fn test_trailing_ones_use_bang() {
        assert_eq!(compress_rows(&[0x3F, 0xFF], 2), b"3!".to_vec());
    }

    #[test]
    fn test_short_runs_stay_literal() {
        assert_eq!(compress_rows(&[0x11, 0x23], 2), b"1123".to_vec());
    }

    #[test]
    fn test_two_by_two_rows() {
        assert_eq!(compress_rows(&[0x00, 0x40], 1), b",40".to_vec());
    }

    #[test]
    fn test_repeated_row_marker() {
        let packed = [0xAA, 0x55, 0xAA, 0x55, 0xAA, 0x56];
        assert_eq!(compress_rows(&packed, 2), b"AA55:AA56".to_vec());
    }

    #[test]
    fn test_long_run_in_wide_row() {
        // 300 bytes = 600 digits of 'A' followed by one 0x12 byte
        let mut packed = vec![0xAA; 300];
        packed.push(0x12);
        let compressed = compress_rows(&packed, 301);
        assert_eq!(compressed, b"zpA12".to_vec());
        assert_eq!(decompress_rows(&compressed, 301).unwrap(), packed);
    }

    #[test]
    fn test_decompress_ignores_whitespace() {
        assert_eq!(
            decompress_rows(b",\n40\r\n", 1).unwrap(),
            vec![0x00, 0x40]
        );
    }

    #[test]
    fn test_decompress_lowercase_hex() {
        assert_eq!(decompress_rows(b"ab", 1).unwrap(), vec![0xAB]);
    }

    #[test]
    fn test_decompress_errors() {
        // ':' on the first row
        assert!(decompress_rows(b":", 1).is_err());
        // dangling count
        assert!(decompress_rows(b"00H", 1).is_err());
        // overflowing run
        assert!(decompress_rows(b"K0", 1).is_err());
        // incomplete row
        assert!(decompress_rows(b"0", 1).is_err());
        // junk
        assert!(decompress_rows(b"0^", 1).is_err());
    }

    #[test]
    fn test_decompress_huge_row_width() {
        assert!(decompress_rows(b"", usize::MAX).is_err());
        // Nothing to decode, so nothing is reserved for the row
        assert_eq!(decompress_rows(b"", 1_000_000_000_000).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_round_trip_patterns() {
        let row_bytes = 5;
        let mut packed = Vec::new();
        packed.extend([0x00; 5]);
        packed.extend([0xFF; 5]);
        packed.extend([0xFF; 5]);
        packed.extend([0xAA, 0x55, 0xAA, 0x55, 0xAA]);
        packed.extend([0x00, 0x00, 0x0F, 0xFF, 0xF0]);
        let compressed = compress_rows(&packed, row_bytes);
        assert_eq!(decompress_rows(&compressed, row_bytes).unwrap(), packed);
    }
}
