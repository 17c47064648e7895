//! # ZPL Graphic Field (^GFA)
//!
//! Builds and parses the single command carrying the image:
//!
//! ```text
//! ^GFA,<total>,<total>,<row>,<payload>
//!   │     │       │      │      └─ encoded bitmap (see Encoding)
//!   │     │       │      └─ bytes per row = ceil(width / 8)
//!   │     │       └─ graphic field count = row * height
//!   │     └─ byte count, always equal to the field count
//!   └─ ^GF with data format A (ASCII)
//! ```
//!
//! ## Payload Layers
//!
//! | Encoding | Payload |
//! |----------|---------|
//! | `Compressed` | base64(zlib(run-length(hex(packed)))) |
//! | `Ascii` | run-length(hex(packed)) |
//! | `Z64` | `:Z64:` base64(zlib(packed)) `:` crc16 |
//!
//! Both counts describe the packed bitmap before any compression, so they
//! are identical for every encoding.
//!
//! ## Example
//!
//! ```
//! use image_to_zpl::config::Encoding;
//! use image_to_zpl::protocol::{deflate, graphics};
//! use image_to_zpl::raster::Bitmap;
//!
//! let compressor = deflate::ensure_compressor_loaded()?;
//! let bitmap = Bitmap::from_bits(2, 2, vec![false, false, false, true])?;
//!
//! let raster = graphics::encode(&bitmap, Encoding::Ascii, compressor)?;
//! assert_eq!(raster.command(), "^GFA,2,2,1,,40");
//!
//! let decoded = graphics::decode_command(&raster.command(), Some(2), Encoding::Ascii, compressor)?;
//! assert_eq!(decoded, bitmap);
//! # Ok::<(), image_to_zpl::ZplError>(())
//! ```

use serde::Serialize;
use std::fmt;

use super::deflate::Compressor;
use super::{ascii, rle};
use crate::config::{Encoding, MAX_DIMENSION};
use crate::error::ZplError;
use crate::raster::{Bitmap, pack};

/// Command prefix: graphic field, ASCII data format.
pub const COMMAND_PREFIX: &str = "^GFA";

/// Header of a zlib + base64 payload.
pub const Z64_HEADER: &str = ":Z64:";

/// Header of an uncompressed base64 payload (decode only).
pub const B64_HEADER: &str = ":B64:";

/// Widest row a decoded field may have.
pub const MAX_ROW_BYTES: usize = MAX_DIMENSION.div_ceil(8) as usize;

/// A bitmap encoded as a `^GFA` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodedRaster {
    /// Packed bitmap size in bytes, `row_byte_count * height`.
    pub total_byte_count: usize,
    /// Packed row length in bytes, `ceil(width / 8)`.
    pub row_byte_count: usize,
    /// Field data in a printable alphabet.
    pub payload: String,
}

impl EncodedRaster {
    /// The full `^GFA` command.
    pub fn command(&self) -> String {
        format!(
            "{},{},{},{},{}",
            COMMAND_PREFIX,
            self.total_byte_count,
            self.total_byte_count,
            self.row_byte_count,
            self.payload
        )
    }

    /// Number of rows described by the counts.
    pub fn rows(&self) -> usize {
        if self.row_byte_count == 0 {
            0
        } else {
            self.total_byte_count / self.row_byte_count
        }
    }

    /// Check the header counts before anything is allocated for them:
    /// whole rows only, at most [`MAX_ROW_BYTES`] per row and
    /// [`MAX_DIMENSION`] rows.
    pub fn check_framing(&self) -> Result<(), ZplError> {
        let (total, row) = (self.total_byte_count, self.row_byte_count);
        if row == 0 {
            if total != 0 {
                return Err(ZplError::Decode(format!(
                    "{} bytes with zero bytes per row",
                    total
                )));
            }
            return Ok(());
        }
        if row > MAX_ROW_BYTES {
            return Err(ZplError::Decode(format!(
                "{} bytes per row exceeds the {}-byte limit",
                row, MAX_ROW_BYTES
            )));
        }
        if total % row != 0 {
            return Err(ZplError::Decode(format!(
                "{} bytes is not a whole number of {}-byte rows",
                total, row
            )));
        }
        if total / row > MAX_DIMENSION as usize {
            return Err(ZplError::Decode(format!(
                "{} rows exceeds the {}-row limit",
                total / row,
                MAX_DIMENSION
            )));
        }
        Ok(())
    }

    /// Parse a `^GFA` command.
    ///
    /// Surrounding `^XA`/`^XZ`, a trailing `^FS` and whitespace are
    /// tolerated. When the byte count and field count disagree, the field
    /// count wins.
    pub fn parse(command: &str) -> Result<Self, ZplError> {
        let mut body = command.trim();
        body = body.strip_prefix("^XA").unwrap_or(body).trim_start();
        body = body.strip_suffix("^XZ").unwrap_or(body).trim_end();
        body = body.strip_suffix("^FS").unwrap_or(body).trim_end();

        let rest = body.strip_prefix(COMMAND_PREFIX).ok_or_else(|| {
            ZplError::Decode(format!("command does not start with {}", COMMAND_PREFIX))
        })?;
        let rest = rest
            .strip_prefix(',')
            .ok_or_else(|| ZplError::Decode("missing parameters after ^GFA".to_string()))?;

        let mut fields = rest.splitn(4, ',');
        let byte_count = parse_count(fields.next(), "byte count")?;
        let field_count = parse_count(fields.next(), "field count")?;
        let row_byte_count = parse_count(fields.next(), "bytes per row")?;
        let payload = fields
            .next()
            .ok_or_else(|| ZplError::Decode("missing field data".to_string()))?;

        if byte_count != field_count {
            log::debug!(
                "byte count {} differs from field count {}, using the field count",
                byte_count,
                field_count
            );
        }

        Ok(Self {
            total_byte_count: field_count,
            row_byte_count,
            payload: payload.trim().to_string(),
        })
    }
}

impl fmt::Display for EncodedRaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command())
    }
}

fn parse_count(field: Option<&str>, name: &str) -> Result<usize, ZplError> {
    let text = field.ok_or_else(|| ZplError::Decode(format!("missing {}", name)))?;
    text.trim()
        .parse()
        .map_err(|_| ZplError::Decode(format!("invalid {} '{}'", name, text)))
}

/// Wrap a field in a one-field label (`^XA ... ^XZ`).
pub fn wrap_label(command: &str) -> String {
    format!("^XA{}^XZ", command)
}

/// Encode already-compressed bytes into the base64 payload and attach the
/// framing counts.
pub fn frame(compressed: &[u8], total_byte_count: usize, row_byte_count: usize) -> EncodedRaster {
    EncodedRaster {
        total_byte_count,
        row_byte_count,
        payload: ascii::to_base64(compressed),
    }
}

/// Encode a bitmap with the given payload encoding.
pub fn encode(
    bitmap: &Bitmap,
    encoding: Encoding,
    compressor: &Compressor,
) -> Result<EncodedRaster, ZplError> {
    let row_byte_count = bitmap.row_bytes();
    let packed = pack::pack(bitmap);
    let total_byte_count = packed.len();

    let raster = match encoding {
        Encoding::Compressed => {
            let runs = rle::compress_rows(&packed, row_byte_count);
            let compressed = compressor.deflate(&runs)?;
            log::debug!(
                "packed {} bytes -> run-length {} -> zlib {}",
                total_byte_count,
                runs.len(),
                compressed.len()
            );
            frame(&compressed, total_byte_count, row_byte_count)
        }
        Encoding::Ascii => {
            let runs = rle::compress_rows(&packed, row_byte_count);
            log::debug!(
                "packed {} bytes -> run-length {}",
                total_byte_count,
                runs.len()
            );
            EncodedRaster {
                total_byte_count,
                row_byte_count,
                payload: runs.into_iter().map(char::from).collect(),
            }
        }
        Encoding::Z64 => {
            let compressed = compressor.deflate(&packed)?;
            let data = ascii::to_base64(&compressed);
            let crc = ascii::crc16_hex(data.as_bytes());
            EncodedRaster {
                total_byte_count,
                row_byte_count,
                payload: format!("{}{}:{}", Z64_HEADER, data, crc),
            }
        }
    };

    Ok(raster)
}

/// Reverse every payload layer and return the packed bytes.
///
/// `:Z64:` and `:B64:` payloads are recognised by their header whatever
/// `encoding` says; other payloads are read as `encoding`.
pub fn decode_payload(
    raster: &EncodedRaster,
    encoding: Encoding,
    compressor: &Compressor,
) -> Result<Vec<u8>, ZplError> {
    raster.check_framing()?;
    let payload = raster.payload.as_str();
    let total = raster.total_byte_count;

    let packed = if let Some(body) = payload.strip_prefix(Z64_HEADER) {
        let data = checked_base64(body)?;
        compressor.inflate_limited(&ascii::from_base64(data)?, total)?
    } else if let Some(body) = payload.strip_prefix(B64_HEADER) {
        ascii::from_base64(checked_base64(body)?)?
    } else {
        match encoding {
            Encoding::Compressed => {
                // Hex digits plus a line break per row, with slack for padding
                let limit = total * 2 + raster.rows() * 2 + 64;
                let runs = compressor.inflate_limited(&ascii::from_base64(payload)?, limit)?;
                rle::decompress_rows(&runs, raster.row_byte_count)?
            }
            Encoding::Ascii => rle::decompress_rows(payload.as_bytes(), raster.row_byte_count)?,
            Encoding::Z64 => {
                return Err(ZplError::Decode(format!(
                    "payload has no {} header",
                    Z64_HEADER
                )));
            }
        }
    };

    if packed.len() != raster.total_byte_count {
        return Err(ZplError::Decode(format!(
            "payload holds {} bytes, header says {}",
            packed.len(),
            raster.total_byte_count
        )));
    }

    Ok(packed)
}

/// Split `<base64>:<crc>` and verify the CRC when present.
fn checked_base64(body: &str) -> Result<&str, ZplError> {
    let Some((data, crc)) = body.rsplit_once(':') else {
        return Ok(body);
    };

    let expected = ascii::crc16_hex(data.as_bytes());
    if !crc.trim().eq_ignore_ascii_case(&expected) {
        return Err(ZplError::Decode(format!(
            "CRC mismatch: payload says {}, computed {}",
            crc.trim(),
            expected
        )));
    }
    Ok(data)
}

/// Decode a bitmap. `width` defaults to `row_byte_count * 8`.
pub fn decode(
    raster: &EncodedRaster,
    width: Option<u32>,
    encoding: Encoding,
    compressor: &Compressor,
) -> Result<Bitmap, ZplError> {
    let packed = decode_payload(raster, encoding, compressor)?;
    let width = match width {
        Some(width) => width,
        None => raster
            .row_byte_count
            .checked_mul(8)
            .and_then(|bits| u32::try_from(bits).ok())
            .ok_or_else(|| {
                ZplError::Decode(format!("{} bytes per row is too wide", raster.row_byte_count))
            })?,
    };
    pack::unpack(&packed, width, raster.row_byte_count)
}

/// Parse and decode a `^GFA` command string.
pub fn decode_command(
    command: &str,
    width: Option<u32>,
    encoding: Encoding,
    compressor: &Compressor,
) -> Result<Bitmap, ZplError> {
    decode(&EncodedRaster::parse(command)?, width, encoding, compressor)
}

// ============================================================================
// TESTS
// ============================================================================
