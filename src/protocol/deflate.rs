//! # Generic Compression Stage
//!
//! zlib (RFC 1950) deflate/inflate via `flate2`. The compressor is brought
//! up once per process by [`ensure_compressor_loaded`]; encoders take the
//! returned [`Compressor`] as an argument, so a successful load is a
//! precondition of encoding rather than hidden global state.
//!
//! Loading runs a small self-check round trip. A failed load is not
//! memoized: the next call tries again.

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use std::io::{Read, Write};
use std::sync::OnceLock;

use crate::error::ZplError;

static COMPRESSOR: OnceLock<Compressor> = OnceLock::new();

/// Probe payload for the load-time self-check.
const PROBE: &[u8] = b"^GFA,8,8,1,:Z64:0000000000000000";

/// A ready-to-use zlib compressor.
#[derive(Debug, Clone, Copy)]
pub struct Compressor {
    level: Compression,
}

impl Compressor {
    /// Bring up a compressor at `level` and verify it round-trips.
    pub fn load(level: Compression) -> Result<Self, ZplError> {
        let compressor = Self { level };
        let packed = compressor.deflate(PROBE)?;
        if compressor.inflate(&packed)? != PROBE {
            return Err(ZplError::CompressionUnavailable(
                "self-check round trip mismatch".to_string(),
            ));
        }
        Ok(compressor)
    }

    pub fn level(&self) -> Compression {
        self.level
    }

    /// zlib-compress `data`.
    pub fn deflate(&self, data: &[u8]) -> Result<Vec<u8>, ZplError> {
        let mut encoder = ZlibEncoder::new(Vec::new(), self.level);
        encoder
            .write_all(data)
            .map_err(|e| ZplError::CompressionUnavailable(format!("deflate failed: {}", e)))?;
        encoder
            .finish()
            .map_err(|e| ZplError::CompressionUnavailable(format!("deflate failed: {}", e)))
    }

    /// Decompress zlib `data`.
    pub fn inflate(&self, data: &[u8]) -> Result<Vec<u8>, ZplError> {
        self.inflate_limited(data, usize::MAX)
    }

    /// Decompress zlib `data`, failing once the output passes `limit` bytes.
    pub fn inflate_limited(&self, data: &[u8], limit: usize) -> Result<Vec<u8>, ZplError> {
        let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
        let mut decoder = ZlibDecoder::new(data).take(cap);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .map_err(|e| ZplError::Decode(format!("zlib decompress error: {}", e)))?;
        if out.len() > limit {
            return Err(ZplError::Decode(format!(
                "zlib data expands past {} bytes",
                limit
            )));
        }
        Ok(out)
    }
}

/// Load the process-wide compressor, or return the one already loaded.
///
/// Safe to call any number of times from any thread.
pub fn ensure_compressor_loaded() -> Result<&'static Compressor, ZplError> {
    if let Some(compressor) = COMPRESSOR.get() {
        return Ok(compressor);
    }

    let compressor = Compressor::load(Compression::best())?;
    log::debug!("zlib compressor loaded (level {})", compressor.level().level());
    Ok(COMPRESSOR.get_or_init(|| compressor))
}
