//! # ZPL Raster Codec
//!
//! Everything between a packed 1-bit bitmap and the text of a `^GFA`
//! command.
//!
//! ## Module Structure
//!
//! - [`rle`]: the printer's run-length scheme over hex rows
//! - [`deflate`]: lazily loaded zlib compressor
//! - [`ascii`]: hex, base64 and CRC-16 text encodings
//! - [`graphics`]: `^GFA` framing, encoding and decoding
//!
//! ## Data Flow
//!
//! ```text
//! packed rows ──► rle::compress_rows ──► Compressor::deflate ──► graphics::frame
//!                  (hex + run tokens)      (zlib)                 (base64 + counts)
//! ```
//!
//! ## Protocol Reference
//!
//! ZPL II Programming Guide, `^GF` (Graphic Field) and the "Alternative Data
//! Compression Scheme for ~DG and ~DB Commands".

pub mod ascii;
pub mod deflate;
pub mod graphics;
pub mod rle;
