//! # Error Types
//!
//! This module defines error types used throughout the image-to-zpl library.

use thiserror::Error;

/// Main error type for image-to-zpl operations
#[derive(Debug, Error)]
pub enum ZplError {
    /// A conversion was requested before any image was loaded
    #[error("No image loaded")]
    MissingInput,

    /// Width or height is zero, non-numeric or otherwise unusable
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),

    /// Unrecognised rotation, encoding or density name
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// The generic (zlib) compressor could not be brought up
    #[error("Compression library unavailable: {0}")]
    CompressionUnavailable(String),

    /// Image decoding or encoding error
    #[error("Image error: {0}")]
    Image(String),

    /// Malformed command string or payload while decoding
    #[error("Decode error: {0}")]
    Decode(String),

    /// Server bind/serve errors
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
