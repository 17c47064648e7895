//! # image-to-zpl - Images to ZPL Graphic Fields
//!
//! Converts raster images into a single `^GFA` command for Zebra label
//! printers, entirely offline. It provides:
//!
//! - **Rasterizer**: high-quality resampling, rotation and luminance threshold
//! - **Raster codec**: byte packing, ZPL run-length compression, zlib and a
//!   printable payload alphabet
//! - **Decoder**: the reverse of every layer, for verification and previews
//! - **Front ends**: a CLI and a small HTTP server with a drag-and-drop page
//!
//! ## Quick Start
//!
//! ```
//! use image_to_zpl::{
//!     config::{Configuration, Rotation},
//!     pipeline,
//!     raster::PixelBuffer,
//! };
//!
//! // 2×2 image: white, white, white, black
//! let white = [255u8, 255, 255, 255];
//! let black = [0u8, 0, 0, 255];
//! let pixels = PixelBuffer::new(2, 2, [white, white, white, black].concat())?;
//!
//! let cfg = Configuration::new(2, 2, 50, Rotation::None);
//! let command = pipeline::convert_to_command(Some(&pixels), &cfg)?.unwrap();
//!
//! assert!(command.starts_with("^GFA,2,2,1,"));
//! # Ok::<(), image_to_zpl::ZplError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Per-conversion configuration |
//! | [`raster`] | Pixels to 1-bit bitmap |
//! | [`protocol`] | Bitmap to `^GFA` text and back |
//! | [`pipeline`] | The two stages composed |
//! | [`preview`] | Viewer links and PNG rendering |
//! | [`form`] | Editable settings with aspect lock and stale results |
//! | [`printer`] | Print densities |
//! | [`server`] | HTTP front end |
//! | [`error`] | Error types |

pub mod config;
pub mod error;
pub mod form;
pub mod pipeline;
pub mod preview;
pub mod printer;
pub mod protocol;
pub mod raster;
pub mod server;

// Re-exports for convenience
pub use config::{Configuration, Encoding, Rotation};
pub use error::ZplError;
pub use pipeline::{Conversion, convert};
pub use printer::Density;
pub use protocol::graphics::EncodedRaster;
pub use raster::{Bitmap, PixelBuffer};
