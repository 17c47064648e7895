//! # Printer Module
//!
//! Printer characteristics that affect how a graphic is sized.
//!
//! ## Modules
//!
//! - [`config`]: Print head densities

pub mod config;

pub use config::Density;
