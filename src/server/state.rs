//! Server state and configuration.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::printer::Density;

/// Default upload limit (50MB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Largest accepted upload body in bytes
    pub max_upload_bytes: usize,
    /// Density used to size preview links
    pub density: Density,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            density: Density::default(),
        }
    }
}

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    /// Unix timestamp of server boot for cache busting.
    pub boot_time: u64,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let boot_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self { config, boot_time }
    }
}
