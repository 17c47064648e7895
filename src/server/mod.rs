//! # HTTP Server
//!
//! Serves the drag-and-drop page and a conversion API. Images are converted
//! in memory and dropped after the response; nothing is stored.
//!
//! ## Usage
//!
//! ```bash
//! image-to-zpl serve --listen 0.0.0.0:8080
//! ```
//!
//! Then open http://localhost:8080 in a browser.
//!
//! ## Routes
//!
//! | Route | Description |
//! |-------|-------------|
//! | `GET /` | Conversion page |
//! | `GET /assets/*path` | Page assets |
//! | `GET /api/health` | Liveness check |
//! | `POST /api/convert` | Multipart image upload, returns the `^GFA` command |

mod handlers;
mod state;
mod static_files;

pub use state::{AppState, DEFAULT_MAX_UPLOAD_BYTES, ServerConfig};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;

use crate::error::ZplError;
use crate::protocol::deflate;

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        // Frontend
        .route("/", get(static_files::index_handler))
        .route("/assets/*path", get(static_files::asset_handler))
        // API
        .route("/api/health", get(handlers::health))
        .route(
            "/api/convert",
            post(handlers::convert::convert).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use image_to_zpl::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), image_to_zpl::ZplError> {
/// let config = ServerConfig {
///     listen_addr: "0.0.0.0:8080".to_string(),
///     ..Default::default()
/// };
///
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), ZplError> {
    // Fail at startup rather than on the first upload
    deflate::ensure_compressor_loaded()?;

    let app_state = Arc::new(AppState::new(config.clone()));
    let app = router(app_state);

    log::info!("image-to-zpl HTTP server starting");
    log::info!("Listening on: {}", config.listen_addr);
    log::info!(
        "Upload limit: {} MB, preview density: {}",
        config.max_upload_bytes / (1024 * 1024),
        config.density
    );
    log::info!("Open http://{}/ in your browser", config.listen_addr);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            ZplError::Transport(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;

    axum::serve(listener, app)
        .await
        .map_err(|e| ZplError::Transport(format!("Server error: {}", e)))?;

    Ok(())
}
