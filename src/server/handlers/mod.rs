//! HTTP handlers for the server.

pub mod convert;

/// GET /api/health - Liveness check.
pub async fn health() -> &'static str {
    "ok"
}
