//! Static file serving for the frontend.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse},
};
use include_dir::{Dir, include_dir};
use std::sync::Arc;

use super::state::AppState;

/// Embedded frontend files.
static FRONTEND: Dir = include_dir!("$CARGO_MANIFEST_DIR/frontend");

/// Serve index.html with a cache-busting parameter on its assets.
pub async fn index_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match FRONTEND.get_file("index.html") {
        Some(file) => {
            let contents = String::from_utf8_lossy(file.contents());
            let cache_bust = format!("?v={}", state.boot_time);
            let busted = contents
                .replace(".js\"", &format!(".js{}\"", cache_bust))
                .replace(".css\"", &format!(".css{}\"", cache_bust));

            Html(busted).into_response()
        }
        None => (StatusCode::NOT_FOUND, "Frontend missing").into_response(),
    }
}

/// Serve static assets from the assets directory.
pub async fn asset_handler(Path(path): Path<String>) -> impl IntoResponse {
    // Strip query params if present
    let clean_path = path.split('?').next().unwrap_or(&path);
    let file_path = format!("assets/{}", clean_path);

    match FRONTEND.get_file(&file_path) {
        Some(file) => {
            let mime = mime_guess::from_path(clean_path)
                .first_or_octet_stream()
                .to_string();
            (
                [
                    (header::CONTENT_TYPE, mime),
                    (header::CACHE_CONTROL, "public, max-age=31536000".to_string()),
                ],
                file.contents().to_vec(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "Asset not found").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::{ServerConfig, router};
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> axum::Router {
        let state = AppState {
            config: ServerConfig::default(),
            boot_time: 42,
        };
        router(Arc::new(state))
    }

    #[tokio::test]
    async fn test_index_is_cache_busted() {
        let response = app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("assets/app.js?v=42"));
        assert!(html.contains("assets/style.css?v=42"));
        assert!(html.contains("id=\"backdrop\""));
    }

    #[tokio::test]
    async fn test_asset_mime_type() {
        let response = app()
            .oneshot(Request::get("/assets/app.js").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let mime = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(mime.contains("javascript"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let script = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(script.contains("URL.revokeObjectURL(state.thumbUrl)"));
    }

    #[tokio::test]
    async fn test_missing_asset() {
        let response = app()
            .oneshot(Request::get("/assets/nope.js").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
