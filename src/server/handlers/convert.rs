//! Image conversion API handler.

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use serde::Serialize;
use std::{sync::Arc, time::Instant};

use crate::{
    config::{Configuration, DEFAULT_THRESHOLD, Encoding, Rotation},
    error::ZplError,
    form::SizeSettings,
    pipeline, preview,
    printer::Density,
    raster::PixelBuffer,
};

use super::super::state::AppState;

type ApiError = (StatusCode, Json<serde_json::Value>);

/// Response from the convert endpoint.
#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub success: bool,
    pub command: String,
    pub total_byte_count: usize,
    pub row_byte_count: usize,
    /// Bitmap width after rotation
    pub width: u32,
    /// Bitmap height after rotation
    pub height: u32,
    pub rotation: Rotation,
    pub encoding: Encoding,
    pub preview_url: String,
    /// True if the viewer will likely reject the command
    pub preview_too_large: bool,
}

/// Fields collected from the multipart upload.
#[derive(Debug)]
struct ConvertForm {
    image: Option<Vec<u8>>,
    width: Option<u32>,
    height: Option<u32>,
    lock: bool,
    darkness: u8,
    rotation: Rotation,
    encoding: Encoding,
    density: Option<Density>,
}

impl Default for ConvertForm {
    fn default() -> Self {
        Self {
            image: None,
            width: None,
            height: None,
            lock: true,
            darkness: DEFAULT_THRESHOLD,
            rotation: Rotation::None,
            encoding: Encoding::default(),
            density: None,
        }
    }
}

impl ConvertForm {
    /// Apply one text field. Unknown fields are ignored.
    fn set(&mut self, name: &str, value: &str) -> Result<(), ZplError> {
        match name {
            "width" => self.width = parse_dimension("width", value)?,
            "height" => self.height = parse_dimension("height", value)?,
            "lock" => self.lock = parse_flag(value),
            "darkness" => {
                let darkness: u32 = value.parse().map_err(|_| {
                    ZplError::InvalidOption(format!("darkness must be 0-100, got '{}'", value))
                })?;
                self.darkness = darkness.min(100) as u8;
            }
            "rotation" => self.rotation = value.parse()?,
            "encoding" => self.encoding = value.parse()?,
            "density" if !value.is_empty() => self.density = Some(value.parse()?),
            _ => {}
        }
        Ok(())
    }
}

fn parse_dimension(name: &str, value: &str) -> Result<Option<u32>, ZplError> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| ZplError::InvalidDimension(format!("{} must be a number, got '{}'", name, value)))
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "true" | "on" | "1" | "yes"
    )
}

fn status_for(error: &ZplError) -> StatusCode {
    match error {
        ZplError::MissingInput
        | ZplError::InvalidDimension(_)
        | ZplError::InvalidOption(_)
        | ZplError::Image(_)
        | ZplError::Decode(_) => StatusCode::BAD_REQUEST,
        ZplError::CompressionUnavailable(_) | ZplError::Transport(_) | ZplError::Io(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(status: StatusCode, message: String) -> ApiError {
    (
        status,
        Json(serde_json::json!({"success": false, "error": message})),
    )
}

/// POST /api/convert - Convert an uploaded image to a `^GFA` command.
pub async fn convert(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ConvertResponse>, ApiError> {
    let mut form = ConvertForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error_response(StatusCode::BAD_REQUEST, format!("Multipart error: {}", e))
    })? {
        let name = field.name().unwrap_or("").to_string();
        if name == "image" {
            let bytes = field.bytes().await.map_err(|e| {
                error_response(StatusCode::BAD_REQUEST, format!("Failed to read image: {}", e))
            })?;
            form.image = Some(bytes.to_vec());
        } else {
            let value = field.text().await.map_err(|e| {
                error_response(StatusCode::BAD_REQUEST, format!("Failed to read {}: {}", name, e))
            })?;
            form.set(&name, value.trim())
                .map_err(|e| error_response(status_for(&e), e.to_string()))?;
        }
    }

    let density = form.density.unwrap_or(state.config.density);
    let started = Instant::now();

    let result = tokio::task::spawn_blocking(move || run_conversion(form, density)).await;

    match result {
        Ok(Ok(response)) => {
            log::info!(
                "Converted {}x{} {} image: {} bytes in {:?}",
                response.width,
                response.height,
                response.encoding,
                response.command.len(),
                started.elapsed()
            );
            Ok(Json(response))
        }
        Ok(Err(e)) => {
            log::debug!("Conversion rejected: {}", e);
            Err(error_response(status_for(&e), e.to_string()))
        }
        Err(e) => Err(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Task error: {}", e),
        )),
    }
}

/// Decode, size and convert an upload. Runs on the blocking pool.
fn run_conversion(form: ConvertForm, density: Density) -> Result<ConvertResponse, ZplError> {
    let bytes = form.image.ok_or(ZplError::MissingInput)?;
    let pixels = PixelBuffer::decode(&bytes)?;

    let size = SizeSettings::resolve(
        pixels.width(),
        pixels.height(),
        form.width,
        form.height,
        form.lock,
    );
    let cfg = Configuration::new(size.width, size.height, form.darkness, form.rotation)
        .with_encoding(form.encoding);
    cfg.validate()?;

    let conversion = pipeline::convert(Some(&pixels), &cfg)?.ok_or(ZplError::MissingInput)?;
    let command = conversion.command();
    let preview_url = preview::labelary_url(&command, &cfg, density)?;
    let preview_too_large = preview::exceeds_viewer_limit(&command);

    Ok(ConvertResponse {
        success: true,
        total_byte_count: conversion.raster.total_byte_count,
        row_byte_count: conversion.raster.row_byte_count,
        width: conversion.bitmap.width(),
        height: conversion.bitmap.height(),
        rotation: cfg.rotation,
        encoding: cfg.encoding,
        preview_url,
        preview_too_large,
        command,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::{AppState, ServerConfig, router};
    use axum::{
        body::{Body, to_bytes},
        http::{Request, header},
    };
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;
    use tower::ServiceExt;

    const BOUNDARY: &str = "zpl-test-boundary";

    /// 2x2 PNG: white, white, white, black.
    fn corner_png() -> Vec<u8> {
        let img = RgbaImage::from_fn(2, 2, |x, y| {
            if x == 1 && y == 1 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn multipart_body(image: Option<&[u8]>, fields: &[(&str, &str)]) -> Vec<u8> {
        let mut body = Vec::new();
        if let Some(image) = image {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            body.extend_from_slice(
                b"Content-Disposition: form-data; name=\"image\"; filename=\"corner.png\"\r\n",
            );
            body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
            body.extend_from_slice(image);
            body.extend_from_slice(b"\r\n");
        }
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    BOUNDARY, name, value
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    async fn post_convert(
        image: Option<&[u8]>,
        fields: &[(&str, &str)],
    ) -> (StatusCode, serde_json::Value) {
        let app = router(Arc::new(AppState::new(ServerConfig::default())));
        let request = Request::builder()
            .method("POST")
            .uri("/api/convert")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(image, fields)))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("ON"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_form_fields() {
        let mut form = ConvertForm::default();
        form.set("width", "120").unwrap();
        form.set("height", "").unwrap();
        form.set("darkness", "250").unwrap();
        form.set("rotation", "left").unwrap();
        form.set("encoding", "z64").unwrap();
        form.set("unknown", "whatever").unwrap();

        assert_eq!(form.width, Some(120));
        assert_eq!(form.height, None);
        assert_eq!(form.darkness, 100);
        assert_eq!(form.rotation, Rotation::Left);
        assert_eq!(form.encoding, Encoding::Z64);
        assert!(form.set("width", "wide").is_err());
        assert!(form.set("rotation", "sideways").is_err());
    }

    #[tokio::test]
    async fn test_convert_ascii() {
        let png = corner_png();
        let (status, json) =
            post_convert(Some(png.as_slice()), &[("encoding", "ascii"), ("darkness", "50")]).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["command"], "^GFA,2,2,1,,40");
        assert_eq!(json["total_byte_count"], 2);
        assert_eq!(json["row_byte_count"], 1);
        assert_eq!(json["preview_too_large"], false);
        assert!(
            json["preview_url"]
                .as_str()
                .unwrap()
                .starts_with("https://labelary.com/viewer.html?")
        );
    }

    #[tokio::test]
    async fn test_convert_rotated_and_resized() {
        let png = corner_png();
        let (status, json) = post_convert(
            Some(png.as_slice()),
            &[
                ("width", "16"),
                ("height", "8"),
                ("lock", "false"),
                ("rotation", "right"),
            ],
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["width"], 8);
        assert_eq!(json["height"], 16);
        assert_eq!(json["row_byte_count"], 1);
        assert_eq!(json["total_byte_count"], 16);
        assert_eq!(json["rotation"], "right");
        assert_eq!(json["encoding"], "compressed");
    }

    #[tokio::test]
    async fn test_convert_without_image() {
        let (status, json) = post_convert(None, &[("width", "10")]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn test_convert_zero_width() {
        let png = corner_png();
        let (status, json) = post_convert(Some(png.as_slice()), &[("width", "0")]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("Invalid dimension"));
    }

    #[tokio::test]
    async fn test_convert_oversized_dimensions() {
        let png = corner_png();

        // Locked: the derived height is out of range too
        let (status, json) = post_convert(Some(png.as_slice()), &[("width", "200000")]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("limit"));

        let (status, _) = post_convert(
            Some(png.as_slice()),
            &[("lock", "false"), ("width", "10"), ("height", "8001")],
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_convert_rejects_garbage_image() {
        let (status, _) = post_convert(Some(&b"not an image"[..]), &[]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health() {
        let app = router(Arc::new(AppState::new(ServerConfig::default())));
        let response = app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"ok");
    }
}
