//! Image API
//!
//! Upload converts to JPEG and stores in the vault. Reads never 404;
//! a missing key resolves to a synthesized placeholder.

use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::io::Cursor;

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// Maximum upload size (5MB)
const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Supported upload formats
const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// JPEG quality for menu images
const JPEG_QUALITY: u8 = 85;

/// Maximum stored edge length; larger uploads are scaled down
const MAX_DIMENSION: u32 = 800;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/images", post(upload))
        .route("/api/images/{key}", get(fetch))
}

/// GET /api/images/{key} - blob bytes with content type; never 404
async fn fetch(
    State(state): State<ServerState>,
    Path(key): Path<String>,
) -> AppResult<impl IntoResponse> {
    let (bytes, content_type) = state.vault.get(&key).await.map_err(AppError::from)?;
    Ok(([(header::CONTENT_TYPE, content_type)], bytes))
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    key: String,
    size: usize,
    content_type: String,
    url: String,
}

/// POST /api/images - multipart upload, re-encoded as JPEG
async fn upload(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("image") {
            continue;
        }

        let filename = field.file_name().unwrap_or("").to_string();
        let data = field.bytes().await?;

        validate_upload(&data, &filename)?;
        let jpeg = recompress_to_jpeg(&data)?;

        let size = jpeg.len();
        let key = state
            .vault
            .put(&jpeg, "image/jpeg")
            .await
            .map_err(AppError::from)?;

        return Ok(Json(UploadResponse {
            url: format!("/api/images/{key}"),
            key,
            size,
            content_type: "image/jpeg".to_string(),
        }));
    }

    Err(AppError::validation("Missing 'image' field in upload"))
}

fn validate_upload(data: &[u8], filename: &str) -> Result<(), AppError> {
    if data.is_empty() {
        return Err(AppError::validation("Empty upload"));
    }
    if data.len() > MAX_FILE_SIZE {
        return Err(AppError::validation(format!(
            "File too large. Maximum size is {}MB",
            MAX_FILE_SIZE / 1024 / 1024
        )));
    }

    let ext = filename
        .rsplit('.')
        .next()
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if !SUPPORTED_FORMATS.contains(&ext.as_str()) {
        return Err(AppError::validation(format!(
            "Unsupported file format '{ext}'. Supported: {SUPPORTED_FORMATS:?}"
        )));
    }
    Ok(())
}

/// Decode, scale down to at most `MAX_DIMENSION` per edge, convert to
/// RGB, and re-encode as JPEG
fn recompress_to_jpeg(data: &[u8]) -> Result<Vec<u8>, AppError> {
    let mut img = image::load_from_memory(data)
        .map_err(|e| AppError::validation(format!("Invalid image: {e}")))?;

    if img.width() > MAX_DIMENSION || img.height() > MAX_DIMENSION {
        img = img.resize(
            MAX_DIMENSION,
            MAX_DIMENSION,
            image::imageops::FilterType::Lanczos3,
        );
    }

    let mut buffer = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buffer);
        let rgb_img = img.to_rgb8();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
        rgb_img
            .write_with_encoder(encoder)
            .map_err(|e| AppError::internal(format!("Failed to compress image: {e}")))?;
    }

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_unknown_extension() {
        assert!(validate_upload(b"data", "menu.bmp").is_err());
        assert!(validate_upload(b"data", "noextension").is_err());
        assert!(validate_upload(b"data", "menu.PNG").is_ok());
    }

    #[test]
    fn test_validate_rejects_oversized_upload() {
        let big = vec![0u8; MAX_FILE_SIZE + 1];
        assert!(validate_upload(&big, "menu.jpg").is_err());
    }

    #[test]
    fn test_recompress_round_trips_via_jpeg() {
        let mut png = Vec::new();
        image::DynamicImage::new_rgb8(4, 4)
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let jpeg = recompress_to_jpeg(&png).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(decoded.width(), 4);
    }

    #[test]
    fn test_recompress_scales_down_oversized_images() {
        let mut png = Vec::new();
        image::DynamicImage::new_rgb8(1600, 400)
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let jpeg = recompress_to_jpeg(&png).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        // Aspect ratio preserved while capping the long edge
        assert_eq!(decoded.width(), 800);
        assert_eq!(decoded.height(), 200);
    }
}
