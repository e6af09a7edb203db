//! Standalone image upload
//!
//! POST /api/upload — multipart `image` part → stored reference, without
//! creating a member. Uses the same strategy and pre-checks as registration.

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use serde::Serialize;
use shared::error::{AppError, ErrorCode};

use super::register::{IMAGE_FIELD, multipart_error};
use crate::error::RegisterError;
use crate::image::{IngestError, UploadedImage};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: &'static str,
    pub image_url: String,
}

pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let multipart = multipart.map_err(|e| RegisterError::Parse(e.body_text()))?;
    let image = read_image(multipart)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::NoImageProvided))?;

    let image_url = state.images.ingest(image).await.map_err(|e| match e {
        IngestError::Upload(msg) => {
            AppError::with_message(ErrorCode::ImageUploadFailed, "Upload failed").with_error(msg)
        }
        rejected => RegisterError::from(rejected).into(),
    })?;

    Ok(Json(UploadResponse {
        message: "Upload successful",
        image_url,
    }))
}

/// First non-empty `image` part; everything else in the body is skipped.
async fn read_image(mut multipart: Multipart) -> Result<Option<UploadedImage>, RegisterError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;
        if !bytes.is_empty() {
            return Ok(Some(UploadedImage {
                file_name,
                content_type,
                bytes,
            }));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_uses_camel_case_url_key() {
        let body = UploadResponse {
            message: "Upload successful",
            image_url: "https://res.cloudinary.com/demo/x.png".into(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "message": "Upload successful",
                "imageUrl": "https://res.cloudinary.com/demo/x.png",
            })
        );
    }
}
