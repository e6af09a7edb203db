//! Registration API handler
//!
//! POST /api/register — multipart form → member record

use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use shared::error::{ApiMessage, AppError, ErrorCode};

use crate::error::RegisterError;
use crate::image::UploadedImage;
use crate::registration::RegistrationForm;
use crate::state::AppState;

/// Form field carrying the photo
pub(super) const IMAGE_FIELD: &str = "image";

pub async fn register(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ApiMessage>), RegisterError> {
    let multipart = multipart.map_err(|e| RegisterError::Parse(e.body_text()))?;
    let form = read_form(multipart).await?;

    state.registrar.register(form).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiMessage::new("Member registered successfully!")),
    ))
}

async fn read_form(mut multipart: Multipart) -> Result<RegistrationForm, RegisterError> {
    let mut form = RegistrationForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == IMAGE_FIELD {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(multipart_error)?;
            form.set_image(UploadedImage {
                file_name,
                content_type,
                bytes,
            });
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            if !form.set_text(&name, &value) {
                tracing::debug!(field = %name, "Ignoring unknown form field");
            }
        }
    }

    Ok(form)
}

/// A body over the router's limit is reported like an oversized photo
pub(super) fn multipart_error(e: MultipartError) -> RegisterError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return RegisterError::Validation(
            AppError::new(ErrorCode::ImageTooLarge).with_error(e.body_text()),
        );
    }
    RegisterError::Parse(e.body_text())
}
