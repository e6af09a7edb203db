//! Image ingestion
//!
//! Turns the optional photo of a submission into the string stored in the
//! member's `image` column. Two strategies exist and one is chosen per
//! process from configuration:
//!
//! - [`InlineImageIngest`]: `data:<mime>;base64,<payload>`
//! - [`CloudinaryImageIngest`]: upload to the image host, keep the secure URL
//!
//! Both share the same pre-checks: a size ceiling and an `image/*` MIME type.

mod cloudinary;
mod inline;

pub use cloudinary::CloudinaryImageIngest;
pub use inline::InlineImageIngest;

use async_trait::async_trait;
use axum::body::Bytes;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, ConfigError, ImageStrategy};

/// A file received under the form's `image` field
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedImage {
    /// Resolve the image MIME type from the part header, falling back to the
    /// file extension when the browser sent a generic type.
    pub fn mime_type(&self) -> Option<String> {
        let declared = self
            .content_type
            .as_deref()
            .map(|ct| ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
            .filter(|ct| ct.starts_with("image/"));
        if declared.is_some() {
            return declared;
        }

        self.file_name
            .as_deref()
            .and_then(|name| mime_guess::from_path(name).first())
            .filter(|m| m.type_() == mime_guess::mime::IMAGE)
            .map(|m| m.essence_str().to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Image too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("Unsupported image type: {0}")]
    UnsupportedType(String),

    #[error("Image upload failed: {0}")]
    Upload(String),
}

/// Converts an uploaded photo into a storable reference
#[async_trait]
pub trait ImageIngest: Send + Sync {
    async fn ingest(&self, image: UploadedImage) -> Result<String, IngestError>;
}

/// Size and type checks shared by every strategy; returns the MIME type.
pub fn check_image(image: &UploadedImage, max_bytes: usize) -> Result<String, IngestError> {
    if image.bytes.len() > max_bytes {
        return Err(IngestError::TooLarge {
            size: image.bytes.len(),
            max: max_bytes,
        });
    }

    image.mime_type().ok_or_else(|| {
        IngestError::UnsupportedType(
            image
                .content_type
                .clone()
                .or_else(|| image.file_name.clone())
                .unwrap_or_else(|| "unknown".into()),
        )
    })
}

/// Build the ingestion strategy selected by configuration
pub fn from_config(config: &Config) -> Result<Arc<dyn ImageIngest>, ConfigError> {
    match config.image_strategy {
        ImageStrategy::Inline => Ok(Arc::new(InlineImageIngest::new(config.max_image_bytes))),
        ImageStrategy::Cloudinary => {
            let cloudinary = config
                .cloudinary
                .clone()
                .ok_or(ConfigError::Missing("CLOUDINARY_CLOUD_NAME"))?;
            let ingest = CloudinaryImageIngest::new(
                cloudinary,
                config.max_image_bytes,
                Duration::from_secs(config.upload_timeout_secs),
            )
            .map_err(|e| ConfigError::Invalid {
                name: "UPLOAD_TIMEOUT_SECS",
                value: e.to_string(),
            })?;
            Ok(Arc::new(ingest))
        }
    }
}
