//! Cloudinary upload via REST API (no SDK dependency)
//!
//! POST {api_base}/{cloud_name}/image/upload as a signed multipart request.
//! Signature: sha256("folder=..&timestamp=.." + api_secret), hex encoded.

use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;

use super::{ImageIngest, IngestError, UploadedImage, check_image};
use crate::config::CloudinaryConfig;

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    error: Option<UploadErrorBody>,
}

#[derive(Deserialize)]
struct UploadErrorBody {
    message: String,
}

/// Uploads the photo to Cloudinary and stores the returned secure URL
#[derive(Debug, Clone)]
pub struct CloudinaryImageIngest {
    client: reqwest::Client,
    config: CloudinaryConfig,
    max_bytes: usize,
}

impl CloudinaryImageIngest {
    pub fn new(
        config: CloudinaryConfig,
        max_bytes: usize,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            config,
            max_bytes,
        })
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/{}/image/upload",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name
        )
    }
}

/// Sign upload parameters: sorted `key=value` pairs joined by `&`, secret appended.
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Describe a transport failure without the request URL
fn describe(err: reqwest::Error) -> String {
    if err.is_timeout() {
        "image host request timed out".to_string()
    } else if err.is_connect() {
        "could not reach image host".to_string()
    } else {
        err.without_url().to_string()
    }
}

#[async_trait]
impl ImageIngest for CloudinaryImageIngest {
    async fn ingest(&self, image: UploadedImage) -> Result<String, IngestError> {
        let mime = check_image(&image, self.max_bytes)?;
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[
                ("folder", self.config.folder.as_str()),
                ("timestamp", timestamp.as_str()),
            ],
            &self.config.api_secret,
        );

        let size = image.bytes.len();
        let part = reqwest::multipart::Part::bytes(image.bytes.to_vec())
            .file_name(image.file_name.unwrap_or_else(|| "photo".into()))
            .mime_str(&mime)
            .map_err(|e| IngestError::Upload(describe(e)))?;

        let form = reqwest::multipart::Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", self.config.folder.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256")
            .part("file", part);

        let resp = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                let message = describe(e);
                tracing::error!(error = %message, "Image host request failed");
                IngestError::Upload(message)
            })?;

        let status = resp.status();
        let body: UploadResponse = resp
            .json()
            .await
            .map_err(|e| {
                IngestError::Upload(format!("invalid image host response: {}", describe(e)))
            })?;

        if !status.is_success() {
            let message = body
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| "no error message".into());
            tracing::error!(%status, message = %message, "Image host rejected upload");
            return Err(IngestError::Upload(format!(
                "image host returned {status}: {message}"
            )));
        }

        let url = body
            .secure_url
            .ok_or_else(|| IngestError::Upload("image host response missing secure_url".into()))?;

        tracing::info!(url = %url, size, "Member photo uploaded");
        Ok(url)
    }
}
