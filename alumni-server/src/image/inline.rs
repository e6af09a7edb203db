use async_trait::async_trait;
use base64::Engine;

use super::{ImageIngest, IngestError, UploadedImage, check_image};

/// Stores the photo inside the member record as a base64 data URI
#[derive(Debug, Clone)]
pub struct InlineImageIngest {
    max_bytes: usize,
}

impl InlineImageIngest {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }
}

#[async_trait]
impl ImageIngest for InlineImageIngest {
    async fn ingest(&self, image: UploadedImage) -> Result<String, IngestError> {
        let mime = check_image(&image, self.max_bytes)?;
        let payload = base64::engine::general_purpose::STANDARD.encode(&image.bytes);
        tracing::debug!(mime = %mime, size = image.bytes.len(), "Inlined member photo");
        Ok(format!("data:{mime};base64,{payload}"))
    }
}
