//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // 405 Method Not Allowed
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,

            // 413 / 415 image pre-checks
            Self::ImageTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnsupportedImageType => StatusCode::UNSUPPORTED_MEDIA_TYPE,

            // 408 Request Timeout
            Self::TimeoutError => StatusCode::REQUEST_TIMEOUT,

            // 500 Internal Server Error
            Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::FormParseFailed
            | Self::ImageUploadFailed => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (validation, duplicate email, missing upload)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
