//! Registration error type
//!
//! `RegisterError` bridges the DB, image and parsing layers to the API-layer
//! error (`AppError`), so the pipeline can use `?` throughout and the handler
//! renders one JSON contract.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

use crate::db::{DbError, StoreError};
use crate::image::IngestError;

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    /// Connection string missing
    #[error("Database is not configured: {0}")]
    Configuration(String),

    #[error("Database connection failed: {0}")]
    Connection(String),

    /// Body was not readable as multipart form data
    #[error("Failed to parse form data: {0}")]
    Parse(String),

    /// Field-level rejection, already carrying the user-facing message
    #[error("{0}")]
    Validation(AppError),

    #[error("Email is already registered: {0}")]
    DuplicateEmail(String),

    /// Photo refused before any encoding or upload (size or type)
    #[error(transparent)]
    ImageRejected(IngestError),

    #[error("Image processing failed: {0}")]
    Upload(String),

    #[error("{0}")]
    Internal(String),

    #[error("Method Not Allowed")]
    MethodNotAllowed,
}

impl From<AppError> for RegisterError {
    fn from(e: AppError) -> Self {
        RegisterError::Validation(e)
    }
}

impl From<DbError> for RegisterError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::Configuration => RegisterError::Configuration(e.to_string()),
            DbError::Connection(msg) => RegisterError::Connection(msg),
        }
    }
}

impl From<StoreError> for RegisterError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateKey(email) => RegisterError::DuplicateEmail(email),
            StoreError::Connection(db) => db.into(),
            StoreError::Database(err) => RegisterError::Internal(err.to_string()),
        }
    }
}

impl From<IngestError> for RegisterError {
    fn from(e: IngestError) -> Self {
        match e {
            IngestError::Upload(msg) => RegisterError::Upload(msg),
            rejected => RegisterError::ImageRejected(rejected),
        }
    }
}

impl From<RegisterError> for AppError {
    fn from(e: RegisterError) -> Self {
        let detail = e.to_string();
        match e {
            RegisterError::Configuration(_) => AppError::new(ErrorCode::ConfigError).with_error(detail),
            RegisterError::Connection(_) => AppError::new(ErrorCode::DatabaseError).with_error(detail),
            RegisterError::Parse(_) => AppError::new(ErrorCode::FormParseFailed).with_error(detail),
            RegisterError::Validation(app) => app,
            RegisterError::DuplicateEmail(_) => AppError::new(ErrorCode::EmailAlreadyRegistered),
            RegisterError::ImageRejected(IngestError::TooLarge { .. }) => {
                AppError::new(ErrorCode::ImageTooLarge).with_error(detail)
            }
            RegisterError::ImageRejected(_) => {
                AppError::new(ErrorCode::UnsupportedImageType).with_error(detail)
            }
            RegisterError::Upload(_) => AppError::new(ErrorCode::ImageUploadFailed).with_error(detail),
            RegisterError::Internal(msg) => AppError::internal(msg),
            RegisterError::MethodNotAllowed => AppError::method_not_allowed(),
        }
    }
}

impl IntoResponse for RegisterError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
