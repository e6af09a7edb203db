//! Error types and API response structures

use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application error with structured error code
///
/// This is the error every handler returns. It renders as the JSON body the
/// registration form reads: `{ "message": ..., "error"?: ... }`.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable message, shown verbatim by the form
    pub message: String,
    /// Optional diagnostic for operators (never contains credentials)
    pub error: Option<String>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            error: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            error: None,
        }
    }

    /// Attach a diagnostic string to this error
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ==================== Convenience constructors ====================

    /// Create a required-field error
    pub fn required(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::RequiredField, msg)
    }

    /// Create an internal error carrying a diagnostic
    pub fn internal(diagnostic: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError).with_error(diagnostic)
    }

    /// Create a method-not-allowed error
    pub fn method_not_allowed() -> Self {
        Self::new(ErrorCode::MethodNotAllowed)
    }
}

/// JSON body shared by success and error responses
///
/// Success: `{ "message": "Member registered successfully!" }`
/// Failure: `{ "message": "Internal Server Error", "error": "..." }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    /// Human-readable message
    pub message: String,
    /// Diagnostic detail (failures only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiMessage {
    /// Create a message-only body
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: None,
        }
    }

    /// Create a body from an AppError
    pub fn from_error(err: &AppError) -> Self {
        Self {
            message: err.message.clone(),
            error: err.error.clone(),
        }
    }
}

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = self.http_status();
        let body = ApiMessage::from_error(&self);

        // Log system errors
        if matches!(self.code.category(), super::category::ErrorCategory::System) {
            tracing::error!(
                code = %self.code,
                message = %self.message,
                error = self.error.as_deref().unwrap_or(""),
                "System error occurred"
            );
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_app_error_new() {
        let err = AppError::new(ErrorCode::EmailAlreadyRegistered);
        assert_eq!(err.code, ErrorCode::EmailAlreadyRegistered);
        assert_eq!(err.message, "Email is already registered.");
        assert!(err.error.is_none());
    }

    #[test]
    fn test_app_error_with_message() {
        let err = AppError::with_message(ErrorCode::RequiredField, "Email is required!");
        assert_eq!(err.code, ErrorCode::RequiredField);
        assert_eq!(err.to_string(), "Email is required!");
    }

    #[test]
    fn test_internal_carries_diagnostic() {
        let err = AppError::internal("pool timed out");
        assert_eq!(err.message, "Internal Server Error");
        assert_eq!(err.error.as_deref(), Some("pool timed out"));
        assert_eq!(err.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_api_message_skips_missing_error() {
        let json = serde_json::to_value(ApiMessage::new("Member registered successfully!")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "message": "Member registered successfully!" })
        );

        let err = AppError::internal("boom");
        let json = serde_json::to_value(ApiMessage::from_error(&err)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "message": "Internal Server Error", "error": "boom" })
        );
    }

    #[test]
    fn test_into_response_status() {
        let resp = AppError::method_not_allowed().into_response();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

        let resp = AppError::required("Email is required!").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = AppError::new(ErrorCode::TimeoutError).into_response();
        assert_eq!(resp.status(), StatusCode::REQUEST_TIMEOUT);
    }
}
