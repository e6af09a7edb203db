//! Unified error system
//!
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Error type with code, message and optional diagnostic
//! - [`ApiMessage`]: The `{ message, error? }` JSON body
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Member errors
//! - 2xxx: Image errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiMessage};
//!
//! let err = AppError::new(ErrorCode::EmailAlreadyRegistered);
//! assert_eq!(err.message, "Email is already registered.");
//!
//! let err = AppError::internal("connection refused");
//! let body = ApiMessage::from_error(&err);
//! assert_eq!(body.error.as_deref(), Some("connection refused"));
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiMessage, AppError};
