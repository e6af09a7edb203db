//! Unified error codes for the registration service
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Member errors
//! - 2xxx: Image errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as u16 values so the browser form and log pipelines can match
/// on a stable number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Required field missing
    RequiredField = 7,
    /// HTTP method not supported by the endpoint
    MethodNotAllowed = 9,

    // ==================== 1xxx: Member ====================
    /// Email already belongs to a member
    EmailAlreadyRegistered = 1001,
    /// Email address is malformed
    InvalidEmail = 1002,
    /// Membership category is not one of the known labels
    InvalidMembershipCategory = 1003,
    /// Marital status is not one of the known values
    InvalidMaritalStatus = 1004,
    /// Text field exceeds its length limit
    FieldTooLong = 1005,

    // ==================== 2xxx: Image ====================
    /// Image exceeds the upload ceiling
    ImageTooLarge = 2001,
    /// Uploaded file is not an image
    UnsupportedImageType = 2002,
    /// Image could not be encoded or uploaded
    ImageUploadFailed = 2003,
    /// Upload request carried no image part
    NoImageProvided = 2004,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Submission body could not be parsed
    FormParseFailed = 9006,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Default user-facing message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::RequiredField => "Please fill in all required fields.",
            ErrorCode::MethodNotAllowed => "Method Not Allowed",

            // Member
            ErrorCode::EmailAlreadyRegistered => "Email is already registered.",
            ErrorCode::InvalidEmail => "Invalid email address.",
            ErrorCode::InvalidMembershipCategory => "Invalid membership category.",
            ErrorCode::InvalidMaritalStatus => "Invalid marital status.",
            ErrorCode::FieldTooLong => "Field is too long",

            // Image
            ErrorCode::ImageTooLarge => "Image is too large",
            ErrorCode::UnsupportedImageType => "Unsupported image type",
            ErrorCode::ImageUploadFailed => "Error processing image.",
            ErrorCode::NoImageProvided => "No image provided",

            // System
            ErrorCode::InternalError => "Internal Server Error",
            ErrorCode::DatabaseError => "Internal Server Error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Internal Server Error",
            ErrorCode::FormParseFailed => "Error parsing form data.",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            7 => Ok(ErrorCode::RequiredField),
            9 => Ok(ErrorCode::MethodNotAllowed),

            // Member
            1001 => Ok(ErrorCode::EmailAlreadyRegistered),
            1002 => Ok(ErrorCode::InvalidEmail),
            1003 => Ok(ErrorCode::InvalidMembershipCategory),
            1004 => Ok(ErrorCode::InvalidMaritalStatus),
            1005 => Ok(ErrorCode::FieldTooLong),

            // Image
            2001 => Ok(ErrorCode::ImageTooLarge),
            2002 => Ok(ErrorCode::UnsupportedImageType),
            2003 => Ok(ErrorCode::ImageUploadFailed),
            2004 => Ok(ErrorCode::NoImageProvided),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9006 => Ok(ErrorCode::FormParseFailed),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}
