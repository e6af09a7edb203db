//! Input validation helpers
//!
//! Text length constants and the checks the registration pipeline runs
//! before touching the store. SQLite TEXT has no built-in length enforcement.

use shared::error::{AppError, ErrorCode};

// ── Text length limits ──────────────────────────────────────────────

/// Person names, occupation
pub const MAX_NAME_LEN: usize = 200;

/// Short identifiers: phone, SSC batch
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Present / permanent addresses
pub const MAX_ADDRESS_LEN: usize = 500;

// ── Validation helpers ──────────────────────────────────────────────

/// Require a value to be present; `label` is the form's field label.
pub fn require<'a>(value: &'a Option<String>, label: &str) -> Result<&'a str, AppError> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::required(format!("{label} is required!"))),
    }
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    label: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.chars().count() > max_len
    {
        return Err(AppError::with_message(
            ErrorCode::FieldTooLong,
            format!("{label} is too long ({} chars, max {max_len})", v.chars().count()),
        ));
    }
    Ok(())
}

/// Minimal structural email check: one `@`, non-empty local part and a dotted domain.
pub fn validate_email(email: &str) -> Result<(), AppError> {
    let invalid = || AppError::new(ErrorCode::InvalidEmail);

    if email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(invalid());
    }
    Ok(())
}
