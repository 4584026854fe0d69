//! Validation error shared by request parsing and the store.

use thiserror::Error;

/// Caller input that cannot be accepted as-is.
///
/// Always names the offending field so the boundary can point the user at
/// it. Raised before any mutation is attempted.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Request field that failed validation (e.g. `"due_date"`).
    pub field: &'static str,
    /// Human-readable reason.
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    /// A required field was absent or blank.
    pub fn required(field: &'static str) -> Self {
        Self::new(field, "is required")
    }

    /// A field value fell outside its enumeration.
    pub fn invalid_choice(field: &'static str, value: &str, allowed: &[&str]) -> Self {
        Self::new(
            field,
            format!("'{value}' is not one of: {}", allowed.join(", ")),
        )
    }
}
