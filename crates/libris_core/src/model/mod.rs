//! Library domain model.
//!
//! # Responsibility
//! - Define the records exchanged between repositories, services and callers.
//! - Own field-level validation and partial-update (patch) semantics so they
//!   can be exercised without a database.
//!
//! # Invariants
//! - Patches only replace fields that are present; omitted fields keep their
//!   stored value.
//! - Borrowing status is derived, never stored.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod book;
pub mod borrowing;
pub mod publisher;
pub mod reader;
pub mod report;
pub mod staff;

static ISBN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9A-Za-z][0-9A-Za-z\-]{0,31}$").expect("valid isbn regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Field-level validation failure, raised before any store access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is absent or blank.
    MissingField(&'static str),
    /// A field is present but its value is unacceptable.
    InvalidField {
        field: &'static str,
        reason: String,
    },
    /// Password shorter than the accepted minimum.
    PasswordTooShort { min_chars: usize },
    /// A patch carried no updatable field.
    EmptyPatch,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing required field: {field}"),
            Self::InvalidField { field, reason } => write!(f, "invalid {field}: {reason}"),
            Self::PasswordTooShort { min_chars } => {
                write!(f, "password must be at least {min_chars} characters long")
            }
            Self::EmptyPatch => write!(f, "no updatable fields supplied"),
        }
    }
}

impl Error for ValidationError {}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Rejects blank text for a required field.
pub(crate) fn require_text(field: &'static str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

/// Validates an ISBN-like catalog identifier.
pub fn validate_isbn(isbn: &str) -> ValidationResult<()> {
    require_text("isbn", isbn)?;
    if !ISBN_RE.is_match(isbn) {
        return Err(ValidationError::InvalidField {
            field: "isbn",
            reason: format!("`{isbn}` is not a catalog identifier"),
        });
    }
    Ok(())
}

/// Validates a reader email address shape.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    require_text("email", email)?;
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::InvalidField {
            field: "email",
            reason: "not an email address".to_string(),
        });
    }
    Ok(())
}

/// Rejects non-positive entity references.
pub(crate) fn require_id(field: &'static str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::InvalidField {
            field,
            reason: format!("must be a positive id, got {id}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_email, validate_isbn, ValidationError};

    #[test]
    fn isbn_accepts_digits_hyphens_and_check_letter() {
        validate_isbn("978-0-14-043908-3").unwrap();
        validate_isbn("080442957X").unwrap();
    }

    #[test]
    fn isbn_rejects_blank_and_spaces() {
        assert_eq!(
            validate_isbn("  ").unwrap_err(),
            ValidationError::MissingField("isbn")
        );
        assert!(matches!(
            validate_isbn("978 014"),
            Err(ValidationError::InvalidField { field: "isbn", .. })
        ));
    }

    #[test]
    fn email_requires_at_and_domain() {
        validate_email("ada@example.org").unwrap();
        assert!(validate_email("ada.example.org").is_err());
        assert!(validate_email("ada@localhost").is_err());
    }
}
