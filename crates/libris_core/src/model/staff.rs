//! Staff profiles and account input.
//!
//! # Invariants
//! - A `Staff` value never carries credential material.
//! - Passwords are only ever held in request structs and are not `Serialize`.

use super::{require_text, ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};

pub const MIN_PASSWORD_CHARS: usize = 8;

/// Public staff profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    pub staff_id: i64,
    pub name: String,
    pub login_id: String,
}

/// Input for creating a staff member together with its credential.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct NewStaff {
    pub name: String,
    pub login_id: String,
    pub password: String,
}

impl NewStaff {
    pub fn validate(&self) -> ValidationResult<()> {
        require_text("name", &self.name)?;
        require_text("login_id", &self.login_id)?;
        if self.login_id.trim().chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidField {
                field: "login_id",
                reason: "must not contain whitespace".to_string(),
            });
        }
        validate_password(&self.password)
    }
}

impl std::fmt::Debug for NewStaff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewStaff")
            .field("name", &self.name)
            .field("login_id", &self.login_id)
            .finish_non_exhaustive()
    }
}

/// Enforces the minimum password length, counted in characters.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ValidationError::PasswordTooShort {
            min_chars: MIN_PASSWORD_CHARS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_password, NewStaff};
    use crate::model::ValidationError;

    #[test]
    fn password_length_counts_characters_not_bytes() {
        assert!(validate_password("ééééééé").is_err());
        validate_password("éééééééé").unwrap();
    }

    #[test]
    fn debug_output_hides_password() {
        let input = NewStaff {
            name: "Grace".to_string(),
            login_id: "grace".to_string(),
            password: "hunter2hunter2".to_string(),
        };
        assert!(!format!("{input:?}").contains("hunter2"));
    }

    #[test]
    fn login_id_with_spaces_is_invalid() {
        let input = NewStaff {
            name: "Grace".to_string(),
            login_id: "grace h".to_string(),
            password: "longenough".to_string(),
        };
        assert!(matches!(
            input.validate(),
            Err(ValidationError::InvalidField {
                field: "login_id",
                ..
            })
        ));
    }
}
