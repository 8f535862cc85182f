//! Reader records, phone numbers and registration input.

use super::{require_id, require_text, validate_email, ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PHONE_TYPE: &str = "mobile";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reader {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: Option<String>,
}

impl Reader {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phone {
    pub phone_no: String,
    pub phone_type: String,
}

/// Reader together with every phone row it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReaderWithPhones {
    #[serde(flatten)]
    pub reader: Reader,
    pub phones: Vec<Phone>,
}

/// Input for registering a reader on behalf of a staff member.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewReader {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: Option<String>,
    pub phone: String,
    pub phone_type: Option<String>,
    /// Staff member performing the registration.
    pub staff_id: i64,
}

impl NewReader {
    pub fn validate(&self) -> ValidationResult<()> {
        require_text("first_name", &self.first_name)?;
        require_text("last_name", &self.last_name)?;
        validate_email(self.email.trim())?;
        validate_phone(&self.phone)?;
        require_id("staff_id", self.staff_id)?;
        Ok(())
    }

    pub fn phone_type_or_default(&self) -> &str {
        self.phone_type
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_PHONE_TYPE)
    }
}

/// Optional-field update for a reader. Phones are not touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReaderPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl ReaderPatch {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.address.is_none()
    }

    pub fn apply(&self, current: &Reader) -> ValidationResult<Reader> {
        if self.is_empty() {
            return Err(ValidationError::EmptyPatch);
        }

        let mut next = current.clone();
        if let Some(first_name) = &self.first_name {
            require_text("first_name", first_name)?;
            next.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = &self.last_name {
            require_text("last_name", last_name)?;
            next.last_name = last_name.trim().to_string();
        }
        if let Some(email) = &self.email {
            validate_email(email.trim())?;
            next.email = email.trim().to_string();
        }
        if let Some(address) = &self.address {
            next.address = Some(address.trim().to_string());
        }
        Ok(next)
    }
}

fn validate_phone(phone: &str) -> ValidationResult<()> {
    require_text("phone", phone)?;
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    let allowed = phone
        .trim()
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'));
    if !allowed || digits < 3 {
        return Err(ValidationError::InvalidField {
            field: "phone",
            reason: "expected digits with optional + - ( ) separators".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{NewReader, Reader, ReaderPatch, DEFAULT_PHONE_TYPE};
    use crate::model::ValidationError;

    fn registration() -> NewReader {
        NewReader {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.org".to_string(),
            address: None,
            phone: "+44 20 7946 0018".to_string(),
            phone_type: None,
            staff_id: 1,
        }
    }

    #[test]
    fn registration_defaults_phone_type() {
        let input = registration();
        input.validate().unwrap();
        assert_eq!(input.phone_type_or_default(), DEFAULT_PHONE_TYPE);
    }

    #[test]
    fn registration_rejects_letters_in_phone() {
        let mut input = registration();
        input.phone = "call me".to_string();
        assert!(matches!(
            input.validate(),
            Err(ValidationError::InvalidField { field: "phone", .. })
        ));
    }

    #[test]
    fn patch_validates_new_email() {
        let current = Reader {
            user_id: 1,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.org".to_string(),
            address: Some("London".to_string()),
        };
        let bad = ReaderPatch {
            email: Some("nope".to_string()),
            ..ReaderPatch::default()
        };
        assert!(bad.apply(&current).is_err());

        let good = ReaderPatch {
            last_name: Some("King".to_string()),
            ..ReaderPatch::default()
        };
        let next = good.apply(&current).unwrap();
        assert_eq!(next.full_name(), "Ada King");
        assert_eq!(next.address.as_deref(), Some("London"));
    }
}
