//! Publisher records.

use super::{require_text, ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publisher {
    pub publisher_id: i64,
    pub name: String,
    pub year_of_publication: Option<i32>,
}

/// Input for creating a publisher.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewPublisher {
    pub name: String,
    pub year_of_publication: Option<i32>,
}

impl NewPublisher {
    pub fn validate(&self) -> ValidationResult<()> {
        require_text("name", &self.name)?;
        if let Some(year) = self.year_of_publication {
            validate_year(year)?;
        }
        Ok(())
    }
}

/// Optional-field update for a publisher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PublisherPatch {
    pub name: Option<String>,
    pub year_of_publication: Option<i32>,
}

impl PublisherPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.year_of_publication.is_none()
    }

    pub fn apply(&self, current: &Publisher) -> ValidationResult<Publisher> {
        if self.is_empty() {
            return Err(ValidationError::EmptyPatch);
        }

        let mut next = current.clone();
        if let Some(name) = &self.name {
            require_text("name", name)?;
            next.name = name.trim().to_string();
        }
        if let Some(year) = self.year_of_publication {
            validate_year(year)?;
            next.year_of_publication = Some(year);
        }
        Ok(next)
    }
}

fn validate_year(year: i32) -> ValidationResult<()> {
    if !(1000..=9999).contains(&year) {
        return Err(ValidationError::InvalidField {
            field: "year_of_publication",
            reason: format!("expected a four digit year, got {year}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{NewPublisher, Publisher, PublisherPatch};

    #[test]
    fn patch_replaces_only_given_fields() {
        let current = Publisher {
            publisher_id: 3,
            name: "Penguin".to_string(),
            year_of_publication: Some(1935),
        };
        let patch = PublisherPatch {
            name: Some(" Penguin Classics ".to_string()),
            year_of_publication: None,
        };
        let next = patch.apply(&current).unwrap();
        assert_eq!(next.name, "Penguin Classics");
        assert_eq!(next.year_of_publication, Some(1935));
    }

    #[test]
    fn new_publisher_rejects_odd_years() {
        let input = NewPublisher {
            name: "Ward Lock".to_string(),
            year_of_publication: Some(87),
        };
        assert!(input.validate().is_err());
    }
}
