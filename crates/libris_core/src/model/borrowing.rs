//! Borrowing records and the derived circulation status.
//!
//! # Invariants
//! - Status is computed from dates on every read; it is never persisted.
//! - A borrowing is open while `return_date` is `None`.

use super::{require_id, validate_isbn, ValidationError, ValidationResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Circulation state of one borrowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BorrowingStatus {
    Active,
    Overdue,
    Returned,
}

impl BorrowingStatus {
    /// Single source of truth for status derivation.
    ///
    /// `Returned` when a return date is set, else `Overdue` when the due date
    /// lies strictly before `today`, else `Active`.
    pub fn derive(due_date: NaiveDate, return_date: Option<NaiveDate>, today: NaiveDate) -> Self {
        if return_date.is_some() {
            Self::Returned
        } else if due_date < today {
            Self::Overdue
        } else {
            Self::Active
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Overdue => "Overdue",
            Self::Returned => "Returned",
        }
    }

    /// Parses a list filter value; blank or `all` means no filter.
    pub fn parse_filter(value: &str) -> Result<Option<Self>, ValidationError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(None),
            "active" => Ok(Some(Self::Active)),
            "overdue" => Ok(Some(Self::Overdue)),
            "returned" => Ok(Some(Self::Returned)),
            other => Err(ValidationError::InvalidField {
                field: "status",
                reason: format!("expected active|returned|overdue, got `{other}`"),
            }),
        }
    }
}

/// Borrowing row as stored in `borrowing`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Borrowing {
    pub borrow_id: i64,
    pub user_id: i64,
    pub isbn: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
}

impl Borrowing {
    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }

    pub fn status(&self, today: NaiveDate) -> BorrowingStatus {
        BorrowingStatus::derive(self.due_date, self.return_date, today)
    }
}

/// Borrowing joined with reader and book labels plus the derived status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BorrowingRecord {
    #[serde(flatten)]
    pub borrowing: Borrowing,
    pub reader_name: String,
    pub book_title: String,
    pub status: BorrowingStatus,
}

/// Input for issuing a book.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssueRequest {
    pub user_id: i64,
    pub isbn: String,
    pub staff_id: i64,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
}

impl IssueRequest {
    pub fn validate(&self) -> ValidationResult<()> {
        require_id("user_id", self.user_id)?;
        validate_isbn(&self.isbn)?;
        require_id("staff_id", self.staff_id)?;
        if self.due_date < self.issue_date {
            return Err(ValidationError::InvalidField {
                field: "due_date",
                reason: "must not be earlier than issue_date".to_string(),
            });
        }
        Ok(())
    }
}

/// Input for returning a borrowed book.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReturnRequest {
    pub borrow_id: i64,
    pub return_date: NaiveDate,
    pub staff_id: i64,
}

impl ReturnRequest {
    pub fn validate(&self) -> ValidationResult<()> {
        require_id("borrow_id", self.borrow_id)?;
        require_id("staff_id", self.staff_id)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{BorrowingStatus, IssueRequest};
    use chrono::NaiveDate;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn open_borrowing_is_active_through_due_date() {
        let due = date("2024-01-15");
        assert_eq!(
            BorrowingStatus::derive(due, None, date("2024-01-10")),
            BorrowingStatus::Active
        );
        assert_eq!(
            BorrowingStatus::derive(due, None, due),
            BorrowingStatus::Active
        );
    }

    #[test]
    fn open_borrowing_turns_overdue_after_due_date() {
        assert_eq!(
            BorrowingStatus::derive(date("2024-01-15"), None, date("2024-01-16")),
            BorrowingStatus::Overdue
        );
    }

    #[test]
    fn return_date_wins_over_due_date() {
        let returned = Some(date("2024-03-01"));
        assert_eq!(
            BorrowingStatus::derive(date("2024-01-15"), returned, date("2024-06-01")),
            BorrowingStatus::Returned
        );
    }

    #[test]
    fn filter_parsing_accepts_blank_and_known_values() {
        assert_eq!(BorrowingStatus::parse_filter("").unwrap(), None);
        assert_eq!(
            BorrowingStatus::parse_filter("Overdue").unwrap(),
            Some(BorrowingStatus::Overdue)
        );
        assert!(BorrowingStatus::parse_filter("lost").is_err());
    }

    #[test]
    fn issue_request_rejects_due_before_issue() {
        let request = IssueRequest {
            user_id: 1,
            isbn: "9780140439083".to_string(),
            staff_id: 1,
            issue_date: date("2024-01-15"),
            due_date: date("2024-01-01"),
        };
        assert!(request.validate().is_err());
    }
}
