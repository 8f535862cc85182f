//! Append-only circulation audit rows and dashboard counters.

use super::ValidationError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportAction {
    Issue,
    Return,
}

impl ReportAction {
    pub fn as_db(self) -> &'static str {
        match self {
            Self::Issue => "ISSUE",
            Self::Return => "RETURN",
        }
    }

    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "ISSUE" => Some(Self::Issue),
            "RETURN" => Some(Self::Return),
            _ => None,
        }
    }

    /// Parses a list filter value case-insensitively; blank means no filter.
    pub fn parse_filter(value: &str) -> Result<Option<Self>, ValidationError> {
        let normalized = value.trim().to_ascii_uppercase();
        if normalized.is_empty() || normalized == "ALL" {
            return Ok(None);
        }
        Self::from_db(&normalized)
            .map(Some)
            .ok_or_else(|| ValidationError::InvalidField {
                field: "type",
                reason: format!("expected ISSUE|RETURN, got `{}`", value.trim()),
            })
    }
}

/// Audit row joined with human-readable labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRecord {
    pub reg_no: i64,
    pub action: ReportAction,
    pub user_id: i64,
    pub reader_name: String,
    pub isbn: String,
    pub book_title: String,
    pub staff_id: i64,
    pub staff_name: String,
    /// UTC timestamp `YYYY-MM-DD HH:MM:SS` assigned by the store.
    pub created_at: String,
}

/// Dashboard aggregate counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LibraryStats {
    pub total_books: u64,
    pub total_readers: u64,
    pub total_staff: u64,
    pub total_publishers: u64,
    pub active_borrowings: u64,
    pub overdue_borrowings: u64,
    pub total_transactions: u64,
}
