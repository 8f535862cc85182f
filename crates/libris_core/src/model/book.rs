//! Book catalog records and patch semantics.
//!
//! # Invariants
//! - `isbn` is the global catalog key and never changes after creation.
//! - `price` is finite and non-negative.
//! - `edition`, when set, is at least 1.

use super::{require_id, require_text, validate_isbn, ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};

/// Catalog row as stored in `book`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub isbn: String,
    pub title: String,
    /// Author number as printed in the catalog; free-form.
    pub author_no: Option<String>,
    pub price: f64,
    pub category: String,
    pub edition: Option<u32>,
    pub publisher_id: i64,
    /// Staff member who catalogued the book.
    pub staff_id: i64,
}

impl Book {
    /// Checks field-level invariants before persistence.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_isbn(&self.isbn)?;
        require_text("title", &self.title)?;
        validate_price(self.price)?;
        if let Some(edition) = self.edition {
            validate_edition(edition)?;
        }
        require_id("publisher_id", self.publisher_id)?;
        require_id("staff_id", self.staff_id)?;
        Ok(())
    }
}

/// Book joined with its publisher name for list and detail views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookRecord {
    #[serde(flatten)]
    pub book: Book,
    pub publisher_name: String,
}

/// Optional-field update for a book. Omitted fields keep stored values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author_no: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub edition: Option<u32>,
    pub publisher_id: Option<i64>,
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author_no.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.edition.is_none()
            && self.publisher_id.is_none()
    }

    /// Produces the updated book, validating the merged result.
    pub fn apply(&self, current: &Book) -> ValidationResult<Book> {
        if self.is_empty() {
            return Err(ValidationError::EmptyPatch);
        }

        let mut next = current.clone();
        if let Some(title) = &self.title {
            next.title = title.trim().to_string();
        }
        if let Some(author_no) = &self.author_no {
            next.author_no = Some(author_no.trim().to_string());
        }
        if let Some(price) = self.price {
            next.price = price;
        }
        if let Some(category) = &self.category {
            next.category = category.trim().to_string();
        }
        if let Some(edition) = self.edition {
            next.edition = Some(edition);
        }
        if let Some(publisher_id) = self.publisher_id {
            next.publisher_id = publisher_id;
        }

        next.validate()?;
        Ok(next)
    }
}

/// Sort column for book listing. Whitelisted to keep SQL static.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BookSort {
    #[default]
    Title,
    Price,
    Isbn,
    Category,
    Edition,
}

impl BookSort {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "title" => Some(Self::Title),
            "price" => Some(Self::Price),
            "isbn" => Some(Self::Isbn),
            "category" => Some(Self::Category),
            "edition" => Some(Self::Edition),
            _ => None,
        }
    }

    pub(crate) fn column(self) -> &'static str {
        match self {
            Self::Title => "b.title",
            Self::Price => "b.price",
            Self::Isbn => "b.isbn",
            Self::Category => "b.category",
            Self::Edition => "b.edition",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub(crate) fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Query options for listing books.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookListQuery {
    /// Case-insensitive substring over title, category and isbn.
    pub search: Option<String>,
    pub sort: BookSort,
    pub order: SortOrder,
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
}

/// One page of book listing results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookPage {
    pub items: Vec<BookRecord>,
    /// Total rows matching the search, across all pages.
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

fn validate_price(price: f64) -> ValidationResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(ValidationError::InvalidField {
            field: "price",
            reason: format!("must be a non-negative number, got {price}"),
        });
    }
    Ok(())
}

fn validate_edition(edition: u32) -> ValidationResult<()> {
    if edition == 0 {
        return Err(ValidationError::InvalidField {
            field: "edition",
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}
