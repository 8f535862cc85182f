//! Request bodies and query strings.
//!
//! Bodies accept numbers either as JSON numbers or numeric strings, since
//! HTML forms submit everything as text. Required fields are optional at the
//! serde level so that a missing field is a validation error, not a decode
//! failure.

use axum::extract::{FromRequest, FromRequestParts};
use chrono::NaiveDate;
use libris_core::model::book::{Book, BookListQuery, BookSort, SortOrder};
use libris_core::model::borrowing::{BorrowingStatus, IssueRequest, ReturnRequest};
use libris_core::model::publisher::{NewPublisher, PublisherPatch};
use libris_core::model::report::ReportAction;
use libris_core::model::reader::NewReader;
use libris_core::model::staff::NewStaff;
use libris_core::ValidationError;
use serde::Deserialize;

use crate::error::ApiError;

/// JSON extractor whose rejections use the API error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub(crate) struct JsonBody<T>(pub T);

/// Path extractor whose rejections use the API error body.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub(crate) struct PathParam<T>(pub T);

fn required<T>(field: &'static str, value: Option<T>) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::MissingField(field))
}

fn text(value: Option<String>) -> String {
    value.unwrap_or_default()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CreateBookBody {
    isbn: Option<String>,
    title: Option<String>,
    author_no: Option<String>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    price: Option<f64>,
    category: Option<String>,
    #[serde(deserialize_with = "lenient::opt_u32")]
    edition: Option<u32>,
    #[serde(deserialize_with = "lenient::opt_i64")]
    publisher_id: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_i64")]
    staff_id: Option<i64>,
}

impl CreateBookBody {
    pub(crate) fn into_book(self) -> Result<Book, ValidationError> {
        Ok(Book {
            isbn: required("isbn", self.isbn)?.trim().to_string(),
            title: required("title", self.title)?.trim().to_string(),
            author_no: self
                .author_no
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            price: self.price.unwrap_or(0.0),
            category: text(self.category).trim().to_string(),
            edition: self.edition,
            publisher_id: required("publisher_id", self.publisher_id)?,
            staff_id: required("staff_id", self.staff_id)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct BookPatchBody {
    title: Option<String>,
    author_no: Option<String>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    price: Option<f64>,
    category: Option<String>,
    #[serde(deserialize_with = "lenient::opt_u32")]
    edition: Option<u32>,
    #[serde(deserialize_with = "lenient::opt_i64")]
    publisher_id: Option<i64>,
}

impl From<BookPatchBody> for libris_core::model::book::BookPatch {
    fn from(value: BookPatchBody) -> Self {
        Self {
            title: value.title,
            author_no: value.author_no,
            price: value.price,
            category: value.category,
            edition: value.edition,
            publisher_id: value.publisher_id,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct BooksQuery {
    search: Option<String>,
    sort: Option<String>,
    order: Option<String>,
    page: Option<String>,
    limit: Option<String>,
}

impl BooksQuery {
    pub(crate) fn into_list_query(self) -> Result<BookListQuery, ValidationError> {
        let sort = match self.sort.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(value) => BookSort::parse(value).ok_or_else(|| ValidationError::InvalidField {
                field: "sort",
                reason: format!("expected title|price|isbn|category|edition, got `{value}`"),
            })?,
            None => BookSort::default(),
        };
        let order = match self.order.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(value) => SortOrder::parse(value).ok_or_else(|| ValidationError::InvalidField {
                field: "order",
                reason: format!("expected asc|desc, got `{value}`"),
            })?,
            None => SortOrder::default(),
        };

        Ok(BookListQuery {
            search: self.search,
            sort,
            order,
            page: parse_count("page", self.page.as_deref())?.unwrap_or(1),
            limit: parse_count("limit", self.limit.as_deref())?.unwrap_or(0),
        })
    }
}

fn parse_count(field: &'static str, value: Option<&str>) -> Result<Option<u32>, ValidationError> {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(text) => text
            .parse()
            .map(Some)
            .map_err(|_| ValidationError::InvalidField {
                field,
                reason: format!("expected a non-negative integer, got `{text}`"),
            }),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SearchQuery {
    pub(crate) q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct StatusQuery {
    status: Option<String>,
}

impl StatusQuery {
    pub(crate) fn into_filter(self) -> Result<Option<BorrowingStatus>, ValidationError> {
        BorrowingStatus::parse_filter(self.status.as_deref().unwrap_or_default())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ReportQuery {
    #[serde(rename = "type")]
    action: Option<String>,
}

impl ReportQuery {
    pub(crate) fn into_filter(self) -> Result<Option<ReportAction>, ValidationError> {
        ReportAction::parse_filter(self.action.as_deref().unwrap_or_default())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct PublisherBody {
    name: Option<String>,
    #[serde(deserialize_with = "lenient::opt_i32")]
    year_of_publication: Option<i32>,
}

impl PublisherBody {
    pub(crate) fn into_new(self) -> NewPublisher {
        NewPublisher {
            name: text(self.name),
            year_of_publication: self.year_of_publication,
        }
    }

    pub(crate) fn into_patch(self) -> PublisherPatch {
        PublisherPatch {
            name: self.name,
            year_of_publication: self.year_of_publication,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RegisterReaderBody {
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    address: Option<String>,
    #[serde(alias = "phone_no")]
    phone: Option<String>,
    phone_type: Option<String>,
    #[serde(deserialize_with = "lenient::opt_i64")]
    staff_id: Option<i64>,
}

impl RegisterReaderBody {
    pub(crate) fn into_new(self) -> Result<NewReader, ValidationError> {
        Ok(NewReader {
            first_name: text(self.first_name),
            last_name: text(self.last_name),
            email: text(self.email),
            address: self.address.filter(|value| !value.trim().is_empty()),
            phone: text(self.phone),
            phone_type: self.phone_type,
            staff_id: required("staff_id", self.staff_id)?,
        })
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
pub(crate) struct CreateStaffBody {
    name: Option<String>,
    login_id: Option<String>,
    password: Option<String>,
}

impl CreateStaffBody {
    pub(crate) fn into_new(self) -> NewStaff {
        NewStaff {
            name: text(self.name),
            login_id: text(self.login_id),
            password: text(self.password),
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
pub(crate) struct LoginBody {
    pub(crate) login_id: Option<String>,
    pub(crate) password: Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
pub(crate) struct ChangePasswordBody {
    pub(crate) old_password: Option<String>,
    pub(crate) new_password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct IssueBody {
    #[serde(alias = "reader_id", deserialize_with = "lenient::opt_i64")]
    user_id: Option<i64>,
    #[serde(alias = "book_id")]
    isbn: Option<String>,
    #[serde(deserialize_with = "lenient::opt_i64")]
    staff_id: Option<i64>,
    #[serde(alias = "issuedate")]
    issue_date: Option<NaiveDate>,
    #[serde(alias = "duedate")]
    due_date: Option<NaiveDate>,
}

impl IssueBody {
    pub(crate) fn into_request(self) -> Result<IssueRequest, ValidationError> {
        Ok(IssueRequest {
            user_id: required("user_id", self.user_id)?,
            isbn: required("isbn", self.isbn)?.trim().to_string(),
            staff_id: required("staff_id", self.staff_id)?,
            issue_date: required("issue_date", self.issue_date)?,
            due_date: required("due_date", self.due_date)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ReturnBody {
    #[serde(deserialize_with = "lenient::opt_i64")]
    borrow_id: Option<i64>,
    #[serde(alias = "returndate")]
    return_date: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient::opt_i64")]
    staff_id: Option<i64>,
}

impl ReturnBody {
    pub(crate) fn into_request(self) -> Result<ReturnRequest, ValidationError> {
        Ok(ReturnRequest {
            borrow_id: required("borrow_id", self.borrow_id)?,
            return_date: required("return_date", self.return_date)?,
            staff_id: required("staff_id", self.staff_id)?,
        })
    }
}

mod lenient {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Int(i64),
        Float(f64),
        Text(String),
    }

    fn opt_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        match Option::<Loose>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Loose::Int(value)) => Ok(Some(value as f64)),
            Some(Loose::Float(value)) => Ok(Some(value)),
            Some(Loose::Text(text)) if text.trim().is_empty() => Ok(None),
            Some(Loose::Text(text)) => text
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("`{text}` is not a number"))),
        }
    }

    fn integral<E: Error>(value: f64) -> Result<i64, E> {
        if value.fract() != 0.0 || value.abs() > 9.0e15 {
            return Err(E::custom(format!("`{value}` is not an integer")));
        }
        Ok(value as i64)
    }

    fn out_of_range<E: Error>(value: i64) -> E {
        E::custom(format!("`{value}` is out of range"))
    }

    pub(super) fn opt_f64<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<f64>, D::Error> {
        opt_number(deserializer)
    }

    pub(super) fn opt_i64<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<i64>, D::Error> {
        opt_number(deserializer)?.map(integral).transpose()
    }

    pub(super) fn opt_i32<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<i32>, D::Error> {
        opt_i64(deserializer)?
            .map(|value| i32::try_from(value).map_err(|_| out_of_range(value)))
            .transpose()
    }

    pub(super) fn opt_u32<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<u32>, D::Error> {
        opt_i64(deserializer)?
            .map(|value| u32::try_from(value).map_err(|_| out_of_range(value)))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::{BooksQuery, CreateBookBody, IssueBody};
    use libris_core::model::book::BookSort;
    use libris_core::ValidationError;

    #[test]
    fn numbers_may_arrive_as_strings() {
        let body: CreateBookBody = serde_json::from_str(
            r#"{"isbn":"123","title":"T","price":"9.50","publisher_id":"2","staff_id":1}"#,
        )
        .unwrap();
        let book = body.into_book().unwrap();
        assert_eq!(book.price, 9.5);
        assert_eq!(book.publisher_id, 2);
        assert_eq!(book.staff_id, 1);
    }

    #[test]
    fn missing_required_field_is_validation_error() {
        let body: CreateBookBody =
            serde_json::from_str(r#"{"isbn":"123","title":"T","staff_id":1}"#).unwrap();
        assert_eq!(
            body.into_book().unwrap_err(),
            ValidationError::MissingField("publisher_id")
        );
    }

    #[test]
    fn fractional_id_is_rejected() {
        let parsed = serde_json::from_str::<CreateBookBody>(r#"{"publisher_id":1.5}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn issue_body_accepts_legacy_field_names() {
        let body: IssueBody = serde_json::from_str(
            r#"{"user_id":1,"isbn":"9","staff_id":2,"issuedate":"2024-01-01","duedate":"2024-01-15"}"#,
        )
        .unwrap();
        let request = body.into_request().unwrap();
        assert_eq!(request.due_date.to_string(), "2024-01-15");
    }

    #[test]
    fn books_query_rejects_unknown_sort() {
        let query = BooksQuery {
            sort: Some("author".to_string()),
            ..BooksQuery::default()
        };
        assert!(matches!(
            query.into_list_query().unwrap_err(),
            ValidationError::InvalidField { field: "sort", .. }
        ));

        let query = BooksQuery {
            sort: Some("PRICE".to_string()),
            page: Some("3".to_string()),
            ..BooksQuery::default()
        };
        let parsed = query.into_list_query().unwrap();
        assert_eq!(parsed.sort, BookSort::Price);
        assert_eq!(parsed.page, 3);
    }
}
