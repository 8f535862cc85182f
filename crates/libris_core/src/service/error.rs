//! Service-level error taxonomy shared by every use-case.

use crate::auth::HashError;
use crate::model::ValidationError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Coarse error class, used by transport layers to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Conflict,
    Referential,
    DependencyBlocked,
    DomainState,
    NotFound,
    Unauthorized,
    Unexpected,
}

/// Error returned by library services.
#[derive(Debug)]
pub enum LibraryError {
    /// Missing or malformed input, rejected before touching the store.
    Validation(ValidationError),
    /// Unique key violation: duplicate isbn, email or login id.
    Conflict(String),
    /// Unknown publisher, staff, reader or book reference.
    Referential(String),
    /// Delete refused because dependent rows exist.
    DependencyBlocked(String),
    /// The book already has an open borrowing.
    BookUnavailable(String),
    AlreadyReturned(i64),
    IncorrectPassword,
    /// Unknown login or wrong password; deliberately undifferentiated.
    InvalidCredentials,
    NotFound(String),
    /// Any other failure. The detail is for logs, not for clients.
    Unexpected(String),
}

impl LibraryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Referential(_) => ErrorKind::Referential,
            Self::DependencyBlocked(_) => ErrorKind::DependencyBlocked,
            Self::BookUnavailable(_) | Self::AlreadyReturned(_) | Self::IncorrectPassword => {
                ErrorKind::DomainState
            }
            Self::InvalidCredentials => ErrorKind::Unauthorized,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    /// Stable machine-readable code for logs and API payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Conflict(_) => "conflict",
            Self::Referential(_) => "referential",
            Self::DependencyBlocked(_) => "dependency_blocked",
            Self::BookUnavailable(_) => "book_unavailable",
            Self::AlreadyReturned(_) => "already_returned",
            Self::IncorrectPassword => "incorrect_password",
            Self::InvalidCredentials => "invalid_credentials",
            Self::NotFound(_) => "not_found",
            Self::Unexpected(_) => "unexpected",
        }
    }

    /// Message safe to show to API clients.
    pub fn public_message(&self) -> String {
        match self {
            Self::Unexpected(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl Display for LibraryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Conflict(message)
            | Self::Referential(message)
            | Self::DependencyBlocked(message)
            | Self::NotFound(message) => write!(f, "{message}"),
            Self::BookUnavailable(isbn) => {
                write!(f, "book {isbn} is not available: it is currently borrowed")
            }
            Self::AlreadyReturned(borrow_id) => {
                write!(f, "borrowing {borrow_id} has already been returned")
            }
            Self::IncorrectPassword => write!(f, "incorrect current password"),
            Self::InvalidCredentials => write!(f, "invalid login id or password"),
            Self::Unexpected(detail) => write!(f, "unexpected failure: {detail}"),
        }
    }
}

impl Error for LibraryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for LibraryError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<HashError> for LibraryError {
    fn from(value: HashError) -> Self {
        Self::Unexpected(value.to_string())
    }
}

impl From<RepoError> for LibraryError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound { entity, key } => {
                Self::NotFound(format!("{entity} {key} not found"))
            }
            RepoError::UniqueViolation(_) => Self::Conflict("record already exists".to_string()),
            RepoError::ForeignKeyViolation(_) => {
                Self::Referential("referenced record does not exist".to_string())
            }
            RepoError::BookUnavailable(isbn) => Self::BookUnavailable(isbn),
            RepoError::AlreadyReturned(borrow_id) => Self::AlreadyReturned(borrow_id),
            blocked @ RepoError::DependencyBlocked { .. } => {
                Self::DependencyBlocked(blocked.to_string())
            }
            other @ (RepoError::Db(_)
            | RepoError::InvalidData(_)
            | RepoError::UninitializedConnection { .. }) => Self::Unexpected(other.to_string()),
        }
    }
}

/// Converts a repository error, replacing generic constraint messages with
/// ones that name the offending field.
pub(crate) fn with_constraint_messages(
    err: RepoError,
    unique: &str,
    foreign_key: &str,
) -> LibraryError {
    match err {
        RepoError::UniqueViolation(_) => LibraryError::Conflict(unique.to_string()),
        RepoError::ForeignKeyViolation(_) => LibraryError::Referential(foreign_key.to_string()),
        other => other.into(),
    }
}
