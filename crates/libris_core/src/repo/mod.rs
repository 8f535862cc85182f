//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per aggregate.
//! - Own every multi-statement transaction and its rollback boundary.
//! - Translate store constraint failures into semantic errors.
//!
//! # Invariants
//! - Write paths validate input before SQL mutations.
//! - Multi-row workflows run inside one `BEGIN IMMEDIATE` transaction and
//!   leave no partial state on error.
//! - Repositories refuse connections whose schema is not fully migrated.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::ValidationError;
use rusqlite::{ffi, Connection};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod book_repo;
pub mod borrowing_repo;
pub mod publisher_repo;
pub mod reader_repo;
pub mod report_repo;
pub mod staff_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by all library aggregates.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    NotFound {
        entity: &'static str,
        key: String,
    },
    InvalidData(String),
    /// Unique or primary key constraint rejected a write.
    UniqueViolation(String),
    /// A referenced row does not exist.
    ForeignKeyViolation(String),
    /// The book already has an open borrowing.
    BookUnavailable(String),
    AlreadyReturned(i64),
    /// Delete refused because dependent rows still exist.
    DependencyBlocked {
        entity: &'static str,
        key: String,
        reason: &'static str,
    },
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, key } => write!(f, "{entity} not found: {key}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UniqueViolation(message) => write!(f, "unique constraint violated: {message}"),
            Self::ForeignKeyViolation(message) => {
                write!(f, "foreign key constraint violated: {message}")
            }
            Self::BookUnavailable(isbn) => write!(f, "book {isbn} is currently borrowed"),
            Self::AlreadyReturned(borrow_id) => {
                write!(f, "borrowing {borrow_id} has already been returned")
            }
            Self::DependencyBlocked {
                entity,
                key,
                reason,
            } => write!(f, "cannot delete {entity} {key}: {reason}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        match constraint_kind(&value) {
            Some(ConstraintKind::Unique) => Self::UniqueViolation(value.to_string()),
            Some(ConstraintKind::ForeignKey) => Self::ForeignKeyViolation(value.to_string()),
            None => Self::Db(DbError::Sqlite(value)),
        }
    }
}

impl RepoError {
    pub(crate) fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConstraintKind {
    Unique,
    ForeignKey,
}

fn constraint_kind(err: &rusqlite::Error) -> Option<ConstraintKind> {
    match err {
        rusqlite::Error::SqliteFailure(inner, _) => match inner.extended_code {
            ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                Some(ConstraintKind::Unique)
            }
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Some(ConstraintKind::ForeignKey),
            _ => None,
        },
        _ => None,
    }
}

/// Rejects connections that have not been bootstrapped by `db::open_*`.
pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let actual_version = current_user_version(conn)?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

/// Runs a `SELECT EXISTS(...)` query returning 0/1.
pub(crate) fn exists(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> RepoResult<bool> {
    let found: i64 = conn.query_row(sql, params, |row| row.get(0))?;
    Ok(found == 1)
}

pub(crate) fn count(conn: &Connection, sql: &str) -> RepoResult<u64> {
    let value: i64 = conn.query_row(sql, [], |row| row.get(0))?;
    u64::try_from(value).map_err(|_| RepoError::InvalidData(format!("negative count {value}")))
}
