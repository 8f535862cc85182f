//! Borrowing repository: the issue and return transactions.
//!
//! # Responsibility
//! - Issue a book: availability check, borrowing insert and `ISSUE` report
//!   row, all in one immediate transaction.
//! - Return a book: state check, return-date update and `RETURN` report row.
//! - Read borrowings joined with reader and book labels.
//!
//! # Invariants
//! - At most one open borrowing per book. The write lock taken by
//!   `BEGIN IMMEDIATE` serializes concurrent issuers; the partial unique
//!   index `uq_borrowing_open_isbn` rejects anything that slips past.
//! - A return never overwrites an existing return date.

use super::{ensure_connection_ready, exists, RepoError, RepoResult};
use crate::model::borrowing::{Borrowing, IssueRequest, ReturnRequest};
use crate::model::report::ReportAction;
use chrono::NaiveDate;
use log::warn;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const BORROWING_VIEW_SQL: &str = "SELECT
    br.borrow_id,
    br.user_id,
    br.isbn,
    br.issue_date,
    br.due_date,
    br.return_date,
    r.first_name || ' ' || r.last_name AS reader_name,
    b.title AS book_title
FROM borrowing br
INNER JOIN reader r ON r.user_id = br.user_id
INNER JOIN book b ON b.isbn = br.isbn";

/// Borrowing row with reader and book labels, before status derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowingView {
    pub borrowing: Borrowing,
    pub reader_name: String,
    pub book_title: String,
}

/// Which borrowings a listing should load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OpenFilter {
    #[default]
    All,
    OpenOnly,
    ClosedOnly,
}

/// Repository interface for circulation records.
pub trait BorrowingRepository {
    /// Issues a book and returns the new borrowing id.
    fn issue_book(&self, request: &IssueRequest) -> RepoResult<i64>;
    /// Records a return and returns the updated borrowing.
    fn return_book(&self, request: &ReturnRequest) -> RepoResult<Borrowing>;
    fn get_borrowing(&self, borrow_id: i64) -> RepoResult<Option<BorrowingView>>;
    /// Lists borrowings newest first.
    fn list_borrowings(&self, filter: OpenFilter) -> RepoResult<Vec<BorrowingView>>;
    /// Due dates of every open borrowing, for dashboard counting.
    fn open_due_dates(&self) -> RepoResult<Vec<NaiveDate>>;
}

pub struct SqliteBorrowingRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBorrowingRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl BorrowingRepository for SqliteBorrowingRepository<'_> {
    fn issue_book(&self, request: &IssueRequest) -> RepoResult<i64> {
        request.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if exists(
            &tx,
            "SELECT EXISTS(SELECT 1 FROM borrowing WHERE isbn = ?1 AND return_date IS NULL);",
            [request.isbn.as_str()],
        )? {
            return Err(RepoError::BookUnavailable(request.isbn.clone()));
        }

        let inserted = tx.execute(
            "INSERT INTO borrowing (user_id, isbn, issue_date, due_date, return_date)
             VALUES (?1, ?2, ?3, ?4, NULL);",
            params![
                request.user_id,
                request.isbn.as_str(),
                request.issue_date,
                request.due_date,
            ],
        );
        if let Err(err) = inserted {
            return Err(match RepoError::from(err) {
                RepoError::UniqueViolation(detail) => {
                    warn!(
                        "event=borrow_issue module=repo status=error error_code=open_borrowing_index detail={detail}"
                    );
                    RepoError::BookUnavailable(request.isbn.clone())
                }
                other => other,
            });
        }
        let borrow_id = tx.last_insert_rowid();

        insert_report(
            &tx,
            ReportAction::Issue,
            request.user_id,
            &request.isbn,
            request.staff_id,
        )?;
        tx.commit()?;
        Ok(borrow_id)
    }

    fn return_book(&self, request: &ReturnRequest) -> RepoResult<Borrowing> {
        request.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut borrowing = tx
            .query_row(
                "SELECT borrow_id, user_id, isbn, issue_date, due_date, return_date
                 FROM borrowing
                 WHERE borrow_id = ?1;",
                [request.borrow_id],
                parse_borrowing_row,
            )
            .optional()?
            .ok_or_else(|| RepoError::not_found("borrowing", request.borrow_id))?;

        if !borrowing.is_open() {
            return Err(RepoError::AlreadyReturned(request.borrow_id));
        }

        tx.execute(
            "UPDATE borrowing SET return_date = ?2 WHERE borrow_id = ?1 AND return_date IS NULL;",
            params![request.borrow_id, request.return_date],
        )?;
        insert_report(
            &tx,
            ReportAction::Return,
            borrowing.user_id,
            &borrowing.isbn,
            request.staff_id,
        )?;
        tx.commit()?;

        borrowing.return_date = Some(request.return_date);
        Ok(borrowing)
    }

    fn get_borrowing(&self, borrow_id: i64) -> RepoResult<Option<BorrowingView>> {
        let view = self
            .conn
            .query_row(
                &format!("{BORROWING_VIEW_SQL} WHERE br.borrow_id = ?1;"),
                [borrow_id],
                parse_view_row,
            )
            .optional()?;
        Ok(view)
    }

    fn list_borrowings(&self, filter: OpenFilter) -> RepoResult<Vec<BorrowingView>> {
        let condition = match filter {
            OpenFilter::All => "",
            OpenFilter::OpenOnly => " WHERE br.return_date IS NULL",
            OpenFilter::ClosedOnly => " WHERE br.return_date IS NOT NULL",
        };
        let mut stmt = self.conn.prepare(&format!(
            "{BORROWING_VIEW_SQL}{condition} ORDER BY br.issue_date DESC, br.borrow_id DESC;"
        ))?;
        let views = stmt
            .query_map([], parse_view_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(views)
    }

    fn open_due_dates(&self) -> RepoResult<Vec<NaiveDate>> {
        let mut stmt = self
            .conn
            .prepare("SELECT due_date FROM borrowing WHERE return_date IS NULL;")?;
        let dates = stmt
            .query_map([], |row| row.get::<_, NaiveDate>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(dates)
    }
}

fn insert_report(
    tx: &Transaction<'_>,
    action: ReportAction,
    user_id: i64,
    isbn: &str,
    staff_id: i64,
) -> RepoResult<()> {
    tx.execute(
        "INSERT INTO report (action, user_id, isbn, staff_id) VALUES (?1, ?2, ?3, ?4);",
        params![action.as_db(), user_id, isbn, staff_id],
    )?;
    Ok(())
}

fn parse_borrowing_row(row: &Row<'_>) -> rusqlite::Result<Borrowing> {
    Ok(Borrowing {
        borrow_id: row.get("borrow_id")?,
        user_id: row.get("user_id")?,
        isbn: row.get("isbn")?,
        issue_date: row.get("issue_date")?,
        due_date: row.get("due_date")?,
        return_date: row.get("return_date")?,
    })
}

fn parse_view_row(row: &Row<'_>) -> rusqlite::Result<BorrowingView> {
    Ok(BorrowingView {
        borrowing: parse_borrowing_row(row)?,
        reader_name: row.get("reader_name")?,
        book_title: row.get("book_title")?,
    })
}
