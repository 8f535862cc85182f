//! Circulation workflows: issue, return and borrowing reads.
//!
//! # Invariants
//! - Status is derived with `BorrowingStatus::derive` against the caller's
//!   `today`; list, fetch and stats agree for the same date.

use super::error::with_constraint_messages;
use super::{log_failure, LibraryError, LibraryResult};
use crate::model::borrowing::{
    Borrowing, BorrowingRecord, BorrowingStatus, IssueRequest, ReturnRequest,
};
use crate::repo::borrowing_repo::{BorrowingRepository, BorrowingView, OpenFilter};
use chrono::NaiveDate;
use log::info;

const ISSUE_BAD_REFERENCE: &str = "invalid user_id, isbn or staff_id";

pub struct CirculationService<R: BorrowingRepository> {
    repo: R,
}

impl<R: BorrowingRepository> CirculationService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Issues a book and returns the new borrow id.
    pub fn issue_book(&self, request: &IssueRequest) -> LibraryResult<i64> {
        let issued = self.repo.issue_book(request).map_err(|err| {
            with_constraint_messages(err, "book is already borrowed", ISSUE_BAD_REFERENCE)
        });
        match issued {
            Ok(borrow_id) => {
                info!(
                    "event=borrow_issue module=circulation status=ok borrow_id={borrow_id} isbn={} user_id={} staff_id={}",
                    request.isbn, request.user_id, request.staff_id
                );
                Ok(borrow_id)
            }
            Err(err) => {
                log_failure("borrow_issue", "circulation", &err);
                Err(err)
            }
        }
    }

    /// Records a return. A second return of the same borrowing is rejected.
    pub fn return_book(&self, request: &ReturnRequest) -> LibraryResult<Borrowing> {
        let returned = self
            .repo
            .return_book(request)
            .map_err(|err| with_constraint_messages(err, "duplicate return", "invalid staff_id"));
        match returned {
            Ok(borrowing) => {
                info!(
                    "event=borrow_return module=circulation status=ok borrow_id={} staff_id={}",
                    borrowing.borrow_id, request.staff_id
                );
                Ok(borrowing)
            }
            Err(err) => {
                log_failure("borrow_return", "circulation", &err);
                Err(err)
            }
        }
    }

    pub fn get_borrowing(
        &self,
        borrow_id: i64,
        today: NaiveDate,
    ) -> LibraryResult<BorrowingRecord> {
        self.repo
            .get_borrowing(borrow_id)?
            .map(|view| to_record(view, today))
            .ok_or_else(|| LibraryError::NotFound("borrowing not found".to_string()))
    }

    /// Lists borrowings newest first, keeping only `status` when given.
    pub fn list_borrowings(
        &self,
        status: Option<BorrowingStatus>,
        today: NaiveDate,
    ) -> LibraryResult<Vec<BorrowingRecord>> {
        let open_filter = match status {
            None => OpenFilter::All,
            Some(BorrowingStatus::Returned) => OpenFilter::ClosedOnly,
            Some(BorrowingStatus::Active | BorrowingStatus::Overdue) => OpenFilter::OpenOnly,
        };

        let records = self
            .repo
            .list_borrowings(open_filter)?
            .into_iter()
            .map(|view| to_record(view, today))
            .filter(|record| status.map_or(true, |wanted| record.status == wanted))
            .collect();
        Ok(records)
    }
}

fn to_record(view: BorrowingView, today: NaiveDate) -> BorrowingRecord {
    let status = view.borrowing.status(today);
    BorrowingRecord {
        borrowing: view.borrowing,
        reader_name: view.reader_name,
        book_title: view.book_title,
        status,
    }
}
