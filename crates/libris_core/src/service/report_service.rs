//! Audit log listing and dashboard statistics.

use super::LibraryResult;
use crate::model::borrowing::BorrowingStatus;
use crate::model::report::{LibraryStats, ReportAction, ReportRecord};
use crate::repo::borrowing_repo::BorrowingRepository;
use crate::repo::report_repo::ReportRepository;
use chrono::NaiveDate;

pub struct ReportService<R: ReportRepository, B: BorrowingRepository> {
    reports: R,
    borrowings: B,
}

impl<R: ReportRepository, B: BorrowingRepository> ReportService<R, B> {
    pub fn new(reports: R, borrowings: B) -> Self {
        Self {
            reports,
            borrowings,
        }
    }

    /// Audit rows newest first, optionally for one action.
    pub fn list_reports(&self, action: Option<ReportAction>) -> LibraryResult<Vec<ReportRecord>> {
        Ok(self.reports.list_reports(action)?)
    }

    /// Dashboard counters. Reads are independent; no transaction is taken.
    pub fn compute_stats(&self, today: NaiveDate) -> LibraryResult<LibraryStats> {
        let totals = self.reports.table_totals()?;

        let mut stats = LibraryStats {
            total_books: totals.books,
            total_readers: totals.readers,
            total_staff: totals.staff,
            total_publishers: totals.publishers,
            total_transactions: totals.reports,
            ..LibraryStats::default()
        };
        for due_date in self.borrowings.open_due_dates()? {
            match BorrowingStatus::derive(due_date, None, today) {
                BorrowingStatus::Overdue => stats.overdue_borrowings += 1,
                _ => stats.active_borrowings += 1,
            }
        }
        Ok(stats)
    }
}
