//! Audit log reads and dashboard counters.

use super::{count, ensure_connection_ready, RepoError, RepoResult};
use crate::model::report::{ReportAction, ReportRecord};
use rusqlite::{Connection, Row};

/// Row counts that do not depend on the current date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableTotals {
    pub books: u64,
    pub readers: u64,
    pub staff: u64,
    pub publishers: u64,
    pub reports: u64,
}

pub trait ReportRepository {
    /// Lists audit rows newest first, optionally restricted to one action.
    fn list_reports(&self, action: Option<ReportAction>) -> RepoResult<Vec<ReportRecord>>;
    fn table_totals(&self) -> RepoResult<TableTotals>;
}

pub struct SqliteReportRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReportRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ReportRepository for SqliteReportRepository<'_> {
    fn list_reports(&self, action: Option<ReportAction>) -> RepoResult<Vec<ReportRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                rp.reg_no,
                rp.action,
                rp.user_id,
                COALESCE(r.first_name || ' ' || r.last_name, '') AS reader_name,
                rp.isbn,
                COALESCE(b.title, '') AS book_title,
                rp.staff_id,
                COALESCE(s.name, '') AS staff_name,
                rp.created_at
             FROM report rp
             LEFT JOIN reader r ON r.user_id = rp.user_id
             LEFT JOIN book b ON b.isbn = rp.isbn
             LEFT JOIN staff s ON s.staff_id = rp.staff_id
             WHERE (?1 IS NULL OR rp.action = ?1)
             ORDER BY rp.reg_no DESC;",
        )?;

        let mut rows = stmt.query([action.map(ReportAction::as_db)])?;
        let mut reports = Vec::new();
        while let Some(row) = rows.next()? {
            reports.push(parse_report_row(row)?);
        }
        Ok(reports)
    }

    fn table_totals(&self) -> RepoResult<TableTotals> {
        Ok(TableTotals {
            books: count(self.conn, "SELECT COUNT(*) FROM book;")?,
            readers: count(self.conn, "SELECT COUNT(*) FROM reader;")?,
            staff: count(self.conn, "SELECT COUNT(*) FROM staff;")?,
            publishers: count(self.conn, "SELECT COUNT(*) FROM publisher;")?,
            reports: count(self.conn, "SELECT COUNT(*) FROM report;")?,
        })
    }
}

fn parse_report_row(row: &Row<'_>) -> RepoResult<ReportRecord> {
    let action_text: String = row.get("action")?;
    let action = ReportAction::from_db(&action_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid action `{action_text}` in report.action"))
    })?;

    Ok(ReportRecord {
        reg_no: row.get("reg_no")?,
        action,
        user_id: row.get("user_id")?,
        reader_name: row.get("reader_name")?,
        isbn: row.get("isbn")?,
        book_title: row.get("book_title")?,
        staff_id: row.get("staff_id")?,
        staff_name: row.get("staff_name")?,
        created_at: row.get("created_at")?,
    })
}
