use chrono::NaiveDate;
use libris_core::db::open_db_in_memory;
use libris_core::model::book::Book;
use libris_core::model::borrowing::{IssueRequest, ReturnRequest};
use libris_core::model::publisher::NewPublisher;
use libris_core::model::reader::NewReader;
use libris_core::model::report::{LibraryStats, ReportAction};
use libris_core::repo::book_repo::{BookRepository, SqliteBookRepository};
use libris_core::repo::borrowing_repo::{BorrowingRepository, SqliteBorrowingRepository};
use libris_core::repo::publisher_repo::{PublisherRepository, SqlitePublisherRepository};
use libris_core::repo::reader_repo::{ReaderRepository, SqliteReaderRepository};
use libris_core::repo::report_repo::SqliteReportRepository;
use libris_core::repo::staff_repo::{SqliteStaffRepository, StaffRepository};
use libris_core::service::ReportService;
use rusqlite::Connection;

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

/// Three books, two readers; one returned loan, one overdue and one active
/// loan as of 2024-02-01.
fn seed_circulation(conn: &Connection) {
    let staff_id = SqliteStaffRepository::try_new(conn)
        .unwrap()
        .create_staff("Ada Clerk", "ada", "pbkdf2-sha256$1000$00$00")
        .unwrap()
        .staff_id;
    let publisher_id = SqlitePublisherRepository::try_new(conn)
        .unwrap()
        .create_publisher(&NewPublisher {
            name: "Vintage".to_string(),
            year_of_publication: None,
        })
        .unwrap()
        .publisher_id;
    let books = SqliteBookRepository::try_new(conn).unwrap();
    for (isbn, title) in [("1001", "Alpha"), ("1002", "Beta"), ("1003", "Gamma")] {
        books
            .create_book(&Book {
                isbn: isbn.to_string(),
                title: title.to_string(),
                author_no: None,
                price: 1.0,
                category: "Misc".to_string(),
                edition: None,
                publisher_id,
                staff_id,
            })
            .unwrap();
    }
    let readers = SqliteReaderRepository::try_new(conn).unwrap();
    let user_ids: Vec<i64> = ["one@example.com", "two@example.com"]
        .into_iter()
        .map(|email| {
            readers
                .register_reader(&NewReader {
                    first_name: "Reader".to_string(),
                    last_name: email.to_string(),
                    email: email.to_string(),
                    address: None,
                    phone: "555-0102".to_string(),
                    phone_type: None,
                    staff_id,
                })
                .unwrap()
        })
        .collect();

    let borrowings = SqliteBorrowingRepository::try_new(conn).unwrap();
    let issue = |user_id: i64, isbn: &str, issued: &str, due: &str| {
        borrowings
            .issue_book(&IssueRequest {
                user_id,
                isbn: isbn.to_string(),
                staff_id,
                issue_date: date(issued),
                due_date: date(due),
            })
            .unwrap()
    };
    let returned = issue(user_ids[0], "1001", "2024-01-01", "2024-01-10");
    issue(user_ids[0], "1002", "2024-01-05", "2024-01-20");
    issue(user_ids[1], "1003", "2024-01-25", "2024-02-15");
    borrowings
        .return_book(&ReturnRequest {
            borrow_id: returned,
            return_date: date("2024-01-09"),
            staff_id,
        })
        .unwrap();
}

#[test]
fn stats_count_tables_and_derived_loan_states() {
    let conn = open_db_in_memory().unwrap();
    seed_circulation(&conn);
    let service = ReportService::new(
        SqliteReportRepository::try_new(&conn).unwrap(),
        SqliteBorrowingRepository::try_new(&conn).unwrap(),
    );

    let stats = service.compute_stats(date("2024-02-01")).unwrap();

    assert_eq!(
        stats,
        LibraryStats {
            total_books: 3,
            total_readers: 2,
            total_staff: 1,
            total_publishers: 1,
            active_borrowings: 1,
            overdue_borrowings: 1,
            total_transactions: 4,
        }
    );
}

#[test]
fn empty_library_has_zero_stats() {
    let conn = open_db_in_memory().unwrap();
    let service = ReportService::new(
        SqliteReportRepository::try_new(&conn).unwrap(),
        SqliteBorrowingRepository::try_new(&conn).unwrap(),
    );

    assert_eq!(
        service.compute_stats(date("2024-02-01")).unwrap(),
        LibraryStats::default()
    );
}

#[test]
fn reports_list_newest_first_and_filter_by_action() {
    let conn = open_db_in_memory().unwrap();
    seed_circulation(&conn);
    let service = ReportService::new(
        SqliteReportRepository::try_new(&conn).unwrap(),
        SqliteBorrowingRepository::try_new(&conn).unwrap(),
    );

    let all = service.list_reports(None).unwrap();
    assert_eq!(all.len(), 4);
    assert_eq!(all[0].action, ReportAction::Return);
    assert_eq!(all[0].book_title, "Alpha");
    assert_eq!(all[0].staff_name, "Ada Clerk");
    assert!(all.windows(2).all(|pair| pair[0].reg_no > pair[1].reg_no));

    let issues = service.list_reports(Some(ReportAction::Issue)).unwrap();
    assert_eq!(issues.len(), 3);
    assert!(issues.iter().all(|r| r.action == ReportAction::Issue));
}
