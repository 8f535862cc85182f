use chrono::NaiveDate;
use libris_core::db::open_db_in_memory;
use libris_core::model::book::{Book, BookListQuery, BookPatch, BookSort, SortOrder};
use libris_core::model::borrowing::IssueRequest;
use libris_core::model::publisher::NewPublisher;
use libris_core::model::reader::NewReader;
use libris_core::repo::book_repo::SqliteBookRepository;
use libris_core::repo::borrowing_repo::{BorrowingRepository, SqliteBorrowingRepository};
use libris_core::repo::publisher_repo::{PublisherRepository, SqlitePublisherRepository};
use libris_core::repo::reader_repo::{ReaderRepository, SqliteReaderRepository};
use libris_core::repo::staff_repo::{SqliteStaffRepository, StaffRepository};
use libris_core::service::BookService;
use libris_core::{ErrorKind, LibraryError, ValidationError};
use rusqlite::Connection;

struct Seed {
    staff_id: i64,
    publisher_id: i64,
}

fn seed(conn: &Connection) -> Seed {
    let staff = SqliteStaffRepository::try_new(conn)
        .unwrap()
        .create_staff("Ada Clerk", "ada", "pbkdf2-sha256$1000$00$00")
        .unwrap();
    let publisher = SqlitePublisherRepository::try_new(conn)
        .unwrap()
        .create_publisher(&NewPublisher {
            name: "Penguin".to_string(),
            year_of_publication: Some(1935),
        })
        .unwrap();
    Seed {
        staff_id: staff.staff_id,
        publisher_id: publisher.publisher_id,
    }
}

fn book(seed: &Seed, isbn: &str, title: &str, category: &str, price: f64) -> Book {
    Book {
        isbn: isbn.to_string(),
        title: title.to_string(),
        author_no: None,
        price,
        category: category.to_string(),
        edition: Some(1),
        publisher_id: seed.publisher_id,
        staff_id: seed.staff_id,
    }
}

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

#[test]
fn create_and_get_includes_publisher_name() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let service = BookService::new(SqliteBookRepository::try_new(&conn).unwrap());

    service
        .create_book(&book(&seed, "978-0141439518", "Pride and Prejudice", "Fiction", 9.5))
        .unwrap();

    let loaded = service.get_book("978-0141439518").unwrap();
    assert_eq!(loaded.book.title, "Pride and Prejudice");
    assert_eq!(loaded.publisher_name, "Penguin");
}

#[test]
fn duplicate_isbn_is_conflict() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let service = BookService::new(SqliteBookRepository::try_new(&conn).unwrap());

    service.create_book(&book(&seed, "111", "First", "A", 1.0)).unwrap();
    let err = service
        .create_book(&book(&seed, "111", "Second", "B", 2.0))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.to_string(), "book with this ISBN already exists");
}

#[test]
fn unknown_publisher_is_referential() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let service = BookService::new(SqliteBookRepository::try_new(&conn).unwrap());

    let mut orphan = book(&seed, "222", "Orphan", "A", 1.0);
    orphan.publisher_id = 9_999;
    let err = service.create_book(&orphan).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Referential);
}

#[test]
fn missing_title_is_rejected_before_insert() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let service = BookService::new(SqliteBookRepository::try_new(&conn).unwrap());

    let err = service
        .create_book(&book(&seed, "333", "   ", "A", 1.0))
        .unwrap_err();

    assert!(matches!(
        err,
        LibraryError::Validation(ValidationError::MissingField("title"))
    ));
    assert_eq!(count_rows(&conn, "book"), 0);
}

#[test]
fn list_searches_sorts_and_paginates() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let service = BookService::new(SqliteBookRepository::try_new(&conn).unwrap());

    for (isbn, title, category, price) in [
        ("100", "Dune", "SciFi", 12.0),
        ("101", "Emma", "Classic", 7.0),
        ("102", "Neuromancer", "SciFi", 10.0),
        ("103", "Foundation", "SciFi", 8.0),
    ] {
        service
            .create_book(&book(&seed, isbn, title, category, price))
            .unwrap();
    }

    let page = service
        .list_books(&BookListQuery {
            search: Some("scifi".to_string()),
            sort: BookSort::Price,
            order: SortOrder::Desc,
            page: 1,
            limit: 2,
        })
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.limit, 2);
    let titles: Vec<_> = page.items.iter().map(|r| r.book.title.as_str()).collect();
    assert_eq!(titles, vec!["Dune", "Neuromancer"]);

    let second = service
        .list_books(&BookListQuery {
            search: Some("scifi".to_string()),
            sort: BookSort::Price,
            order: SortOrder::Desc,
            page: 2,
            limit: 2,
        })
        .unwrap();
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].book.title, "Foundation");
}

#[test]
fn search_treats_percent_literally() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let service = BookService::new(SqliteBookRepository::try_new(&conn).unwrap());
    service.create_book(&book(&seed, "200", "100% Cotton", "Craft", 3.0)).unwrap();
    service.create_book(&book(&seed, "201", "Plain", "Craft", 3.0)).unwrap();

    let hits = service.search_books("%").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].book.isbn, "200");
}

#[test]
fn update_applies_only_supplied_fields() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let service = BookService::new(SqliteBookRepository::try_new(&conn).unwrap());
    service.create_book(&book(&seed, "300", "Draft", "Misc", 4.0)).unwrap();

    let updated = service
        .update_book(
            "300",
            &BookPatch {
                price: Some(6.5),
                ..BookPatch::default()
            },
        )
        .unwrap();

    assert_eq!(updated.book.title, "Draft");
    assert_eq!(updated.book.price, 6.5);
    assert_eq!(service.get_book("300").unwrap().book.price, 6.5);
}

#[test]
fn update_unknown_book_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let service = BookService::new(SqliteBookRepository::try_new(&conn).unwrap());

    let err = service
        .update_book(
            "404",
            &BookPatch {
                title: Some("Ghost".to_string()),
                ..BookPatch::default()
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn delete_is_blocked_while_book_is_on_loan() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let service = BookService::new(SqliteBookRepository::try_new(&conn).unwrap());
    service.create_book(&book(&seed, "400", "Loaned", "Misc", 4.0)).unwrap();
    let user_id = register_reader(&conn, seed.staff_id);
    SqliteBorrowingRepository::try_new(&conn)
        .unwrap()
        .issue_book(&IssueRequest {
            user_id,
            isbn: "400".to_string(),
            staff_id: seed.staff_id,
            issue_date: date("2024-01-01"),
            due_date: date("2024-01-15"),
        })
        .unwrap();

    let err = service.delete_book("400").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DependencyBlocked);
    assert_eq!(count_rows(&conn, "book"), 1);
    assert_eq!(count_rows(&conn, "borrowing"), 1);
    assert_eq!(count_rows(&conn, "report"), 1);
}

#[test]
fn delete_removes_closed_history() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let service = BookService::new(SqliteBookRepository::try_new(&conn).unwrap());
    service.create_book(&book(&seed, "500", "Returned", "Misc", 4.0)).unwrap();
    let user_id = register_reader(&conn, seed.staff_id);
    let borrowings = SqliteBorrowingRepository::try_new(&conn).unwrap();
    let borrow_id = borrowings
        .issue_book(&IssueRequest {
            user_id,
            isbn: "500".to_string(),
            staff_id: seed.staff_id,
            issue_date: date("2024-01-01"),
            due_date: date("2024-01-15"),
        })
        .unwrap();
    borrowings
        .return_book(&libris_core::model::borrowing::ReturnRequest {
            borrow_id,
            return_date: date("2024-01-10"),
            staff_id: seed.staff_id,
        })
        .unwrap();

    service.delete_book("500").unwrap();

    assert_eq!(count_rows(&conn, "book"), 0);
    assert_eq!(count_rows(&conn, "borrowing"), 0);
    assert_eq!(count_rows(&conn, "report"), 0);
    assert_eq!(service.delete_book("500").unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn available_books_exclude_open_borrowings() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let service = BookService::new(SqliteBookRepository::try_new(&conn).unwrap());
    service.create_book(&book(&seed, "600", "Free", "Misc", 1.0)).unwrap();
    service.create_book(&book(&seed, "601", "Taken", "Misc", 1.0)).unwrap();
    let user_id = register_reader(&conn, seed.staff_id);
    SqliteBorrowingRepository::try_new(&conn)
        .unwrap()
        .issue_book(&IssueRequest {
            user_id,
            isbn: "601".to_string(),
            staff_id: seed.staff_id,
            issue_date: date("2024-01-01"),
            due_date: date("2024-01-15"),
        })
        .unwrap();

    let available = service.list_available_books().unwrap();
    let isbns: Vec<_> = available.iter().map(|r| r.book.isbn.as_str()).collect();
    assert_eq!(isbns, vec!["600"]);
}

fn register_reader(conn: &Connection, staff_id: i64) -> i64 {
    SqliteReaderRepository::try_new(conn)
        .unwrap()
        .register_reader(&NewReader {
            first_name: "Rita".to_string(),
            last_name: "Reader".to_string(),
            email: "rita@example.com".to_string(),
            address: None,
            phone: "555-0100".to_string(),
            phone_type: None,
            staff_id,
        })
        .unwrap()
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| row.get(0))
        .unwrap()
}
