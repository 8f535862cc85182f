use libris_core::db::open_db_in_memory;
use libris_core::model::book::Book;
use libris_core::model::publisher::{NewPublisher, PublisherPatch};
use libris_core::repo::book_repo::{BookRepository, SqliteBookRepository};
use libris_core::repo::publisher_repo::SqlitePublisherRepository;
use libris_core::repo::staff_repo::{SqliteStaffRepository, StaffRepository};
use libris_core::service::PublisherService;
use libris_core::ErrorKind;

fn new_publisher(name: &str) -> NewPublisher {
    NewPublisher {
        name: name.to_string(),
        year_of_publication: Some(1998),
    }
}

#[test]
fn create_list_and_get() {
    let conn = open_db_in_memory().unwrap();
    let service = PublisherService::new(SqlitePublisherRepository::try_new(&conn).unwrap());

    let vintage = service.create_publisher(&new_publisher("Vintage")).unwrap();
    service.create_publisher(&new_publisher("anchor")).unwrap();

    let names: Vec<_> = service
        .list_publishers()
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["anchor", "Vintage"]);
    assert_eq!(service.get_publisher(vintage.publisher_id).unwrap(), vintage);
}

#[test]
fn blank_name_is_validation_error() {
    let conn = open_db_in_memory().unwrap();
    let service = PublisherService::new(SqlitePublisherRepository::try_new(&conn).unwrap());

    let err = service.create_publisher(&new_publisher("  ")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn patch_updates_only_supplied_fields() {
    let conn = open_db_in_memory().unwrap();
    let service = PublisherService::new(SqlitePublisherRepository::try_new(&conn).unwrap());
    let created = service.create_publisher(&new_publisher("Vintage")).unwrap();

    let updated = service
        .update_publisher(
            created.publisher_id,
            &PublisherPatch {
                name: Some("Vintage Books".to_string()),
                ..PublisherPatch::default()
            },
        )
        .unwrap();

    assert_eq!(updated.name, "Vintage Books");
    assert_eq!(updated.year_of_publication, Some(1998));
}

#[test]
fn delete_is_blocked_while_books_reference_publisher() {
    let conn = open_db_in_memory().unwrap();
    let service = PublisherService::new(SqlitePublisherRepository::try_new(&conn).unwrap());
    let publisher = service.create_publisher(&new_publisher("Vintage")).unwrap();
    let staff = SqliteStaffRepository::try_new(&conn)
        .unwrap()
        .create_staff("Ada Clerk", "ada", "pbkdf2-sha256$1000$00$00")
        .unwrap();
    let books = SqliteBookRepository::try_new(&conn).unwrap();
    books
        .create_book(&Book {
            isbn: "0679720200".to_string(),
            title: "The Stranger".to_string(),
            author_no: None,
            price: 11.0,
            category: "Fiction".to_string(),
            edition: None,
            publisher_id: publisher.publisher_id,
            staff_id: staff.staff_id,
        })
        .unwrap();

    let err = service.delete_publisher(publisher.publisher_id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DependencyBlocked);
    assert!(service.get_publisher(publisher.publisher_id).is_ok());

    books.delete_book("0679720200").unwrap();
    service.delete_publisher(publisher.publisher_id).unwrap();
    assert_eq!(
        service.get_publisher(publisher.publisher_id).unwrap_err().kind(),
        ErrorKind::NotFound
    );
}
