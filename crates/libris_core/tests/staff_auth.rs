use libris_core::auth::{Pbkdf2Hasher, MIN_ROUNDS};
use libris_core::db::open_db_in_memory;
use libris_core::model::staff::NewStaff;
use libris_core::model::ValidationError;
use libris_core::repo::staff_repo::{SqliteStaffRepository, StaffRepository};
use libris_core::service::StaffService;
use libris_core::{ErrorKind, LibraryError};
use rusqlite::Connection;

fn hasher() -> Pbkdf2Hasher {
    Pbkdf2Hasher::new(MIN_ROUNDS).unwrap()
}

fn new_staff(login_id: &str, password: &str) -> NewStaff {
    NewStaff {
        name: "Ada Clerk".to_string(),
        login_id: login_id.to_string(),
        password: password.to_string(),
    }
}

#[test]
fn create_stores_hash_not_password() {
    let conn = open_db_in_memory().unwrap();
    let hasher = hasher();
    let service = StaffService::new(SqliteStaffRepository::try_new(&conn).unwrap(), &hasher);

    let staff = service
        .create_staff_account(&new_staff("ada", "correct horse"))
        .unwrap();
    assert_eq!(staff.login_id, "ada");

    let stored: String = conn
        .query_row(
            "SELECT password_hash FROM authentication WHERE login_id = 'ada';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(!stored.contains("correct horse"));
    assert!(stored.starts_with("pbkdf2-sha256$"));
}

#[test]
fn short_password_is_rejected_before_any_write() {
    let conn = open_db_in_memory().unwrap();
    let hasher = hasher();
    let service = StaffService::new(SqliteStaffRepository::try_new(&conn).unwrap(), &hasher);

    let err = service
        .create_staff_account(&new_staff("ada", "short"))
        .unwrap_err();

    assert!(matches!(
        err,
        LibraryError::Validation(ValidationError::PasswordTooShort { min_chars: 8 })
    ));
    assert_eq!(count_rows(&conn, "authentication"), 0);
    assert_eq!(count_rows(&conn, "staff"), 0);
}

#[test]
fn duplicate_login_is_conflict_and_leaves_single_account() {
    let conn = open_db_in_memory().unwrap();
    let hasher = hasher();
    let service = StaffService::new(SqliteStaffRepository::try_new(&conn).unwrap(), &hasher);
    service
        .create_staff_account(&new_staff("ada", "password-one"))
        .unwrap();

    let err = service
        .create_staff_account(&new_staff("ada", "password-two"))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.to_string(), "login id already exists");
    assert_eq!(count_rows(&conn, "authentication"), 1);
    assert_eq!(count_rows(&conn, "staff"), 1);
}

#[test]
fn authenticate_never_reveals_whether_login_exists() {
    let conn = open_db_in_memory().unwrap();
    let hasher = hasher();
    let service = StaffService::new(SqliteStaffRepository::try_new(&conn).unwrap(), &hasher);
    service
        .create_staff_account(&new_staff("ada", "correct horse"))
        .unwrap();

    let unknown = service.authenticate("grace", "correct horse").unwrap_err();
    let wrong = service.authenticate("ada", "battery staple").unwrap_err();

    assert!(matches!(unknown, LibraryError::InvalidCredentials));
    assert!(matches!(wrong, LibraryError::InvalidCredentials));
    assert_eq!(unknown.to_string(), wrong.to_string());
    assert_eq!(unknown.kind(), ErrorKind::Unauthorized);

    let staff = service.authenticate("ada", "correct horse").unwrap();
    assert_eq!(staff.name, "Ada Clerk");
}

#[test]
fn change_password_requires_current_password() {
    let conn = open_db_in_memory().unwrap();
    let hasher = hasher();
    let service = StaffService::new(SqliteStaffRepository::try_new(&conn).unwrap(), &hasher);
    let staff = service
        .create_staff_account(&new_staff("ada", "first-password"))
        .unwrap();

    let err = service
        .change_password(staff.staff_id, "not-the-password", "second-password")
        .unwrap_err();
    assert!(matches!(err, LibraryError::IncorrectPassword));

    let too_short = service
        .change_password(staff.staff_id, "first-password", "tiny")
        .unwrap_err();
    assert_eq!(too_short.kind(), ErrorKind::Validation);

    service
        .change_password(staff.staff_id, "first-password", "second-password")
        .unwrap();
    assert!(service.authenticate("ada", "first-password").is_err());
    service.authenticate("ada", "second-password").unwrap();
}

#[test]
fn change_password_for_unknown_staff_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let hasher = hasher();
    let service = StaffService::new(SqliteStaffRepository::try_new(&conn).unwrap(), &hasher);

    let err = service
        .change_password(42, "whatever-old", "whatever-new")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn list_staff_returns_profiles_only() {
    let conn = open_db_in_memory().unwrap();
    let hasher = hasher();
    let repo = SqliteStaffRepository::try_new(&conn).unwrap();
    let service = StaffService::new(repo, &hasher);
    service
        .create_staff_account(&new_staff("ada", "correct horse"))
        .unwrap();

    let listed = service.list_staff().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].login_id, "ada");

    let credential = SqliteStaffRepository::try_new(&conn)
        .unwrap()
        .find_credential("ada")
        .unwrap()
        .unwrap();
    assert!(!format!("{credential:?}").contains("pbkdf2"));
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| row.get(0))
        .unwrap()
}
