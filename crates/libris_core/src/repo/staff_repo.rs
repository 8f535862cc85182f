//! Staff and credential repository contracts and SQLite implementation.
//!
//! # Invariants
//! - The credential row is written before the staff row in one transaction.
//! - Password hashes never leave this module except through
//!   `StaffCredential`, which is consumed by the staff service.

use super::{ensure_connection_ready, RepoError, RepoResult};
use crate::model::staff::Staff;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const STAFF_SELECT_SQL: &str = "SELECT staff_id, name, login_id FROM staff";

/// Staff profile with its stored password hash.
#[derive(Clone)]
pub struct StaffCredential {
    pub staff: Staff,
    pub password_hash: String,
}

impl std::fmt::Debug for StaffCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaffCredential")
            .field("staff", &self.staff)
            .finish_non_exhaustive()
    }
}

/// Repository interface for staff accounts.
pub trait StaffRepository {
    /// Inserts credential and staff rows atomically.
    fn create_staff(&self, name: &str, login_id: &str, password_hash: &str) -> RepoResult<Staff>;
    fn get_staff(&self, staff_id: i64) -> RepoResult<Option<Staff>>;
    fn list_staff(&self) -> RepoResult<Vec<Staff>>;
    fn find_credential(&self, login_id: &str) -> RepoResult<Option<StaffCredential>>;
    fn update_password_hash(&self, login_id: &str, password_hash: &str) -> RepoResult<()>;
}

pub struct SqliteStaffRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStaffRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl StaffRepository for SqliteStaffRepository<'_> {
    fn create_staff(&self, name: &str, login_id: &str, password_hash: &str) -> RepoResult<Staff> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO authentication (login_id, password_hash) VALUES (?1, ?2);",
            params![login_id, password_hash],
        )?;
        tx.execute(
            "INSERT INTO staff (name, login_id) VALUES (?1, ?2);",
            params![name, login_id],
        )?;
        let staff_id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Staff {
            staff_id,
            name: name.to_string(),
            login_id: login_id.to_string(),
        })
    }

    fn get_staff(&self, staff_id: i64) -> RepoResult<Option<Staff>> {
        let staff = self
            .conn
            .query_row(
                &format!("{STAFF_SELECT_SQL} WHERE staff_id = ?1;"),
                [staff_id],
                parse_staff_row,
            )
            .optional()?;
        Ok(staff)
    }

    fn list_staff(&self) -> RepoResult<Vec<Staff>> {
        let mut stmt = self.conn.prepare(&format!(
            "{STAFF_SELECT_SQL} ORDER BY name COLLATE NOCASE ASC, staff_id ASC;"
        ))?;
        let staff = stmt
            .query_map([], parse_staff_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(staff)
    }

    fn find_credential(&self, login_id: &str) -> RepoResult<Option<StaffCredential>> {
        let credential = self
            .conn
            .query_row(
                "SELECT s.staff_id, s.name, s.login_id, a.password_hash
                 FROM authentication a
                 INNER JOIN staff s ON s.login_id = a.login_id
                 WHERE a.login_id = ?1;",
                [login_id],
                |row| {
                    Ok(StaffCredential {
                        staff: parse_staff_row(row)?,
                        password_hash: row.get("password_hash")?,
                    })
                },
            )
            .optional()?;
        Ok(credential)
    }

    fn update_password_hash(&self, login_id: &str, password_hash: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE authentication SET password_hash = ?2 WHERE login_id = ?1;",
            params![login_id, password_hash],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("credential", login_id));
        }
        Ok(())
    }
}

fn parse_staff_row(row: &Row<'_>) -> rusqlite::Result<Staff> {
    Ok(Staff {
        staff_id: row.get("staff_id")?,
        name: row.get("name")?,
        login_id: row.get("login_id")?,
    })
}
