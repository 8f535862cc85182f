//! Reader repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Register readers together with their first phone and assist link.
//! - Own the guarded, cascading reader delete.
//!
//! # Invariants
//! - Registration writes reader, phone and assist rows atomically.
//! - A reader with an open borrowing is never deleted.

use super::{ensure_connection_ready, exists, RepoError, RepoResult};
use crate::model::reader::{NewReader, Phone, Reader, ReaderPatch, ReaderWithPhones};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::HashMap;

const READER_SELECT_SQL: &str = "SELECT user_id, first_name, last_name, email, address FROM reader";

/// Repository interface for readers and their phones.
pub trait ReaderRepository {
    /// Inserts reader, phone and staff-assist rows in one transaction.
    fn register_reader(&self, input: &NewReader) -> RepoResult<i64>;
    fn get_reader(&self, user_id: i64) -> RepoResult<Option<ReaderWithPhones>>;
    fn list_readers(&self) -> RepoResult<Vec<Reader>>;
    fn list_readers_with_phones(&self) -> RepoResult<Vec<ReaderWithPhones>>;
    fn update_reader(&self, user_id: i64, patch: &ReaderPatch) -> RepoResult<Reader>;
    /// Deletes a reader and dependent rows unless a borrowing is open.
    fn delete_reader(&self, user_id: i64) -> RepoResult<()>;
}

pub struct SqliteReaderRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReaderRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ReaderRepository for SqliteReaderRepository<'_> {
    fn register_reader(&self, input: &NewReader) -> RepoResult<i64> {
        input.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO reader (first_name, last_name, email, address)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                input.first_name.trim(),
                input.last_name.trim(),
                input.email.trim(),
                input.address.as_deref().map(str::trim),
            ],
        )?;
        let user_id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO reader_phone (user_id, phone_no, phone_type) VALUES (?1, ?2, ?3);",
            params![user_id, input.phone.trim(), input.phone_type_or_default()],
        )?;
        tx.execute(
            "INSERT INTO staff_assists_reader (staff_id, user_id) VALUES (?1, ?2);",
            params![input.staff_id, user_id],
        )?;

        tx.commit()?;
        Ok(user_id)
    }

    fn get_reader(&self, user_id: i64) -> RepoResult<Option<ReaderWithPhones>> {
        let Some(reader) = load_reader(self.conn, user_id)? else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(
            "SELECT phone_no, phone_type
             FROM reader_phone
             WHERE user_id = ?1
             ORDER BY phone_no ASC;",
        )?;
        let phones = stmt
            .query_map([user_id], |row| {
                Ok(Phone {
                    phone_no: row.get("phone_no")?,
                    phone_type: row.get("phone_type")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(ReaderWithPhones { reader, phones }))
    }

    fn list_readers(&self) -> RepoResult<Vec<Reader>> {
        let mut stmt = self.conn.prepare(&format!(
            "{READER_SELECT_SQL}
             ORDER BY last_name COLLATE NOCASE ASC, first_name COLLATE NOCASE ASC, user_id ASC;"
        ))?;
        let readers = stmt
            .query_map([], parse_reader_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(readers)
    }

    fn list_readers_with_phones(&self) -> RepoResult<Vec<ReaderWithPhones>> {
        let readers = self.list_readers()?;

        let mut stmt = self.conn.prepare(
            "SELECT user_id, phone_no, phone_type
             FROM reader_phone
             ORDER BY user_id ASC, phone_no ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut phones_by_reader: HashMap<i64, Vec<Phone>> = HashMap::new();
        while let Some(row) = rows.next()? {
            phones_by_reader
                .entry(row.get("user_id")?)
                .or_default()
                .push(Phone {
                    phone_no: row.get("phone_no")?,
                    phone_type: row.get("phone_type")?,
                });
        }

        Ok(readers
            .into_iter()
            .map(|reader| {
                let phones = phones_by_reader.remove(&reader.user_id).unwrap_or_default();
                ReaderWithPhones { reader, phones }
            })
            .collect())
    }

    fn update_reader(&self, user_id: i64, patch: &ReaderPatch) -> RepoResult<Reader> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let current =
            load_reader(&tx, user_id)?.ok_or_else(|| RepoError::not_found("reader", user_id))?;
        let next = patch.apply(&current)?;

        tx.execute(
            "UPDATE reader
             SET first_name = ?2, last_name = ?3, email = ?4, address = ?5
             WHERE user_id = ?1;",
            params![
                user_id,
                next.first_name.as_str(),
                next.last_name.as_str(),
                next.email.as_str(),
                next.address.as_deref(),
            ],
        )?;
        tx.commit()?;
        Ok(next)
    }

    fn delete_reader(&self, user_id: i64) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if load_reader(&tx, user_id)?.is_none() {
            return Err(RepoError::not_found("reader", user_id));
        }
        if exists(
            &tx,
            "SELECT EXISTS(SELECT 1 FROM borrowing WHERE user_id = ?1 AND return_date IS NULL);",
            [user_id],
        )? {
            return Err(RepoError::DependencyBlocked {
                entity: "reader",
                key: user_id.to_string(),
                reason: "they have an open borrowing",
            });
        }

        for sql in [
            "DELETE FROM report WHERE user_id = ?1;",
            "DELETE FROM reader_phone WHERE user_id = ?1;",
            "DELETE FROM staff_assists_reader WHERE user_id = ?1;",
            "DELETE FROM borrowing WHERE user_id = ?1;",
            "DELETE FROM reader WHERE user_id = ?1;",
        ] {
            tx.execute(sql, [user_id])?;
        }
        tx.commit()?;
        Ok(())
    }
}

fn load_reader(conn: &Connection, user_id: i64) -> RepoResult<Option<Reader>> {
    let reader = conn
        .query_row(
            &format!("{READER_SELECT_SQL} WHERE user_id = ?1;"),
            [user_id],
            parse_reader_row,
        )
        .optional()?;
    Ok(reader)
}

fn parse_reader_row(row: &Row<'_>) -> rusqlite::Result<Reader> {
    Ok(Reader {
        user_id: row.get("user_id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        email: row.get("email")?,
        address: row.get("address")?,
    })
}
