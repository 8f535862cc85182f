//! Publisher repository contracts and SQLite implementation.

use super::{ensure_connection_ready, exists, RepoError, RepoResult};
use crate::model::publisher::{NewPublisher, Publisher, PublisherPatch};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

/// Repository interface for publishers.
pub trait PublisherRepository {
    fn create_publisher(&self, input: &NewPublisher) -> RepoResult<Publisher>;
    fn get_publisher(&self, publisher_id: i64) -> RepoResult<Option<Publisher>>;
    fn list_publishers(&self) -> RepoResult<Vec<Publisher>>;
    fn update_publisher(&self, publisher_id: i64, patch: &PublisherPatch) -> RepoResult<Publisher>;
    /// Deletes a publisher that no book references.
    fn delete_publisher(&self, publisher_id: i64) -> RepoResult<()>;
}

pub struct SqlitePublisherRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePublisherRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl PublisherRepository for SqlitePublisherRepository<'_> {
    fn create_publisher(&self, input: &NewPublisher) -> RepoResult<Publisher> {
        input.validate()?;

        self.conn.execute(
            "INSERT INTO publisher (name, year_of_publication) VALUES (?1, ?2);",
            params![input.name.trim(), input.year_of_publication],
        )?;

        Ok(Publisher {
            publisher_id: self.conn.last_insert_rowid(),
            name: input.name.trim().to_string(),
            year_of_publication: input.year_of_publication,
        })
    }

    fn get_publisher(&self, publisher_id: i64) -> RepoResult<Option<Publisher>> {
        load_publisher(self.conn, publisher_id)
    }

    fn list_publishers(&self) -> RepoResult<Vec<Publisher>> {
        let mut stmt = self.conn.prepare(
            "SELECT publisher_id, name, year_of_publication
             FROM publisher
             ORDER BY name COLLATE NOCASE ASC, publisher_id ASC;",
        )?;
        let publishers = stmt
            .query_map([], parse_publisher_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(publishers)
    }

    fn update_publisher(&self, publisher_id: i64, patch: &PublisherPatch) -> RepoResult<Publisher> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let current = load_publisher(&tx, publisher_id)?
            .ok_or_else(|| RepoError::not_found("publisher", publisher_id))?;
        let next = patch.apply(&current)?;

        tx.execute(
            "UPDATE publisher SET name = ?2, year_of_publication = ?3 WHERE publisher_id = ?1;",
            params![publisher_id, next.name.as_str(), next.year_of_publication],
        )?;
        tx.commit()?;
        Ok(next)
    }

    fn delete_publisher(&self, publisher_id: i64) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if load_publisher(&tx, publisher_id)?.is_none() {
            return Err(RepoError::not_found("publisher", publisher_id));
        }
        if exists(
            &tx,
            "SELECT EXISTS(SELECT 1 FROM book WHERE publisher_id = ?1);",
            [publisher_id],
        )? {
            return Err(RepoError::DependencyBlocked {
                entity: "publisher",
                key: publisher_id.to_string(),
                reason: "books still reference it",
            });
        }

        tx.execute("DELETE FROM publisher WHERE publisher_id = ?1;", [publisher_id])?;
        tx.commit()?;
        Ok(())
    }
}

fn load_publisher(conn: &Connection, publisher_id: i64) -> RepoResult<Option<Publisher>> {
    let publisher = conn
        .query_row(
            "SELECT publisher_id, name, year_of_publication
             FROM publisher
             WHERE publisher_id = ?1;",
            [publisher_id],
            parse_publisher_row,
        )
        .optional()?;
    Ok(publisher)
}

fn parse_publisher_row(row: &Row<'_>) -> rusqlite::Result<Publisher> {
    Ok(Publisher {
        publisher_id: row.get("publisher_id")?,
        name: row.get("name")?,
        year_of_publication: row.get("year_of_publication")?,
    })
}
