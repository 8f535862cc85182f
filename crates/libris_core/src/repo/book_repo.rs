//! Book catalog repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD, search and pagination over `book`.
//! - Own the guarded, cascading book delete.
//!
//! # Invariants
//! - A book with an open borrowing is never deleted.
//! - Deleting a book removes its report rows and closed borrowings first.

use super::{ensure_connection_ready, exists, RepoError, RepoResult};
use crate::model::book::{Book, BookListQuery, BookPage, BookPatch, BookRecord};
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction, TransactionBehavior,
};

const BOOK_SELECT_SQL: &str = "SELECT
    b.isbn,
    b.title,
    b.author_no,
    b.price,
    b.category,
    b.edition,
    b.publisher_id,
    b.staff_id,
    p.name AS publisher_name
FROM book b
INNER JOIN publisher p ON p.publisher_id = b.publisher_id";

const OPEN_BORROWING_FOR_BOOK_SQL: &str = "SELECT EXISTS(
    SELECT 1 FROM borrowing WHERE isbn = ?1 AND return_date IS NULL
);";

pub const BOOKS_DEFAULT_LIMIT: u32 = 20;
pub const BOOKS_LIMIT_MAX: u32 = 100;

/// Repository interface for the book catalog.
pub trait BookRepository {
    fn create_book(&self, book: &Book) -> RepoResult<BookRecord>;
    fn get_book(&self, isbn: &str) -> RepoResult<Option<BookRecord>>;
    fn list_books(&self, query: &BookListQuery) -> RepoResult<BookPage>;
    /// Lists books that have no open borrowing, ordered by title.
    fn list_available_books(&self) -> RepoResult<Vec<BookRecord>>;
    /// Applies a patch to a stored book and returns the result.
    fn update_book(&self, isbn: &str, patch: &BookPatch) -> RepoResult<BookRecord>;
    /// Deletes a book and its circulation history unless it is on loan.
    fn delete_book(&self, isbn: &str) -> RepoResult<()>;
}

/// SQLite-backed book repository.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn create_book(&self, book: &Book) -> RepoResult<BookRecord> {
        book.validate()?;

        self.conn.execute(
            "INSERT INTO book (
                isbn,
                title,
                author_no,
                price,
                category,
                edition,
                publisher_id,
                staff_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                book.isbn.as_str(),
                book.title.as_str(),
                book.author_no.as_deref(),
                book.price,
                book.category.as_str(),
                book.edition,
                book.publisher_id,
                book.staff_id,
            ],
        )?;

        load_book(self.conn, &book.isbn)?
            .ok_or_else(|| RepoError::InvalidData("created book missing on read-back".to_string()))
    }

    fn get_book(&self, isbn: &str) -> RepoResult<Option<BookRecord>> {
        load_book(self.conn, isbn)
    }

    fn list_books(&self, query: &BookListQuery) -> RepoResult<BookPage> {
        let mut filter = String::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            filter.push_str(
                " WHERE (b.title LIKE ?1 ESCAPE '\\'
                     OR b.category LIKE ?1 ESCAPE '\\'
                     OR b.isbn LIKE ?1 ESCAPE '\\')",
            );
            bind_values.push(Value::Text(like_pattern(search)));
        }

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM book b{filter};"),
            params_from_iter(bind_values.iter()),
            |row| row.get(0),
        )?;

        let limit = normalize_book_limit(query.limit);
        let page = query.page.max(1);
        let offset = i64::from(page - 1) * i64::from(limit);
        let sql = format!(
            "{BOOK_SELECT_SQL}{filter} ORDER BY {} {}, b.isbn ASC LIMIT {limit} OFFSET {offset};",
            query.sort.column(),
            query.order.keyword(),
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values.iter()))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_book_row(row)?);
        }

        Ok(BookPage {
            items,
            total: u64::try_from(total).unwrap_or_default(),
            page,
            limit,
        })
    }

    fn list_available_books(&self) -> RepoResult<Vec<BookRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BOOK_SELECT_SQL}
             WHERE NOT EXISTS (
                SELECT 1 FROM borrowing br
                WHERE br.isbn = b.isbn AND br.return_date IS NULL
             )
             ORDER BY b.title ASC, b.isbn ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut books = Vec::new();
        while let Some(row) = rows.next()? {
            books.push(parse_book_row(row)?);
        }
        Ok(books)
    }

    fn update_book(&self, isbn: &str, patch: &BookPatch) -> RepoResult<BookRecord> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let current = load_book(&tx, isbn)?.ok_or_else(|| RepoError::not_found("book", isbn))?;
        let next = patch.apply(&current.book)?;

        tx.execute(
            "UPDATE book
             SET
                title = ?2,
                author_no = ?3,
                price = ?4,
                category = ?5,
                edition = ?6,
                publisher_id = ?7
             WHERE isbn = ?1;",
            params![
                isbn,
                next.title.as_str(),
                next.author_no.as_deref(),
                next.price,
                next.category.as_str(),
                next.edition,
                next.publisher_id,
            ],
        )?;

        let updated = load_book(&tx, isbn)?.ok_or_else(|| {
            RepoError::InvalidData("updated book missing on read-back".to_string())
        })?;
        tx.commit()?;
        Ok(updated)
    }

    fn delete_book(&self, isbn: &str) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !exists(&tx, "SELECT EXISTS(SELECT 1 FROM book WHERE isbn = ?1);", [isbn])? {
            return Err(RepoError::not_found("book", isbn));
        }
        if exists(&tx, OPEN_BORROWING_FOR_BOOK_SQL, [isbn])? {
            return Err(RepoError::DependencyBlocked {
                entity: "book",
                key: isbn.to_string(),
                reason: "it has an open borrowing",
            });
        }

        tx.execute("DELETE FROM report WHERE isbn = ?1;", [isbn])?;
        tx.execute("DELETE FROM borrowing WHERE isbn = ?1;", [isbn])?;
        tx.execute("DELETE FROM book WHERE isbn = ?1;", [isbn])?;
        tx.commit()?;
        Ok(())
    }
}

/// Normalizes list limit: default 20, clamped to 100.
pub fn normalize_book_limit(limit: u32) -> u32 {
    match limit {
        0 => BOOKS_DEFAULT_LIMIT,
        value if value > BOOKS_LIMIT_MAX => BOOKS_LIMIT_MAX,
        value => value,
    }
}

fn load_book(conn: &Connection, isbn: &str) -> RepoResult<Option<BookRecord>> {
    let mut stmt = conn.prepare(&format!("{BOOK_SELECT_SQL} WHERE b.isbn = ?1;"))?;
    let record = stmt
        .query_row([isbn], |row| Ok(parse_book_row(row)))
        .optional()?;
    record.transpose()
}

fn parse_book_row(row: &Row<'_>) -> RepoResult<BookRecord> {
    let edition = match row.get::<_, Option<i64>>("edition")? {
        Some(value) => Some(u32::try_from(value).map_err(|_| {
            RepoError::InvalidData(format!("invalid edition `{value}` in book.edition"))
        })?),
        None => None,
    };

    Ok(BookRecord {
        book: Book {
            isbn: row.get("isbn")?,
            title: row.get("title")?,
            author_no: row.get("author_no")?,
            price: row.get("price")?,
            category: row.get("category")?,
            edition,
            publisher_id: row.get("publisher_id")?,
            staff_id: row.get("staff_id")?,
        },
        publisher_name: row.get("publisher_name")?,
    })
}

/// Builds a `%...%` LIKE pattern with wildcard characters escaped.
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::{like_pattern, normalize_book_limit};

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(normalize_book_limit(0), 20);
        assert_eq!(normalize_book_limit(7), 7);
        assert_eq!(normalize_book_limit(5000), 100);
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
