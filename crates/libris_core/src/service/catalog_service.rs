//! Catalog use-cases: books and publishers.

use super::error::with_constraint_messages;
use super::{log_failure, LibraryError, LibraryResult};
use crate::model::book::{Book, BookListQuery, BookPage, BookPatch, BookRecord};
use crate::model::publisher::{NewPublisher, Publisher, PublisherPatch};
use crate::repo::book_repo::{BookRepository, BOOKS_LIMIT_MAX};
use crate::repo::publisher_repo::PublisherRepository;
use log::info;

const BOOK_DUPLICATE: &str = "book with this ISBN already exists";
const BOOK_BAD_REFERENCE: &str = "invalid publisher_id or staff_id";

/// Book catalog service.
pub struct BookService<R: BookRepository> {
    repo: R,
}

impl<R: BookRepository> BookService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list_books(&self, query: &BookListQuery) -> LibraryResult<BookPage> {
        Ok(self.repo.list_books(query)?)
    }

    /// Title/category/isbn search returning at most one full page.
    pub fn search_books(&self, term: &str) -> LibraryResult<Vec<BookRecord>> {
        let query = BookListQuery {
            search: Some(term.to_string()),
            page: 1,
            limit: BOOKS_LIMIT_MAX,
            ..BookListQuery::default()
        };
        Ok(self.repo.list_books(&query)?.items)
    }

    pub fn list_available_books(&self) -> LibraryResult<Vec<BookRecord>> {
        Ok(self.repo.list_available_books()?)
    }

    pub fn get_book(&self, isbn: &str) -> LibraryResult<BookRecord> {
        self.repo
            .get_book(isbn)?
            .ok_or_else(|| LibraryError::NotFound("book not found".to_string()))
    }

    pub fn create_book(&self, book: &Book) -> LibraryResult<BookRecord> {
        let created = self
            .repo
            .create_book(book)
            .map_err(|err| with_constraint_messages(err, BOOK_DUPLICATE, BOOK_BAD_REFERENCE));
        match created {
            Ok(record) => {
                info!(
                    "event=book_create module=catalog status=ok isbn={}",
                    record.book.isbn
                );
                Ok(record)
            }
            Err(err) => {
                log_failure("book_create", "catalog", &err);
                Err(err)
            }
        }
    }

    /// Applies a partial update. Unknown isbn is `NotFound`.
    pub fn update_book(&self, isbn: &str, patch: &BookPatch) -> LibraryResult<BookRecord> {
        let updated = self
            .repo
            .update_book(isbn, patch)
            .map_err(|err| with_constraint_messages(err, BOOK_DUPLICATE, BOOK_BAD_REFERENCE));
        if let Err(err) = &updated {
            log_failure("book_update", "catalog", err);
        } else {
            info!("event=book_update module=catalog status=ok isbn={isbn}");
        }
        updated
    }

    /// Deletes a book with its closed history; refused while it is on loan.
    pub fn delete_book(&self, isbn: &str) -> LibraryResult<()> {
        match self.repo.delete_book(isbn) {
            Ok(()) => {
                info!("event=book_delete module=catalog status=ok isbn={isbn}");
                Ok(())
            }
            Err(err) => {
                let err = LibraryError::from(err);
                log_failure("book_delete", "catalog", &err);
                Err(err)
            }
        }
    }
}

/// Publisher service.
pub struct PublisherService<R: PublisherRepository> {
    repo: R,
}

impl<R: PublisherRepository> PublisherService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list_publishers(&self) -> LibraryResult<Vec<Publisher>> {
        Ok(self.repo.list_publishers()?)
    }

    pub fn get_publisher(&self, publisher_id: i64) -> LibraryResult<Publisher> {
        self.repo
            .get_publisher(publisher_id)?
            .ok_or_else(|| LibraryError::NotFound("publisher not found".to_string()))
    }

    pub fn create_publisher(&self, input: &NewPublisher) -> LibraryResult<Publisher> {
        match self.repo.create_publisher(input) {
            Ok(publisher) => {
                info!(
                    "event=publisher_create module=catalog status=ok publisher_id={}",
                    publisher.publisher_id
                );
                Ok(publisher)
            }
            Err(err) => {
                let err = LibraryError::from(err);
                log_failure("publisher_create", "catalog", &err);
                Err(err)
            }
        }
    }

    pub fn update_publisher(
        &self,
        publisher_id: i64,
        patch: &PublisherPatch,
    ) -> LibraryResult<Publisher> {
        self.repo
            .update_publisher(publisher_id, patch)
            .map_err(|err| {
                let err = LibraryError::from(err);
                log_failure("publisher_update", "catalog", &err);
                err
            })
    }

    pub fn delete_publisher(&self, publisher_id: i64) -> LibraryResult<()> {
        match self.repo.delete_publisher(publisher_id) {
            Ok(()) => {
                info!(
                    "event=publisher_delete module=catalog status=ok publisher_id={publisher_id}"
                );
                Ok(())
            }
            Err(err) => {
                let err = LibraryError::from(err);
                log_failure("publisher_delete", "catalog", &err);
                Err(err)
            }
        }
    }
}
