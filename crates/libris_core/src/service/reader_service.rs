//! Reader registration and maintenance.

use super::error::with_constraint_messages;
use super::{log_failure, LibraryError, LibraryResult};
use crate::model::reader::{NewReader, Reader, ReaderPatch, ReaderWithPhones};
use crate::repo::reader_repo::ReaderRepository;
use log::info;

const EMAIL_DUPLICATE: &str = "email already exists";

pub struct ReaderService<R: ReaderRepository> {
    repo: R,
}

impl<R: ReaderRepository> ReaderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list_readers(&self) -> LibraryResult<Vec<Reader>> {
        Ok(self.repo.list_readers()?)
    }

    pub fn list_readers_with_phones(&self) -> LibraryResult<Vec<ReaderWithPhones>> {
        Ok(self.repo.list_readers_with_phones()?)
    }

    pub fn get_reader(&self, user_id: i64) -> LibraryResult<ReaderWithPhones> {
        self.repo
            .get_reader(user_id)?
            .ok_or_else(|| LibraryError::NotFound("reader not found".to_string()))
    }

    /// Registers a reader with one phone and the assisting staff link.
    ///
    /// Returns the new reader id. Nothing is written when any step fails.
    pub fn register_reader(&self, input: &NewReader) -> LibraryResult<i64> {
        let registered = self
            .repo
            .register_reader(input)
            .map_err(|err| with_constraint_messages(err, EMAIL_DUPLICATE, "invalid staff_id"));
        match registered {
            Ok(user_id) => {
                info!(
                    "event=reader_register module=readers status=ok user_id={user_id} staff_id={}",
                    input.staff_id
                );
                Ok(user_id)
            }
            Err(err) => {
                log_failure("reader_register", "readers", &err);
                Err(err)
            }
        }
    }

    pub fn update_reader(&self, user_id: i64, patch: &ReaderPatch) -> LibraryResult<Reader> {
        self.repo
            .update_reader(user_id, patch)
            .map_err(|err| {
                let err = with_constraint_messages(err, EMAIL_DUPLICATE, "invalid reference");
                log_failure("reader_update", "readers", &err);
                err
            })
    }

    /// Deletes a reader and their history; refused while a borrowing is open.
    pub fn delete_reader(&self, user_id: i64) -> LibraryResult<()> {
        match self.repo.delete_reader(user_id) {
            Ok(()) => {
                info!("event=reader_delete module=readers status=ok user_id={user_id}");
                Ok(())
            }
            Err(err) => {
                let err = LibraryError::from(err);
                log_failure("reader_delete", "readers", &err);
                Err(err)
            }
        }
    }
}
