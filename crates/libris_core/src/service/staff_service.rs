//! Staff accounts and credential checks.
//!
//! # Invariants
//! - Plain-text passwords are never persisted or logged.
//! - `authenticate` reports unknown login and wrong password identically.

use super::error::with_constraint_messages;
use super::{log_failure, LibraryError, LibraryResult};
use crate::auth::PasswordHasher;
use crate::model::staff::{validate_password, NewStaff, Staff};
use crate::repo::staff_repo::StaffRepository;
use log::{info, warn};

const LOGIN_DUPLICATE: &str = "login id already exists";

/// Staff service with an injected password hasher.
pub struct StaffService<'h, R: StaffRepository> {
    repo: R,
    hasher: &'h dyn PasswordHasher,
}

impl<'h, R: StaffRepository> StaffService<'h, R> {
    pub fn new(repo: R, hasher: &'h dyn PasswordHasher) -> Self {
        Self { repo, hasher }
    }

    pub fn list_staff(&self) -> LibraryResult<Vec<Staff>> {
        Ok(self.repo.list_staff()?)
    }

    /// Creates a staff profile and its credential.
    ///
    /// The password is validated before hashing, so a short password never
    /// reaches the store.
    pub fn create_staff_account(&self, input: &NewStaff) -> LibraryResult<Staff> {
        let created = input
            .validate()
            .map_err(LibraryError::from)
            .and_then(|()| Ok(self.hasher.hash(&input.password)?))
            .and_then(|hash| {
                self.repo
                    .create_staff(input.name.trim(), input.login_id.trim(), &hash)
                    .map_err(|err| {
                        with_constraint_messages(err, LOGIN_DUPLICATE, "invalid login_id")
                    })
            });
        match created {
            Ok(staff) => {
                info!(
                    "event=staff_create module=staff status=ok staff_id={}",
                    staff.staff_id
                );
                Ok(staff)
            }
            Err(err) => {
                log_failure("staff_create", "staff", &err);
                Err(err)
            }
        }
    }

    /// Verifies a login. Returns the staff profile, never the hash.
    pub fn authenticate(&self, login_id: &str, password: &str) -> LibraryResult<Staff> {
        let Some(credential) = self.repo.find_credential(login_id.trim())? else {
            // Spend comparable work so response time does not reveal the miss.
            let _ = self.hasher.hash(password);
            warn!("event=staff_login module=staff status=error error_code=invalid_credentials");
            return Err(LibraryError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &credential.password_hash)? {
            warn!("event=staff_login module=staff status=error error_code=invalid_credentials");
            return Err(LibraryError::InvalidCredentials);
        }

        info!(
            "event=staff_login module=staff status=ok staff_id={}",
            credential.staff.staff_id
        );
        Ok(credential.staff)
    }

    /// Replaces a password after checking the current one.
    pub fn change_password(
        &self,
        staff_id: i64,
        old_password: &str,
        new_password: &str,
    ) -> LibraryResult<()> {
        let result = self.try_change_password(staff_id, old_password, new_password);
        match &result {
            Ok(()) => {
                info!("event=staff_password_change module=staff status=ok staff_id={staff_id}")
            }
            Err(err) => log_failure("staff_password_change", "staff", err),
        }
        result
    }

    fn try_change_password(
        &self,
        staff_id: i64,
        old_password: &str,
        new_password: &str,
    ) -> LibraryResult<()> {
        let staff = self
            .repo
            .get_staff(staff_id)?
            .ok_or_else(|| LibraryError::NotFound("staff not found".to_string()))?;
        let credential = self
            .repo
            .find_credential(&staff.login_id)?
            .ok_or_else(|| LibraryError::NotFound("staff credential not found".to_string()))?;

        if !self.hasher.verify(old_password, &credential.password_hash)? {
            return Err(LibraryError::IncorrectPassword);
        }
        validate_password(new_password)?;

        let hash = self.hasher.hash(new_password)?;
        self.repo.update_password_hash(&staff.login_id, &hash)?;
        Ok(())
    }
}
