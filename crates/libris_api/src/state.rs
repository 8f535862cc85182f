//! Shared request state and the blocking-work bridge.

use crate::error::{ApiError, ApiResult};
use chrono::NaiveDate;
use libris_core::{DbPool, LibraryError, LibraryResult, PasswordHasher};
use rusqlite::Connection;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pool: DbPool,
    hasher: Arc<dyn PasswordHasher>,
    fixed_today: Option<NaiveDate>,
}

impl AppState {
    pub fn new(pool: DbPool, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            pool,
            hasher,
            fixed_today: None,
        }
    }

    /// Pins the date used for status derivation.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.fixed_today = Some(today);
        self
    }

    /// Current local date unless pinned.
    pub fn today(&self) -> NaiveDate {
        self.fixed_today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Runs store work on the blocking pool with one pooled connection.
    pub async fn run<T, F>(&self, op: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection, &dyn PasswordHasher) -> LibraryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        let hasher = Arc::clone(&self.hasher);

        let joined = tokio::task::spawn_blocking(move || -> LibraryResult<T> {
            let conn = pool
                .get()
                .map_err(|err| LibraryError::Unexpected(format!("connection pool: {err}")))?;
            op(&conn, hasher.as_ref())
        })
        .await;

        match joined {
            Ok(result) => result.map_err(ApiError::from),
            Err(err) => {
                Err(LibraryError::Unexpected(format!("blocking task failed: {err}")).into())
            }
        }
    }
}
