//! Core domain logic for Libris.
//! This crate is the single source of truth for circulation invariants.

pub mod auth;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use auth::{HashError, PasswordHasher, Pbkdf2Hasher};
pub use db::{open_db, open_db_in_memory, open_pool, DbError, DbPool, PooledConn};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::ValidationError;
pub use repo::{RepoError, RepoResult};
pub use service::{ErrorKind, LibraryError, LibraryResult};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
