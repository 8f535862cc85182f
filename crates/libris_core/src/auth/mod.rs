//! Password hashing capability.
//!
//! # Responsibility
//! - Define the `PasswordHasher` seam used by the staff service.
//! - Provide the default salted PBKDF2-HMAC-SHA256 implementation.
//!
//! # Invariants
//! - Stored hashes are self-describing: `pbkdf2-sha256$<rounds>$<salt>$<digest>`.
//!   Verification reads the cost from the stored value, so changing the
//!   configured rounds never invalidates existing credentials.
//! - Verification compares digests in constant time.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod pbkdf2_hasher;

pub use pbkdf2_hasher::{Pbkdf2Hasher, DEFAULT_ROUNDS, MIN_ROUNDS};

/// Errors raised while hashing or reading stored hashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    /// The configured cost is below the accepted floor.
    WeakCost { rounds: u32, min_rounds: u32 },
    /// A stored hash could not be parsed.
    MalformedHash(&'static str),
}

impl Display for HashError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WeakCost { rounds, min_rounds } => {
                write!(f, "hash cost {rounds} is below the minimum {min_rounds}")
            }
            Self::MalformedHash(reason) => write!(f, "malformed password hash: {reason}"),
        }
    }
}

impl Error for HashError {}

/// One-way password hashing capability.
pub trait PasswordHasher: Send + Sync {
    /// Hashes `password` with a fresh random salt.
    fn hash(&self, password: &str) -> Result<String, HashError>;
    /// Checks `password` against a value produced by `hash`.
    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, HashError>;
}
