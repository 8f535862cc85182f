use super::{HashError, PasswordHasher};
use rand::RngCore;
use sha2::Sha256;

pub const DEFAULT_ROUNDS: u32 = 100_000;
pub const MIN_ROUNDS: u32 = 1_000;

const SCHEME: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
const DIGEST_LEN: usize = 32;

/// PBKDF2-HMAC-SHA256 hasher with a cost fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pbkdf2Hasher {
    rounds: u32,
}

impl Pbkdf2Hasher {
    pub fn new(rounds: u32) -> Result<Self, HashError> {
        if rounds < MIN_ROUNDS {
            return Err(HashError::WeakCost {
                rounds,
                min_rounds: MIN_ROUNDS,
            });
        }
        Ok(Self { rounds })
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }
}

impl Default for Pbkdf2Hasher {
    fn default() -> Self {
        Self {
            rounds: DEFAULT_ROUNDS,
        }
    }
}

impl PasswordHasher for Pbkdf2Hasher {
    fn hash(&self, password: &str) -> Result<String, HashError> {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let digest = derive(password, &salt, self.rounds);
        Ok(format!(
            "{SCHEME}${}${}${}",
            self.rounds,
            hex::encode(salt),
            hex::encode(digest)
        ))
    }

    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, HashError> {
        let parsed = ParsedHash::parse(stored_hash)?;
        let candidate = derive(password, &parsed.salt, parsed.rounds);
        Ok(constant_time_eq(&candidate, &parsed.digest))
    }
}

struct ParsedHash {
    rounds: u32,
    salt: Vec<u8>,
    digest: Vec<u8>,
}

impl ParsedHash {
    fn parse(value: &str) -> Result<Self, HashError> {
        let mut parts = value.split('$');
        if parts.next() != Some(SCHEME) {
            return Err(HashError::MalformedHash("unknown scheme"));
        }
        let rounds = parts
            .next()
            .and_then(|raw| raw.parse::<u32>().ok())
            .filter(|rounds| *rounds > 0)
            .ok_or(HashError::MalformedHash("invalid rounds"))?;
        let salt = parts
            .next()
            .and_then(|raw| hex::decode(raw).ok())
            .filter(|salt| !salt.is_empty())
            .ok_or(HashError::MalformedHash("invalid salt"))?;
        let digest = parts
            .next()
            .and_then(|raw| hex::decode(raw).ok())
            .filter(|digest| digest.len() == DIGEST_LEN)
            .ok_or(HashError::MalformedHash("invalid digest"))?;
        if parts.next().is_some() {
            return Err(HashError::MalformedHash("trailing fields"));
        }

        Ok(Self {
            rounds,
            salt,
            digest,
        })
    }
}

fn derive(password: &str, salt: &[u8], rounds: u32) -> [u8; DIGEST_LEN] {
    let mut digest = [0u8; DIGEST_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, rounds, &mut digest);
    digest
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
