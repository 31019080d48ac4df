//! Password hashing
//!
//! bcrypt with a per-hash random salt. Verification is delegated to
//! `bcrypt::verify`, which compares digests in constant time.

/// Cost factor used when none is configured
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Lowest cost bcrypt accepts
pub const MIN_BCRYPT_COST: u32 = 4;

/// Highest cost bcrypt accepts
pub const MAX_BCRYPT_COST: u32 = 31;

/// Password hashing errors
///
/// The wrapped message comes from bcrypt and never contains the password or hash.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Stored password hash is malformed")]
    MalformedHash,
}

/// One-way salted password hasher
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_BCRYPT_COST)
    }
}

impl PasswordHasher {
    /// Create a hasher with the given cost, clamped to the range bcrypt accepts
    pub fn new(cost: u32) -> Self {
        Self {
            cost: cost.clamp(MIN_BCRYPT_COST, MAX_BCRYPT_COST),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password. Fails only if the salt source or bcrypt itself fails.
    pub fn hash(&self, password: &str) -> Result<String, HashError> {
        bcrypt::hash(password, self.cost).map_err(|e| HashError::Hashing(e.to_string()))
    }

    /// Check a password against a stored digest
    pub fn verify(&self, password: &str, digest: &str) -> Result<bool, HashError> {
        bcrypt::verify(password, digest).map_err(|e| match e {
            bcrypt::BcryptError::InvalidHash(_) | bcrypt::BcryptError::InvalidPrefix(_) => {
                HashError::MalformedHash
            }
            other => HashError::Hashing(other.to_string()),
        })
    }

    /// [`hash`](Self::hash) on the blocking thread pool
    pub async fn hash_blocking(&self, password: String) -> Result<String, HashError> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| HashError::Hashing(e.to_string()))?
    }

    /// [`verify`](Self::verify) on the blocking thread pool
    pub async fn verify_blocking(&self, password: String, digest: String) -> Result<bool, HashError> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .map_err(|e| HashError::Hashing(e.to_string()))?
    }
}
