//! Password hashing primitive.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(String),
}

/// `hash(secret) -> digest`, `verify(secret, digest) -> bool`.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, secret: &str) -> Result<String, PasswordError>;

    /// Never fails: a malformed stored digest verifies as `false`.
    fn verify(&self, secret: &str, digest: &str) -> bool;
}

/// bcrypt-backed hasher.
#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Lower costs are only sensible in tests.
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, secret: &str) -> Result<String, PasswordError> {
        bcrypt::hash(secret, self.cost).map_err(|e| PasswordError::Hash(e.to_string()))
    }

    fn verify(&self, secret: &str, digest: &str) -> bool {
        match bcrypt::verify(secret, digest) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::debug!(error = %e, "password verification error coerced to mismatch");
                false
            }
        }
    }
}
