//! Password hashing
//!
//! bcrypt with a per-hash random salt; the cost factor comes from settings.

use crate::error::AuthError;

/// Hashes plaintext passwords and checks candidates against stored hashes.
#[derive(Debug, Clone, Copy)]
pub struct CredentialHasher {
    cost: u32,
}

impl CredentialHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Produce a salted one-way hash of `plaintext`.
    pub fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        bcrypt::hash(plaintext, self.cost).map_err(|e| AuthError::Hash(e.to_string()))
    }

    /// Check `plaintext` against a stored hash.
    ///
    /// A hash that cannot be parsed never matches.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        match bcrypt::verify(plaintext, hash) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(error = %e, "stored password hash could not be parsed");
                false
            }
        }
    }
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new(10)
    }
}
