//! Errors raised while hashing credentials or handling tokens

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Signature mismatch, wrong algorithm or a structurally broken token
    #[error("invalid token")]
    InvalidToken,

    #[error("token expired")]
    Expired,

    #[error("failed to hash password: {0}")]
    Hash(String),

    #[error("failed to sign token: {0}")]
    Signing(String),
}
