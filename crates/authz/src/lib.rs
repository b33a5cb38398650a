//! Credential hashing and signed identity tokens.
//!
//! Both services are plain values built once at startup from configuration
//! and shared by reference; neither keeps any per-request state.

pub mod error;
pub mod password;
pub mod token;

pub use error::AuthError;
pub use password::CredentialHasher;
pub use token::{TokenService, UserClaims};
