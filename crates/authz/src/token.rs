//! Signed identity tokens
//!
//! HS256 JWTs carrying the user's public identity under a `data` claim plus
//! `iat`/`exp`. Tokens are stateless: nothing is stored server side and each
//! request verifies its token from scratch.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Public identity of a user as embedded in a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    pub id: String,
    pub username: String,
    pub email: String,
}

/// Full token payload
#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    data: UserClaims,
    iat: i64,
    exp: i64,
}

/// Issues and verifies tokens with a process-wide signing secret
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact: a token is dead the second after `exp`.
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Lifetime of freshly issued tokens
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign `claims` into a token expiring `ttl` from now.
    pub fn issue(&self, claims: &UserClaims) -> Result<String, AuthError> {
        let now = Utc::now();
        let payload = TokenClaims {
            data: claims.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &payload, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Check signature and expiry, returning the embedded claims unchanged.
    pub fn verify(&self, token: &str) -> Result<UserClaims, AuthError> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.data)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                other => {
                    tracing::debug!(reason = ?other, "token rejected");
                    AuthError::InvalidToken
                }
            })
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
