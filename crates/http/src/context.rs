//! Per-request authentication context
//!
//! Every request gets an [`AuthContext`]. A missing, expired or forged token
//! never fails the request here; it simply leaves the context anonymous and
//! the operations that need a user reject it themselves.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use bookshelf_authz::{AuthError, TokenService, UserClaims};

const BEARER_SCHEME: &str = "bearer";

/// The caller's identity, if the request carried a valid token
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    pub user: Option<UserClaims>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user: UserClaims) -> Self {
        Self { user: Some(user) }
    }

    /// Resolve the context from request headers.
    pub fn from_headers(headers: &HeaderMap, tokens: &TokenService) -> Self {
        let Some(token) = bearer_token(headers) else {
            return Self::anonymous();
        };

        match tokens.verify(token) {
            Ok(user) => {
                tracing::debug!(user_id = %user.id, "request authenticated");
                Self::authenticated(user)
            }
            Err(AuthError::Expired) => {
                tracing::debug!("expired token, continuing unauthenticated");
                Self::anonymous()
            }
            Err(e) => {
                tracing::debug!(error = %e, "rejected token, continuing unauthenticated");
                Self::anonymous()
            }
        }
    }
}

/// Extract the token from the `authorization` header, with or without a
/// `Bearer ` prefix. Blank values count as absent.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();

    let token = match value.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case(BEARER_SCHEME) => rest.trim(),
        None if value.eq_ignore_ascii_case(BEARER_SCHEME) => "",
        _ => value,
    };

    (!token.is_empty()).then_some(token)
}

/// Middleware that attaches an [`AuthContext`] to every request
pub async fn auth_context_middleware(
    State(tokens): State<TokenService>,
    mut request: Request,
    next: Next,
) -> Response {
    let context = AuthContext::from_headers(request.headers(), &tokens);
    request.extensions_mut().insert(context);
    next.run(request).await
}

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .unwrap_or_default())
    }
}
