//! Error handling for the bookshelf HTTP layer
//!
//! `AppError` renders the same way whether it leaves through a plain HTTP
//! response or as a GraphQL error entry.

use async_graphql::ErrorExtensions;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

const HIDDEN_INTERNAL_MESSAGE: &str = "An internal server error occurred";

/// Application error types that map to HTTP responses and GraphQL errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {message}")]
    Validation {
        details: Vec<serde_json::Value>,
        code: String,
        message: String,
    },

    #[error("conflict: {message}")]
    Conflict {
        details: Vec<serde_json::Value>,
        code: String,
        message: String,
    },

    #[error("not found: {message}")]
    NotFound { message: String, code: String },

    #[error("unauthorized: {message}")]
    Unauthorized { message: String, code: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a validation error
    pub fn validation(details: Vec<serde_json::Value>, message: impl Into<String>) -> Self {
        Self::Validation {
            details,
            code: "validation_error".to_string(),
            message: message.into(),
        }
    }

    /// Create a validation error for a single offending field
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::validation(vec![json!({"field": field, "error": message})], message)
    }

    /// An account with the requested email already exists
    pub fn duplicate_email() -> Self {
        Self::Conflict {
            details: vec![json!({"field": "email", "error": "already registered"})],
            code: "duplicate_email".to_string(),
            message: "An account with this email already exists".to_string(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            code: "not_found".to_string(),
        }
    }

    /// The operation needs a valid token and the request had none
    pub fn not_authenticated() -> Self {
        Self::Unauthorized {
            message: "Not logged in".to_string(),
            code: "not_authenticated".to_string(),
        }
    }

    /// A mutation that changes the caller's data was made without a valid
    /// token
    pub fn login_required() -> Self {
        Self::Unauthorized {
            message: "You need to be logged in!".to_string(),
            code: "not_authenticated".to_string(),
        }
    }

    /// Login failed. The message is the same whether the email or the
    /// password was wrong.
    pub fn invalid_credentials() -> Self {
        Self::Unauthorized {
            message: "Incorrect credentials. Try again".to_string(),
            code: "invalid_credentials".to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &str {
        match self {
            AppError::Validation { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Unauthorized { code, .. } => code,
            AppError::Internal(_) => "internal_error",
        }
    }

    /// Message safe to show to a client. Internal details are hidden in
    /// release builds.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Validation { message, .. }
            | AppError::Conflict { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Unauthorized { message, .. } => message.clone(),
            AppError::Internal(e) => {
                if cfg!(debug_assertions) {
                    e.to_string()
                } else {
                    HIDDEN_INTERNAL_MESSAGE.to_string()
                }
            }
        }
    }

    pub fn details(&self) -> &[serde_json::Value] {
        match self {
            AppError::Validation { details, .. } | AppError::Conflict { details, .. } => details,
            _ => &[],
        }
    }

    fn record(&self, error_id: &Uuid) {
        if self.status().is_server_error() {
            tracing::error!(
                error_id = %error_id,
                error_code = %self.code(),
                status_code = %self.status().as_u16(),
                error = %self,
                "Request error"
            );
        } else {
            tracing::warn!(
                error_id = %error_id,
                error_code = %self.code(),
                status_code = %self.status().as_u16(),
                "Request error"
            );
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let timestamp = OffsetDateTime::now_utc().to_string();
        self.record(&error_id);

        let error_response = json!({
            "error": {
                "code": self.code(),
                "message": self.public_message(),
                "details": self.details(),
                "trace_id": error_id.to_string(),
                "timestamp": timestamp
            }
        });

        (self.status(), Json(error_response)).into_response()
    }
}

impl ErrorExtensions for AppError {
    fn extend(&self) -> async_graphql::Error {
        let error_id = Uuid::new_v4();
        let timestamp = OffsetDateTime::now_utc().to_string();
        self.record(&error_id);

        async_graphql::Error::new(self.public_message()).extend_with(|_, extensions| {
            extensions.set("code", self.code().to_string());
            extensions.set("trace_id", error_id.to_string());
            extensions.set("timestamp", timestamp);
            if !self.details().is_empty() {
                let details = serde_json::Value::Array(self.details().to_vec());
                if let Ok(details) = async_graphql::Value::from_json(details) {
                    extensions.set("details", details);
                }
            }
        })
    }
}
