use bookshelf_authz::AuthError;
use bookshelf_db::StoreError;
use bookshelf_http::AppError;
use thiserror::Error;

/// Failures of the account operations
#[derive(Debug, Error)]
pub enum UserError {
    #[error("not authenticated")]
    NotAuthenticated,

    /// Same as `NotAuthenticated`, raised by the saved-book mutations
    #[error("login required")]
    LoginRequired,

    /// Unknown email or wrong password; deliberately indistinguishable
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("email already registered")]
    DuplicateEmail,

    #[error("invalid {field}: {message}")]
    InvalidInput { field: &'static str, message: String },

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("password hashing task failed: {0}")]
    Hashing(#[from] tokio::task::JoinError),
}

impl UserError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            message: message.into(),
        }
    }
}

impl From<UserError> for AppError {
    fn from(error: UserError) -> Self {
        match error {
            UserError::NotAuthenticated => AppError::not_authenticated(),
            UserError::LoginRequired => AppError::login_required(),
            UserError::InvalidCredentials => AppError::invalid_credentials(),
            UserError::DuplicateEmail => AppError::duplicate_email(),
            UserError::InvalidInput { field, message } => AppError::invalid_field(field, message),
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}
