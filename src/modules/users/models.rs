use async_graphql::{SimpleObject, ID};
use bookshelf_authz::UserClaims;
use bookshelf_db::UserDocument;

use crate::modules::books::SavedBook;
use crate::modules::users::error::UserError;

/// Public view of a user. Never carries the password hash or the document
/// version.
#[derive(Debug, Clone, PartialEq, Eq, SimpleObject)]
#[graphql(name = "User")]
pub struct UserProfile {
    #[graphql(name = "_id")]
    pub id: ID,
    pub username: String,
    pub email: String,
    /// Number of saved books, reported even when the list itself is not loaded
    pub book_count: usize,
    pub saved_books: Vec<SavedBook>,
}

impl UserProfile {
    pub fn from_document(document: UserDocument, options: FindOptions) -> Self {
        let book_count = document.saved_books.len();
        let saved_books = if options.populate_saved_books {
            document.saved_books.into_iter().map(SavedBook::from).collect()
        } else {
            Vec::new()
        };

        Self {
            id: ID(document.id),
            username: document.username,
            email: document.email,
            book_count,
            saved_books,
        }
    }

    /// Identity claims embedded in this user's tokens
    pub fn claims(&self) -> UserClaims {
        UserClaims {
            id: self.id.0.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// A stored account, password hash included. Only the login path sees this.
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub profile: UserProfile,
    pub(crate) password_hash: String,
}

/// Result of a successful login or registration.
#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Auth")]
pub struct AuthPayload {
    pub token: String,
    pub user: UserProfile,
}

/// Query options for user lookups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    /// Load the saved-books list instead of only its count
    pub populate_saved_books: bool,
}

impl FindOptions {
    pub fn populated() -> Self {
        Self {
            populate_saved_books: true,
        }
    }
}

/// Registration fields as submitted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    /// Trim and lowercase what needs it, then reject obviously bad input.
    pub fn normalized(self) -> Result<Self, UserError> {
        let username = self.username.trim().to_string();
        let email = normalize_email(&self.email);

        if username.is_empty() {
            return Err(UserError::invalid("username", "username is required"));
        }
        if !looks_like_email(&email) {
            return Err(UserError::invalid("email", "must use a valid email address"));
        }
        if self.password.is_empty() {
            return Err(UserError::invalid("password", "password is required"));
        }

        Ok(Self {
            username,
            email,
            password: self.password,
        })
    }
}

/// Emails are compared case-insensitively.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// `something@something.something`, no whitespace.
fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.rsplit_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}
