use serde::{Deserialize, Serialize};

/// A book embedded in a user document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDocument {
    /// Identifier from the external book search API
    pub book_id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub description: Option<String>,
    /// Cover image link
    pub image: Option<String>,
    /// Info page link
    pub link: Option<String>,
}

/// A stored user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDocument {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    /// Bumped on every write to the document
    pub version: u64,
    pub saved_books: Vec<BookDocument>,
}

/// Fields supplied when inserting a user; the store assigns id and version.
#[derive(Debug, Clone)]
pub struct NewUserDocument {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}
