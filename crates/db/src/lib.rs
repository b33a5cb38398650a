//! Document store boundary for user accounts.
//!
//! The rest of the workspace only sees [`UserStore`]; the in-memory
//! implementation backs the server and the test suites.

pub mod memory;
pub mod models;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryUserStore;
pub use models::{BookDocument, NewUserDocument, UserDocument};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("duplicate value for unique field '{field}': {value}")]
    DuplicateKey { field: &'static str, value: String },
}

/// Id and email addressable store of user documents.
///
/// Array updates are atomic per document: concurrent `add_to_set` calls for
/// the same user never lose an entry.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new document, failing on a duplicate email.
    async fn insert(&self, user: NewUserDocument) -> Result<UserDocument, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<UserDocument>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserDocument>, StoreError>;

    /// Append `book` to the user's saved books unless an entry with the same
    /// `book_id` is already there. `None` when the user does not exist.
    async fn add_to_set(
        &self,
        user_id: &str,
        book: BookDocument,
    ) -> Result<Option<UserDocument>, StoreError>;

    /// Remove every saved book with `book_id`. `None` when the user does not
    /// exist.
    async fn pull(&self, user_id: &str, book_id: &str)
        -> Result<Option<UserDocument>, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;
}
