//! In-memory user store
//!
//! DashMap-backed; safe to share across request tasks. Array updates run
//! while the document's shard lock is held, which makes each update atomic.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use uuid::Uuid;

use crate::models::{BookDocument, NewUserDocument, UserDocument};
use crate::{StoreError, UserStore};

#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<DashMap<String, UserDocument>>,
    /// Unique index: email -> user id
    emails: Arc<DashMap<String, String>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: NewUserDocument) -> Result<UserDocument, StoreError> {
        match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateKey {
                field: "email",
                value: user.email,
            }),
            Entry::Vacant(slot) => {
                let document = UserDocument {
                    id: Uuid::now_v7().to_string(),
                    username: user.username,
                    email: user.email,
                    password_hash: user.password_hash,
                    version: 0,
                    saved_books: Vec::new(),
                };
                self.users.insert(document.id.clone(), document.clone());
                slot.insert(document.id.clone());

                tracing::debug!(user_id = %document.id, "user document inserted");
                Ok(document)
            }
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UserDocument>, StoreError> {
        Ok(self.users.get(id).map(|doc| doc.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserDocument>, StoreError> {
        // Release the index guard before touching the documents map.
        let id = match self.emails.get(email) {
            Some(id) => id.clone(),
            None => return Ok(None),
        };
        self.find_by_id(&id).await
    }

    async fn add_to_set(
        &self,
        user_id: &str,
        book: BookDocument,
    ) -> Result<Option<UserDocument>, StoreError> {
        let Some(mut document) = self.users.get_mut(user_id) else {
            return Ok(None);
        };

        if document
            .saved_books
            .iter()
            .all(|saved| saved.book_id != book.book_id)
        {
            document.saved_books.push(book);
            document.version += 1;
        }

        Ok(Some(document.clone()))
    }

    async fn pull(
        &self,
        user_id: &str,
        book_id: &str,
    ) -> Result<Option<UserDocument>, StoreError> {
        let Some(mut document) = self.users.get_mut(user_id) else {
            return Ok(None);
        };

        let before = document.saved_books.len();
        document.saved_books.retain(|saved| saved.book_id != book_id);
        if document.saved_books.len() != before {
            document.version += 1;
        }

        Ok(Some(document.clone()))
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.users.len())
    }
}
