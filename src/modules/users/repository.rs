//! User repository
//!
//! Wraps the document store with the account rules: passwords are hashed
//! before the first write, emails are normalized, lookups never expose the
//! hash, and saved-book updates go through the store's atomic set-add/pull.

use std::sync::Arc;

use bookshelf_authz::CredentialHasher;
use bookshelf_db::{BookDocument, NewUserDocument, StoreError, UserStore};

use super::error::UserError;
use super::models::{normalize_email, FindOptions, NewUser, UserAccount, UserProfile};
use crate::modules::books::SavedBook;

#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn UserStore>,
    hasher: CredentialHasher,
}

impl UserRepository {
    pub fn new(store: Arc<dyn UserStore>, hasher: CredentialHasher) -> Self {
        Self { store, hasher }
    }

    pub async fn find_by_id(
        &self,
        id: &str,
        options: FindOptions,
    ) -> Result<Option<UserProfile>, UserError> {
        let document = self.store.find_by_id(id).await?;
        Ok(document.map(|doc| UserProfile::from_document(doc, options)))
    }

    /// Look up an account for login. The result carries the password hash.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, UserError> {
        let document = self.store.find_by_email(&normalize_email(email)).await?;
        Ok(document.map(|doc| {
            let password_hash = doc.password_hash.clone();
            UserAccount {
                profile: UserProfile::from_document(doc, FindOptions::populated()),
                password_hash,
            }
        }))
    }

    /// Validate, hash the password and insert.
    pub async fn create(&self, new_user: NewUser) -> Result<UserProfile, UserError> {
        let new_user = new_user.normalized()?;

        let hasher = self.hasher;
        let password = new_user.password;
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;

        let document = self
            .store
            .insert(NewUserDocument {
                username: new_user.username,
                email: new_user.email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                StoreError::DuplicateKey { field: "email", .. } => UserError::DuplicateEmail,
                other => UserError::Store(other),
            })?;

        tracing::info!(user_id = %document.id, "user created");
        Ok(UserProfile::from_document(document, FindOptions::populated()))
    }

    /// Check a login attempt against the stored hash.
    pub async fn verify_password(
        &self,
        account: &UserAccount,
        plaintext: String,
    ) -> Result<bool, UserError> {
        let hasher = self.hasher;
        let hash = account.password_hash.clone();
        Ok(tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &hash)).await?)
    }

    /// Add `book` unless the user already saved one with the same id.
    pub async fn add_saved_book(
        &self,
        user_id: &str,
        book: SavedBook,
    ) -> Result<Option<UserProfile>, UserError> {
        let book_id = book.book_id.clone();
        let document = self
            .store
            .add_to_set(user_id, BookDocument::from(book))
            .await?;

        if document.is_some() {
            tracing::debug!(user_id, book_id = %book_id, "book saved");
        }
        Ok(document.map(|doc| UserProfile::from_document(doc, FindOptions::populated())))
    }

    /// Remove every saved entry with `book_id`; absent ids are a no-op.
    pub async fn remove_saved_book(
        &self,
        user_id: &str,
        book_id: &str,
    ) -> Result<Option<UserProfile>, UserError> {
        let document = self.store.pull(user_id, book_id).await?;

        if document.is_some() {
            tracing::debug!(user_id, book_id, "book removed");
        }
        Ok(document.map(|doc| UserProfile::from_document(doc, FindOptions::populated())))
    }

    pub async fn count(&self) -> Result<usize, UserError> {
        Ok(self.store.count().await?)
    }
}
