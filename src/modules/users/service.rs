use std::sync::Arc;

use bookshelf_authz::{CredentialHasher, TokenService};
use bookshelf_db::UserStore;
use bookshelf_http::AuthContext;
use bookshelf_kernel::settings::AuthSettings;

use super::error::UserError;
use super::models::{AuthPayload, FindOptions, NewUser, UserProfile};
use super::repository::UserRepository;
use crate::modules::books::{BookInput, SavedBook};

/// Account operations behind the GraphQL resolvers
#[derive(Clone)]
pub struct AccountService {
    repository: UserRepository,
    tokens: TokenService,
}

impl AccountService {
    pub fn new(repository: UserRepository, tokens: TokenService) -> Self {
        Self { repository, tokens }
    }

    pub fn from_settings(settings: &AuthSettings, store: Arc<dyn UserStore>) -> Self {
        let tokens = TokenService::new(
            settings.jwt_secret.as_bytes(),
            chrono::Duration::seconds(settings.token_ttl_secs),
        );
        let repository = UserRepository::new(store, CredentialHasher::new(settings.bcrypt_cost));
        Self::new(repository, tokens)
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn repository(&self) -> &UserRepository {
        &self.repository
    }

    /// Profile of the caller. `None` when the token outlived its user.
    pub async fn me(&self, auth: &AuthContext) -> Result<Option<UserProfile>, UserError> {
        let user = auth.user.as_ref().ok_or(UserError::NotAuthenticated)?;
        self.repository
            .find_by_id(&user.id, FindOptions::populated())
            .await
    }

    pub async fn login(&self, email: &str, password: String) -> Result<AuthPayload, UserError> {
        let Some(account) = self.repository.find_by_email(email).await? else {
            tracing::debug!("login for unknown email");
            return Err(UserError::InvalidCredentials);
        };

        if !self.repository.verify_password(&account, password).await? {
            tracing::debug!(user_id = %account.profile.id.as_str(), "login with wrong password");
            return Err(UserError::InvalidCredentials);
        }

        self.authenticate(account.profile)
    }

    pub async fn add_user(&self, new_user: NewUser) -> Result<AuthPayload, UserError> {
        let user = self.repository.create(new_user).await?;
        self.authenticate(user)
    }

    pub async fn save_book(
        &self,
        auth: &AuthContext,
        book: BookInput,
    ) -> Result<Option<UserProfile>, UserError> {
        let user = auth.user.as_ref().ok_or(UserError::LoginRequired)?;

        let book = SavedBook::from(book);
        if book.book_id.is_empty() {
            return Err(UserError::invalid("bookId", "bookId is required"));
        }
        if book.title.is_empty() {
            return Err(UserError::invalid("title", "title is required"));
        }

        self.repository.add_saved_book(&user.id, book).await
    }

    pub async fn remove_book(
        &self,
        auth: &AuthContext,
        book_id: &str,
    ) -> Result<Option<UserProfile>, UserError> {
        let user = auth.user.as_ref().ok_or(UserError::LoginRequired)?;

        // Saved ids are trimmed on the way in; match them the same way.
        let book_id = book_id.trim();
        if book_id.is_empty() {
            return Err(UserError::invalid("bookId", "bookId is required"));
        }

        self.repository.remove_saved_book(&user.id, book_id).await
    }

    fn authenticate(&self, user: UserProfile) -> Result<AuthPayload, UserError> {
        let token = self.tokens.issue(&user.claims())?;
        Ok(AuthPayload { token, user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookshelf_db::MemoryUserStore;

    fn service() -> AccountService {
        let settings = AuthSettings {
            jwt_secret: "test-secret".to_string(),
            token_ttl_secs: 7200,
            bcrypt_cost: 4,
        };
        AccountService::from_settings(&settings, Arc::new(MemoryUserStore::new()))
    }

    fn registration() -> NewUser {
        NewUser {
            username: "a".to_string(),
            email: "a@x.com".to_string(),
            password: "p".to_string(),
        }
    }

    fn book_input() -> BookInput {
        BookInput {
            book_id: "123".to_string(),
            title: "T".to_string(),
            authors: vec!["A".to_string()],
            description: None,
            image: None,
            link: None,
        }
    }

    async fn signed_in(service: &AccountService) -> AuthContext {
        let auth = service.add_user(registration()).await.unwrap();
        AuthContext::authenticated(service.tokens().verify(&auth.token).unwrap())
    }

    #[tokio::test]
    async fn register_returns_token_and_empty_profile() {
        let service = service();
        let auth = service.add_user(registration()).await.unwrap();

        assert_eq!(auth.user.username, "a");
        assert_eq!(auth.user.email, "a@x.com");
        assert!(auth.user.saved_books.is_empty());

        let claims = service.tokens().verify(&auth.token).unwrap();
        assert_eq!(claims, auth.user.claims());
    }

    #[tokio::test]
    async fn login_issues_token_for_correct_password() {
        let service = service();
        let registered = service.add_user(registration()).await.unwrap();

        let auth = service.login("a@x.com", "p".to_string()).await.unwrap();
        assert_eq!(auth.user.id, registered.user.id);
        assert_eq!(
            service.tokens().verify(&auth.token).unwrap().id,
            registered.user.id.as_str()
        );
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let service = service();
        service.add_user(registration()).await.unwrap();

        let wrong_password = service.login("a@x.com", "wrong".to_string()).await;
        let unknown_email = service.login("b@x.com", "p".to_string()).await;

        assert!(matches!(wrong_password, Err(UserError::InvalidCredentials)));
        assert!(matches!(unknown_email, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn duplicate_registration_fails() {
        let service = service();
        service.add_user(registration()).await.unwrap();

        let err = service.add_user(registration()).await.unwrap_err();
        assert!(matches!(err, UserError::DuplicateEmail));
    }

    #[tokio::test]
    async fn anonymous_callers_are_rejected() {
        let service = service();
        let anonymous = AuthContext::anonymous();

        assert!(matches!(
            service.me(&anonymous).await,
            Err(UserError::NotAuthenticated)
        ));
        assert!(matches!(
            service.save_book(&anonymous, book_input()).await,
            Err(UserError::LoginRequired)
        ));
        assert!(matches!(
            service.remove_book(&anonymous, "123").await,
            Err(UserError::LoginRequired)
        ));
    }

    #[tokio::test]
    async fn saving_the_same_book_twice_keeps_one() {
        let service = service();
        let auth = signed_in(&service).await;

        service.save_book(&auth, book_input()).await.unwrap();
        let user = service
            .save_book(&auth, book_input())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(user.saved_books.len(), 1);
        assert_eq!(user.saved_books[0].book_id, "123");

        let me = service.me(&auth).await.unwrap().unwrap();
        assert_eq!(me.book_count, 1);
    }

    #[tokio::test]
    async fn save_book_requires_id_and_title() {
        let service = service();
        let auth = signed_in(&service).await;

        let blank_id = BookInput {
            book_id: " ".to_string(),
            ..book_input()
        };
        let err = service.save_book(&auth, blank_id).await.unwrap_err();
        assert!(matches!(
            err,
            UserError::InvalidInput {
                field: "bookId",
                ..
            }
        ));

        let blank_title = BookInput {
            title: String::new(),
            ..book_input()
        };
        let err = service.save_book(&auth, blank_title).await.unwrap_err();
        assert!(matches!(err, UserError::InvalidInput { field: "title", .. }));
    }

    #[tokio::test]
    async fn removing_absent_book_is_a_no_op() {
        let service = service();
        let auth = signed_in(&service).await;
        service.save_book(&auth, book_input()).await.unwrap();

        let user = service
            .remove_book(&auth, "missing")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.saved_books.len(), 1);

        let user = service.remove_book(&auth, "123").await.unwrap().unwrap();
        assert!(user.saved_books.is_empty());
    }

    #[tokio::test]
    async fn padded_book_id_removes_what_it_saved() {
        let service = service();
        let auth = signed_in(&service).await;

        let padded = BookInput {
            book_id: " 123 ".to_string(),
            ..book_input()
        };
        let saved = service.save_book(&auth, padded).await.unwrap().unwrap();
        assert_eq!(saved.saved_books[0].book_id, "123");

        let user = service.remove_book(&auth, " 123 ").await.unwrap().unwrap();
        assert!(user.saved_books.is_empty());
    }

    #[tokio::test]
    async fn remove_book_requires_id() {
        let service = service();
        let auth = signed_in(&service).await;

        let err = service.remove_book(&auth, "  ").await.unwrap_err();
        assert!(matches!(
            err,
            UserError::InvalidInput {
                field: "bookId",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn valid_token_for_missing_user_yields_none() {
        let service = service();
        let ghost = AuthContext::authenticated(bookshelf_authz::UserClaims {
            id: "gone".to_string(),
            username: "ghost".to_string(),
            email: "ghost@x.com".to_string(),
        });

        assert!(service.me(&ghost).await.unwrap().is_none());
        assert!(service
            .save_book(&ghost, book_input())
            .await
            .unwrap()
            .is_none());
    }
}
