//! Users module: accounts, sign-in and the saved-books list, served over
//! GraphQL.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    routing::{get, post},
    Router,
};
use bookshelf_kernel::{settings::GraphqlSettings, InitCtx, Module};

pub mod error;
pub mod models;
pub mod repository;
pub mod schema;
pub mod service;

pub use error::UserError;
pub use models::{AuthPayload, FindOptions, NewUser, UserProfile};
pub use schema::{build_schema, BookshelfSchema, GRAPHQL_PATH};
pub use service::AccountService;

pub struct UsersModule {
    schema: BookshelfSchema,
    service: AccountService,
    playground: bool,
}

impl UsersModule {
    pub fn new(service: AccountService, schema: BookshelfSchema, playground: bool) -> Self {
        Self {
            schema,
            service,
            playground,
        }
    }
}

#[async_trait]
impl Module for UsersModule {
    fn name(&self) -> &'static str {
        "users"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            token_ttl_secs = ctx.settings.auth.token_ttl_secs,
            playground = self.playground,
            "users module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        let endpoint = if self.playground {
            get(schema::graphiql).post(schema::graphql_handler)
        } else {
            post(schema::graphql_handler)
        };

        Router::new()
            .route(GRAPHQL_PATH, endpoint)
            .with_state(self.schema.clone())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let users = self.service.repository().count().await?;
        tracing::info!(module = self.name(), users, "users module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "users module stopped");
        Ok(())
    }
}

/// Create the users module around an account service
pub fn create_module(service: AccountService, settings: &GraphqlSettings) -> Arc<dyn Module> {
    let schema = build_schema(service.clone(), settings);
    Arc::new(UsersModule::new(service, schema, settings.playground))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use bookshelf_db::MemoryUserStore;
    use bookshelf_kernel::settings::AuthSettings;
    use tower::ServiceExt;

    fn module(playground: bool) -> Arc<dyn Module> {
        let service =
            AccountService::from_settings(&AuthSettings::default(), Arc::new(MemoryUserStore::new()));
        create_module(
            service,
            &GraphqlSettings {
                playground,
                depth_limit: 10,
            },
        )
    }

    #[tokio::test]
    async fn playground_can_be_disabled() {
        let response = module(false)
            .routes()
            .oneshot(Request::get(GRAPHQL_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let response = module(true)
            .routes()
            .oneshot(Request::get(GRAPHQL_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn lifecycle_runs_on_empty_store() {
        let module = module(false);
        let settings = bookshelf_kernel::settings::Settings::default();
        let ctx = InitCtx {
            settings: &settings,
        };

        module.init(&ctx).await.unwrap();
        module.start(&ctx).await.unwrap();
        module.stop().await.unwrap();
        assert_eq!(module.name(), "users");
    }
}
