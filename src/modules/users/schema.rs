//! GraphQL schema for the account operations

use async_graphql::http::GraphiQLSource;
use async_graphql::{Context, EmptySubscription, ErrorExtensions, Object, Schema, ID};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    response::{Html, IntoResponse},
};
use bookshelf_http::{AppError, AuthContext};
use bookshelf_kernel::settings::GraphqlSettings;

use super::error::UserError;
use super::models::{AuthPayload, NewUser, UserProfile};
use super::service::AccountService;
use crate::modules::books::BookInput;

pub const GRAPHQL_PATH: &str = "/graphql";

pub type BookshelfSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(service: AccountService, settings: &GraphqlSettings) -> BookshelfSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(service)
        .limit_depth(settings.depth_limit)
        .finish()
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The signed-in user with their saved books
    async fn me(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<UserProfile>> {
        let service = ctx.data::<AccountService>()?;
        service.me(&auth_context(ctx)).await.map_err(to_graphql)
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn login(
        &self,
        ctx: &Context<'_>,
        email: String,
        password: String,
    ) -> async_graphql::Result<AuthPayload> {
        let service = ctx.data::<AccountService>()?;
        service.login(&email, password).await.map_err(to_graphql)
    }

    /// Register and sign in
    async fn add_user(
        &self,
        ctx: &Context<'_>,
        username: String,
        email: String,
        password: String,
    ) -> async_graphql::Result<AuthPayload> {
        let service = ctx.data::<AccountService>()?;
        service
            .add_user(NewUser {
                username,
                email,
                password,
            })
            .await
            .map_err(to_graphql)
    }

    async fn save_book(
        &self,
        ctx: &Context<'_>,
        book_to_save: BookInput,
    ) -> async_graphql::Result<Option<UserProfile>> {
        let service = ctx.data::<AccountService>()?;
        service
            .save_book(&auth_context(ctx), book_to_save)
            .await
            .map_err(to_graphql)
    }

    async fn remove_book(
        &self,
        ctx: &Context<'_>,
        book_id: ID,
    ) -> async_graphql::Result<Option<UserProfile>> {
        let service = ctx.data::<AccountService>()?;
        service
            .remove_book(&auth_context(ctx), book_id.as_str())
            .await
            .map_err(to_graphql)
    }
}

fn auth_context(ctx: &Context<'_>) -> AuthContext {
    ctx.data_opt::<AuthContext>().cloned().unwrap_or_default()
}

fn to_graphql(error: UserError) -> async_graphql::Error {
    AppError::from(error).extend()
}

pub async fn graphql_handler(
    State(schema): State<BookshelfSchema>,
    auth: AuthContext,
    request: GraphQLRequest,
) -> GraphQLResponse {
    schema.execute(request.into_inner().data(auth)).await.into()
}

pub async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint(GRAPHQL_PATH).finish())
}
