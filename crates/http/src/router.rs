//! Router builder for the bookshelf HTTP server
//!
//! Layers wrap only the routes that exist when they are added, so callers add
//! routes and fallbacks first and middleware last.

use std::path::Path;
use std::time::Duration;

use axum::{
    extract::Request,
    http::{HeaderValue, StatusCode, Uri},
    middleware, Router,
};
use bookshelf_authz::TokenService;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    services::{ServeDir, ServeFile},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use uuid::Uuid;

use crate::context::auth_context_middleware;
use crate::error::AppError;

/// Builder for constructing the main HTTP router
pub struct RouterBuilder {
    router: Router,
}

impl RouterBuilder {
    /// Create a new router builder
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    /// Add a route to the router
    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Merge a module's router; its paths are kept as the module declares them
    pub fn mount_module(mut self, module_name: &str, module_router: Router) -> Self {
        tracing::info!(module = module_name, "mounting module routes");
        self.router = self.router.merge(module_router);
        self
    }

    /// Serve a built client bundle for unmatched paths, falling back to its
    /// `index.html`; without a bundle unmatched paths get a JSON 404
    pub fn with_fallback(mut self, static_dir: Option<&Path>) -> Self {
        self.router = match static_dir {
            Some(dir) => {
                tracing::info!(dir = %dir.display(), "serving client bundle");
                let index = ServeFile::new(dir.join("index.html"));
                self.router.fallback_service(ServeDir::new(dir).fallback(index))
            }
            None => self.router.fallback(not_found),
        };
        self
    }

    /// Attach an `AuthContext` to every request
    pub fn with_auth_context(mut self, tokens: TokenService) -> Self {
        self.router = self
            .router
            .layer(middleware::from_fn_with_state(tokens, auth_context_middleware));
        self
    }

    /// Add tracing middleware
    pub fn with_tracing(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(false))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        );
        self
    }

    /// Add CORS middleware
    pub fn with_cors(mut self) -> Self {
        self.router = self.router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
        self
    }

    /// Add request ID middleware; the id is echoed back on the response
    pub fn with_request_id(mut self) -> Self {
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7));
        self
    }

    /// Answer `408 Request Timeout` for requests running past `timeout_ms`
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.router = self.router.layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_millis(timeout_ms),
        ));
        self
    }

    /// Build the final router
    pub fn build(self) -> Router {
        self.router
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn not_found(uri: Uri) -> AppError {
    AppError::not_found(format!("no route for {}", uri.path()))
}

/// Time-ordered request ids
#[derive(Clone, Copy)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let request_id = Uuid::now_v7()
            .to_string()
            .parse::<HeaderValue>()
            .ok()?;
        Some(RequestId::new(request_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AuthContext;
    use axum::{body::Body, routing::get};
    use bookshelf_authz::UserClaims;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn get_request(path: &str) -> axum::http::Request<Body> {
        axum::http::Request::get(path).body(Body::empty()).unwrap()
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn tokens() -> TokenService {
        TokenService::new(b"router-secret", chrono::Duration::hours(2))
    }

    async fn whoami(context: AuthContext) -> String {
        context
            .user
            .map(|user| user.username)
            .unwrap_or_else(|| "anonymous".to_string())
    }

    #[tokio::test]
    async fn test_router_builder_basic() {
        let router = RouterBuilder::new()
            .route("/test", get(|| async { "test" }))
            .build();

        let response = router
            .oneshot(get_request("/test"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "test");
    }

    #[tokio::test]
    async fn test_module_mounting() {
        let module_router = Router::new().route("/graphql", get(|| async { "module" }));

        let router = RouterBuilder::new()
            .mount_module("users", module_router)
            .build();

        let response = router
            .oneshot(get_request("/graphql"))
            .await
            .unwrap();
        assert_eq!(body_string(response).await, "module");
    }

    #[tokio::test]
    async fn test_unmatched_path_is_json_404() {
        let router = RouterBuilder::new().with_fallback(None).build();

        let response = router
            .oneshot(get_request("/nowhere"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn test_slow_request_times_out() {
        let router = RouterBuilder::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_millis(500)).await;
                    "late"
                }),
            )
            .with_timeout(20)
            .build();

        let response = router.oneshot(get_request("/slow")).await.unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn test_middleware_chain() {
        let tokens = tokens();
        let token = tokens
            .issue(&UserClaims {
                id: "u1".to_string(),
                username: "a".to_string(),
                email: "a@x.com".to_string(),
            })
            .unwrap();

        let router = RouterBuilder::new()
            .route("/whoami", get(whoami))
            .with_auth_context(tokens)
            .with_timeout(5000)
            .with_tracing()
            .with_request_id()
            .with_cors()
            .build();

        let response = router
            .clone()
            .oneshot(
                axum::http::Request::get("/whoami")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(body_string(response).await, "a");

        let response = router
            .oneshot(get_request("/whoami"))
            .await
            .unwrap();
        assert_eq!(body_string(response).await, "anonymous");
    }
}
