use async_trait::async_trait;
use axum::Router;

/// Read-only view of the loaded settings handed to every lifecycle hook
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
}

/// A unit of the bookshelf server: owns its routes and reacts to the
/// process lifecycle driven by [`ModuleRegistry`](crate::ModuleRegistry).
#[async_trait]
pub trait Module: Sync + Send {
    /// Registry key; two modules may not share one
    fn name(&self) -> &'static str;

    /// Check configuration before the listener is bound. An error aborts
    /// startup.
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Routes merged into the root router at the paths given, e.g. the
    /// users module's `/graphql`
    fn routes(&self) -> Router {
        Router::new()
    }

    /// Runs once every module is initialized, before serving. The users
    /// module reports how many accounts its store holds here.
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs after the server has drained, in reverse registration order
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
