//! Process wiring: store, account service, module registry and HTTP server.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use bookshelf_db::{MemoryUserStore, UserStore};
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules::{self, users::AccountService};

/// Everything the server needs, assembled from settings.
pub struct App {
    settings: Settings,
    service: AccountService,
    registry: ModuleRegistry,
}

impl App {
    /// Build the app on top of a fresh in-memory store.
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        Self::with_store(settings, Arc::new(MemoryUserStore::new()))
    }

    pub fn with_store(settings: Settings, store: Arc<dyn UserStore>) -> anyhow::Result<Self> {
        let service = AccountService::from_settings(&settings.auth, store);
        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, &settings, service.clone())
            .context("failed to register modules")?;

        Ok(Self {
            settings,
            service,
            registry,
        })
    }

    pub fn service(&self) -> &AccountService {
        &self.service
    }

    /// The complete HTTP router, without binding a listener.
    pub fn router(&self) -> Router {
        bookshelf_http::build_router(
            &self.registry,
            &self.settings,
            self.service.tokens().clone(),
        )
    }

    /// Run the module lifecycle around the HTTP server until shutdown.
    pub async fn run(self) -> anyhow::Result<()> {
        let ctx = InitCtx {
            settings: &self.settings,
        };

        self.registry.init_all(&ctx).await?;
        self.registry.start_all(&ctx).await?;

        let served = bookshelf_http::start_server(
            &self.registry,
            &self.settings,
            self.service.tokens().clone(),
        )
        .await;

        self.registry.stop_all().await?;
        served
    }
}
