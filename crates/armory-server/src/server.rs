use std::sync::Arc;

use armory_catalog::Catalog;
use armory_store::JsonFileStore;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// Armory HTTP server.
pub struct ArmoryServer {
    config: ServerConfig,
    catalog: Arc<Catalog>,
}

impl ArmoryServer {
    /// Load the catalog from `config.data_dir`.
    pub fn new(config: ServerConfig) -> Self {
        let store = Arc::new(JsonFileStore::new(&config.data_dir));
        let catalog = Arc::new(Catalog::load(store));
        Self { config, catalog }
    }

    pub fn with_catalog(config: ServerConfig, catalog: Arc<Catalog>) -> Self {
        Self { config, catalog }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(AppState::new(Arc::clone(&self.catalog), self.config.clone()))
    }

    /// Start serving requests until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(
            environment = ?self.config.environment,
            data_dir = %self.config.data_dir.display(),
            "armory server listening on {}",
            self.config.bind_addr
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
