use std::sync::Arc;

use armory_catalog::Catalog;

use crate::config::ServerConfig;

/// Shared handler state. Cloned per request.
#[derive(Clone, Debug)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(catalog: Arc<Catalog>, config: ServerConfig) -> Self {
        Self {
            catalog,
            config: Arc::new(config),
        }
    }
}
