use std::sync::Arc;
use std::time::Duration;

use catalog_core::context::RequestContext;
use catalog_core::service::CoursePartService;
use catalog_core::store::CatalogStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState<S>>`.
///
/// Generic over the catalog store so the same routes serve PostgreSQL in
/// production and the in-memory catalog in tests.
pub struct AppState<S> {
    /// Course part lifecycle engine.
    pub parts: Arc<CoursePartService<S>>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            parts: Arc::clone(&self.parts),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: CatalogStore> AppState<S> {
    pub fn new(store: S, config: ServerConfig) -> Self {
        Self {
            parts: Arc::new(CoursePartService::new(store)),
            config: Arc::new(config),
        }
    }

    /// Fresh context bounded by the configured operation timeout.
    pub fn request_context(&self) -> RequestContext {
        RequestContext::with_timeout(Duration::from_secs(self.config.operation_timeout_secs))
    }
}
