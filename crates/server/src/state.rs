//! Application state shared across handlers.

use std::sync::Arc;

use crate::cache::QueryCache;
use crate::config::ServerConfig;
use crate::gateway::{DataGateway, RestGateway};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the data gateway and the query cache.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    gateway: Arc<dyn DataGateway>,
    cache: QueryCache,
}

impl AppState {
    /// Create the application state with the HTTP gateway.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let gateway: Arc<dyn DataGateway> = Arc::new(RestGateway::new(&config.gateway));
        Self::with_gateway(config, gateway)
    }

    /// Create the application state over an arbitrary gateway. Tests
    /// pass a [`crate::gateway::MemoryGateway`] here.
    #[must_use]
    pub fn with_gateway(config: ServerConfig, gateway: Arc<dyn DataGateway>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                gateway,
                cache: QueryCache::new(),
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get the shared data gateway.
    #[must_use]
    pub fn gateway(&self) -> &Arc<dyn DataGateway> {
        &self.inner.gateway
    }

    /// Get a reference to the query cache.
    #[must_use]
    pub fn cache(&self) -> &QueryCache {
        &self.inner.cache
    }
}
