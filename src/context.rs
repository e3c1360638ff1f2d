/// Application context and dependency injection
use crate::{
    config::GatewayConfig,
    error::GatewayResult,
    store::{ContentStore, IpfsApiStore},
};
use std::sync::Arc;

/// Application context holding all shared services
///
/// The store client is an explicit, injected handle. There is no global
/// singleton and no background reconnect loop; callers own retry policy.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<GatewayConfig>,
    pub store: Arc<dyn ContentStore>,
}

impl AppContext {
    /// Create a context backed by the configured store endpoint
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        config.validate()?;

        let store = IpfsApiStore::new(
            &config.store.api_url,
            config.store_timeout(),
            config.store.max_concurrency,
        )?;

        Ok(Self {
            config: Arc::new(config),
            store: Arc::new(store),
        })
    }

    /// Create a context around an externally supplied store
    pub fn with_store(config: GatewayConfig, store: Arc<dyn ContentStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }

    /// Base URL of this gateway service
    pub fn service_url(&self) -> String {
        format!(
            "http://{}:{}",
            self.config.service.hostname, self.config.service.port
        )
    }
}
