use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::api::middleware::{ApiRateLimitConfig, api_rate_limit_config};
use crate::config::StaticConfig;
use crate::services::{AuthService, DomainService, EventService, LinkService, RedirectService};
use crate::storage::{SeaOrmStorage, StorageFactory};

/// Everything the HTTP workers share
#[derive(Clone)]
pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub auth_service: Arc<AuthService>,
    pub domain_service: Arc<DomainService>,
    pub link_service: Arc<LinkService>,
    pub event_service: Arc<EventService>,
    pub redirect_service: Arc<RedirectService>,
    pub rate_limit: ApiRateLimitConfig,
}

impl StartupContext {
    /// Wire the services over an already-open storage
    pub fn from_storage(storage: Arc<SeaOrmStorage>, config: &StaticConfig) -> Result<Self> {
        let rate_limit =
            api_rate_limit_config(&config.api).context("Invalid API rate limit settings")?;

        Ok(Self {
            auth_service: Arc::new(AuthService::new(storage.clone())),
            domain_service: Arc::new(DomainService::new(storage.clone())),
            link_service: Arc::new(LinkService::new(storage.clone())),
            event_service: Arc::new(EventService::new(storage.clone())),
            redirect_service: Arc::new(RedirectService::new(storage.clone())),
            rate_limit,
            storage,
        })
    }
}

/// Open storage, run migrations and build the service graph
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    // Already installed when a second server starts in the same process
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    let storage = StorageFactory::create(&config.database)
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", storage.backend_name());

    let context = StartupContext::from_storage(storage, config)?;

    info!(
        "Pre-startup processing completed in {:.2?}",
        start_time.elapsed()
    );
    Ok(context)
}
