use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::errors::Result;

pub mod backend;
pub mod models;

pub use backend::{
    CustomerUpsert, DomainFilter, DomainUpdate, EventFilter, EventOrder, LinkFilter, NewApiToken,
    SeaOrmStorage,
};
pub use models::{
    AnalyticsEvent, ApiToken, ClickContext, Customer, Domain, DomainType, EventKind, Link, Plan,
    ROOT_KEY, Role, User, Workspace,
};

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &DatabaseConfig) -> Result<Arc<SeaOrmStorage>> {
        let storage = SeaOrmStorage::new(config).await?;
        Ok(Arc::new(storage))
    }
}
