//! SeaORM storage backend
//!
//! One `SeaOrmStorage` serves SQLite, MySQL/MariaDB and PostgreSQL. Queries
//! are split by resource across the sibling modules.

mod connection;
mod converters;
mod customers;
mod domains;
mod events;
mod links;
pub mod retry;
mod workspaces;

use std::time::Duration;

use moka::sync::Cache;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, SqlErr};
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::errors::{LinkhubError, Result};
use crate::storage::models::ApiToken;

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use customers::CustomerUpsert;
pub use domains::{DomainFilter, DomainUpdate};
pub use events::{EventFilter, EventOrder};
pub use links::LinkFilter;
pub use workspaces::NewApiToken;

/// Unique-index violations become a 409 `conflict`; other errors pass through
fn conflict_on_unique(err: DbErr, message: impl Into<String>) -> LinkhubError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            debug!("unique constraint violated: {}", detail);
            LinkhubError::conflict(message)
        }
        _ => err.into(),
    }
}

/// Infer the database backend from its URL
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite://")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(LinkhubError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    /// Per-workspace domain COUNT cache (30s TTL)
    count_cache: Cache<String, u64>,
    /// API tokens keyed by hashed key (30s TTL)
    token_cache: Cache<String, ApiToken>,
    retry_config: retry::RetryConfig,
}

impl SeaOrmStorage {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let database_url = config.database_url.as_str();
        if database_url.is_empty() {
            return Err(LinkhubError::database_config("database_url is not set"));
        }
        let backend_name = infer_backend_from_url(database_url)?;

        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, &backend_name, config).await?
        };

        let storage = SeaOrmStorage {
            db,
            backend_name,
            count_cache: Cache::builder()
                .time_to_live(Duration::from_secs(30))
                .max_capacity(1_000)
                .build(),
            token_cache: Cache::builder()
                .time_to_live(Duration::from_secs(30))
                .max_capacity(10_000)
                .build(),
            retry_config: retry::RetryConfig::from(config),
        };

        run_migrations(&storage.db).await?;

        info!(
            "{} storage initialized",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    pub async fn ping(&self) -> Result<()> {
        self.db
            .execute_unprepared("SELECT 1")
            .await
            .map(|_| ())
            .map_err(|e| LinkhubError::database_connection(format!("Ping failed: {}", e)))
    }

    fn count_key(workspace_id: &str) -> String {
        format!("domains:{}", workspace_id)
    }

    pub(crate) fn invalidate_count_cache(&self, workspace_id: &str) {
        self.count_cache.invalidate(&Self::count_key(workspace_id));
    }
}
