//! Shared setup for the HTTP integration tests
//!
//! One SQLite database per test binary; every test provisions its own
//! workspace so tests never see each other's rows.

#![allow(dead_code)]

use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use tempfile::TempDir;
use tokio::sync::OnceCell;

use linkhub::config::{AnalyticsConfig, ApiConfig, DatabaseConfig, StaticConfig};
use linkhub::runtime::lifetime::startup::StartupContext;
use linkhub::services::{CreateWorkspaceRequest, WorkspaceService};
use linkhub::storage::{NewApiToken, Plan, SeaOrmStorage, Workspace};
use linkhub::utils::{generate_api_key, generate_random_code};

pub struct TestEnv {
    pub ctx: StartupContext,
    pub workspaces: WorkspaceService,
    pub api: ApiConfig,
    pub analytics: AnalyticsConfig,
}

static TEST_DIR: OnceLock<TempDir> = OnceLock::new();
static ENV: OnceCell<TestEnv> = OnceCell::const_new();

pub async fn env() -> &'static TestEnv {
    ENV.get_or_init(|| async {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("linkhub_test.db");

        let mut config = StaticConfig::default();
        config.database = DatabaseConfig {
            database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
            ..DatabaseConfig::default()
        };
        // Tests hammer one key; keep the limiter out of the way
        config.api.rate_limit_per_minute = 60_000;
        config.api.rate_limit_burst = 100_000;

        let storage = Arc::new(
            SeaOrmStorage::new(&config.database)
                .await
                .expect("Failed to create storage"),
        );
        let ctx = StartupContext::from_storage(storage.clone(), &config)
            .expect("Failed to build services");

        let _ = TEST_DIR.set(temp_dir);
        TestEnv {
            ctx,
            workspaces: WorkspaceService::new(storage),
            api: config.api,
            analytics: config.analytics,
        }
    })
    .await
}

pub fn storage(env: &TestEnv) -> &SeaOrmStorage {
    &env.ctx.storage
}

/// Lowercase random suffix for slugs and hostnames
pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, generate_random_code(10).to_lowercase())
}

/// A fresh workspace plus its plain API key
pub async fn provision(plan: Plan) -> (Workspace, String) {
    provision_with_limit(plan, None).await
}

pub async fn provision_with_limit(plan: Plan, usage_limit: Option<i64>) -> (Workspace, String) {
    let env = env().await;
    let slug = unique("ws");
    let provisioned = env
        .workspaces
        .provision(CreateWorkspaceRequest {
            name: format!("Workspace {}", slug),
            owner_email: format!("owner@{}.test", slug),
            slug,
            plan,
            usage_limit,
            owner_name: Some("Test Owner".to_string()),
        })
        .await
        .expect("Failed to provision workspace");
    (provisioned.workspace, provisioned.issued.plain_key)
}

/// Key owned by the workspace owner but not restricted to one workspace
pub async fn unrestricted_key(workspace: &Workspace, expires_at: Option<DateTime<Utc>>) -> String {
    let env = env().await;
    let storage = storage(env);
    let owner = storage
        .get_owner_id(&workspace.id)
        .await
        .unwrap()
        .expect("workspace has an owner");
    let key = generate_api_key();
    storage
        .create_api_token(NewApiToken {
            name: "Unrestricted",
            hashed_key: &key.hashed,
            partial_key: &key.partial,
            user_id: &owner,
            workspace_id: None,
            expires_at,
        })
        .await
        .unwrap();
    key.plain
}

pub fn bearer(key: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", key))
}

/// Full application (health, API, redirects) over the shared database
#[macro_export]
macro_rules! test_app {
    () => {{
        let env = common::env().await;
        let start = linkhub::api::services::AppStartTime::now();
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(linkhub::api::middleware::RequestIdMiddleware)
                .configure(|cfg| {
                    linkhub::runtime::modes::configure_app(
                        cfg,
                        &env.ctx,
                        &start,
                        &env.api,
                        &env.analytics,
                    )
                }),
        )
        .await
    }};
}
