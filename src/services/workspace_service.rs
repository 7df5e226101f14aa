//! Workspace and API key provisioning

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::errors::{LinkhubError, Result};
use crate::storage::{ApiToken, NewApiToken, Plan, SeaOrmStorage, User, Workspace};
use crate::utils::generate_api_key;

pub const DEFAULT_USAGE_LIMIT: i64 = 1000;

#[derive(Debug, Clone)]
pub struct CreateWorkspaceRequest {
    pub name: String,
    pub slug: String,
    pub plan: Plan,
    pub usage_limit: Option<i64>,
    pub owner_email: String,
    pub owner_name: Option<String>,
}

/// A freshly issued key; `plain_key` is not stored anywhere
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: ApiToken,
    pub plain_key: String,
}

#[derive(Debug, Clone)]
pub struct ProvisionedWorkspace {
    pub workspace: Workspace,
    pub owner: User,
    pub issued: IssuedToken,
}

pub struct WorkspaceService {
    storage: Arc<SeaOrmStorage>,
}

fn is_valid_workspace_slug(slug: &str) -> bool {
    (3..=48).contains(&slug.len())
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

impl WorkspaceService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// Create owner, workspace and a first API key in one go
    pub async fn provision(&self, req: CreateWorkspaceRequest) -> Result<ProvisionedWorkspace> {
        if !is_valid_workspace_slug(&req.slug) {
            return Err(LinkhubError::validation(format!(
                "Invalid workspace slug '{}'. Use 3-48 lowercase letters, digits or '-'.",
                req.slug
            )));
        }
        if req.name.trim().is_empty() {
            return Err(LinkhubError::validation("Workspace name cannot be empty."));
        }

        let owner = self
            .storage
            .create_user(req.owner_name.as_deref(), &req.owner_email)
            .await?;
        let workspace = self
            .storage
            .create_workspace(
                req.name.trim(),
                &req.slug,
                req.plan,
                req.usage_limit.unwrap_or(DEFAULT_USAGE_LIMIT),
                &owner.id,
            )
            .await?;
        let issued = self
            .issue_token(&workspace.id, "Default", None)
            .await?;

        Ok(ProvisionedWorkspace {
            workspace,
            owner,
            issued,
        })
    }

    /// Issue a key for the workspace owner, restricted to that workspace
    pub async fn issue_token(
        &self,
        workspace_id: &str,
        name: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<IssuedToken> {
        let workspace = self
            .storage
            .get_workspace(workspace_id)
            .await?
            .ok_or_else(|| LinkhubError::not_found("Workspace not found."))?;
        let owner_id = self
            .storage
            .get_owner_id(&workspace.id)
            .await?
            .ok_or_else(|| LinkhubError::not_found("Workspace has no owner."))?;

        let key = generate_api_key();
        let token = self
            .storage
            .create_api_token(NewApiToken {
                name,
                hashed_key: &key.hashed,
                partial_key: &key.partial,
                user_id: &owner_id,
                workspace_id: Some(&workspace.id),
                expires_at,
            })
            .await?;

        info!("API key {} issued for workspace {}", token.id, workspace.id);
        Ok(IssuedToken {
            token,
            plain_key: key.plain,
        })
    }
}
