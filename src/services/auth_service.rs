//! API-key authentication and workspace resolution

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, warn};

use crate::errors::{LinkhubError, Result};
use crate::storage::{ApiToken, Link, Plan, ROOT_KEY, SeaOrmStorage, User, Workspace};
use crate::utils::hash_api_key;

/// `last_used` is written at most once per this window
const TOKEN_TOUCH_INTERVAL_SECS: i64 = 60;

/// Resolved caller of a workspace-scoped route
#[derive(Debug, Clone)]
pub struct WorkspaceContext {
    pub workspace: Workspace,
    pub user: User,
    pub token: ApiToken,
    pub link: Option<Link>,
}

/// Gates applied on top of plain membership
#[derive(Debug, Clone, Default)]
pub struct WorkspaceOptions {
    pub need_not_exceeded_clicks: bool,
    pub required_plans: Option<Vec<Plan>>,
}

/// Request values the authorizer needs
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthInput<'a> {
    pub authorization: Option<&'a str>,
    pub workspace_id: Option<&'a str>,
    pub project_slug: Option<&'a str>,
    pub link_id: Option<&'a str>,
    pub domain: Option<&'a str>,
    pub key: Option<&'a str>,
}

pub struct AuthService {
    storage: Arc<SeaOrmStorage>,
}

/// Extract the key from `Bearer <key>`
fn bearer_key(header: &str) -> Option<&str> {
    let key = header.strip_prefix("Bearer ")?.trim();
    (!key.is_empty()).then_some(key)
}

/// Accept `ws_<id>` and bare `<id>`
fn normalize_workspace_id(id: &str) -> String {
    if id.starts_with("ws_") {
        id.to_string()
    } else {
        format!("ws_{}", id)
    }
}

impl AuthService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    pub async fn authorize(
        &self,
        input: AuthInput<'_>,
        options: &WorkspaceOptions,
    ) -> Result<WorkspaceContext> {
        let header = input
            .authorization
            .ok_or_else(|| LinkhubError::unauthorized("Missing Authorization header."))?;
        let api_key = bearer_key(header).ok_or_else(|| {
            LinkhubError::validation(
                "Misconfigured authorization header. Did you forget to add 'Bearer '?",
            )
        })?;

        let token = self
            .storage
            .find_token_by_hash(&hash_api_key(api_key))
            .await?
            .ok_or_else(|| LinkhubError::unauthorized("Unauthorized: Invalid API key."))?;

        let now = Utc::now();
        if token.is_expired(now) {
            return Err(LinkhubError::unauthorized(
                "Unauthorized: Access token expired.",
            ));
        }

        let user = self
            .storage
            .get_user(&token.user_id)
            .await?
            .ok_or_else(|| LinkhubError::unauthorized("Unauthorized: Invalid API key."))?;

        let workspace = self.resolve_workspace(&input, &token).await?;

        if !self.storage.is_member(&workspace.id, &user.id).await? {
            debug!("User {} is not a member of {}", user.id, workspace.id);
            return Err(LinkhubError::not_found("Workspace not found."));
        }

        if options.need_not_exceeded_clicks && workspace.exceeded_clicks() {
            return Err(LinkhubError::exceeded_limit(format!(
                "You have exceeded your {} clicks usage limit. Upgrade your plan to continue.",
                workspace.usage_limit
            )));
        }

        if let Some(ref plans) = options.required_plans
            && !plans.contains(&workspace.plan)
        {
            return Err(LinkhubError::forbidden("Unauthorized: Need higher plan."));
        }

        let link = self.resolve_link(&input, &workspace).await?;

        if token
            .last_used
            .is_none_or(|t| now - t > Duration::seconds(TOKEN_TOUCH_INTERVAL_SECS))
            && let Err(e) = self.storage.touch_token(&token, now).await
        {
            warn!("Failed to update last_used for token {}: {}", token.id, e);
        }

        Ok(WorkspaceContext {
            workspace,
            user,
            token,
            link,
        })
    }

    async fn resolve_workspace(&self, input: &AuthInput<'_>, token: &ApiToken) -> Result<Workspace> {
        let requested_id = input
            .workspace_id
            .filter(|id| !id.is_empty())
            .map(normalize_workspace_id);

        let workspace = match (requested_id, input.project_slug.filter(|s| !s.is_empty())) {
            (Some(id), _) => {
                self.check_restriction(token, &id)?;
                self.storage.get_workspace(&id).await?
            }
            (None, Some(slug)) => self.storage.get_workspace_by_slug(slug).await?,
            (None, None) => match token.workspace_id {
                Some(ref id) => self.storage.get_workspace(id).await?,
                None => {
                    return Err(LinkhubError::validation(
                        "Workspace ID not found. Did you forget to include a `workspaceId` query parameter?",
                    ));
                }
            },
        }
        .ok_or_else(|| LinkhubError::not_found("Workspace not found."))?;

        self.check_restriction(token, &workspace.id)?;
        Ok(workspace)
    }

    fn check_restriction(&self, token: &ApiToken, workspace_id: &str) -> Result<()> {
        match token.workspace_id {
            Some(ref allowed) if allowed != workspace_id => Err(LinkhubError::forbidden(
                "Unauthorized: This API key does not have access to this workspace.",
            )),
            _ => Ok(()),
        }
    }

    async fn resolve_link(
        &self,
        input: &AuthInput<'_>,
        workspace: &Workspace,
    ) -> Result<Option<Link>> {
        let link = if let Some(link_id) = input.link_id.filter(|s| !s.is_empty()) {
            Some(self.storage.get_link(link_id).await?)
        } else if let (Some(domain), Some(key)) = (
            input.domain.filter(|s| !s.is_empty()),
            input.key.filter(|s| !s.is_empty() && *s != ROOT_KEY),
        ) {
            Some(self.storage.get_link_by_key(domain, key).await?)
        } else {
            None
        };

        match link {
            None => Ok(None),
            Some(Some(link)) if link.workspace_id == workspace.id => Ok(Some(link)),
            Some(_) => Err(LinkhubError::not_found("Link not found.")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_key() {
        assert_eq!(bearer_key("Bearer lh_abc"), Some("lh_abc"));
        assert_eq!(bearer_key("Bearer "), None);
        assert_eq!(bearer_key("lh_abc"), None);
        assert_eq!(bearer_key("Basic xyz"), None);
    }

    #[test]
    fn test_normalize_workspace_id() {
        assert_eq!(normalize_workspace_id("ws_123"), "ws_123");
        assert_eq!(normalize_workspace_id("123"), "ws_123");
    }
}
