//! Users, workspaces, memberships and API tokens

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ExprTrait, QueryFilter, Set, TransactionTrait,
    sea_query::Expr,
};
use tracing::{debug, info};

use super::converters::{model_to_token, model_to_user, model_to_workspace};
use super::{SeaOrmStorage, retry};
use crate::errors::{LinkhubError, Result};
use crate::storage::models::{ApiToken, Plan, Role, User, Workspace};
use crate::utils::generate_id;

use migration::entities::{api_token, user, workspace, workspace_user};

/// Fields of a token about to be stored; the plain key never reaches here
pub struct NewApiToken<'a> {
    pub name: &'a str,
    pub hashed_key: &'a str,
    pub partial_key: &'a str,
    pub user_id: &'a str,
    pub workspace_id: Option<&'a str>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl SeaOrmStorage {
    pub async fn create_user(&self, name: Option<&str>, email: &str) -> Result<User> {
        let model = user::ActiveModel {
            id: Set(generate_id("user")),
            name: Set(name.map(str::to_string)),
            email: Set(email.to_lowercase()),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await?;
        Ok(model_to_user(model))
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<User>> {
        let db = &self.db;
        let id = id.to_string();
        let model = retry::with_retry("get_user", self.retry_config, || async {
            user::Entity::find_by_id(id.clone()).one(db).await
        })
        .await?;
        Ok(model.map(model_to_user))
    }

    /// Create a workspace with `owner_id` as its owner
    pub async fn create_workspace(
        &self,
        name: &str,
        slug: &str,
        plan: Plan,
        usage_limit: i64,
        owner_id: &str,
    ) -> Result<Workspace> {
        if self.get_workspace_by_slug(slug).await?.is_some() {
            return Err(LinkhubError::conflict(format!(
                "Workspace slug '{}' is already in use.",
                slug
            )));
        }

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let model = workspace::ActiveModel {
            id: Set(generate_id("ws")),
            name: Set(name.to_string()),
            slug: Set(slug.to_string()),
            plan: Set(plan.to_string()),
            usage: Set(0),
            usage_limit: Set(usage_limit),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        workspace_user::ActiveModel {
            workspace_id: Set(model.id.clone()),
            user_id: Set(owner_id.to_string()),
            role: Set(Role::Owner.as_ref().to_string()),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        info!("Workspace created: {} ({})", model.slug, model.id);
        Ok(model_to_workspace(model))
    }

    pub async fn get_workspace(&self, id: &str) -> Result<Option<Workspace>> {
        let db = &self.db;
        let id = id.to_string();
        let model = retry::with_retry("get_workspace", self.retry_config, || async {
            workspace::Entity::find_by_id(id.clone()).one(db).await
        })
        .await?;
        Ok(model.map(model_to_workspace))
    }

    pub async fn get_workspace_by_slug(&self, slug: &str) -> Result<Option<Workspace>> {
        let db = &self.db;
        let slug = slug.to_string();
        let model = retry::with_retry("get_workspace_by_slug", self.retry_config, || async {
            workspace::Entity::find()
                .filter(workspace::Column::Slug.eq(slug.clone()))
                .one(db)
                .await
        })
        .await?;
        Ok(model.map(model_to_workspace))
    }

    pub async fn is_member(&self, workspace_id: &str, user_id: &str) -> Result<bool> {
        let db = &self.db;
        let key = (workspace_id.to_string(), user_id.to_string());
        let membership = retry::with_retry("is_member", self.retry_config, || async {
            workspace_user::Entity::find_by_id(key.clone()).one(db).await
        })
        .await?;
        Ok(membership.is_some())
    }

    pub async fn get_owner_id(&self, workspace_id: &str) -> Result<Option<String>> {
        let owner = workspace_user::Entity::find()
            .filter(workspace_user::Column::WorkspaceId.eq(workspace_id))
            .filter(workspace_user::Column::Role.eq(Role::Owner.as_ref()))
            .one(&self.db)
            .await?;
        Ok(owner.map(|m| m.user_id))
    }

    pub async fn add_workspace_usage(&self, workspace_id: &str, clicks: i64) -> Result<()> {
        workspace::Entity::update_many()
            .col_expr(
                workspace::Column::Usage,
                Expr::col(workspace::Column::Usage).add(Expr::val(clicks)),
            )
            .filter(workspace::Column::Id.eq(workspace_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    pub async fn create_api_token(&self, new: NewApiToken<'_>) -> Result<ApiToken> {
        let model = api_token::ActiveModel {
            id: Set(generate_id("tok")),
            name: Set(new.name.to_string()),
            hashed_key: Set(new.hashed_key.to_string()),
            partial_key: Set(new.partial_key.to_string()),
            user_id: Set(new.user_id.to_string()),
            workspace_id: Set(new.workspace_id.map(str::to_string)),
            expires_at: Set(new.expires_at),
            last_used: Set(None),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await?;
        Ok(model_to_token(model))
    }

    /// Look up a token by the SHA-256 of its plain key (cached)
    pub async fn find_token_by_hash(&self, hashed_key: &str) -> Result<Option<ApiToken>> {
        if let Some(token) = self.token_cache.get(hashed_key) {
            debug!("token cache hit: {}", token.id);
            return Ok(Some(token));
        }

        let db = &self.db;
        let hashed = hashed_key.to_string();
        let model = retry::with_retry("find_token_by_hash", self.retry_config, || async {
            api_token::Entity::find()
                .filter(api_token::Column::HashedKey.eq(hashed.clone()))
                .one(db)
                .await
        })
        .await?;

        let token = model.map(model_to_token);
        if let Some(ref t) = token {
            self.token_cache.insert(hashed_key.to_string(), t.clone());
        }
        Ok(token)
    }

    pub async fn touch_token(&self, token: &ApiToken, now: DateTime<Utc>) -> Result<()> {
        api_token::Entity::update_many()
            .col_expr(api_token::Column::LastUsed, Expr::value(Some(now)))
            .filter(api_token::Column::Id.eq(token.id.as_str()))
            .exec(&self.db)
            .await?;

        let mut refreshed = token.clone();
        refreshed.last_used = Some(now);
        self.token_cache
            .insert(token.hashed_key.clone(), refreshed);
        Ok(())
    }
}
