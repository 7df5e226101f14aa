//! Domain queries and mutations

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbErr, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::Expr,
};
use tracing::{debug, info};

use super::converters::{domain_to_active_model, model_to_domain};
use super::{SeaOrmStorage, conflict_on_unique, retry};
use crate::errors::{LinkhubError, Result};
use crate::storage::models::{Domain, DomainType};

use migration::entities::{domain, link, workspace};

const DOMAIN_IN_USE: &str = "This domain is already in use.";

#[derive(Debug, Clone, Default)]
pub struct DomainFilter {
    pub archived: bool,
    /// Substring match on slug
    pub search: Option<String>,
}

/// Partial update; `Some(None)` clears a nullable field
#[derive(Debug, Clone, Default)]
pub struct DomainUpdate {
    pub slug: Option<String>,
    pub domain_type: Option<DomainType>,
    pub target: Option<Option<String>>,
    pub expired_url: Option<Option<String>>,
    pub placeholder: Option<Option<String>>,
    pub noindex: Option<bool>,
    pub archived: Option<bool>,
}

impl DomainUpdate {
    pub fn is_empty(&self) -> bool {
        self.slug.is_none()
            && self.domain_type.is_none()
            && self.target.is_none()
            && self.expired_url.is_none()
            && self.placeholder.is_none()
            && self.noindex.is_none()
            && self.archived.is_none()
    }
}

impl SeaOrmStorage {
    /// Whether any workspace owns `slug`
    pub async fn domain_exists(&self, slug: &str) -> Result<bool> {
        Ok(self.get_domain(slug).await?.is_some())
    }

    pub async fn get_domain(&self, slug: &str) -> Result<Option<Domain>> {
        let db = &self.db;
        let slug = slug.to_lowercase();
        let model = retry::with_retry("get_domain", self.retry_config, || async {
            domain::Entity::find()
                .filter(domain::Column::Slug.eq(slug.clone()))
                .one(db)
                .await
        })
        .await?;
        Ok(model.map(model_to_domain))
    }

    /// Domain `slug` if it belongs to `workspace_id`
    pub async fn get_workspace_domain(
        &self,
        workspace_id: &str,
        slug: &str,
    ) -> Result<Option<Domain>> {
        Ok(self
            .get_domain(slug)
            .await?
            .filter(|d| d.workspace_id == workspace_id))
    }

    pub async fn count_domains(&self, workspace_id: &str) -> Result<u64> {
        let cache_key = Self::count_key(workspace_id);
        if let Some(cached) = self.count_cache.get(&cache_key) {
            debug!("count cache hit: key={}, value={}", cache_key, cached);
            return Ok(cached);
        }

        let db = &self.db;
        let ws = workspace_id.to_string();
        let count = retry::with_retry("count_domains", self.retry_config, || async {
            domain::Entity::find()
                .filter(domain::Column::WorkspaceId.eq(ws.clone()))
                .count(db)
                .await
        })
        .await?;

        self.count_cache.insert(cache_key, count);
        Ok(count)
    }

    pub async fn list_domains(
        &self,
        workspace_id: &str,
        filter: &DomainFilter,
        page: u64,
        page_size: u64,
    ) -> Result<Vec<Domain>> {
        let mut condition = Condition::all()
            .add(domain::Column::WorkspaceId.eq(workspace_id))
            .add(domain::Column::Archived.eq(filter.archived));

        if let Some(ref search) = filter.search {
            condition = condition.add(domain::Column::Slug.contains(search.to_lowercase()));
        }

        let db = &self.db;
        let page_offset = page.saturating_sub(1);
        let models = retry::with_retry("list_domains", self.retry_config, || async {
            domain::Entity::find()
                .filter(condition.clone())
                .order_by_desc(domain::Column::Primary)
                .order_by_desc(domain::Column::CreatedAt)
                .paginate(db, page_size)
                .fetch_page(page_offset)
                .await
        })
        .await?;

        Ok(models.into_iter().map(model_to_domain).collect())
    }

    /// Insert a domain; it becomes primary when the workspace had none
    pub async fn create_domain(&self, new: Domain) -> Result<Domain> {
        let db = &self.db;
        let model = retry::with_retry("create_domain", self.retry_config, || async {
            let txn = db.begin().await?;

            let candidate = Domain {
                primary: false,
                ..new.clone()
            };
            let mut model = domain_to_active_model(&candidate).insert(&txn).await?;

            // Workspace row lock serializes promotion; SQLite holds the write lock already.
            workspace::Entity::find_by_id(model.workspace_id.clone())
                .lock_exclusive()
                .one(&txn)
                .await?;
            let has_primary = domain::Entity::find()
                .filter(domain::Column::WorkspaceId.eq(model.workspace_id.as_str()))
                .filter(domain::Column::Primary.eq(true))
                .lock_exclusive()
                .one(&txn)
                .await?
                .is_some();
            if !has_primary {
                let mut active = model.into_active_model();
                active.primary = Set(true);
                model = active.update(&txn).await?;
            }

            txn.commit().await?;
            Ok::<_, DbErr>(model)
        })
        .await
        .map_err(|e| conflict_on_unique(e, DOMAIN_IN_USE))?;

        self.invalidate_count_cache(&new.workspace_id);
        info!("Domain created: {} (workspace {})", model.slug, model.workspace_id);
        Ok(model_to_domain(model))
    }

    /// Make `slug` the only primary domain of the workspace
    pub async fn set_primary_domain(&self, workspace_id: &str, slug: &str) -> Result<Domain> {
        let db = &self.db;
        let updated = retry::with_retry("set_primary_domain", self.retry_config, || async {
            let txn = db.begin().await?;

            let Some(model) = domain::Entity::find()
                .filter(domain::Column::WorkspaceId.eq(workspace_id))
                .filter(domain::Column::Slug.eq(slug))
                .one(&txn)
                .await?
            else {
                return Ok(None);
            };

            domain::Entity::update_many()
                .col_expr(domain::Column::Primary, Expr::value(false))
                .filter(domain::Column::WorkspaceId.eq(workspace_id))
                .filter(domain::Column::Id.ne(model.id.as_str()))
                .exec(&txn)
                .await?;

            let mut active = model.into_active_model();
            active.primary = Set(true);
            let updated = active.update(&txn).await?;

            txn.commit().await?;
            Ok::<_, DbErr>(Some(updated))
        })
        .await?
        .ok_or_else(|| LinkhubError::not_found("Domain not found."))?;

        info!("Primary domain set: {} (workspace {})", slug, workspace_id);
        Ok(model_to_domain(updated))
    }

    /// Apply `update` to `current`; a rename carries the domain's links along
    pub async fn update_domain(&self, current: &Domain, update: DomainUpdate) -> Result<Domain> {
        let db = &self.db;
        let updated = retry::with_retry("update_domain", self.retry_config, || async {
            let txn = db.begin().await?;

            let mut active = domain_to_active_model(current);
            active.created_at = sea_orm::ActiveValue::NotSet;
            active.clicks = sea_orm::ActiveValue::NotSet;

            if let Some(ref new_slug) = update.slug
                && new_slug != &current.slug
            {
                link::Entity::update_many()
                    .col_expr(link::Column::Domain, Expr::value(new_slug.clone()))
                    .filter(link::Column::Domain.eq(current.slug.as_str()))
                    .exec(&txn)
                    .await?;
                active.slug = Set(new_slug.clone());
            }
            if let Some(domain_type) = update.domain_type {
                active.domain_type = Set(domain_type.as_ref().to_string());
            }
            if let Some(ref target) = update.target {
                active.target = Set(target.clone());
            }
            if let Some(ref expired_url) = update.expired_url {
                active.expired_url = Set(expired_url.clone());
            }
            if let Some(ref placeholder) = update.placeholder {
                active.placeholder = Set(placeholder.clone());
            }
            if let Some(noindex) = update.noindex {
                active.noindex = Set(noindex);
            }
            if let Some(archived) = update.archived {
                active.archived = Set(archived);
            }

            let updated = active.update(&txn).await?;
            txn.commit().await?;
            Ok::<_, DbErr>(updated)
        })
        .await
        .map_err(|e| conflict_on_unique(e, DOMAIN_IN_USE))?;

        info!("Domain updated: {} -> {}", current.slug, updated.slug);
        Ok(model_to_domain(updated))
    }

    /// Delete a domain together with its links; returns the number of links removed
    pub async fn delete_domain(&self, domain: &Domain) -> Result<u64> {
        let db = &self.db;
        let removed = retry::with_retry("delete_domain", self.retry_config, || async {
            let txn = db.begin().await?;

            let links = link::Entity::delete_many()
                .filter(link::Column::Domain.eq(domain.slug.as_str()))
                .exec(&txn)
                .await?;

            domain::Entity::delete_by_id(domain.id.clone())
                .exec(&txn)
                .await?;

            txn.commit().await?;
            Ok::<_, DbErr>(links.rows_affected)
        })
        .await?;

        self.invalidate_count_cache(&domain.workspace_id);
        info!("Domain deleted: {} ({} links removed)", domain.slug, removed);
        Ok(removed)
    }

    pub async fn add_domain_clicks(&self, domain_id: &str, clicks: i64) -> Result<()> {
        use sea_orm::ExprTrait;

        domain::Entity::update_many()
            .col_expr(
                domain::Column::Clicks,
                Expr::col(domain::Column::Clicks).add(Expr::val(clicks)),
            )
            .filter(domain::Column::Id.eq(domain_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
