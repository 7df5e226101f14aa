//! Custom domain management

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::errors::{LinkhubError, Result};
use crate::storage::{Domain, DomainFilter, DomainType, DomainUpdate, SeaOrmStorage, Workspace};
use crate::utils::generate_id;
use crate::utils::url_validator::{normalize_hostname, validate_url};

pub const MAX_DOMAINS_PAGE_SIZE: u64 = 50;

#[derive(Debug, Clone, Default)]
pub struct CreateDomainRequest {
    pub slug: String,
    pub domain_type: Option<DomainType>,
    pub target: Option<String>,
    pub expired_url: Option<String>,
    pub placeholder: Option<String>,
    pub noindex: Option<bool>,
    pub archived: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct ListDomainsRequest {
    pub archived: bool,
    pub search: Option<String>,
    pub page: u64,
    pub page_size: Option<u64>,
}

pub struct DomainService {
    storage: Arc<SeaOrmStorage>,
}

fn validate_slug(slug: &str) -> Result<String> {
    normalize_hostname(slug)
        .ok_or_else(|| LinkhubError::validation(format!("Invalid domain: '{}'.", slug.trim())))
}

/// Validate an optional URL field, treating blank as unset
fn validate_optional_url(field: &str, value: Option<String>) -> Result<Option<String>> {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(url) => {
            validate_url(&url)
                .map_err(|e| LinkhubError::validation(format!("Invalid `{}`: {}", field, e)))?;
            Ok(Some(url))
        }
    }
}

impl DomainService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    pub async fn exists(&self, slug: &str) -> Result<bool> {
        self.storage.domain_exists(slug).await
    }

    pub async fn get(&self, workspace: &Workspace, slug: &str) -> Result<Domain> {
        self.storage
            .get_workspace_domain(&workspace.id, slug)
            .await?
            .ok_or_else(|| LinkhubError::not_found("Domain not found."))
    }

    pub async fn list(&self, workspace: &Workspace, req: ListDomainsRequest) -> Result<Vec<Domain>> {
        let page_size = req
            .page_size
            .unwrap_or(MAX_DOMAINS_PAGE_SIZE)
            .clamp(1, MAX_DOMAINS_PAGE_SIZE);
        let filter = DomainFilter {
            archived: req.archived,
            search: req.search.filter(|s| !s.trim().is_empty()),
        };
        self.storage
            .list_domains(&workspace.id, &filter, req.page.max(1), page_size)
            .await
    }

    pub async fn create(&self, workspace: &Workspace, req: CreateDomainRequest) -> Result<Domain> {
        let slug = validate_slug(&req.slug)?;
        let target = validate_optional_url("target", req.target)?;
        let expired_url = validate_optional_url("expiredUrl", req.expired_url)?;
        let placeholder = validate_optional_url("placeholder", req.placeholder)?;

        if self.storage.domain_exists(&slug).await? {
            return Err(LinkhubError::conflict("This domain is already in use."));
        }

        let count = self.storage.count_domains(&workspace.id).await?;
        if count >= workspace.domains_limit {
            return Err(LinkhubError::exceeded_limit(format!(
                "You've reached your {} domain limit of {}. Upgrade your plan to add more domains.",
                workspace.plan, workspace.domains_limit
            )));
        }

        let domain = Domain {
            id: generate_id("dom"),
            slug,
            workspace_id: workspace.id.clone(),
            verified: false,
            primary: false,
            archived: req.archived.unwrap_or(false),
            noindex: req.noindex.unwrap_or(false),
            placeholder,
            expired_url,
            target,
            domain_type: req.domain_type.unwrap_or_default(),
            clicks: 0,
            created_at: Utc::now(),
        };
        self.storage.create_domain(domain).await
    }

    pub async fn set_primary(&self, workspace: &Workspace, slug: &str) -> Result<Domain> {
        let domain = self.get(workspace, slug).await?;
        self.storage
            .set_primary_domain(&workspace.id, &domain.slug)
            .await
    }

    pub async fn update(
        &self,
        workspace: &Workspace,
        slug: &str,
        mut update: DomainUpdate,
    ) -> Result<Domain> {
        let current = self.get(workspace, slug).await?;

        if let Some(new_slug) = update.slug.take() {
            let new_slug = validate_slug(&new_slug)?;
            if new_slug != current.slug && self.storage.domain_exists(&new_slug).await? {
                return Err(LinkhubError::conflict("This domain is already in use."));
            }
            update.slug = Some(new_slug);
        }
        for (field, value) in [
            ("target", &mut update.target),
            ("expiredUrl", &mut update.expired_url),
            ("placeholder", &mut update.placeholder),
        ] {
            if let Some(inner) = value.take() {
                *value = Some(validate_optional_url(field, inner)?);
            }
        }

        if update.is_empty() {
            return Ok(current);
        }
        self.storage.update_domain(&current, update).await
    }

    pub async fn delete(&self, workspace: &Workspace, slug: &str) -> Result<Domain> {
        let domain = self.get(workspace, slug).await?;
        let removed = self.storage.delete_domain(&domain).await?;
        info!(
            "DomainService: deleted '{}' with {} links",
            domain.slug, removed
        );
        Ok(domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_slug() {
        assert_eq!(validate_slug(" Links.Acme.io ").unwrap(), "links.acme.io");
        assert!(validate_slug("not a domain").is_err());
    }

    #[test]
    fn test_validate_optional_url() {
        assert_eq!(validate_optional_url("target", None).unwrap(), None);
        assert_eq!(
            validate_optional_url("target", Some("  ".into())).unwrap(),
            None
        );
        assert_eq!(
            validate_optional_url("target", Some("https://acme.io".into())).unwrap(),
            Some("https://acme.io".to_string())
        );
        let err = validate_optional_url("expiredUrl", Some("javascript:x".into())).unwrap_err();
        assert!(err.message().starts_with("Invalid `expiredUrl`"));
    }
}
