//! Short link management

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::errors::{LinkhubError, Result};
use crate::storage::{Link, LinkFilter, ROOT_KEY, SeaOrmStorage, Workspace};
use crate::utils::generate_random_code;
use crate::utils::url_validator::validate_url;

const RANDOM_KEY_LENGTH: usize = 7;
const MAX_LINKS_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone)]
pub struct CreateLinkRequest {
    pub domain: String,
    /// Generated when absent
    pub key: Option<String>,
    pub url: String,
    pub expires_at: Option<DateTime<Utc>>,
}

pub struct LinkService {
    storage: Arc<SeaOrmStorage>,
}

/// Keys are path segments: alphanumerics plus `-`, `_`, `.` and `/`
fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= 190
        && !key.starts_with('/')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'))
}

impl LinkService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    pub async fn create_link(&self, workspace: &Workspace, req: CreateLinkRequest) -> Result<Link> {
        validate_url(&req.url).map_err(|e| LinkhubError::validation(e.to_string()))?;

        let domain = self
            .storage
            .get_workspace_domain(&workspace.id, &req.domain)
            .await?
            .ok_or_else(|| LinkhubError::not_found("Domain not found."))?;

        let key = match req.key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()) {
            Some(key) if key == ROOT_KEY => {
                return Err(LinkhubError::unprocessable(
                    "The key `_root` is reserved for the domain root.",
                ));
            }
            Some(key) if !is_valid_key(&key) => {
                return Err(LinkhubError::validation(format!("Invalid key: '{}'.", key)));
            }
            Some(key) => key,
            None => generate_random_code(RANDOM_KEY_LENGTH),
        };

        if self
            .storage
            .get_link_by_key(&domain.slug, &key)
            .await?
            .is_some()
        {
            return Err(LinkhubError::conflict(format!(
                "Duplicate key: {}/{} already exists.",
                domain.slug, key
            )));
        }

        let link = Link {
            id: crate::utils::generate_id("link"),
            workspace_id: workspace.id.clone(),
            domain: domain.slug,
            key,
            url: req.url.trim().to_string(),
            clicks: 0,
            leads: 0,
            sales: 0,
            sale_amount: 0,
            expires_at: req.expires_at,
            created_at: Utc::now(),
        };
        let link = self.storage.create_link(&link).await?;
        info!("LinkService: created '{}' -> '{}'", link.short_link(), link.url);
        Ok(link)
    }

    pub async fn list_links(
        &self,
        workspace: &Workspace,
        filter: LinkFilter,
        page: u64,
        page_size: Option<u64>,
    ) -> Result<Vec<Link>> {
        let page_size = page_size
            .unwrap_or(MAX_LINKS_PAGE_SIZE)
            .clamp(1, MAX_LINKS_PAGE_SIZE);
        self.storage
            .list_links(&workspace.id, &filter, page.max(1), page_size)
            .await
    }
}
