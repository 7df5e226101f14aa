//! Host-based redirect resolution

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use crate::errors::Result;
use crate::storage::{Domain, Link, ROOT_KEY, SeaOrmStorage};

#[derive(Debug, Clone)]
pub enum RedirectOutcome {
    /// Follow `url`; `link` is `None` for the domain root
    Redirect {
        domain: Domain,
        link: Option<Link>,
        url: String,
    },
    /// Expired link; sent to the domain's `expiredUrl` without tracking
    Expired { domain: Domain, url: String },
    /// Expired link on a domain without an `expiredUrl`
    Gone,
    NotFound,
}

pub struct RedirectService {
    storage: Arc<SeaOrmStorage>,
}

/// Hostname without port, lowercased
pub fn normalize_host(host: &str) -> String {
    host.rsplit_once(':')
        .filter(|(_, port)| port.chars().all(|c| c.is_ascii_digit()))
        .map(|(h, _)| h)
        .unwrap_or(host)
        .to_lowercase()
}

impl RedirectService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    #[instrument(skip(self), fields(host = %host, key = %key))]
    pub async fn resolve(&self, host: &str, key: &str, now: DateTime<Utc>) -> Result<RedirectOutcome> {
        let Some(domain) = self.storage.get_domain(&normalize_host(host)).await? else {
            debug!("Unknown domain");
            return Ok(RedirectOutcome::NotFound);
        };
        if domain.archived {
            return Ok(RedirectOutcome::NotFound);
        }

        if key.is_empty() || key == ROOT_KEY {
            let url = domain.target.clone().or_else(|| domain.placeholder.clone());
            return Ok(match url {
                Some(url) => RedirectOutcome::Redirect {
                    domain,
                    link: None,
                    url,
                },
                None => RedirectOutcome::NotFound,
            });
        }

        let Some(link) = self.storage.get_link_by_key(&domain.slug, key).await? else {
            return Ok(RedirectOutcome::NotFound);
        };

        if link.is_expired(now) {
            return Ok(match domain.expired_url.clone() {
                Some(url) => RedirectOutcome::Expired { domain, url },
                None => RedirectOutcome::Gone,
            });
        }

        Ok(RedirectOutcome::Redirect {
            url: link.url.clone(),
            domain,
            link: Some(link),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("Go.Example.com:8080"), "go.example.com");
        assert_eq!(normalize_host("go.example.com"), "go.example.com");
    }
}
