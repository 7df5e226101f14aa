//! Domain types handed out by the storage layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Workspace billing plan
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Pro,
    Business,
    Enterprise,
}

impl Plan {
    pub fn domains_limit(&self) -> u64 {
        match self {
            Plan::Free => 3,
            Plan::Pro => 10,
            Plan::Business => 100,
            Plan::Enterprise => 1000,
        }
    }

    /// Unknown plan names stored in the database degrade to `free`
    pub fn parse_lossy(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub plan: Plan,
    pub usage: i64,
    pub usage_limit: i64,
    pub domains_limit: u64,
    pub created_at: DateTime<Utc>,
}

impl Workspace {
    pub fn exceeded_clicks(&self) -> bool {
        self.usage > self.usage_limit
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Owner,
    Member,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiToken {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub hashed_key: String,
    pub partial_key: String,
    pub user_id: String,
    pub workspace_id: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ApiToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp < now)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DomainType {
    #[default]
    Redirect,
    Rewrite,
}

/// Custom short-link domain as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub id: String,
    pub slug: String,
    #[serde(skip)]
    pub workspace_id: String,
    pub verified: bool,
    pub primary: bool,
    pub archived: bool,
    pub noindex: bool,
    pub placeholder: Option<String>,
    pub expired_url: Option<String>,
    pub target: Option<String>,
    #[serde(rename = "type")]
    pub domain_type: DomainType,
    pub clicks: i64,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: String,
    pub workspace_id: String,
    pub domain: String,
    pub key: String,
    pub url: String,
    pub clicks: i64,
    pub leads: i64,
    pub sales: i64,
    pub sale_amount: i64,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Link {
    pub fn short_link(&self) -> String {
        if self.key == ROOT_KEY {
            format!("https://{}", self.domain)
        } else {
            format!("https://{}/{}", self.domain, self.key)
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp < now)
    }
}

/// Key that addresses a domain's root
pub const ROOT_KEY: &str = "_root";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub workspace_id: String,
    pub external_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub link_id: Option<String>,
    pub click_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventKind {
    Click,
    Lead,
    Sale,
}

/// One analytics row. Field names are the raw column names that the
/// export falls back to when a column has no dedicated accessor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub id: String,
    #[serde(skip)]
    pub workspace_id: String,
    pub event: String,
    pub timestamp: DateTime<Utc>,
    pub click_id: String,
    pub link_id: String,
    pub domain: String,
    pub key: String,
    pub url: String,
    pub qr: bool,
    pub continent: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub device: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
    pub referer: Option<String>,
    pub referer_url: Option<String>,
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_processor: Option<String>,
}

impl AnalyticsEvent {
    pub fn kind(&self) -> Option<EventKind> {
        self.event.parse().ok()
    }
}

/// Click attributes captured at redirect time
#[derive(Debug, Clone, Default)]
pub struct ClickContext {
    pub qr: bool,
    pub continent: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub device: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
    pub referer: Option<String>,
    pub referer_url: Option<String>,
    pub ip: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_plan_limits_and_parsing() {
        assert_eq!(Plan::Free.domains_limit(), 3);
        assert_eq!(Plan::Enterprise.domains_limit(), 1000);
        assert_eq!(Plan::parse_lossy("business"), Plan::Business);
        assert_eq!(Plan::parse_lossy("legacy"), Plan::Free);
        assert_eq!(Plan::Pro.to_string(), "pro");
    }

    #[test]
    fn test_domain_json_shape() {
        let domain = Domain {
            id: "dom_1".into(),
            slug: "go.example.com".into(),
            workspace_id: "ws_1".into(),
            verified: false,
            primary: true,
            archived: false,
            noindex: true,
            placeholder: None,
            expired_url: Some("https://example.com/expired".into()),
            target: None,
            domain_type: DomainType::Rewrite,
            clicks: 0,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&domain).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 11);
        assert_eq!(json["type"], "rewrite");
        assert_eq!(json["expiredUrl"], "https://example.com/expired");
        assert!(json["placeholder"].is_null());
        assert!(!obj.contains_key("workspaceId"));
    }

    #[test]
    fn test_short_link_for_root() {
        let now = Utc::now();
        let mut link = Link {
            id: "link_1".into(),
            workspace_id: "ws_1".into(),
            domain: "go.example.com".into(),
            key: ROOT_KEY.into(),
            url: "https://example.com".into(),
            clicks: 0,
            leads: 0,
            sales: 0,
            sale_amount: 0,
            expires_at: Some(now - Duration::seconds(1)),
            created_at: now,
        };
        assert_eq!(link.short_link(), "https://go.example.com");
        assert!(link.is_expired(now));
        link.key = "promo".into();
        assert_eq!(link.short_link(), "https://go.example.com/promo");
    }

    #[test]
    fn test_event_row_omits_empty_conversion_fields() {
        let event = AnalyticsEvent {
            event: "click".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("invoice_id").is_none());
        assert!(json.get("workspace_id").is_none());
        assert_eq!(event.kind(), Some(EventKind::Click));
    }
}
