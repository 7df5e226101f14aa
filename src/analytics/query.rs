//! Query-string model shared by the events listing and export

use chrono::{DateTime, Utc};
use serde::Deserialize;
use strum::{AsRefStr, EnumString};

use super::interval::{Interval, parse_datetime, resolve_window};
use crate::config::AnalyticsConfig;
use crate::errors::{LinkhubError, Result};
use crate::storage::{EventFilter, EventKind, EventOrder, Workspace};

/// Event family requested by the caller (`clicks`, `leads`, `sales`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum EventType {
    #[default]
    Clicks,
    Leads,
    Sales,
}

impl EventType {
    pub fn kind(&self) -> EventKind {
        match self {
            EventType::Clicks => EventKind::Click,
            EventType::Leads => EventKind::Lead,
            EventType::Sales => EventKind::Sale,
        }
    }
}

/// Raw query parameters; every value is validated by [`EventsQuery::parse`]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsQuery {
    pub event: Option<String>,
    pub domain: Option<String>,
    pub key: Option<String>,
    pub link_id: Option<String>,
    pub interval: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub device: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
    pub referer: Option<String>,
    pub qr: Option<String>,
    pub root: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub order: Option<String>,
    /// Export only
    pub columns: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EventsParams {
    pub event: EventType,
    pub domain: Option<String>,
    pub key: Option<String>,
    pub link_id: Option<String>,
    /// `None` when the caller sent no interval
    pub interval: Option<Interval>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub device: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
    pub referer: Option<String>,
    pub qr: Option<bool>,
    pub root: Option<bool>,
    pub page: u64,
    pub limit: Option<u64>,
    pub order: EventOrder,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_enum<T: std::str::FromStr>(field: &str, value: &Option<String>) -> Result<Option<T>> {
    match non_empty(value) {
        None => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| LinkhubError::validation(format!("Invalid `{}`: '{}'.", field, v))),
    }
}

pub(crate) fn parse_bool(field: &str, value: &Option<String>) -> Result<Option<bool>> {
    match non_empty(value).as_deref() {
        None => Ok(None),
        Some("true") | Some("1") => Ok(Some(true)),
        Some("false") | Some("0") => Ok(Some(false)),
        Some(other) => Err(LinkhubError::validation(format!(
            "Invalid `{}`: '{}'. Expected true or false.",
            field, other
        ))),
    }
}

fn parse_number(field: &str, value: &Option<String>) -> Result<Option<u64>> {
    match non_empty(value) {
        None => Ok(None),
        Some(v) => v.parse::<u64>().map(Some).map_err(|_| {
            LinkhubError::validation(format!("Invalid `{}`: '{}'. Expected a number.", field, v))
        }),
    }
}

impl EventsQuery {
    pub fn parse(&self) -> Result<EventsParams> {
        let start = non_empty(&self.start)
            .map(|s| parse_datetime("start", &s))
            .transpose()?;
        let end = non_empty(&self.end)
            .map(|s| parse_datetime("end", &s))
            .transpose()?;

        let page = parse_number("page", &self.page)?.unwrap_or(1);
        if page == 0 {
            return Err(LinkhubError::validation("`page` must be at least 1."));
        }

        Ok(EventsParams {
            event: parse_enum("event", &self.event)?.unwrap_or_default(),
            domain: non_empty(&self.domain).map(|d| d.to_lowercase()),
            key: non_empty(&self.key),
            link_id: non_empty(&self.link_id),
            interval: parse_enum("interval", &self.interval)?,
            start,
            end,
            country: non_empty(&self.country),
            city: non_empty(&self.city),
            device: non_empty(&self.device),
            browser: non_empty(&self.browser),
            os: non_empty(&self.os),
            referer: non_empty(&self.referer),
            qr: parse_bool("qr", &self.qr)?,
            root: parse_bool("root", &self.root)?,
            page,
            limit: parse_number("limit", &self.limit)?,
            order: parse_enum("order", &self.order)?.unwrap_or_default(),
        })
    }
}

impl EventsParams {
    /// Storage filter for `workspace`, with `link_id` overriding the query's own
    pub fn to_filter(
        &self,
        workspace: &Workspace,
        link_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<EventFilter> {
        let (start, end) = resolve_window(
            self.interval.unwrap_or_default(),
            self.start,
            self.end,
            workspace.created_at,
            now,
        )?;

        let mut filter = EventFilter::new(workspace.id.clone(), self.event.kind(), start, end);
        filter.link_id = link_id;
        filter.domain = self.domain.clone();
        filter.key = self.key.clone();
        filter.country = self.country.clone();
        filter.city = self.city.clone();
        filter.device = self.device.clone();
        filter.browser = self.browser.clone();
        filter.os = self.os.clone();
        filter.referer = self.referer.clone();
        filter.qr = self.qr;
        filter.root = self.root;
        filter.order = self.order;
        Ok(filter)
    }

    /// Page size clamped to the configured maximum
    pub fn page_limit(&self, config: &AnalyticsConfig) -> u64 {
        self.limit
            .unwrap_or(config.events_default_limit)
            .clamp(1, config.events_max_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> EventsQuery {
        let encoded = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        actix_web::web::Query::<EventsQuery>::from_query(&encoded)
            .unwrap()
            .into_inner()
    }

    #[test]
    fn test_defaults() {
        let params = EventsQuery::default().parse().unwrap();
        assert_eq!(params.event, EventType::Clicks);
        assert_eq!(params.interval, None);
        assert_eq!(params.order, EventOrder::Desc);
        assert_eq!(params.page, 1);
    }

    #[test]
    fn test_typed_values() {
        let params = query(&[
            ("event", "sales"),
            ("interval", "90d"),
            ("linkId", "link_abc"),
            ("qr", "true"),
            ("order", "asc"),
            ("domain", "Go.Example.com"),
        ])
        .parse()
        .unwrap();
        assert_eq!(params.event.kind(), EventKind::Sale);
        assert_eq!(params.interval, Some(Interval::Quarter));
        assert_eq!(params.link_id.as_deref(), Some("link_abc"));
        assert_eq!(params.qr, Some(true));
        assert_eq!(params.order, EventOrder::Asc);
        assert_eq!(params.domain.as_deref(), Some("go.example.com"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(query(&[("event", "views")]).parse().is_err());
        assert!(query(&[("interval", "2w")]).parse().is_err());
        assert!(query(&[("start", "not-a-date")]).parse().is_err());
        assert!(query(&[("qr", "maybe")]).parse().is_err());
        assert!(query(&[("limit", "-1")]).parse().is_err());
    }

    #[test]
    fn test_page_limit_is_clamped() {
        let config = AnalyticsConfig::default();
        let params = query(&[("limit", "50000")]).parse().unwrap();
        assert_eq!(params.page_limit(&config), config.events_max_limit);
        let params = EventsQuery::default().parse().unwrap();
        assert_eq!(params.page_limit(&config), config.events_default_limit);
    }
}
