//! Date windows for analytics queries and their plan limits

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use strum::{AsRefStr, EnumString};

use crate::errors::{LinkhubError, Result};
use crate::storage::Plan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, AsRefStr, EnumString)]
pub enum Interval {
    #[default]
    #[serde(rename = "24h")]
    #[strum(serialize = "24h")]
    Day,
    #[serde(rename = "7d")]
    #[strum(serialize = "7d")]
    Week,
    #[serde(rename = "30d")]
    #[strum(serialize = "30d")]
    Month,
    #[serde(rename = "90d")]
    #[strum(serialize = "90d")]
    Quarter,
    #[serde(rename = "ytd")]
    #[strum(serialize = "ytd")]
    YearToDate,
    #[serde(rename = "1y")]
    #[strum(serialize = "1y")]
    Year,
    #[serde(rename = "all")]
    #[strum(serialize = "all")]
    All,
}

impl Interval {
    /// Start of the preset window ending at `now`
    pub fn start_from(&self, now: DateTime<Utc>, workspace_created: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Interval::Day => now - Duration::hours(24),
            Interval::Week => now - Duration::days(7),
            Interval::Month => now - Duration::days(30),
            Interval::Quarter => now - Duration::days(90),
            Interval::YearToDate => Utc
                .with_ymd_and_hms(now.year(), 1, 1, 0, 0, 0)
                .single()
                .unwrap_or(now),
            Interval::Year => now - Duration::days(365),
            Interval::All => workspace_created.min(now),
        }
    }
}

/// Parse `start`/`end` values: RFC3339 or a bare `YYYY-MM-DD` (midnight UTC)
pub fn parse_datetime(field: &str, value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| {
            LinkhubError::validation(format!(
                "Invalid `{}`: '{}'. Use RFC3339 (e.g. 2024-01-01T00:00:00Z) or YYYY-MM-DD.",
                field, value
            ))
        })
}

/// Effective `[start, end]` window of a query
pub fn resolve_window(
    interval: Interval,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    workspace_created: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let (start, end) = match start {
        Some(start) => (start, end.unwrap_or(now)),
        None => (interval.start_from(now, workspace_created), now),
    };
    if start > end {
        return Err(LinkhubError::validation(
            "`start` must be earlier than `end`.",
        ));
    }
    Ok((start, end))
}

/// Reject windows longer than the plan keeps history for
pub fn valid_date_range_for_plan(
    plan: Plan,
    interval: Option<Interval>,
    start: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<()> {
    let days_back = start.map(|s| (now - s).num_days());

    match plan {
        Plan::Free => {
            let long_interval = matches!(
                interval,
                Some(Interval::All | Interval::Quarter | Interval::YearToDate | Interval::Year)
            );
            if long_interval || days_back.is_some_and(|d| d > 31) {
                return Err(LinkhubError::forbidden(
                    "You can only get analytics for up to 30 days on a Free plan. Upgrade to Pro or Business to get analytics for longer periods.",
                ));
            }
        }
        Plan::Pro => {
            if interval == Some(Interval::All) || days_back.is_some_and(|d| d > 366) {
                return Err(LinkhubError::forbidden(
                    "You can only get analytics for up to 1 year on a Pro plan. Upgrade to Business to get analytics for longer periods.",
                ));
            }
        }
        Plan::Business | Plan::Enterprise => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_interval_parsing() {
        assert_eq!("24h".parse::<Interval>().unwrap(), Interval::Day);
        assert_eq!("ytd".parse::<Interval>().unwrap(), Interval::YearToDate);
        assert!("2w".parse::<Interval>().is_err());
        assert_eq!(Interval::Year.as_ref(), "1y");
    }

    #[test]
    fn test_preset_windows() {
        let created = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(
            Interval::Week.start_from(now(), created),
            now() - Duration::days(7)
        );
        assert_eq!(
            Interval::YearToDate.start_from(now(), created),
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(Interval::All.start_from(now(), created), created);
    }

    #[test]
    fn test_parse_datetime_formats() {
        assert_eq!(
            parse_datetime("start", "2026-03-01").unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_datetime("end", "2026-03-01T10:00:00+02:00").unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()
        );
        assert!(parse_datetime("start", "yesterday").is_err());
    }

    #[test]
    fn test_resolve_window_rejects_inverted_range() {
        let created = now() - Duration::days(400);
        let start = Some(now() - Duration::days(1));
        let end = Some(now() - Duration::days(2));
        assert!(resolve_window(Interval::Day, start, end, created, now()).is_err());

        let (s, e) = resolve_window(Interval::Day, start, None, created, now()).unwrap();
        assert_eq!(s, now() - Duration::days(1));
        assert_eq!(e, now());
    }

    #[test]
    fn test_free_plan_limits() {
        assert!(valid_date_range_for_plan(Plan::Free, Some(Interval::Month), None, now()).is_ok());
        assert!(valid_date_range_for_plan(Plan::Free, Some(Interval::Quarter), None, now()).is_err());
        let err =
            valid_date_range_for_plan(Plan::Free, None, Some(now() - Duration::days(40)), now())
                .unwrap_err();
        assert!(err.message().contains("30 days on a Free plan"));
    }

    #[test]
    fn test_pro_and_business_limits() {
        assert!(valid_date_range_for_plan(Plan::Pro, Some(Interval::Year), None, now()).is_ok());
        assert!(valid_date_range_for_plan(Plan::Pro, Some(Interval::All), None, now()).is_err());
        assert!(
            valid_date_range_for_plan(Plan::Pro, None, Some(now() - Duration::days(400)), now())
                .is_err()
        );
        assert!(valid_date_range_for_plan(Plan::Business, Some(Interval::All), None, now()).is_ok());
    }
}
