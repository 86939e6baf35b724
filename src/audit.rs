use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;

use crate::api::{decode_list, Backend, AUDIT_LOGS_PATH};
use crate::error::{Result, SalaryGenError};
use crate::report::Id;

/// Logs shown when no date filter is given
pub const RECENT_LOGS: usize = 5;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub entity_name: Option<String>,
    #[serde(default)]
    pub entity_id: Option<Value>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl AuditLog {
    pub fn recorded_at(&self) -> Option<NaiveDateTime> {
        self.timestamp.as_deref().and_then(parse_timestamp)
    }

    pub fn entity_id(&self) -> Option<String> {
        self.entity_id
            .as_ref()
            .and_then(Id::from_value)
            .map(|id| id.to_string())
    }
}

/// RFC 3339, ISO local date-time, or a bare date
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Date filter for the audit log screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditFilter {
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub day: Option<u32>,
}

impl AuditFilter {
    pub fn is_empty(&self) -> bool {
        self.month.is_none() && self.year.is_none() && self.day.is_none()
    }

    /// Any filter needs both month and year
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() || (self.month.is_some() && self.year.is_some()) {
            Ok(())
        } else {
            Err(SalaryGenError::InvalidAuditFilter)
        }
    }

    fn matches(&self, log: &AuditLog) -> bool {
        let Some(at) = log.recorded_at() else {
            return false;
        };
        self.month.map_or(true, |m| at.month() == m)
            && self.year.map_or(true, |y| at.year() == y)
            && self.day.map_or(true, |d| at.day() == d)
    }

    pub fn heading(&self) -> String {
        match (self.day, self.month, self.year) {
            (_, None, _) | (_, _, None) => "RECENT LOGS".to_string(),
            (Some(d), Some(m), Some(y)) => format!("LOGS ON : {d}/{m}/{y}"),
            (None, Some(m), Some(y)) => format!("LOGS ON : {m}/{y}"),
        }
    }
}

/// Newest first; logs without a readable timestamp go last
pub fn sort_newest_first(logs: &mut [AuditLog]) {
    logs.sort_by(|a, b| b.recorded_at().cmp(&a.recorded_at()));
}

/// The logs to show for `filter`: the most recent few, or every match
pub fn select_logs(mut logs: Vec<AuditLog>, filter: &AuditFilter) -> Result<Vec<AuditLog>> {
    filter.validate()?;
    sort_newest_first(&mut logs);
    if filter.is_empty() {
        logs.truncate(RECENT_LOGS);
        return Ok(logs);
    }
    Ok(logs.into_iter().filter(|log| filter.matches(log)).collect())
}

pub fn fetch_audit_logs(backend: &dyn Backend) -> Result<Vec<AuditLog>> {
    decode_list(AUDIT_LOGS_PATH, backend.get(AUDIT_LOGS_PATH)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn logs() -> Vec<AuditLog> {
        serde_json::from_value(json!([
            {"username": "admin", "action": "LOGIN", "timestamp": "2025-03-01T09:00:00"},
            {"username": "hr", "action": "GENERATE", "timestamp": "2025-03-14T10:30:00Z"},
            {"username": "hr", "action": "UPDATE", "timestamp": "garbage"},
            {"username": "admin", "action": "DELETE", "timestamp": "2025-02-14T08:00:00.123"},
            {"action": "LOGIN", "timestamp": "2025-03-14"},
            {"action": "LOGIN", "timestamp": "2025-01-02T00:00:00"},
            {"action": "LOGIN", "timestamp": "2024-12-31T23:59:59"}
        ]))
        .unwrap()
    }

    #[test]
    fn unfiltered_shows_five_newest() {
        let shown = select_logs(logs(), &AuditFilter::default()).unwrap();
        assert_eq!(shown.len(), RECENT_LOGS);
        assert_eq!(shown[0].action.as_deref(), Some("GENERATE"));
        assert_eq!(shown[1].timestamp.as_deref(), Some("2025-03-14"));
        assert!(shown.iter().all(|l| l.recorded_at().is_some()));
    }

    #[test]
    fn month_and_year_filter() {
        let filter = AuditFilter {
            month: Some(3),
            year: Some(2025),
            day: None,
        };
        assert_eq!(select_logs(logs(), &filter).unwrap().len(), 3);
        assert_eq!(filter.heading(), "LOGS ON : 3/2025");

        let day = AuditFilter {
            day: Some(14),
            ..filter
        };
        assert_eq!(select_logs(logs(), &day).unwrap().len(), 2);
        assert_eq!(day.heading(), "LOGS ON : 14/3/2025");
    }

    #[test]
    fn partial_filter_is_rejected() {
        let filter = AuditFilter {
            month: Some(3),
            year: None,
            day: Some(1),
        };
        assert!(matches!(
            select_logs(logs(), &filter),
            Err(SalaryGenError::InvalidAuditFilter)
        ));
        assert_eq!(AuditFilter::default().heading(), "RECENT LOGS");
    }

    #[test]
    fn numeric_entity_ids_are_shown() {
        let log: AuditLog = serde_json::from_value(json!({"entityId": 42})).unwrap();
        assert_eq!(log.entity_id().as_deref(), Some("42"));
    }
}
