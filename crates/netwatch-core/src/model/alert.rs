// ── Alert domain types ──

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Number of alerts the dashboard retains.
pub const ALERT_RETENTION: usize = 5;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// An alert raised by the backend. Never mutated client-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub id: i64,
    pub alert_type: String,
    pub severity: Severity,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
    pub device_ip: Option<String>,
}

impl Alert {
    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

/// Keep the `ALERT_RETENTION` most recent alerts, newest first.
///
/// Ties on timestamp are broken by descending id.
pub fn retain_recent(mut alerts: Vec<Alert>) -> Vec<Alert> {
    alerts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
    alerts.truncate(ALERT_RETENTION);
    alerts
}
