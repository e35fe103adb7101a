// ── Derived views ──
//
// Render-ready projections of `DashboardState`. Recomputed on every read,
// never stored.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;

use super::DashboardState;
use crate::format::fmt_speed;
use crate::model::{Alert, NetworkStatus, Severity, StatSample};

const TIME_LABEL_FORMAT: &str = "%H:%M:%S";
const FEED_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One chart point per historical sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub timestamp: DateTime<Utc>,
    /// Wall-clock label in the viewer's time zone.
    pub label: String,
    pub download: f64,
    pub upload: f64,
    pub devices: u32,
}

/// Online/offline split of the device census.
///
/// `online + offline` always equals the reported total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DevicePartition {
    pub online: u32,
    pub offline: u32,
}

impl DevicePartition {
    /// `None` when there are no devices at all. Active counts above the
    /// total are clamped to it.
    pub fn from_counts(total: u32, active: u32) -> Option<Self> {
        if total == 0 {
            return None;
        }
        let online = active.min(total);
        Some(Self {
            online,
            offline: total - online,
        })
    }

    pub fn total(&self) -> u32 {
        self.online + self.offline
    }

    /// Named slices for charting.
    pub fn slices(&self) -> [(&'static str, u32); 2] {
        [("Online", self.online), ("Offline", self.offline)]
    }
}

/// Headline figures for the status panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSummary {
    pub is_online: bool,
    pub label: &'static str,
    pub download: String,
    pub upload: String,
    pub total_devices: u32,
    pub active_devices: u32,
}

impl From<&NetworkStatus> for StatusSummary {
    fn from(status: &NetworkStatus) -> Self {
        Self {
            is_online: status.is_online,
            label: if status.is_online { "Online" } else { "Offline" },
            download: fmt_speed(status.download_speed),
            upload: fmt_speed(status.upload_speed),
            total_devices: status.total_devices,
            active_devices: status.active_devices,
        }
    }
}

/// One row of the alert feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertFeedItem {
    pub id: i64,
    pub severity: Severity,
    pub critical: bool,
    pub alert_type: String,
    pub message: String,
    pub time_label: String,
    pub device_ip: Option<String>,
}

impl AlertFeedItem {
    fn from_alert<Tz: TimeZone>(alert: &Alert, tz: &Tz) -> Self
    where
        Tz::Offset: Display,
    {
        Self {
            id: alert.id,
            severity: alert.severity,
            critical: alert.is_critical(),
            alert_type: alert.alert_type.clone(),
            message: alert.message.clone(),
            time_label: alert
                .timestamp
                .with_timezone(tz)
                .format(FEED_TIME_FORMAT)
                .to_string(),
            device_ip: alert.device_ip.clone(),
        }
    }
}

fn time_series_point<Tz: TimeZone>(sample: &StatSample, tz: &Tz) -> TimeSeriesPoint
where
    Tz::Offset: Display,
{
    TimeSeriesPoint {
        timestamp: sample.timestamp,
        label: sample
            .timestamp
            .with_timezone(tz)
            .format(TIME_LABEL_FORMAT)
            .to_string(),
        download: sample.download_speed,
        upload: sample.upload_speed,
        devices: sample.total_devices,
    }
}

// ── Derivations on the state ─────────────────────────────────────────

impl DashboardState {
    /// Time series with labels in the local time zone.
    pub fn time_series(&self) -> Vec<TimeSeriesPoint> {
        self.time_series_in(&Local)
    }

    pub fn time_series_in<Tz: TimeZone>(&self, tz: &Tz) -> Vec<TimeSeriesPoint>
    where
        Tz::Offset: Display,
    {
        self.stats
            .iter()
            .map(|sample| time_series_point(sample, tz))
            .collect()
    }

    /// Partition of the latest status, if there is one with devices.
    pub fn device_partition(&self) -> Option<DevicePartition> {
        self.status
            .as_ref()
            .and_then(|s| DevicePartition::from_counts(s.total_devices, s.active_devices))
    }

    pub fn status_summary(&self) -> Option<StatusSummary> {
        self.status.as_ref().map(StatusSummary::from)
    }

    /// Alert feed with timestamps in the local time zone.
    pub fn alert_feed(&self) -> Vec<AlertFeedItem> {
        self.alert_feed_in(&Local)
    }

    pub fn alert_feed_in<Tz: TimeZone>(&self, tz: &Tz) -> Vec<AlertFeedItem>
    where
        Tz::Offset: Display,
    {
        self.alerts
            .iter()
            .map(|alert| AlertFeedItem::from_alert(alert, tz))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::FixedOffset;
    use pretty_assertions::assert_eq;

    use super::*;

    fn status(total: u32, active: u32) -> NetworkStatus {
        NetworkStatus {
            is_online: true,
            download_speed: 1_048_576.0,
            upload_speed: 2048.0,
            total_devices: total,
            active_devices: active,
            devices: Vec::new(),
        }
    }

    fn state_with(status: Option<NetworkStatus>) -> DashboardState {
        DashboardState {
            status,
            ..DashboardState::default()
        }
    }

    #[test]
    fn partition_splits_total() {
        let p = DevicePartition::from_counts(5, 3).unwrap();
        assert_eq!(p, DevicePartition { online: 3, offline: 2 });
        assert_eq!(p.total(), 5);
        assert_eq!(p.slices(), [("Online", 3), ("Offline", 2)]);
    }

    #[test]
    fn partition_absent_without_devices() {
        assert_eq!(DevicePartition::from_counts(0, 0), None);
        assert_eq!(state_with(Some(status(0, 0))).device_partition(), None);
        assert_eq!(state_with(None).device_partition(), None);
    }

    #[test]
    fn partition_clamps_overcounted_active() {
        let p = DevicePartition::from_counts(2, 7).unwrap();
        assert_eq!(p, DevicePartition { online: 2, offline: 0 });
    }

    #[test]
    fn partition_invariant_holds() {
        for total in 0..20 {
            for active in 0..25 {
                if let Some(p) = DevicePartition::from_counts(total, active) {
                    assert_eq!(p.online + p.offline, total);
                }
            }
        }
    }

    #[test]
    fn summary_formats_rates() {
        let summary = state_with(Some(status(5, 3))).status_summary().unwrap();
        assert_eq!(summary.label, "Online");
        assert_eq!(summary.download, "1.00 MB/s");
        assert_eq!(summary.upload, "2.00 KB/s");
        assert_eq!(summary.active_devices, 3);
    }

    #[test]
    fn time_series_labels_follow_time_zone() {
        let sample = StatSample {
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 5).unwrap(),
            download_speed: 10.0,
            upload_speed: 5.0,
            total_devices: 4,
            active_devices: 2,
            network_usage: None,
            ping_latency: None,
        };
        let state = DashboardState {
            stats: vec![sample],
            ..DashboardState::default()
        };

        let utc = state.time_series_in(&Utc);
        assert_eq!(utc[0].label, "12:30:05");
        assert_eq!(utc[0].devices, 4);

        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(state.time_series_in(&plus_two)[0].label, "14:30:05");
    }

    #[test]
    fn alert_feed_flags_critical() {
        let alert = Alert {
            id: 3,
            alert_type: "network_down".into(),
            severity: Severity::Critical,
            message: "Network connectivity lost".into(),
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
            is_read: false,
            device_ip: None,
        };
        let state = DashboardState {
            alerts: vec![alert],
            ..DashboardState::default()
        };

        let feed = state.alert_feed_in(&Utc);
        assert!(feed[0].critical);
        assert_eq!(feed[0].time_label, "2026-03-01 09:00:00");
    }
}
