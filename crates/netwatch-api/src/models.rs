// Wire types for the monitor backend's REST and live-feed payloads.
//
// Every record is a closed struct with explicit required fields. Collections
// decode leniently through `Decoded<T>`: an element missing a required field
// is quarantined (counted and logged) instead of failing the whole payload.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};

// ── Network status ──────────────────────────────────────────────────

/// A device seen on the monitored network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub ip: String,
    pub is_online: bool,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub connection_type: Option<String>,
}

/// Full status snapshot, as returned by `GET /api/network/status` and
/// carried by every `network_data` live event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NetworkStatusRecord {
    pub is_online: bool,
    /// Bytes per second.
    pub download_speed: f64,
    /// Bytes per second.
    pub upload_speed: f64,
    pub total_devices: u32,
    pub active_devices: u32,
    #[serde(default)]
    pub devices: Decoded<DeviceRecord>,
}

// ── Historical stats ────────────────────────────────────────────────

/// One historical sample from `GET /api/network/stats`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatRecord {
    #[serde(deserialize_with = "de_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub download_speed: f64,
    pub upload_speed: f64,
    pub total_devices: u32,
    pub active_devices: u32,
    #[serde(default)]
    pub network_usage: Option<f64>,
    #[serde(default)]
    pub ping_latency: Option<f64>,
}

// ── Alerts ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    #[serde(alias = "informational")]
    Info,
    Warning,
    Critical,
}

/// One alert from `GET /api/alerts`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AlertRecord {
    pub id: i64,
    #[serde(rename = "type")]
    pub alert_type: String,
    pub severity: AlertSeverity,
    pub message: String,
    #[serde(deserialize_with = "de_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub device_ip: Option<String>,
}

// ── Lenient collections ─────────────────────────────────────────────

/// A decoded collection with malformed elements quarantined.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub items: Vec<T>,
    /// Number of elements dropped because they failed to decode.
    pub rejected: usize,
}

impl<T> Default for Decoded<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            rejected: 0,
        }
    }
}

impl<T: DeserializeOwned> Decoded<T> {
    /// Decode each element independently, keeping the ones that parse.
    pub fn from_values(values: Vec<serde_json::Value>) -> Self {
        let mut items = Vec::with_capacity(values.len());
        let mut rejected = 0;

        for (index, value) in values.into_iter().enumerate() {
            match serde_json::from_value::<T>(value) {
                Ok(item) => items.push(item),
                Err(e) => {
                    rejected += 1;
                    tracing::warn!(
                        index,
                        error = %e,
                        record = short_type_name::<T>(),
                        "quarantined malformed record"
                    );
                }
            }
        }

        Self { items, rejected }
    }
}

impl<T> Decoded<T> {
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Decoded<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // `null` decodes as an empty collection.
        let values = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
        Ok(Self::from_values(values.unwrap_or_default()))
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

// ── Timestamps ──────────────────────────────────────────────────────

/// Parse a backend timestamp.
///
/// Accepts RFC 3339 and the SQL `YYYY-MM-DD HH:MM:SS[.fff]` form the
/// backend's database emits (UTC, no offset), with either a space or `T`
/// separator.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn de_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognized timestamp: {raw:?}")))
}

// ── Tests ────────────────────────────────────────────────────────────
