// ── Historical stats ──

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One historical sample. Immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatSample {
    pub timestamp: DateTime<Utc>,
    pub download_speed: f64,
    pub upload_speed: f64,
    pub total_devices: u32,
    pub active_devices: u32,
    pub network_usage: Option<f64>,
    pub ping_latency: Option<f64>,
}

/// Put server-ordered samples (newest first) into chronological order.
///
/// Reverses first, then stable-sorts by timestamp so the result is
/// ascending even if the server breaks its ordering contract. Samples with
/// equal timestamps keep their reversed relative order.
pub fn chronological(mut newest_first: Vec<StatSample>) -> Vec<StatSample> {
    newest_first.reverse();
    newest_first.sort_by_key(|sample| sample.timestamp);
    newest_first
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample(minute: u32, download: f64) -> StatSample {
        StatSample {
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 12, minute, 0).unwrap(),
            download_speed: download,
            upload_speed: 0.0,
            total_devices: 1,
            active_devices: 1,
            network_usage: None,
            ping_latency: None,
        }
    }

    fn minutes(samples: &[StatSample]) -> Vec<u32> {
        use chrono::Timelike;
        samples.iter().map(|s| s.timestamp.minute()).collect()
    }

    #[test]
    fn newest_first_becomes_ascending() {
        let ordered = chronological(vec![sample(3, 0.0), sample(2, 0.0), sample(1, 0.0)]);
        assert_eq!(minutes(&ordered), vec![1, 2, 3]);
    }

    #[test]
    fn out_of_contract_order_is_still_sorted() {
        let ordered = chronological(vec![sample(2, 0.0), sample(5, 0.0), sample(1, 0.0)]);
        assert_eq!(minutes(&ordered), vec![1, 2, 5]);
    }

    #[test]
    fn equal_timestamps_keep_reversed_order() {
        let ordered = chronological(vec![sample(1, 20.0), sample(1, 10.0)]);
        let downloads: Vec<f64> = ordered.iter().map(|s| s.download_speed).collect();
        assert_eq!(downloads, vec![10.0, 20.0]);
    }
}
