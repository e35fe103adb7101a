// ── Snapshot fetcher ──
//
// Issues the three snapshot requests concurrently and reports each result
// on its own. One failing request never blocks or discards the others;
// deciding what to apply is the dashboard's job.

use netwatch_api::{ApiClient, Error as ApiError};
use tracing::debug;

use crate::model::alert::retain_recent;
use crate::model::stats::chronological;
use crate::model::{Alert, NetworkStatus, StatSample};

/// Independent results of one snapshot fetch.
///
/// Stats are already chronological and alerts already truncated to the
/// most recent few, newest first.
#[derive(Debug)]
pub struct SnapshotBatch {
    pub status: Result<NetworkStatus, ApiError>,
    pub stats: Result<Vec<StatSample>, ApiError>,
    pub alerts: Result<Vec<Alert>, ApiError>,
}

impl SnapshotBatch {
    /// `true` if any request was rejected for lack of a valid session.
    pub fn is_unauthorized(&self) -> bool {
        self.failures().any(|(_, err)| err.is_auth_expired())
    }

    /// The failed slices, by name.
    pub fn failures(&self) -> impl Iterator<Item = (&'static str, &ApiError)> {
        [
            ("status", self.status.as_ref().err()),
            ("stats", self.stats.as_ref().err()),
            ("alerts", self.alerts.as_ref().err()),
        ]
        .into_iter()
        .filter_map(|(slice, err)| err.map(|e| (slice, e)))
    }
}

/// Authenticated one-shot retrieval of status, stats and alerts.
#[derive(Clone)]
pub struct SnapshotFetcher {
    client: ApiClient,
}

impl SnapshotFetcher {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Fetch all three slices concurrently.
    pub async fn fetch_all(&self) -> SnapshotBatch {
        let (status, stats, alerts) = tokio::join!(
            self.fetch_status(),
            self.fetch_stats(),
            self.fetch_alerts(),
        );

        debug!(
            status_ok = status.is_ok(),
            stats_ok = stats.is_ok(),
            alerts_ok = alerts.is_ok(),
            "snapshot fetch settled"
        );

        SnapshotBatch {
            status,
            stats,
            alerts,
        }
    }

    pub async fn fetch_status(&self) -> Result<NetworkStatus, ApiError> {
        let record = self.client.network_status().await?;
        Ok(record.into())
    }

    /// Historical samples in chronological order.
    pub async fn fetch_stats(&self) -> Result<Vec<StatSample>, ApiError> {
        let decoded = self.client.network_stats().await?;
        let samples = decoded.into_items().into_iter().map(StatSample::from).collect();
        Ok(chronological(samples))
    }

    /// The most recent alerts, newest first.
    pub async fn fetch_alerts(&self) -> Result<Vec<Alert>, ApiError> {
        let decoded = self.client.alerts().await?;
        let alerts = decoded.into_items().into_iter().map(Alert::from).collect();
        Ok(retain_recent(alerts))
    }
}
