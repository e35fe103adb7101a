// ── Dashboard store ──
//
// One `watch` channel holds the whole state behind an `Arc`. Every
// transition is a single `send_modify`/`send_if_modified`, so readers see
// either the state before an update or after it, never a mix of sources.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::config::StatusPolicy;
use crate::fetcher::SnapshotBatch;
use crate::model::{Alert, NetworkStatus, StatSample};
use crate::stream::DashboardStream;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display)]
pub enum LoadPhase {
    /// Not activated.
    #[default]
    Initial,
    /// Activated, first snapshot fetch still in flight.
    Loading,
    /// First snapshot fetch settled.
    Ready,
}

/// Where the current status came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UpdateSource {
    Fetch,
    Push,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateMeta {
    /// Bumped on every status change. Monotonic across activations.
    pub revision: u64,
    pub source: Option<UpdateSource>,
    pub updated_at: Option<DateTime<Utc>>,
    pub stats_refreshed_at: Option<DateTime<Utc>>,
}

/// Everything the dashboard knows at one instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub phase: LoadPhase,
    pub status: Option<NetworkStatus>,
    /// Chronological.
    pub stats: Vec<StatSample>,
    /// Newest first, at most `ALERT_RETENTION`.
    pub alerts: Vec<Alert>,
    pub meta: StateMeta,
}

impl DashboardState {
    pub fn is_ready(&self) -> bool {
        self.phase == LoadPhase::Ready
    }
}

/// Status revision observed when a fetch was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTicket {
    revision: u64,
}

/// Owner of the dashboard state.
pub struct DashboardStore {
    state: watch::Sender<Arc<DashboardState>>,
}

impl DashboardStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(Arc::new(DashboardState::default()));
        Self { state }
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Arc<DashboardState> {
        Arc::clone(&self.state.borrow())
    }

    pub fn phase(&self) -> LoadPhase {
        self.state.borrow().phase
    }

    pub fn subscribe(&self) -> DashboardStream {
        DashboardStream::new(self.state.subscribe())
    }

    /// Take a ticket before issuing a status fetch.
    pub fn status_ticket(&self) -> StatusTicket {
        StatusTicket {
            revision: self.state.borrow().meta.revision,
        }
    }

    // ── Lifecycle transitions ────────────────────────────────────────

    /// Initial -> Loading. Clears data left over from a previous activation.
    pub fn begin_loading(&self) {
        self.state.send_modify(|state| {
            let s = Arc::make_mut(state);
            let revision = s.meta.revision;
            *s = DashboardState {
                phase: LoadPhase::Loading,
                meta: StateMeta {
                    revision,
                    ..StateMeta::default()
                },
                ..DashboardState::default()
            };
        });
    }

    /// Back to Initial, dropping everything an activation gathered.
    ///
    /// Used when the session is rejected: nothing learned under it stays
    /// readable.
    pub fn discard(&self) {
        self.state.send_modify(|state| {
            let revision = state.meta.revision;
            *state = Arc::new(DashboardState {
                meta: StateMeta {
                    revision,
                    ..StateMeta::default()
                },
                ..DashboardState::default()
            });
        });
    }

    /// Back to Initial. Data stays readable until the next activation.
    pub fn reset(&self) {
        self.state.send_if_modified(|state| {
            if state.phase == LoadPhase::Initial {
                return false;
            }
            Arc::make_mut(state).phase = LoadPhase::Initial;
            true
        });
    }

    // ── Data transitions ─────────────────────────────────────────────

    /// Apply a settled snapshot fetch and move to Ready.
    ///
    /// Failed slices keep their previous value; failures are logged. The
    /// caller handles authorization failures before getting here.
    pub fn apply_snapshot(&self, batch: SnapshotBatch, ticket: StatusTicket, policy: StatusPolicy) {
        for (slice, err) in batch.failures() {
            warn!(slice, error = %err, "snapshot slice unavailable, keeping previous value");
        }

        let SnapshotBatch {
            status,
            stats,
            alerts,
        } = batch;

        self.state.send_modify(|state| {
            let s = Arc::make_mut(state);
            if let Ok(status) = status {
                apply_fetched_status(s, status, ticket, policy);
            }
            if let Ok(stats) = stats {
                s.stats = stats;
                s.meta.stats_refreshed_at = Some(Utc::now());
            }
            if let Ok(alerts) = alerts {
                s.alerts = alerts;
            }
            s.phase = LoadPhase::Ready;
        });
    }

    /// Replace the status with a live push. Returns `false` if it equals
    /// the current status (no revision bump, no notification).
    pub fn apply_push(&self, status: NetworkStatus) -> bool {
        self.state.send_if_modified(|state| {
            if state.status.as_ref() == Some(&status) {
                return false;
            }
            replace_status(Arc::make_mut(state), status, UpdateSource::Push);
            true
        })
    }

    /// Replace historical stats (already chronological).
    pub fn apply_stats(&self, stats: Vec<StatSample>) {
        self.state.send_modify(|state| {
            let s = Arc::make_mut(state);
            s.stats = stats;
            s.meta.stats_refreshed_at = Some(Utc::now());
        });
    }
}

impl Default for DashboardStore {
    fn default() -> Self {
        Self::new()
    }
}

// ── Transition helpers ───────────────────────────────────────────────

fn replace_status(state: &mut DashboardState, status: NetworkStatus, source: UpdateSource) {
    state.status = Some(status);
    state.meta.revision += 1;
    state.meta.source = Some(source);
    state.meta.updated_at = Some(Utc::now());
    debug!(revision = state.meta.revision, %source, "status replaced");
}

fn apply_fetched_status(
    state: &mut DashboardState,
    status: NetworkStatus,
    ticket: StatusTicket,
    policy: StatusPolicy,
) {
    if state.status.as_ref() == Some(&status) {
        return;
    }
    if policy == StatusPolicy::RejectStaleFetch && state.meta.revision > ticket.revision {
        debug!(
            issued_at = ticket.revision,
            current = state.meta.revision,
            "discarding fetched status older than a live push"
        );
        return;
    }
    replace_status(state, status, UpdateSource::Fetch);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use netwatch_api::Error as ApiError;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::Severity;

    fn status(active: u32) -> NetworkStatus {
        NetworkStatus {
            is_online: true,
            download_speed: 100.0,
            upload_speed: 50.0,
            total_devices: 5,
            active_devices: active,
            devices: Vec::new(),
        }
    }

    fn sample(minute: u32) -> StatSample {
        StatSample {
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 12, minute, 0).unwrap(),
            download_speed: 1.0,
            upload_speed: 1.0,
            total_devices: 5,
            active_devices: 3,
            network_usage: None,
            ping_latency: None,
        }
    }

    fn alert(id: i64) -> Alert {
        Alert {
            id,
            alert_type: "network_up".into(),
            severity: Severity::Info,
            message: "Network connectivity restored".into(),
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap(),
            is_read: true,
            device_ip: None,
        }
    }

    fn ok_batch(active: u32) -> SnapshotBatch {
        SnapshotBatch {
            status: Ok(status(active)),
            stats: Ok(vec![sample(1), sample(2)]),
            alerts: Ok(vec![alert(1)]),
        }
    }

    #[test]
    fn starts_initial_and_empty() {
        let store = DashboardStore::new();
        let state = store.snapshot();
        assert_eq!(state.phase, LoadPhase::Initial);
        assert!(state.status.is_none());
        assert!(state.stats.is_empty());
    }

    #[test]
    fn loading_then_ready_on_snapshot() {
        let store = DashboardStore::new();
        store.begin_loading();
        assert_eq!(store.phase(), LoadPhase::Loading);

        let ticket = store.status_ticket();
        store.apply_snapshot(ok_batch(3), ticket, StatusPolicy::LastWriteWins);

        let state = store.snapshot();
        assert_eq!(state.phase, LoadPhase::Ready);
        assert_eq!(state.status.as_ref().unwrap().active_devices, 3);
        assert_eq!(state.stats.len(), 2);
        assert_eq!(state.alerts.len(), 1);
        assert_eq!(state.meta.source, Some(UpdateSource::Fetch));
        assert!(state.meta.stats_refreshed_at.is_some());
    }

    #[test]
    fn failed_slices_keep_previous_value() {
        let store = DashboardStore::new();
        store.begin_loading();
        let ticket = store.status_ticket();
        store.apply_snapshot(
            SnapshotBatch {
                status: Ok(status(2)),
                stats: Err(ApiError::Api {
                    status: 500,
                    message: "db".into(),
                }),
                alerts: Err(ApiError::Timeout { timeout_secs: 30 }),
            },
            ticket,
            StatusPolicy::LastWriteWins,
        );

        let state = store.snapshot();
        assert_eq!(state.phase, LoadPhase::Ready);
        assert!(state.status.is_some());
        assert!(state.stats.is_empty());
        assert!(state.alerts.is_empty());
        assert!(state.meta.stats_refreshed_at.is_none());
    }

    #[test]
    fn total_failure_still_reaches_ready() {
        let store = DashboardStore::new();
        store.begin_loading();
        let ticket = store.status_ticket();
        store.apply_snapshot(
            SnapshotBatch {
                status: Err(ApiError::Timeout { timeout_secs: 30 }),
                stats: Err(ApiError::Timeout { timeout_secs: 30 }),
                alerts: Err(ApiError::Timeout { timeout_secs: 30 }),
            },
            ticket,
            StatusPolicy::LastWriteWins,
        );
        let state = store.snapshot();
        assert_eq!(state.phase, LoadPhase::Ready);
        assert!(state.status.is_none());
    }

    #[test]
    fn push_before_fetch_is_kept_then_overwritten() {
        let store = DashboardStore::new();
        store.begin_loading();
        let ticket = store.status_ticket();

        assert!(store.apply_push(status(4)));
        assert_eq!(store.snapshot().phase, LoadPhase::Loading);
        assert_eq!(store.snapshot().status.as_ref().unwrap().active_devices, 4);

        store.apply_snapshot(ok_batch(1), ticket, StatusPolicy::LastWriteWins);
        let state = store.snapshot();
        assert_eq!(state.status.as_ref().unwrap().active_devices, 1);
        assert_eq!(state.meta.source, Some(UpdateSource::Fetch));
    }

    #[test]
    fn push_after_fetch_wins() {
        let store = DashboardStore::new();
        store.begin_loading();
        let ticket = store.status_ticket();
        store.apply_snapshot(ok_batch(1), ticket, StatusPolicy::LastWriteWins);

        assert!(store.apply_push(status(4)));
        let state = store.snapshot();
        assert_eq!(state.phase, LoadPhase::Ready);
        assert_eq!(state.status.as_ref().unwrap().active_devices, 4);
        assert_eq!(state.meta.source, Some(UpdateSource::Push));
    }

    #[test]
    fn stale_fetch_rejected_when_opted_in() {
        let store = DashboardStore::new();
        store.begin_loading();
        let ticket = store.status_ticket();

        store.apply_push(status(4));
        store.apply_snapshot(ok_batch(1), ticket, StatusPolicy::RejectStaleFetch);

        let state = store.snapshot();
        assert_eq!(state.status.as_ref().unwrap().active_devices, 4);
        assert_eq!(state.meta.source, Some(UpdateSource::Push));
        // Other slices are still applied.
        assert_eq!(state.stats.len(), 2);
        assert_eq!(state.phase, LoadPhase::Ready);
    }

    #[test]
    fn fresh_fetch_accepted_under_guard() {
        let store = DashboardStore::new();
        store.begin_loading();
        let ticket = store.status_ticket();
        store.apply_snapshot(ok_batch(2), ticket, StatusPolicy::RejectStaleFetch);

        let state = store.snapshot();
        assert_eq!(state.meta.revision, 1);
        assert_eq!(state.meta.source, Some(UpdateSource::Fetch));
    }

    #[test]
    fn equal_fetched_status_keeps_revision() {
        let store = DashboardStore::new();
        store.begin_loading();
        store.apply_push(status(2));

        let ticket = store.status_ticket();
        store.apply_snapshot(ok_batch(2), ticket, StatusPolicy::LastWriteWins);

        let state = store.snapshot();
        assert_eq!(state.meta.revision, 1);
        assert_eq!(state.meta.source, Some(UpdateSource::Push));
    }

    #[test]
    fn discard_drops_early_pushes() {
        let store = DashboardStore::new();
        store.begin_loading();
        store.apply_push(status(4));
        store.discard();

        let state = store.snapshot();
        assert_eq!(state.phase, LoadPhase::Initial);
        assert!(state.status.is_none());
        assert!(state.meta.source.is_none());
        assert_eq!(state.meta.revision, 1);
    }

    #[test]
    fn equal_push_is_a_no_op() {
        let store = DashboardStore::new();
        let mut rx = store.subscribe();

        assert!(store.apply_push(status(3)));
        let revision = store.snapshot().meta.revision;
        assert!(rx.has_changed());
        rx.mark_seen();

        assert!(!store.apply_push(status(3)));
        assert_eq!(store.snapshot().meta.revision, revision);
        assert!(!rx.has_changed());
    }

    #[test]
    fn reactivation_clears_data_but_keeps_revision() {
        let store = DashboardStore::new();
        store.begin_loading();
        store.apply_push(status(3));
        store.reset();

        let state = store.snapshot();
        assert_eq!(state.phase, LoadPhase::Initial);
        assert!(state.status.is_some());

        store.begin_loading();
        let state = store.snapshot();
        assert!(state.status.is_none());
        assert_eq!(state.meta.revision, 1);
    }

    #[test]
    fn stats_refresh_leaves_phase_and_status() {
        let store = DashboardStore::new();
        store.begin_loading();
        let ticket = store.status_ticket();
        store.apply_snapshot(ok_batch(2), ticket, StatusPolicy::LastWriteWins);
        let before = store.snapshot();

        store.apply_stats(vec![sample(1), sample(2), sample(3)]);
        let after = store.snapshot();

        assert_eq!(after.phase, LoadPhase::Ready);
        assert_eq!(after.status, before.status);
        assert_eq!(after.meta.revision, before.meta.revision);
        assert_eq!(after.stats.len(), 3);
    }
}
