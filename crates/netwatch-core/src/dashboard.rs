// ── Dashboard lifecycle ──
//
// Ties the fetcher, the live channel and the store together for one
// session: activation fetches the baseline while live pushes flow in,
// background tasks keep stats fresh, and deactivation tears everything
// down before the store leaves the Ready phase.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use netwatch_api::{ApiClient, LiveChannel, Subscription, TlsMode, TransportConfig};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{DashboardConfig, TlsVerification};
use crate::error::CoreError;
use crate::fetcher::SnapshotFetcher;
use crate::session::SessionContext;
use crate::store::{DashboardState, DashboardStore, LoadPhase};
use crate::stream::DashboardStream;

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<DashboardInner>`. Does nothing until
/// [`activate()`](Self::activate) is called.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

struct DashboardInner {
    config: DashboardConfig,
    session: SessionContext,
    fetcher: SnapshotFetcher,
    live: Option<LiveChannel>,
    store: DashboardStore,
    active: Mutex<Option<Activation>>,
}

/// Background work owned by one activation.
struct Activation {
    cancel: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl Activation {
    async fn shutdown(self) {
        self.cancel.cancel();
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}

impl Dashboard {
    pub fn new(config: DashboardConfig, session: SessionContext) -> Result<Self, CoreError> {
        let transport = build_transport(&config);
        let client = ApiClient::new(config.url.clone(), session.credentials(), &transport)?;

        let live = if config.live_enabled {
            let live_url = config.live_url.as_ref().unwrap_or(&config.url);
            Some(
                LiveChannel::new(live_url, session.credentials())?
                    .with_tls(&transport.tls)?
                    .with_event_name(config.live_event.clone())
                    .with_reconnect(config.reconnect.clone()),
            )
        } else {
            None
        };

        Ok(Self {
            inner: Arc::new(DashboardInner {
                config,
                session,
                fetcher: SnapshotFetcher::new(client),
                live,
                store: DashboardStore::new(),
                active: Mutex::new(None),
            }),
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    pub fn session(&self) -> &SessionContext {
        &self.inner.session
    }

    pub fn store(&self) -> &DashboardStore {
        &self.inner.store
    }

    /// The current state snapshot.
    pub fn state(&self) -> Arc<DashboardState> {
        self.inner.store.snapshot()
    }

    pub fn subscribe(&self) -> DashboardStream {
        self.inner.store.subscribe()
    }

    pub async fn is_active(&self) -> bool {
        self.inner.active.lock().await.is_some()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Activate the dashboard.
    ///
    /// Starts the live subscription, fetches the baseline snapshot, and
    /// spawns the stats refresh task. Returns once the baseline fetch has
    /// settled and the store is Ready. An unauthorized answer on any
    /// request invalidates the session, discards the whole batch and
    /// returns [`CoreError::SessionInvalid`].
    pub async fn activate(&self) -> Result<(), CoreError> {
        if !self.inner.session.is_valid() {
            return Err(CoreError::SessionInvalid);
        }

        let mut active = self.inner.active.lock().await;
        if active.is_some() {
            debug!("dashboard already active");
            return Ok(());
        }

        let store = &self.inner.store;
        store.begin_loading();

        let mut activation = Activation {
            cancel: CancellationToken::new(),
            handles: Vec::new(),
        };

        // Pushes arriving before the baseline settles are applied as usual.
        if let Some(live) = &self.inner.live {
            let subscription = live.subscribe_with(&activation.cancel);
            activation.handles.push(tokio::spawn(live_forwarder_task(
                self.clone(),
                subscription,
                activation.cancel.clone(),
            )));
        }

        let ticket = store.status_ticket();
        let batch = self.inner.fetcher.fetch_all().await;

        if batch.is_unauthorized() {
            activation.shutdown().await;
            store.discard();
            self.inner.session.invalidate();
            return Err(CoreError::SessionInvalid);
        }

        store.apply_snapshot(batch, ticket, self.inner.config.status_policy);

        if let Some(period) = self.inner.config.stats_refresh.filter(|p| !p.is_zero()) {
            activation.handles.push(tokio::spawn(stats_refresh_task(
                self.clone(),
                period,
                activation.cancel.clone(),
            )));
        }

        *active = Some(activation);
        info!(url = %self.inner.config.url, "dashboard active");
        Ok(())
    }

    /// Stop all background work and return the store to Initial.
    ///
    /// No state mutation happens after this returns.
    pub async fn deactivate(&self) {
        let activation = self.inner.active.lock().await.take();
        if let Some(activation) = activation {
            activation.shutdown().await;
            debug!("dashboard deactivated");
        }
        self.inner.store.reset();
    }

    /// Re-fetch historical stats into the store.
    pub async fn refresh_stats(&self) -> Result<(), CoreError> {
        if self.inner.store.phase() == LoadPhase::Initial {
            return Err(CoreError::NotActive);
        }

        match self.inner.fetcher.fetch_stats().await {
            Ok(stats) => {
                debug!(samples = stats.len(), "stats refreshed");
                self.inner.store.apply_stats(stats);
                Ok(())
            }
            Err(e) if e.is_auth_expired() => {
                self.inner.session.invalidate();
                Err(CoreError::SessionInvalid)
            }
            Err(e) => Err(e.into()),
        }
    }

    // ── One-shot convenience ─────────────────────────────────────────

    /// One-shot: activate, run closure, deactivate.
    ///
    /// Disables the live feed and periodic refresh since only a single
    /// snapshot is needed.
    pub async fn oneshot<F, Fut, T>(
        config: DashboardConfig,
        session: SessionContext,
        f: F,
    ) -> Result<T, CoreError>
    where
        F: FnOnce(Dashboard) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.live_enabled = false;
        cfg.stats_refresh = None;

        let dashboard = Dashboard::new(cfg, session)?;
        dashboard.activate().await?;
        let result = f(dashboard.clone()).await;
        dashboard.deactivate().await;
        result
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Apply every live status event to the store, in receipt order.
async fn live_forwarder_task(
    dashboard: Dashboard,
    mut subscription: Subscription,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            event = subscription.recv() => {
                let Some(record) = event else {
                    warn!("live feed ended");
                    break;
                };
                dashboard.inner.store.apply_push(record.into());
            }
        }
    }
    subscription.unsubscribe().await;
}

/// Periodically re-fetch historical stats.
async fn stats_refresh_task(dashboard: Dashboard, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick fires immediately; activation just fetched.
    interval.tick().await;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = dashboard.refresh_stats() => result,
        };

        match result {
            Ok(()) => {}
            Err(CoreError::SessionInvalid) => {
                // Stop the whole activation; nothing will succeed from here.
                cancel.cancel();
                break;
            }
            Err(e) => warn!(error = %e, "stats refresh failed"),
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn build_transport(config: &DashboardConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
