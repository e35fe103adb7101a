// ── Runtime dashboard configuration ──
//
// Describes *how* to reach the monitor backend and how the dashboard
// behaves once active. Never touches disk: the CLI builds a
// `DashboardConfig` from its profile and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use netwatch_api::ReconnectConfig;
use netwatch_api::live::NETWORK_DATA_EVENT;
use serde::{Deserialize, Serialize};
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed home servers).
    DangerAcceptInvalid,
}

/// How a fetched status competes with live pushes for the status slice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusPolicy {
    /// Whichever update is applied last wins.
    #[default]
    LastWriteWins,
    /// Discard a fetched status if a push was applied after the fetch
    /// was issued.
    RejectStaleFetch,
}

/// Configuration for one dashboard session against one server.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Server root, e.g. `http://localhost:5000`.
    pub url: Url,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// How often to re-fetch historical stats. `None` disables it.
    pub stats_refresh: Option<Duration>,
    /// Subscribe to the live status feed while active.
    pub live_enabled: bool,
    /// Live feed server, when it differs from `url`.
    pub live_url: Option<Url>,
    pub reconnect: ReconnectConfig,
    pub status_policy: StatusPolicy,
    /// Name of the push event carrying status snapshots.
    pub live_event: String,
}

impl DashboardConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            stats_refresh: Some(Duration::from_secs(60)),
            live_enabled: true,
            live_url: None,
            reconnect: ReconnectConfig::default(),
            status_policy: StatusPolicy::default(),
            live_event: NETWORK_DATA_EVENT.to_owned(),
        }
    }
}
