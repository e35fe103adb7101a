// netwatch-core: Reconciles snapshot fetches and live pushes into one view model.

pub mod config;
pub mod convert;
pub mod dashboard;
pub mod error;
pub mod fetcher;
pub mod format;
pub mod model;
pub mod session;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{DashboardConfig, StatusPolicy, TlsVerification};
pub use dashboard::Dashboard;
pub use error::CoreError;
pub use fetcher::{SnapshotBatch, SnapshotFetcher};
pub use format::{fmt_bytes, fmt_speed, unit_index};
pub use session::{SessionContext, SessionState};
pub use store::{
    AlertFeedItem, DashboardState, DashboardStore, DevicePartition, LoadPhase, StateMeta,
    StatusSummary, StatusTicket, TimeSeriesPoint, UpdateSource,
};
pub use stream::DashboardStream;

pub use model::{Alert, Device, DeviceFilter, NetworkStatus, Severity, StatSample};
