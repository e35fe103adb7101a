// ── Reactive dashboard store ──
//
// Single owner of the dashboard state, with push-based change
// notification and pure derived views.

mod dashboard_store;
mod views;

pub use dashboard_store::{
    DashboardState, DashboardStore, LoadPhase, StateMeta, StatusTicket, UpdateSource,
};
pub use views::{AlertFeedItem, DevicePartition, StatusSummary, TimeSeriesPoint};
