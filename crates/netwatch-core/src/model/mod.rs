// ── Domain model ──
//
// Canonical representations of the monitor backend's data, decoupled from
// the wire types in `netwatch_api::models`. See `crate::convert` for the
// mapping.

pub mod alert;
pub mod stats;
pub mod status;

pub use alert::{ALERT_RETENTION, Alert, Severity};
pub use stats::StatSample;
pub use status::{Device, DeviceFilter, NetworkStatus};
