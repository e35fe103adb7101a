// ── Network status domain types ──

use serde::Serialize;

/// A device seen on the monitored network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    pub ip: String,
    pub is_online: bool,
    pub mac: Option<String>,
    pub vendor: Option<String>,
    pub hostname: Option<String>,
    pub connection_type: Option<String>,
}

impl Device {
    /// Hostname when known, otherwise the IP address.
    pub fn display_name(&self) -> &str {
        self.hostname
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.ip)
    }
}

/// A complete, self-consistent status snapshot.
///
/// Always replaced wholesale; no field is ever updated on its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkStatus {
    pub is_online: bool,
    /// Bytes per second.
    pub download_speed: f64,
    /// Bytes per second.
    pub upload_speed: f64,
    pub total_devices: u32,
    pub active_devices: u32,
    pub devices: Vec<Device>,
}

/// Filter predicate for device listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeviceFilter {
    #[default]
    All,
    Online,
    Offline,
}

impl DeviceFilter {
    pub fn matches(self, device: &Device) -> bool {
        match self {
            Self::All => true,
            Self::Online => device.is_online,
            Self::Offline => !device.is_online,
        }
    }
}
