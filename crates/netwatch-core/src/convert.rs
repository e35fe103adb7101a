// ── API-to-domain type conversions ──
//
// Bridges `netwatch_api` wire records into `netwatch_core::model` types.
// Quarantined collection elements were already dropped during decoding;
// conversion itself cannot fail.

use netwatch_api::models::{
    AlertRecord, AlertSeverity, DeviceRecord, NetworkStatusRecord, StatRecord,
};

use crate::model::{Alert, Device, NetworkStatus, Severity, StatSample};

// ── Status ─────────────────────────────────────────────────────────

impl From<DeviceRecord> for Device {
    fn from(r: DeviceRecord) -> Self {
        Self {
            ip: r.ip,
            is_online: r.is_online,
            mac: r.mac,
            vendor: r.vendor,
            hostname: r.hostname,
            connection_type: r.connection_type,
        }
    }
}

impl From<NetworkStatusRecord> for NetworkStatus {
    fn from(r: NetworkStatusRecord) -> Self {
        Self {
            is_online: r.is_online,
            download_speed: r.download_speed,
            upload_speed: r.upload_speed,
            total_devices: r.total_devices,
            active_devices: r.active_devices,
            devices: r.devices.into_items().into_iter().map(Device::from).collect(),
        }
    }
}

// ── Stats ──────────────────────────────────────────────────────────

impl From<StatRecord> for StatSample {
    fn from(r: StatRecord) -> Self {
        Self {
            timestamp: r.timestamp,
            download_speed: r.download_speed,
            upload_speed: r.upload_speed,
            total_devices: r.total_devices,
            active_devices: r.active_devices,
            network_usage: r.network_usage,
            ping_latency: r.ping_latency,
        }
    }
}

// ── Alerts ─────────────────────────────────────────────────────────

impl From<AlertSeverity> for Severity {
    fn from(s: AlertSeverity) -> Self {
        match s {
            AlertSeverity::Info => Self::Info,
            AlertSeverity::Warning => Self::Warning,
            AlertSeverity::Critical => Self::Critical,
        }
    }
}

impl From<AlertRecord> for Alert {
    fn from(r: AlertRecord) -> Self {
        Self {
            id: r.id,
            alert_type: r.alert_type,
            severity: r.severity.into(),
            message: r.message,
            timestamp: r.timestamp,
            is_read: r.is_read,
            device_ip: r.device_ip,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use netwatch_api::Decoded;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn status_record_converts_wholesale() {
        let record = NetworkStatusRecord {
            is_online: true,
            download_speed: 1_048_576.0,
            upload_speed: 2048.0,
            total_devices: 5,
            active_devices: 3,
            devices: Decoded {
                items: vec![DeviceRecord {
                    ip: "192.168.1.5".into(),
                    is_online: true,
                    mac: Some("aa:bb:cc:dd:ee:ff".into()),
                    vendor: None,
                    hostname: Some("printer".into()),
                    connection_type: Some("WiFi".into()),
                }],
                rejected: 2,
            },
        };

        let status = NetworkStatus::from(record);
        assert_eq!(status.total_devices, 5);
        assert_eq!(status.devices.len(), 1);
        assert_eq!(status.devices[0].display_name(), "printer");
        assert_eq!(status.devices[0].connection_type.as_deref(), Some("WiFi"));
    }

    #[test]
    fn severity_maps_one_to_one() {
        assert_eq!(Severity::from(AlertSeverity::Info), Severity::Info);
        assert_eq!(Severity::from(AlertSeverity::Warning), Severity::Warning);
        assert_eq!(Severity::from(AlertSeverity::Critical), Severity::Critical);
    }
}
