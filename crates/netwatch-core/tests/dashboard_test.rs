// Dashboard lifecycle tests against a wiremock backend and an in-process
// Socket.IO live feed.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use netwatch_api::{NoToken, ReconnectConfig, StaticToken};
use netwatch_core::{
    CoreError, Dashboard, DashboardConfig, DevicePartition, LoadPhase, SessionContext,
    SessionState, StatusPolicy, TlsVerification, UpdateSource,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn session() -> SessionContext {
    SessionContext::new(Arc::new(StaticToken::from("tok".to_string())))
}

fn config(server: &MockServer) -> DashboardConfig {
    let mut config = DashboardConfig::new(Url::parse(&server.uri()).unwrap());
    config.live_enabled = false;
    config.stats_refresh = None;
    config.timeout = Duration::from_secs(5);
    config
}

fn status_body(total: u32, active: u32) -> serde_json::Value {
    json!({
        "is_online": true,
        "download_speed": 1_048_576,
        "upload_speed": 2048,
        "total_devices": total,
        "active_devices": active,
        "devices": [
            { "ip": "192.168.1.2", "hostname": "desktop", "is_online": true },
            { "ip": "192.168.1.3", "is_online": false }
        ]
    })
}

fn stats_body(minutes: &[u32]) -> serde_json::Value {
    let samples: Vec<_> = minutes
        .iter()
        .map(|m| {
            json!({
                "timestamp": format!("2026-03-01 12:{m:02}:00"),
                "download_speed": f64::from(*m) * 100.0,
                "upload_speed": 10.0,
                "total_devices": 5,
                "active_devices": 3,
                "network_usage": 1000.0,
                "ping_latency": 12.5
            })
        })
        .collect();
    json!(samples)
}

fn alerts_body(count: i64) -> serde_json::Value {
    let alerts: Vec<_> = (1..=count)
        .map(|id| {
            json!({
                "id": id,
                "type": if id % 2 == 0 { "network_down" } else { "network_up" },
                "message": format!("alert {id}"),
                "severity": if id % 2 == 0 { "critical" } else { "informational" },
                "timestamp": format!("2026-03-01 0{}:00:00", id % 10),
                "is_read": false
            })
        })
        .collect();
    json!(alerts)
}

async fn mount(server: &MockServer, route: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(template)
        .mount(server)
        .await;
}

async fn mount_happy(server: &MockServer) {
    mount(
        server,
        "/api/network/status",
        ResponseTemplate::new(200).set_body_json(status_body(5, 3)),
    )
    .await;
    mount(
        server,
        "/api/network/stats",
        ResponseTemplate::new(200).set_body_json(stats_body(&[3, 2, 1])),
    )
    .await;
    mount(
        server,
        "/api/alerts",
        ResponseTemplate::new(200).set_body_json(alerts_body(7)),
    )
    .await;
}

// ── Activation ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_activation_builds_view_model() {
    let server = MockServer::start().await;
    mount_happy(&server).await;

    let dashboard = Dashboard::new(config(&server), session()).unwrap();
    assert_eq!(dashboard.state().phase, LoadPhase::Initial);

    dashboard.activate().await.unwrap();
    let state = dashboard.state();

    assert_eq!(state.phase, LoadPhase::Ready);
    assert_eq!(state.meta.source, Some(UpdateSource::Fetch));

    let summary = state.status_summary().unwrap();
    assert_eq!(summary.download, "1.00 MB/s");
    assert_eq!(summary.upload, "2.00 KB/s");
    assert_eq!(
        state.device_partition(),
        Some(DevicePartition {
            online: 3,
            offline: 2
        })
    );

    let series = state.time_series_in(&chrono::Utc);
    let labels: Vec<&str> = series.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, vec!["12:01:00", "12:02:00", "12:03:00"]);

    let ids: Vec<i64> = state.alerts.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![7, 6, 5, 4, 3]);
    assert!(state.alert_feed_in(&chrono::Utc)[1].critical);

    dashboard.deactivate().await;
    assert_eq!(dashboard.state().phase, LoadPhase::Initial);
}

#[tokio::test]
async fn test_unauthorized_status_invalidates_session() {
    let server = MockServer::start().await;
    mount(&server, "/api/network/status", ResponseTemplate::new(401)).await;
    mount(
        &server,
        "/api/network/stats",
        ResponseTemplate::new(200).set_body_json(stats_body(&[2, 1])),
    )
    .await;
    mount(
        &server,
        "/api/alerts",
        ResponseTemplate::new(200).set_body_json(alerts_body(2)),
    )
    .await;

    let session = session();
    let mut session_rx = session.subscribe();
    let dashboard = Dashboard::new(config(&server), session.clone()).unwrap();

    let err = dashboard.activate().await.unwrap_err();
    assert!(matches!(err, CoreError::SessionInvalid));

    assert!(matches!(
        *session_rx.borrow_and_update(),
        SessionState::Invalidated { .. }
    ));
    assert!(!dashboard.is_active().await);

    // No slice of the batch was applied.
    let state = dashboard.state();
    assert!(state.status.is_none());
    assert!(state.stats.is_empty());
    assert!(state.alerts.is_empty());
    assert_ne!(state.phase, LoadPhase::Ready);

    // An invalid session cannot be re-activated.
    assert!(matches!(
        dashboard.activate().await,
        Err(CoreError::SessionInvalid)
    ));
}

#[tokio::test]
async fn test_missing_token_is_treated_as_unauthorized() {
    let server = MockServer::start().await;
    mount_happy(&server).await;

    let session = SessionContext::new(Arc::new(NoToken));
    let dashboard = Dashboard::new(config(&server), session.clone()).unwrap();

    assert!(matches!(
        dashboard.activate().await,
        Err(CoreError::SessionInvalid)
    ));
    assert!(!session.is_valid());
}

#[tokio::test]
async fn test_partial_failure_degrades_gracefully() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/api/network/status",
        ResponseTemplate::new(200).set_body_json(status_body(5, 3)),
    )
    .await;
    mount(
        &server,
        "/api/network/stats",
        ResponseTemplate::new(500).set_body_json(json!({ "error": "db locked" })),
    )
    .await;
    mount(
        &server,
        "/api/alerts",
        ResponseTemplate::new(200).set_body_string("not json"),
    )
    .await;

    let dashboard = Dashboard::new(config(&server), session()).unwrap();
    dashboard.activate().await.unwrap();

    let state = dashboard.state();
    assert_eq!(state.phase, LoadPhase::Ready);
    assert!(state.status.is_some());
    assert!(state.stats.is_empty());
    assert!(state.alerts.is_empty());
    assert!(dashboard.session().is_valid());

    dashboard.deactivate().await;
}

// ── Background refresh ──────────────────────────────────────────────

#[tokio::test]
async fn test_periodic_stats_refresh() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/api/network/status",
        ResponseTemplate::new(200).set_body_json(status_body(5, 3)),
    )
    .await;
    mount(
        &server,
        "/api/alerts",
        ResponseTemplate::new(200).set_body_json(alerts_body(1)),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/network/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_body(&[1])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/network/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_body(&[3, 2, 1])))
        .mount(&server)
        .await;

    let mut cfg = config(&server);
    cfg.stats_refresh = Some(Duration::from_millis(50));
    let dashboard = Dashboard::new(cfg, session()).unwrap();
    dashboard.activate().await.unwrap();
    assert_eq!(dashboard.state().stats.len(), 1);

    let mut stream = dashboard.subscribe();
    let refreshed = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let state = stream.changed().await.unwrap();
            if state.stats.len() == 3 {
                return state;
            }
        }
    })
    .await
    .expect("stats were never refreshed");

    assert_eq!(refreshed.phase, LoadPhase::Ready);
    assert!(refreshed.stats[0].timestamp < refreshed.stats[2].timestamp);

    dashboard.deactivate().await;
}

#[tokio::test]
async fn test_refresh_requires_activation() {
    let server = MockServer::start().await;
    let dashboard = Dashboard::new(config(&server), session()).unwrap();
    assert!(matches!(
        dashboard.refresh_stats().await,
        Err(CoreError::NotActive)
    ));
}

// ── Live feed ───────────────────────────────────────────────────────

const OPEN: &str = r#"0{"sid":"s","upgrades":[],"pingInterval":25000,"pingTimeout":20000}"#;

fn push_frame(total: u32, active: u32) -> String {
    format!(
        r#"42["network_data",{{"is_online":true,"download_speed":512,"upload_speed":256,"total_devices":{total},"active_devices":{active},"devices":[]}}]"#
    )
}

#[tokio::test]
async fn test_live_pushes_replace_status() {
    let server = MockServer::start().await;
    mount_happy(&server).await;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let live_url = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();
    let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

    let feed = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        ws.send(Message::text(OPEN)).await.unwrap();
        let _connect = ws.next().await;
        ws.send(Message::text(r#"40{"sid":"n"}"#)).await.unwrap();

        // Wait until activation settled, then push.
        let _ = release_rx.await;
        ws.send(Message::text(push_frame(0, 0))).await.unwrap();
        while let Some(Ok(frame)) = ws.next().await {
            if frame.is_close() {
                break;
            }
        }
    });

    let mut cfg = config(&server);
    cfg.live_enabled = true;
    cfg.live_url = Some(live_url);
    cfg.status_policy = StatusPolicy::LastWriteWins;
    cfg.reconnect = ReconnectConfig {
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(50),
        max_retries: Some(2),
    };

    let dashboard = Dashboard::new(cfg, session()).unwrap();
    dashboard.activate().await.unwrap();
    let fetched_revision = dashboard.state().meta.revision;

    let mut stream = dashboard.subscribe();
    release_tx.send(()).unwrap();

    let pushed = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let state = stream.changed().await.unwrap();
            if state.meta.source == Some(UpdateSource::Push) {
                return state;
            }
        }
    })
    .await
    .expect("push never arrived");

    assert_eq!(pushed.phase, LoadPhase::Ready);
    assert_eq!(pushed.meta.revision, fetched_revision + 1);
    let status = pushed.status.as_ref().unwrap();
    assert_eq!(status.total_devices, 0);
    assert!(status.devices.is_empty());
    // Zero devices: no partition slices at all.
    assert_eq!(pushed.device_partition(), None);
    // Other slices untouched by the push.
    assert_eq!(pushed.stats.len(), 3);

    dashboard.deactivate().await;
    let revision = dashboard.state().meta.revision;
    feed.await.unwrap();
    assert_eq!(dashboard.state().meta.revision, revision);
    assert_eq!(dashboard.state().phase, LoadPhase::Initial);
}

#[tokio::test]
async fn test_push_before_rejected_fetch_is_discarded() {
    let server = MockServer::start().await;
    // Slow 401 so the push lands while the baseline is still in flight.
    mount(
        &server,
        "/api/network/status",
        ResponseTemplate::new(401).set_delay(Duration::from_millis(300)),
    )
    .await;
    mount(
        &server,
        "/api/network/stats",
        ResponseTemplate::new(200).set_body_json(stats_body(&[1])),
    )
    .await;
    mount(
        &server,
        "/api/alerts",
        ResponseTemplate::new(200).set_body_json(alerts_body(1)),
    )
    .await;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let live_url = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();

    let feed = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        ws.send(Message::text(OPEN)).await.unwrap();
        let _connect = ws.next().await;
        ws.send(Message::text(r#"40{"sid":"n"}"#)).await.unwrap();
        ws.send(Message::text(push_frame(4, 2))).await.unwrap();
        while let Some(Ok(frame)) = ws.next().await {
            if frame.is_close() {
                break;
            }
        }
    });

    let mut cfg = config(&server);
    cfg.live_enabled = true;
    cfg.live_url = Some(live_url);
    cfg.reconnect = ReconnectConfig {
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(50),
        max_retries: Some(0),
    };

    let dashboard = Dashboard::new(cfg, session()).unwrap();
    let mut stream = dashboard.subscribe();

    let activation = tokio::spawn({
        let dashboard = dashboard.clone();
        async move { dashboard.activate().await }
    });

    let pushed = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let state = stream.changed().await.unwrap();
            if state.meta.source == Some(UpdateSource::Push) {
                return state;
            }
        }
    })
    .await
    .expect("push never arrived");
    assert_eq!(pushed.phase, LoadPhase::Loading);

    let err = activation.await.unwrap().unwrap_err();
    assert!(matches!(err, CoreError::SessionInvalid));

    let state = dashboard.state();
    assert_eq!(state.phase, LoadPhase::Initial);
    assert!(state.status.is_none());
    assert!(state.meta.source.is_none());

    let _ = tokio::time::timeout(Duration::from_secs(5), feed).await;
}

#[tokio::test]
async fn test_live_feed_shares_tls_settings() {
    let server = MockServer::start().await;

    let mut cfg = config(&server);
    cfg.live_enabled = true;
    cfg.tls = TlsVerification::DangerAcceptInvalid;
    assert!(Dashboard::new(cfg.clone(), session()).is_ok());

    // A CA file the REST client cannot read fails for the live feed too,
    // before anything connects.
    cfg.tls = TlsVerification::CustomCa("/nonexistent/netwatch-ca.pem".into());
    assert!(matches!(
        Dashboard::new(cfg, session()),
        Err(CoreError::ConnectionFailed { .. })
    ));
}
