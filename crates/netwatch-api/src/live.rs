//! Live status feed with auto-reconnect.
//!
//! Subscribes to the backend's Socket.IO endpoint and streams every
//! `network_data` event, decoded as a full [`NetworkStatusRecord`], through
//! a bounded [`tokio::sync::mpsc`] channel. Events are delivered exactly
//! once and in receipt order; the transport task applies back-pressure
//! rather than dropping when the consumer is slow. Reconnection uses
//! exponential backoff with jitter.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use netwatch_api::{LiveChannel, StaticToken};
//! use url::Url;
//!
//! let base = Url::parse("http://localhost:5000")?;
//! let channel = LiveChannel::new(&base, Arc::new(StaticToken::from(token)))?;
//!
//! let mut subscription = channel.subscribe();
//! while let Some(status) = subscription.recv().await {
//!     println!("{} devices online", status.active_devices);
//! }
//!
//! subscription.unsubscribe().await;
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use secrecy::ExposeSecret;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{Connector, tungstenite};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::credential::CredentialProvider;
use crate::error::Error;
use crate::models::NetworkStatusRecord;
use crate::socketio::{self, EnginePacket, SocketPacket};
use crate::transport::TlsMode;

// ── Channel constants ────────────────────────────────────────────────

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Name of the event carrying full network status snapshots.
pub const NETWORK_DATA_EVENT: &str = "network_data";

// ── ReconnectConfig ──────────────────────────────────────────────────

/// Exponential backoff configuration for live feed reconnection.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// Maximum reconnection attempts before giving up.
    /// `None` means retry forever.
    pub max_retries: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

// ── LiveChannel ──────────────────────────────────────────────────────

/// Connection parameters for the live status feed.
///
/// Holds no connection itself: each call to [`subscribe`](Self::subscribe)
/// spawns an independent transport task owned by the returned
/// [`Subscription`].
#[derive(Clone)]
pub struct LiveChannel {
    endpoint: Url,
    credentials: Arc<dyn CredentialProvider>,
    event_name: String,
    reconnect: ReconnectConfig,
    connector: Option<Connector>,
}

impl LiveChannel {
    /// Build a channel for the server at `base_url` (the same URL the REST
    /// client uses, e.g. `http://localhost:5000`).
    pub fn new(base_url: &Url, credentials: Arc<dyn CredentialProvider>) -> Result<Self, Error> {
        Ok(Self {
            endpoint: socket_endpoint(base_url)?,
            credentials,
            event_name: NETWORK_DATA_EVENT.to_owned(),
            reconnect: ReconnectConfig::default(),
            connector: None,
        })
    }

    /// Verify `wss://` connections the same way the REST client does.
    pub fn with_tls(mut self, tls: &TlsMode) -> Result<Self, Error> {
        self.connector = tls.websocket_connector()?;
        Ok(self)
    }

    /// Listen for a different event name.
    pub fn with_event_name(mut self, name: impl Into<String>) -> Self {
        self.event_name = name.into();
        self
    }

    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// The WebSocket URL the transport connects to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    /// Start a subscription with its own cancellation scope.
    pub fn subscribe(&self) -> Subscription {
        self.subscribe_with(&CancellationToken::new())
    }

    /// Start a subscription that is also cancelled when `parent` is.
    ///
    /// Returns immediately; the first connection attempt happens in the
    /// background.
    pub fn subscribe_with(&self, parent: &CancellationToken) -> Subscription {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let cancel = parent.child_token();

        let task_cancel = cancel.clone();
        let channel = self.clone();
        let task = tokio::spawn(async move {
            live_loop(channel, event_tx, task_cancel).await;
        });

        Subscription {
            event_rx,
            cancel,
            task: Some(task),
        }
    }
}

// ── Subscription ─────────────────────────────────────────────────────

/// Handle to a running live feed.
///
/// Dropping the handle cancels the background transport task; call
/// [`unsubscribe`](Self::unsubscribe) to also wait for it to finish.
pub struct Subscription {
    event_rx: mpsc::Receiver<NetworkStatusRecord>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Wait for the next status event.
    ///
    /// Returns `None` once the subscription has been cancelled or the
    /// transport gave up reconnecting.
    pub async fn recv(&mut self) -> Option<NetworkStatusRecord> {
        self.event_rx.recv().await
    }

    /// A token that fires when this subscription is torn down.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel the transport task and wait for it to exit.
    pub async fn unsubscribe(mut self) {
        self.cancel.cancel();
        self.event_rx.close();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ── Background reconnection loop ─────────────────────────────────────

/// Main loop: connect → read → on error, backoff → reconnect.
async fn live_loop(
    channel: LiveChannel,
    event_tx: mpsc::Sender<NetworkStatusRecord>,
    cancel: CancellationToken,
) {
    let mut attempt: u32 = 0;

    loop {
        let result = connect_and_read(&channel, &event_tx, &cancel).await;

        if cancel.is_cancelled() {
            break;
        }
        if event_tx.is_closed() {
            tracing::debug!("live feed consumer gone, stopping");
            break;
        }

        match result {
            // Clean disconnect (server close frame or stream ended).
            // Reset attempt counter and reconnect immediately.
            Ok(()) => {
                tracing::info!("live feed disconnected cleanly, reconnecting");
                attempt = 0;
            }
            Err(e) => {
                tracing::warn!(error = %e, attempt, "live feed error");

                if let Some(max) = channel.reconnect.max_retries {
                    if attempt >= max {
                        tracing::error!(
                            max_retries = max,
                            "live feed reconnection limit reached, giving up"
                        );
                        break;
                    }
                }

                let delay = calculate_backoff(attempt, &channel.reconnect);
                tracing::info!(
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    attempt,
                    "waiting before reconnect"
                );

                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(delay) => {}
                }

                attempt = attempt.saturating_add(1);
            }
        }
    }

    tracing::debug!("live feed loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Establish a single WebSocket connection, read frames until it drops.
async fn connect_and_read(
    channel: &LiveChannel,
    event_tx: &mpsc::Sender<NetworkStatusRecord>,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    tracing::info!(url = %channel.endpoint, "connecting to live feed");

    let (ws_stream, _response) = tokio::select! {
        biased;
        () = cancel.cancelled() => return Ok(()),
        connected = tokio_tungstenite::connect_async_tls_with_config(
            channel.endpoint.as_str(),
            None,
            false,
            channel.connector.clone(),
        ) => {
            connected.map_err(|e| Error::WebSocketConnect(e.to_string()))?
        }
    };

    tracing::info!("live feed connected");

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                let _ = write.close().await;
                return Ok(());
            }
            frame = read.next() => {
                match frame {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        match handle_text_frame(
                            &text,
                            channel.credentials.as_ref(),
                            &channel.event_name,
                        )? {
                            FrameAction::Reply(reply) => {
                                write
                                    .send(tungstenite::Message::text(reply))
                                    .await
                                    .map_err(|e| Error::WebSocketConnect(e.to_string()))?;
                            }
                            FrameAction::Deliver(status) => {
                                // Consumer gone: stop reading, the outer loop exits.
                                if event_tx.send(status).await.is_err() {
                                    return Ok(());
                                }
                            }
                            FrameAction::Close => return Ok(()),
                            FrameAction::Ignore => {}
                        }
                    }
                    Some(Ok(tungstenite::Message::Close(frame))) => {
                        if let Some(ref cf) = frame {
                            tracing::info!(
                                code = %cf.code,
                                reason = %cf.reason,
                                "live feed close frame received"
                            );
                        } else {
                            tracing::info!("live feed close frame received (no payload)");
                        }
                        return Ok(());
                    }
                    Some(Err(e)) => {
                        return Err(Error::WebSocketConnect(e.to_string()));
                    }
                    None => {
                        tracing::info!("live feed stream ended");
                        return Ok(());
                    }
                    _ => {
                        // Binary, Ping, Pong, Frame -- tungstenite answers pings itself
                    }
                }
            }
        }
    }
}

// ── Frame handling ───────────────────────────────────────────────────

/// What the transport should do in response to one text frame.
#[derive(Debug, PartialEq)]
enum FrameAction {
    Reply(String),
    Deliver(NetworkStatusRecord),
    Close,
    Ignore,
}

/// Interpret one Engine.IO text frame.
///
/// Malformed frames and unrelated events are skipped; a server-side
/// connect rejection is surfaced as an error so the loop backs off.
fn handle_text_frame(
    text: &str,
    credentials: &dyn CredentialProvider,
    event_name: &str,
) -> Result<FrameAction, Error> {
    let packet = match socketio::decode_engine(text) {
        Ok(packet) => packet,
        Err(e) => {
            tracing::debug!(error = %e, "skipping undecodable engine.io frame");
            return Ok(FrameAction::Ignore);
        }
    };

    match packet {
        EnginePacket::Open(handshake) => {
            tracing::debug!(
                sid = %handshake.sid,
                ping_interval_ms = handshake.ping_interval,
                "engine.io session opened"
            );
            let auth = credentials
                .bearer_token()
                .map(|token| serde_json::json!({ "token": token.expose_secret() }));
            Ok(FrameAction::Reply(socketio::encode_connect(
                socketio::DEFAULT_NAMESPACE,
                auth.as_ref(),
            )))
        }
        EnginePacket::Ping => Ok(FrameAction::Reply(socketio::encode_pong().to_owned())),
        EnginePacket::Close => Ok(FrameAction::Close),
        EnginePacket::Message(payload) => handle_socket_packet(payload, event_name),
        EnginePacket::Pong | EnginePacket::Upgrade | EnginePacket::Noop => {
            Ok(FrameAction::Ignore)
        }
    }
}

fn handle_socket_packet(payload: &str, event_name: &str) -> Result<FrameAction, Error> {
    let packet = match socketio::decode_socket(payload) {
        Ok(packet) => packet,
        Err(e) => {
            tracing::debug!(error = %e, "skipping undecodable socket.io packet");
            return Ok(FrameAction::Ignore);
        }
    };

    match packet {
        SocketPacket::Connect { namespace, .. } => {
            tracing::info!(%namespace, "live feed namespace joined");
            Ok(FrameAction::Ignore)
        }
        SocketPacket::Event { name, args, .. } if name == event_name => {
            let Some(payload) = args.into_iter().next() else {
                tracing::warn!(event = %name, "event without payload, skipping");
                return Ok(FrameAction::Ignore);
            };
            match serde_json::from_value::<NetworkStatusRecord>(payload) {
                Ok(status) => Ok(FrameAction::Deliver(status)),
                Err(e) => {
                    tracing::warn!(event = %name, error = %e, "malformed status event, skipping");
                    Ok(FrameAction::Ignore)
                }
            }
        }
        SocketPacket::Event { name, .. } => {
            tracing::trace!(event = %name, "ignoring unrelated event");
            Ok(FrameAction::Ignore)
        }
        SocketPacket::Disconnect { namespace } => {
            tracing::info!(%namespace, "server closed the namespace");
            Ok(FrameAction::Close)
        }
        SocketPacket::ConnectError { message, .. } => Err(Error::Protocol(format!(
            "server rejected connection: {message}"
        ))),
        SocketPacket::Ack { .. } => Ok(FrameAction::Ignore),
    }
}

// ── Endpoint derivation ──────────────────────────────────────────────

/// Map the REST base URL onto the Socket.IO WebSocket endpoint.
///
/// `http://host:5000` becomes
/// `ws://host:5000/socket.io/?EIO=4&transport=websocket`.
pub fn socket_endpoint(base_url: &Url) -> Result<Url, Error> {
    let scheme = match base_url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(Error::WebSocketConnect(format!(
                "unsupported URL scheme for live feed: {other}"
            )));
        }
    };

    let mut url = base_url.clone();
    url.set_scheme(scheme)
        .map_err(|()| Error::WebSocketConnect(format!("cannot use scheme {scheme}")))?;
    let path = base_url.path().trim_end_matches('/').to_owned();
    url.set_path(&format!("{path}/socket.io/"));
    url.set_query(Some(&format!(
        "EIO={}&transport=websocket",
        socketio::ENGINE_IO_VERSION
    )));
    url.set_fragment(None);
    Ok(url)
}

// ── Backoff calculation ──────────────────────────────────────────────

/// Exponential backoff with jitter.
///
/// `delay = min(initial * 2^attempt, max) + jitter`
///
/// Jitter is +-25% to spread out reconnection storms from multiple clients.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn calculate_backoff(attempt: u32, config: &ReconnectConfig) -> Duration {
    let exponent = i32::try_from(attempt.min(31)).unwrap_or(31);
    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(exponent);
    let capped = base.min(config.max_delay.as_secs_f64());

    // Deterministic "jitter" seeded from the attempt number.
    let jitter_factor = 1.0 + 0.25 * ((f64::from(attempt) * 7.3).sin());
    let with_jitter = (capped * jitter_factor).max(0.0);

    Duration::from_secs_f64(with_jitter)
}

// ── Tests ────────────────────────────────────────────────────────────
