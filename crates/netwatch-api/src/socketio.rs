//! Engine.IO v4 / Socket.IO v5 text framing.
//!
//! The backend's live feed speaks Socket.IO over a WebSocket transport.
//! Each WebSocket text frame carries one Engine.IO packet; Engine.IO
//! `message` packets in turn carry one Socket.IO packet:
//!
//! ```text
//! 0{"sid":"..","pingInterval":25000,"pingTimeout":20000}   engine open
//! 2                                                        engine ping
//! 3                                                        engine pong
//! 40{"token":".."}                                         socket connect
//! 42["network_data",{..}]                                  socket event
//! 42/admin,7["network_data",{..}]                          event w/ namespace + ack id
//! 44{"message":"unauthorized"}                             socket connect error
//! ```
//!
//! Binary attachments are not supported; the backend never sends them.

use serde::Deserialize;
use serde_json::Value;

use crate::error::Error;

/// Engine.IO protocol revision appended to the endpoint query.
pub const ENGINE_IO_VERSION: u8 = 4;

/// The default Socket.IO namespace.
pub const DEFAULT_NAMESPACE: &str = "/";

// ── Engine.IO ────────────────────────────────────────────────────────

/// Session parameters announced by the server's `open` packet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenHandshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    pub ping_interval: u64,
    pub ping_timeout: u64,
    #[serde(default)]
    pub max_payload: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnginePacket<'a> {
    Open(OpenHandshake),
    Close,
    Ping,
    Pong,
    Message(&'a str),
    Upgrade,
    Noop,
}

/// Decode one Engine.IO packet from a WebSocket text frame.
pub fn decode_engine(frame: &str) -> Result<EnginePacket<'_>, Error> {
    let mut chars = frame.chars();
    let kind = chars
        .next()
        .ok_or_else(|| Error::Protocol("empty engine.io frame".into()))?;
    let rest = chars.as_str();

    match kind {
        '0' => {
            let handshake = serde_json::from_str(rest)
                .map_err(|e| Error::Protocol(format!("invalid open handshake: {e}")))?;
            Ok(EnginePacket::Open(handshake))
        }
        '1' => Ok(EnginePacket::Close),
        '2' => Ok(EnginePacket::Ping),
        '3' => Ok(EnginePacket::Pong),
        '4' => Ok(EnginePacket::Message(rest)),
        '5' => Ok(EnginePacket::Upgrade),
        '6' => Ok(EnginePacket::Noop),
        other => Err(Error::Protocol(format!(
            "unknown engine.io packet type {other:?}"
        ))),
    }
}

/// The pong frame answering a server ping.
pub fn encode_pong() -> &'static str {
    "3"
}

// ── Socket.IO ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect {
        namespace: String,
        data: Option<Value>,
    },
    Disconnect {
        namespace: String,
    },
    Event {
        namespace: String,
        ack_id: Option<u64>,
        name: String,
        args: Vec<Value>,
    },
    Ack {
        namespace: String,
        ack_id: u64,
        args: Vec<Value>,
    },
    ConnectError {
        namespace: String,
        message: String,
    },
}

/// Decode the Socket.IO packet inside an Engine.IO `message`.
pub fn decode_socket(payload: &str) -> Result<SocketPacket, Error> {
    let mut chars = payload.chars();
    let kind = chars
        .next()
        .ok_or_else(|| Error::Protocol("empty socket.io packet".into()))?;
    let (namespace, rest) = split_namespace(chars.as_str());
    let (ack_id, body) = split_ack_id(rest);

    let data: Option<Value> = if body.is_empty() {
        None
    } else {
        Some(
            serde_json::from_str(body)
                .map_err(|e| Error::Protocol(format!("invalid socket.io payload: {e}")))?,
        )
    };

    match kind {
        '0' => Ok(SocketPacket::Connect { namespace, data }),
        '1' => Ok(SocketPacket::Disconnect { namespace }),
        '2' => {
            let mut args = match data {
                Some(Value::Array(items)) => items,
                _ => return Err(Error::Protocol("event payload is not an array".into())),
            };
            if args.is_empty() {
                return Err(Error::Protocol("event payload has no name".into()));
            }
            let name = match args.remove(0) {
                Value::String(name) => name,
                other => {
                    return Err(Error::Protocol(format!("event name is not a string: {other}")));
                }
            };
            Ok(SocketPacket::Event {
                namespace,
                ack_id,
                name,
                args,
            })
        }
        '3' => {
            let ack_id =
                ack_id.ok_or_else(|| Error::Protocol("ack packet without an id".into()))?;
            let args = match data {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };
            Ok(SocketPacket::Ack {
                namespace,
                ack_id,
                args,
            })
        }
        '4' => {
            let message = match data {
                Some(Value::String(s)) => s,
                Some(Value::Object(map)) => map
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("connection refused")
                    .to_owned(),
                _ => "connection refused".to_owned(),
            };
            Ok(SocketPacket::ConnectError { namespace, message })
        }
        '5' | '6' => Err(Error::Protocol("binary socket.io packets are not supported".into())),
        other => Err(Error::Protocol(format!(
            "unknown socket.io packet type {other:?}"
        ))),
    }
}

/// Encode a namespace CONNECT request, wrapped in an Engine.IO message.
pub fn encode_connect(namespace: &str, auth: Option<&Value>) -> String {
    let mut frame = String::from("40");
    if namespace != DEFAULT_NAMESPACE {
        frame.push_str(namespace);
        frame.push(',');
    }
    if let Some(auth) = auth {
        frame.push_str(&auth.to_string());
    }
    frame
}

fn split_namespace(rest: &str) -> (String, &str) {
    if rest.starts_with('/') {
        match rest.split_once(',') {
            Some((ns, tail)) => (ns.to_owned(), tail),
            None => (rest.to_owned(), ""),
        }
    } else {
        (DEFAULT_NAMESPACE.to_owned(), rest)
    }
}

fn split_ack_id(rest: &str) -> (Option<u64>, &str) {
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return (None, rest);
    }
    let (id, tail) = rest.split_at(digits);
    (id.parse().ok(), tail)
}

// ── Tests ────────────────────────────────────────────────────────────
