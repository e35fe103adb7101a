// ── Core error types ──
//
// User-facing errors from netwatch-core. Consumers never see raw HTTP
// status codes or JSON parse failures; the `From<netwatch_api::Error>` impl
// translates transport-layer errors into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session ──────────────────────────────────────────────────────
    /// The backend rejected the session token (or none was available).
    /// The session has been invalidated and must be re-established.
    #[error("Session is no longer valid -- re-authentication required")]
    SessionInvalid,

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Live feed error: {reason}")]
    LiveFeed { reason: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    #[error("Malformed response: {message}")]
    InvalidPayload { message: String },

    // ── Lifecycle ────────────────────────────────────────────────────
    #[error("Dashboard is not active")]
    NotActive,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    pub fn is_session_invalid(&self) -> bool {
        matches!(self, Self::SessionInvalid)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<netwatch_api::Error> for CoreError {
    fn from(err: netwatch_api::Error) -> Self {
        use netwatch_api::Error as ApiError;

        match err {
            ApiError::Unauthorized | ApiError::MissingCredential => CoreError::SessionInvalid,
            ApiError::InvalidCredential(reason) => CoreError::Config {
                message: format!("Invalid session token: {reason}"),
            },
            ApiError::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            ApiError::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            ApiError::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            ApiError::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            ApiError::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            ApiError::WebSocketConnect(reason) | ApiError::Protocol(reason) => {
                CoreError::LiveFeed { reason }
            }
            ApiError::WebSocketClosed { code, reason } => CoreError::LiveFeed {
                reason: format!("closed (code {code}): {reason}"),
            },
            ApiError::Deserialization { message, body: _ } => {
                CoreError::InvalidPayload { message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_invalidate_the_session() {
        assert!(CoreError::from(netwatch_api::Error::Unauthorized).is_session_invalid());
        assert!(CoreError::from(netwatch_api::Error::MissingCredential).is_session_invalid());
    }

    #[test]
    fn api_status_is_preserved() {
        let err = CoreError::from(netwatch_api::Error::Api {
            status: 503,
            message: "busy".into(),
        });
        assert!(matches!(err, CoreError::Api { status: Some(503), .. }));
    }

    #[test]
    fn malformed_body_becomes_invalid_payload() {
        let err = CoreError::from(netwatch_api::Error::Deserialization {
            message: "missing field `is_online`".into(),
            body: "{}".into(),
        });
        assert!(matches!(err, CoreError::InvalidPayload { .. }));
    }
}
