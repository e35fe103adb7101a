//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use netwatch_config::ConfigError;
use netwatch_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the monitor at {url}")]
    #[diagnostic(
        code(netwatch::connection_failed),
        help(
            "Check that the monitor backend is running and reachable.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Live feed failed: {reason}")]
    #[diagnostic(code(netwatch::live_feed))]
    LiveFeed { reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(netwatch::timeout),
        help("Increase the timeout with --timeout or check the monitor's responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Session expired or rejected by the server")]
    #[diagnostic(
        code(netwatch::session_expired),
        help(
            "Sign in to the monitor again to obtain a new token, then run:\n\
             netwatch config set-token --profile {profile}"
        )
    )]
    SessionExpired { profile: String },

    #[error("No session token configured for profile '{profile}'")]
    #[diagnostic(
        code(netwatch::no_credentials),
        help(
            "Store one with: netwatch config set-token --profile {profile}\n\
             Or set the NETWATCH_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Data ─────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(netwatch::api_error))]
    Api { message: String },

    #[error("{resource} is unavailable")]
    #[diagnostic(
        code(netwatch::unavailable),
        help("The server did not return it. Re-run with -v for details.")
    )]
    Unavailable { resource: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(netwatch::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(netwatch::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No server configured")]
    #[diagnostic(
        code(netwatch::no_config),
        help(
            "Pass --server, set NETWATCH_SERVER, or add a profile to\n\
             {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(netwatch::config))]
    Config(Box<ConfigError>),

    // ── IO / Rendering ───────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::LiveFeed { .. } => exit_code::CONNECTION,
            Self::SessionExpired { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired { .. })
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SessionInvalid => CliError::SessionExpired {
                profile: "default".into(),
            },
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::Timeout { .. } => CliError::Timeout,
            CoreError::LiveFeed { reason } => CliError::LiveFeed { reason },
            CoreError::Api { message, status } => CliError::Api {
                message: match status {
                    Some(code) => format!("{message} (HTTP {code})"),
                    None => message,
                },
            },
            CoreError::InvalidPayload { message } => CliError::Api { message },
            CoreError::NotActive => CliError::Api {
                message: "dashboard is not active".into(),
            },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_invalid_exits_with_auth_code() {
        let err = CliError::from(CoreError::SessionInvalid);
        assert!(err.is_session_expired());
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn transport_failures_map_to_connection_and_timeout_codes() {
        let conn = CliError::from(CoreError::ConnectionFailed {
            url: "http://localhost:5000/".into(),
            reason: "refused".into(),
        });
        assert_eq!(conn.exit_code(), exit_code::CONNECTION);
        assert_eq!(
            CliError::from(CoreError::Timeout { timeout_secs: 30 }).exit_code(),
            exit_code::TIMEOUT
        );
    }

    #[test]
    fn missing_token_is_an_auth_failure() {
        let err = CliError::from(ConfigError::NoCredentials {
            profile: "home".into(),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);
        assert_eq!(err.to_string(), "No session token configured for profile 'home'");
    }

    #[test]
    fn api_errors_carry_the_status_code() {
        let err = CliError::from(CoreError::Api {
            message: "Internal Server Error".into(),
            status: Some(500),
        });
        assert_eq!(err.to_string(), "API error: Internal Server Error (HTTP 500)");
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }
}
