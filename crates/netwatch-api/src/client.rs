// REST client for the monitor backend's snapshot endpoints.
//
// Every request carries the provider's current bearer token. A 401 answer
// maps to `Error::Unauthorized` so callers can tell an invalidated session
// apart from ordinary transport or server failures.

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::credential::CredentialProvider;
use crate::error::Error;
use crate::models::{AlertRecord, Decoded, NetworkStatusRecord, StatRecord};
use crate::transport::TransportConfig;

const STATUS_PATH: &str = "api/network/status";
const STATS_PATH: &str = "api/network/stats";
const ALERTS_PATH: &str = "api/alerts";

/// Longest response excerpt kept in deserialization errors.
const BODY_PREVIEW_LEN: usize = 512;

/// HTTP client for the monitor backend's REST API.
///
/// Cheap to clone; clones share the connection pool and the credential
/// provider.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Arc<dyn CredentialProvider>,
}

impl ApiClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the server root, e.g. `http://localhost:5000`.
    pub fn new(
        base_url: Url,
        credentials: Arc<dyn CredentialProvider>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, credentials))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            http,
            base_url: with_trailing_slash(base_url),
            credentials,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn credentials(&self) -> Arc<dyn CredentialProvider> {
        Arc::clone(&self.credentials)
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// `GET /api/network/status`
    pub async fn network_status(&self) -> Result<NetworkStatusRecord, Error> {
        self.get(STATUS_PATH).await
    }

    /// `GET /api/network/stats`
    ///
    /// Returned in server order (newest first); malformed samples are
    /// quarantined.
    pub async fn network_stats(&self) -> Result<Decoded<StatRecord>, Error> {
        self.get(STATS_PATH).await
    }

    /// `GET /api/alerts`
    pub async fn alerts(&self) -> Result<Decoded<AlertRecord>, Error> {
        self.get(ALERTS_PATH).await
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        let token = self
            .credentials
            .bearer_token()
            .ok_or(Error::MissingCredential)?;

        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .bearer_auth(token.expose_secret())
            .send()
            .await
            .map_err(Error::Transport)?;

        self.parse_response(resp).await
    }

    async fn parse_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized);
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: error_message(&body)
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_owned()),
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: preview(&body),
        })
    }
}

/// `Url::join` drops the last path segment unless it ends in `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Pull `{"error": ".."}` or `{"message": ".."}` out of an error body.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error", "message", "msg"]
        .iter()
        .find_map(|key| value.get(key).and_then(serde_json::Value::as_str))
        .map(str::to_owned)
}

fn preview(body: &str) -> String {
    match body.char_indices().nth(BODY_PREVIEW_LEN) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_owned(),
    }
}
