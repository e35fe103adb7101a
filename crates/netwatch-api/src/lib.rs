// netwatch-api: Async client for the network monitor backend (REST + Socket.IO live feed)

pub mod client;
pub mod credential;
pub mod error;
pub mod live;
pub mod models;
pub mod socketio;
pub mod transport;

pub use client::ApiClient;
pub use credential::{CredentialProvider, NoToken, StaticToken};
pub use error::Error;
pub use live::{LiveChannel, ReconnectConfig, Subscription};
pub use models::{
    AlertRecord, AlertSeverity, Decoded, DeviceRecord, NetworkStatusRecord, StatRecord,
};
pub use transport::{TlsMode, TransportConfig};
