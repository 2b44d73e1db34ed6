//! Client library for the gantt scheduler API.
//!
//! # Architecture
//!
//! - [`Client`] - the API client. Built from a version, an endpoint and a
//!   token, and hands out resource clients such as [`ZonesClient`].
//! - [`identity`] - Keystone v2.0 password exchange and service catalog lookup.
//! - [`Session`] - turns [`AuthSettings`] into a ready [`Client`],
//!   authenticating on every connect when it holds credentials.
//! - [`retry`] - backoff policy shared by every request.
//!
//! ```no_run
//! # async fn demo() -> Result<(), gantt_client::Error> {
//! use gantt_client::{ApiVersion, AuthToken, Client, Endpoint};
//!
//! let client = Client::new(
//!     ApiVersion::V1,
//!     Endpoint::parse("http://scheduler.example:8774/v1/tenant-a")?,
//!     AuthToken::new("3bcc3d3a03f44e3d8377f9247b0ad155")?,
//! )?;
//! for zone in client.zones().list().await? {
//!     println!("{} {}", zone.id, zone.api_url);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod identity;
pub mod retry;
pub mod session;
pub mod zones;

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};

pub use client::Client;
pub use error::Error;
pub use gantt_config::{AuthSettings, Interface, ServiceSelection};
pub use gantt_types::{
    ApiVersion, AuthToken, Endpoint, NewZone, Password, PasswordCredentials, TenantId, Username,
    Zone, ZoneInfo, ZoneUpdate,
};
pub use identity::{Access, IdentityClient, ServiceCatalog};
pub use retry::RetryConfig;
pub use session::{Authorization, Session};
pub use zones::ZonesClient;

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const TCP_KEEPALIVE_SECS: u64 = 60;
const POOL_MAX_IDLE_PER_HOST: usize = 10;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

/// Transport settings shared by the identity and scheduler clients.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Total time allowed for a single request.
    pub timeout: Duration,
    /// Accept invalid TLS certificates.
    pub insecure: bool,
    pub retry: RetryConfig,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            insecure: false,
            retry: RetryConfig::default(),
        }
    }
}

#[must_use]
pub fn user_agent() -> &'static str {
    concat!("gantt-client/", env!("CARGO_PKG_VERSION"))
}

/// Build the HTTP client used for every request.
pub fn http_client(options: &ClientOptions) -> Result<reqwest::Client> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    default_headers.insert(USER_AGENT, HeaderValue::from_static(user_agent()));

    if options.insecure {
        tracing::warn!("TLS certificate verification is disabled");
    }

    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(options.timeout)
        .redirect(reqwest::redirect::Policy::none())
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
        .danger_accept_invalid_certs(options.insecure)
        .default_headers(default_headers)
        .build()
        .map_err(Error::from)
}

/// Decode a JSON body, tagging failures with what was being decoded.
pub(crate) async fn decode_json<T>(response: reqwest::Response, context: &'static str) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|source| Error::Decode { context, source })
}
