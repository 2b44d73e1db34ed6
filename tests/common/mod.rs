//! Shared test utilities and fixtures
//!
//! One wiremock server plays both the identity service (`/v2.0/tokens`) and
//! the scheduler (`/v1/<tenant>/...`).

#![allow(dead_code)]

use std::time::Duration;

use gantt_client::{
    ApiVersion, AuthSettings, AuthToken, Client, ClientOptions, Endpoint, Password,
    PasswordCredentials, RetryConfig, ServiceSelection, Session, TenantId, Username,
};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TENANT: &str = "b363706f891f48019483f8bd6503c54b";
pub const TOKEN: &str = "3bcc3d3a03f44e3d8377f9247b0ad155";

/// Retry settings without delays.
pub fn fast_options() -> ClientOptions {
    ClientOptions {
        timeout: Duration::from_secs(5),
        insecure: false,
        retry: RetryConfig {
            max_retries: 2,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(10),
            jitter_factor: 0.0,
        },
    }
}

pub fn scheduler_path(suffix: &str) -> String {
    format!("/v1/{TENANT}/{suffix}")
}

pub fn scheduler_url(server: &MockServer) -> String {
    format!("{}/v1/{TENANT}", server.uri())
}

pub fn auth_url(server: &MockServer) -> String {
    format!("{}/v2.0", server.uri())
}

pub fn token_client(server: &MockServer) -> Client {
    Client::with_options(
        ApiVersion::V1,
        Endpoint::parse(&scheduler_url(server)).unwrap(),
        AuthToken::new(TOKEN).unwrap(),
        &fast_options(),
    )
    .unwrap()
}

pub fn credentials() -> PasswordCredentials {
    PasswordCredentials::new(
        Username::new("alice").unwrap(),
        Password::new("secret").unwrap(),
        Some(TenantId::new(TENANT).unwrap()),
    )
}

pub fn password_session(server: &MockServer) -> Session {
    let auth = AuthSettings::Password {
        credentials: credentials(),
        auth_url: Endpoint::parse(&auth_url(server)).unwrap(),
        endpoint_override: None,
    };
    Session::new(auth, ServiceSelection::default(), ApiVersion::V1, fast_options()).unwrap()
}

pub fn token_session(server: &MockServer) -> Session {
    let auth = AuthSettings::Token {
        token: AuthToken::new(TOKEN).unwrap(),
        endpoint: Endpoint::parse(&scheduler_url(server)).unwrap(),
    };
    Session::new(auth, ServiceSelection::default(), ApiVersion::V1, fast_options()).unwrap()
}

/// Keystone v2.0 access document whose catalog points back at `server`.
pub fn access_body(server: &MockServer, token: &str) -> serde_json::Value {
    serde_json::json!({
        "access": {
            "token": {
                "id": token,
                "expires": "2030-01-01T00:00:00Z",
                "tenant": {"id": TENANT, "name": "demo"}
            },
            "serviceCatalog": [
                {
                    "type": "compute",
                    "name": "nova",
                    "endpoints": [{"region": "RegionOne", "publicURL": "http://nova.invalid/v1.1"}]
                },
                {
                    "type": "scheduler",
                    "name": "gantt",
                    "endpoints": [{
                        "region": "RegionOne",
                        "publicURL": scheduler_url(server)
                    }]
                }
            ],
            "user": {"id": "u-1", "name": "alice"}
        }
    })
}

/// Mount a successful password exchange issuing `token`.
pub async fn mount_identity(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/v2.0/tokens"))
        .and(body_partial_json(serde_json::json!({
            "auth": {"passwordCredentials": {"username": "alice", "password": "secret"}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(access_body(server, token)))
        .mount(server)
        .await;
}

pub fn zone_json(id: u64, api_url: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "api_url": api_url,
        "username": "admin",
        "weight_offset": 0.0,
        "weight_scale": 1.0
    })
}
