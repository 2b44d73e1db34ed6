//! Error type for the client and helpers that turn HTTP failures into it.

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde_json::Value;
use thiserror::Error;

use gantt_types::TypesError;

const MAX_ERROR_DETAIL_CHARS: usize = 200;

/// Request id headers, in lookup order.
const REQUEST_ID_HEADERS: [&str; 2] = ["x-openstack-request-id", "x-compute-request-id"];

#[derive(Debug, Error)]
pub enum Error {
    #[error("authentication failed: {message}{}", request_id_suffix(.request_id.as_deref()))]
    Unauthorized {
        message: String,
        request_id: Option<String>,
    },
    #[error("forbidden: {message}{}", request_id_suffix(.request_id.as_deref()))]
    Forbidden {
        message: String,
        request_id: Option<String>,
    },
    #[error("not found: {message}{}", request_id_suffix(.request_id.as_deref()))]
    NotFound {
        message: String,
        request_id: Option<String>,
    },
    #[error("HTTP {status}: {message}{}", request_id_suffix(.request_id.as_deref()))]
    Http {
        status: StatusCode,
        message: String,
        request_id: Option<String>,
    },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("connection failed after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        source: reqwest::Error,
    },
    #[error("failed to decode {context}: {source}")]
    Decode {
        context: &'static str,
        source: serde_json::Error,
    },
    #[error("no endpoint for service type {service_type:?}{}", region_suffix(.region.as_deref()))]
    EndpointNotFound {
        service_type: String,
        region: Option<String>,
    },
    #[error(transparent)]
    Types(#[from] TypesError),
    #[error(transparent)]
    Config(#[from] gantt_config::ConfigError),
    #[error("the token was rejected and no credentials are available to reauthenticate")]
    ReauthenticationUnavailable,
}

fn request_id_suffix(request_id: Option<&str>) -> String {
    request_id.map_or_else(String::new, |id| format!(" (request id: {id})"))
}

fn region_suffix(region: Option<&str>) -> String {
    region.map_or_else(String::new, |r| format!(" in region {r:?}"))
}

impl Error {
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            Self::Forbidden { .. } => Some(StatusCode::FORBIDDEN),
            Self::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            Self::Http { status, .. } => Some(*status),
            Self::Transport(e) | Self::Exhausted { source: e, .. } => e.status(),
            _ => None,
        }
    }

    /// Build the error for a non-2xx response from its status, headers and body.
    #[must_use]
    pub fn from_response_parts(status: StatusCode, headers: &HeaderMap, body: &str) -> Self {
        let message = extract_fault_message(body).unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            } else {
                truncate_with_ellipsis(trimmed, MAX_ERROR_DETAIL_CHARS)
            }
        });

        let request_id = request_id(headers);
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized {
                message,
                request_id,
            },
            StatusCode::FORBIDDEN => Self::Forbidden {
                message,
                request_id,
            },
            StatusCode::NOT_FOUND => Self::NotFound {
                message,
                request_id,
            },
            _ => Self::Http {
                status,
                message,
                request_id,
            },
        }
    }

    /// Consume a failed response and turn it into an [`Error`].
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.unwrap_or_default();
        Self::from_response_parts(status, &headers, &body)
    }
}

fn request_id(headers: &HeaderMap) -> Option<String> {
    REQUEST_ID_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string)
    })
}

/// Pull a human readable message out of an error body.
///
/// Understands the OpenStack fault envelope (`{"itemNotFound": {"message": ..}}`,
/// any single top-level key), `{"error": {"message": ..}}` and a bare
/// `{"message": ..}`.
#[must_use]
pub fn extract_fault_message(body: &str) -> Option<String> {
    let payload: Value = serde_json::from_str(body.trim()).ok()?;

    payload
        .pointer("/error/message")
        .and_then(Value::as_str)
        .or_else(|| payload.pointer("/message").and_then(Value::as_str))
        .or_else(|| {
            let object = payload.as_object()?;
            if object.len() != 1 {
                return None;
            }
            object
                .values()
                .next()
                .and_then(|fault| fault.get("message"))
                .and_then(Value::as_str)
        })
        .or_else(|| payload.as_str())
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty())
}

fn truncate_with_ellipsis(raw: &str, max_chars: usize) -> String {
    if raw.chars().count() <= max_chars {
        return raw.to_string();
    }
    let mut truncated: String = raw.chars().take(max_chars.saturating_sub(3)).collect();
    truncated.push_str("...");
    truncated
}
