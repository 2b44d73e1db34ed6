//! Core domain types for the gantt client.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the client or the CLI.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod endpoint;
mod ids;
mod zone;

pub use endpoint::Endpoint;
pub use ids::{TenantId, Username};
pub use zone::{NewZone, Zone, ZoneInfo, ZoneUpdate};

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("invalid URL {value:?}: {reason}")]
    InvalidUrl { value: String, reason: String },
    #[error("unsupported API version {0:?} (supported: 1)")]
    UnsupportedVersion(String),
}

// ============================================================================
// API Version
// ============================================================================

/// Versions of the scheduler API this client can speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ApiVersion {
    #[default]
    V1,
}

impl ApiVersion {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ApiVersion::V1 => "1",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        let normalized = raw.trim().to_ascii_lowercase();
        let normalized = normalized.strip_prefix('v').unwrap_or(&normalized);
        match normalized {
            "1" | "1.0" => Ok(ApiVersion::V1),
            _ => Err(TypesError::UnsupportedVersion(raw.to_string())),
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ============================================================================
// Secrets
// ============================================================================

/// Opaque token issued by the identity service.
///
/// The value is never printed by `Debug`; use [`AuthToken::expose`] at the
/// point where it is written into a request header.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(value: impl Into<String>) -> Result<Self, TypesError> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return Err(TypesError::Empty { field: "auth token" });
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthToken(<redacted>)")
    }
}

/// A user password. Not trimmed: leading and trailing spaces are significant.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub fn new(value: impl Into<String>) -> Result<Self, TypesError> {
        let value = value.into();
        if value.is_empty() {
            return Err(TypesError::Empty { field: "password" });
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Password(<redacted>)")
    }
}

/// Username/password pair, optionally scoped to a tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordCredentials {
    pub username: Username,
    pub password: Password,
    pub tenant_id: Option<TenantId>,
}

impl PasswordCredentials {
    #[must_use]
    pub fn new(username: Username, password: Password, tenant_id: Option<TenantId>) -> Self {
        Self {
            username,
            password,
            tenant_id,
        }
    }
}
