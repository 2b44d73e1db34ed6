//! Child zones known to the scheduler.
//!
//! A zone is another scheduler deployment the parent forwards requests to.
//! The parent stores the child's API URL and the credentials it uses to talk
//! to it, plus a linear weighting (`offset + scale * cost`) applied to costs
//! reported by that child.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

const fn default_weight_scale() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: u64,
    pub api_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub weight_offset: f64,
    #[serde(default = "default_weight_scale")]
    pub weight_scale: f64,
}

/// Request body for registering a child zone.
#[derive(Clone, PartialEq, Serialize)]
pub struct NewZone {
    pub api_url: String,
    pub username: String,
    pub password: String,
    pub weight_offset: f64,
    pub weight_scale: f64,
}

impl NewZone {
    #[must_use]
    pub fn new(
        api_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            username: username.into(),
            password: password.into(),
            weight_offset: 0.0,
            weight_scale: default_weight_scale(),
        }
    }

    #[must_use]
    pub fn with_weights(mut self, offset: f64, scale: f64) -> Self {
        self.weight_offset = offset;
        self.weight_scale = scale;
        self
    }
}

impl fmt::Debug for NewZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewZone")
            .field("api_url", &self.api_url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("weight_offset", &self.weight_offset)
            .field("weight_scale", &self.weight_scale)
            .finish()
    }
}

/// Partial update for an existing zone. Only `Some` fields are sent.
#[derive(Clone, Default, PartialEq, Serialize)]
pub struct ZoneUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_offset: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_scale: Option<f64>,
}

impl ZoneUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.api_url.is_none()
            && self.username.is_none()
            && self.password.is_none()
            && self.weight_offset.is_none()
            && self.weight_scale.is_none()
    }
}

impl fmt::Debug for ZoneUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoneUpdate")
            .field("api_url", &self.api_url)
            .field("username", &self.username)
            .field(
                "password",
                &self.password.as_ref().map(|_| "[REDACTED]"),
            )
            .field("weight_offset", &self.weight_offset)
            .field("weight_scale", &self.weight_scale)
            .finish()
    }
}

/// Name and advertised capabilities of the zone answering the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneInfo {
    pub name: String,
    #[serde(default)]
    pub capabilities: BTreeMap<String, String>,
}
