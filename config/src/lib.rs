//! Credential resolution and configuration loading for gantt.
//!
//! Credentials come from three layers, highest precedence first:
//!
//! 1. command-line flags,
//! 2. `OS_*` environment variables,
//! 3. the optional `~/.gantt/config.toml` file (`[auth]` table).
//!
//! The first two are merged by the CLI before they reach this crate, so
//! [`CredentialArgs`] carries one optional value per setting. The file layer
//! fills in whatever is still unset, then [`AuthSettings::resolve`] decides
//! whether the caller already holds a token or has to authenticate.

use std::path::{Path, PathBuf};
use std::{env, fmt};

use serde::Deserialize;
use thiserror::Error;

use gantt_types::{
    AuthToken, Endpoint, Password, PasswordCredentials, TenantId, TypesError, Username,
};

pub const DEFAULT_SERVICE_TYPE: &str = "scheduler";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("missing credentials: {}", .missing.join(", "))]
    MissingCredentials { missing: Vec<&'static str> },
    #[error("invalid {setting}: {source}")]
    Invalid {
        setting: &'static str,
        source: TypesError,
    },
    #[error("invalid endpoint interface {0:?} (expected public, internal or admin)")]
    InvalidInterface(String),
}

// ============================================================================
// Config file
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct GanttConfig {
    pub auth: Option<AuthConfig>,
}

/// `[auth]` table of the config file. Keys mirror the `OS_*` variables.
#[derive(Default, Deserialize)]
pub struct AuthConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub tenant_id: Option<String>,
    pub auth_url: Option<String>,
    pub image_url: Option<String>,
    pub auth_token: Option<String>,
    pub region_name: Option<String>,
    pub service_type: Option<String>,
    pub endpoint_type: Option<String>,
}

// Manual Debug impl to prevent leaking secrets in logs.
impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn mask(opt: Option<&String>) -> &'static str {
            if opt.is_some() { "[REDACTED]" } else { "None" }
        }
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("password", &mask(self.password.as_ref()))
            .field("tenant_id", &self.tenant_id)
            .field("auth_url", &self.auth_url)
            .field("image_url", &self.image_url)
            .field("auth_token", &mask(self.auth_token.as_ref()))
            .field("region_name", &self.region_name)
            .field("service_type", &self.service_type)
            .field("endpoint_type", &self.endpoint_type)
            .finish()
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".gantt").join("config.toml"))
}

/// Expand `${VAR}` references. Unknown variables expand to the empty string;
/// an unterminated `${` is kept literally.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let var = &after[..end];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

impl GanttConfig {
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| {
            tracing::warn!("Failed to read config at {:?}: {}", path, source);
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;

        toml::from_str(&content).map_err(|source| {
            tracing::warn!("Failed to parse config at {:?}: {}", path, source);
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    fn auth(&self) -> Option<&AuthConfig> {
        self.auth.as_ref()
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Flag/environment values as collected by the CLI. Every field is optional.
#[derive(Default, Clone)]
pub struct CredentialArgs {
    pub username: Option<String>,
    pub password: Option<String>,
    pub tenant_id: Option<String>,
    pub auth_url: Option<String>,
    pub image_url: Option<String>,
    pub auth_token: Option<String>,
    pub region_name: Option<String>,
    pub service_type: Option<String>,
    pub endpoint_type: Option<String>,
}

impl fmt::Debug for CredentialArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialArgs")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("tenant_id", &self.tenant_id)
            .field("auth_url", &self.auth_url)
            .field("image_url", &self.image_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("region_name", &self.region_name)
            .field("service_type", &self.service_type)
            .field("endpoint_type", &self.endpoint_type)
            .finish()
    }
}

/// Pick the first non-blank value; file values get `${VAR}` expansion.
fn pick(arg: Option<&String>, file: Option<&String>) -> Option<String> {
    arg.map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| {
            file.map(|v| expand_env_vars(v).trim().to_string())
                .filter(|v| !v.is_empty())
        })
}

/// Same as [`pick`] but keeps surrounding whitespace, for passwords.
fn pick_raw(arg: Option<&String>, file: Option<&String>) -> Option<String> {
    arg.filter(|v| !v.is_empty())
        .cloned()
        .or_else(|| file.map(|v| expand_env_vars(v)).filter(|v| !v.is_empty()))
}

fn invalid(setting: &'static str) -> impl FnOnce(TypesError) -> ConfigError {
    move |source| ConfigError::Invalid { setting, source }
}

/// How the CLI obtains a token for this invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthSettings {
    /// A pre-obtained token and the service URL it is valid for.
    Token { token: AuthToken, endpoint: Endpoint },
    /// Authenticate against the identity service on every invocation.
    Password {
        credentials: PasswordCredentials,
        auth_url: Endpoint,
        endpoint_override: Option<Endpoint>,
    },
}

impl AuthSettings {
    pub fn resolve(
        args: &CredentialArgs,
        file: Option<&GanttConfig>,
    ) -> Result<Self, ConfigError> {
        let file = file.and_then(GanttConfig::auth);
        let from_file = |f: fn(&AuthConfig) -> Option<&String>| file.and_then(f);

        let token = pick(args.auth_token.as_ref(), from_file(|c| c.auth_token.as_ref()));
        let image_url = pick(args.image_url.as_ref(), from_file(|c| c.image_url.as_ref()));

        if let (Some(token), Some(image_url)) = (&token, &image_url) {
            tracing::debug!(
                "Using pre-obtained token; skipping authentication and ignoring any password credentials"
            );
            return Ok(Self::Token {
                token: AuthToken::new(token.as_str()).map_err(invalid("auth token"))?,
                endpoint: Endpoint::parse(image_url).map_err(invalid("image url"))?,
            });
        }

        let username = pick(args.username.as_ref(), from_file(|c| c.username.as_ref()));
        let password = pick_raw(args.password.as_ref(), from_file(|c| c.password.as_ref()));
        let tenant_id = pick(args.tenant_id.as_ref(), from_file(|c| c.tenant_id.as_ref()));
        let auth_url = pick(args.auth_url.as_ref(), from_file(|c| c.auth_url.as_ref()));

        let mut missing = Vec::new();
        if username.is_none() {
            missing.push("--os-username or OS_USERNAME");
        }
        if password.is_none() {
            missing.push("--os-password or OS_PASSWORD");
        }
        if auth_url.is_none() {
            missing.push("--os-auth-url or OS_AUTH_URL");
        }

        let (Some(username), Some(password), Some(auth_url)) = (username, password, auth_url)
        else {
            if token.is_some() {
                missing.push("--os-image-url or OS_IMAGE_URL (required with a token)");
            }
            return Err(ConfigError::MissingCredentials { missing });
        };

        if token.is_some() {
            tracing::warn!("Auth token given without a service URL; ignoring it and reauthenticating");
        }

        let credentials = PasswordCredentials::new(
            Username::new(username).map_err(invalid("username"))?,
            Password::new(password).map_err(invalid("password"))?,
            tenant_id
                .map(TenantId::new)
                .transpose()
                .map_err(invalid("tenant id"))?,
        );

        Ok(Self::Password {
            credentials,
            auth_url: Endpoint::parse(&auth_url).map_err(invalid("auth url"))?,
            endpoint_override: image_url
                .map(|url| Endpoint::parse(&url))
                .transpose()
                .map_err(invalid("image url"))?,
        })
    }

    #[must_use]
    pub fn can_reauthenticate(&self) -> bool {
        matches!(self, Self::Password { .. })
    }
}

/// Which catalog URL of a service entry to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interface {
    #[default]
    Public,
    Internal,
    Admin,
}

impl Interface {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "public" | "publicurl" => Ok(Self::Public),
            "internal" | "internalurl" => Ok(Self::Internal),
            "admin" | "adminurl" => Ok(Self::Admin),
            _ => Err(ConfigError::InvalidInterface(raw.to_string())),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Internal => "internal",
            Self::Admin => "admin",
        }
    }
}

/// Selects the scheduler endpoint out of the identity service catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSelection {
    pub service_type: String,
    pub region_name: Option<String>,
    pub interface: Interface,
}

impl Default for ServiceSelection {
    fn default() -> Self {
        Self {
            service_type: DEFAULT_SERVICE_TYPE.to_string(),
            region_name: None,
            interface: Interface::Public,
        }
    }
}

impl ServiceSelection {
    pub fn resolve(
        args: &CredentialArgs,
        file: Option<&GanttConfig>,
    ) -> Result<Self, ConfigError> {
        let file = file.and_then(GanttConfig::auth);
        let service_type = pick(
            args.service_type.as_ref(),
            file.and_then(|c| c.service_type.as_ref()),
        )
        .unwrap_or_else(|| DEFAULT_SERVICE_TYPE.to_string());
        let region_name = pick(
            args.region_name.as_ref(),
            file.and_then(|c| c.region_name.as_ref()),
        );
        let interface = pick(
            args.endpoint_type.as_ref(),
            file.and_then(|c| c.endpoint_type.as_ref()),
        )
        .map(|raw| Interface::parse(&raw))
        .transpose()?
        .unwrap_or_default();

        Ok(Self {
            service_type,
            region_name,
            interface,
        })
    }
}
