//! The `gantt` command-line client.
//!
//! Credentials are read from `--os-*` flags, falling back to the matching
//! `OS_*` environment variables and then to `~/.gantt/config.toml`:
//!
//! ```text
//! export OS_USERNAME=user
//! export OS_PASSWORD=password
//! export OS_TENANT_ID=b363706f891f48019483f8bd6503c54b
//! export OS_AUTH_URL=http://auth.example.com:5000/v2.0
//! gantt zone-list
//! ```
//!
//! Each invocation authenticates again. To skip that, pass a token obtained
//! earlier (`gantt token-get`) together with the service URL it belongs to
//! via `--os-auth-token`/`OS_AUTH_TOKEN` and `--os-image-url`/`OS_IMAGE_URL`.
//! `gantt help` lists the available commands.

pub mod core_dumps;
pub mod output;

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use gantt_client::{
    ApiVersion, AuthSettings, ClientOptions, DEFAULT_TIMEOUT_SECS, NewZone, RetryConfig,
    ServiceSelection, Session, ZoneUpdate,
};
use gantt_config::{CredentialArgs, GanttConfig};

#[derive(Debug, Parser)]
#[command(
    name = "gantt",
    version,
    about = "Command-line interface to the gantt scheduler API",
    long_about = "Command-line interface to the gantt scheduler API.\n\n\
                  Authenticates with --os-username/--os-password/--os-tenant-id/--os-auth-url \
                  (or the matching OS_* environment variables) on every invocation, unless \
                  --os-auth-token and --os-image-url are both given."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Username for the identity service
    #[arg(long, global = true, env = "OS_USERNAME")]
    pub os_username: Option<String>,

    /// Password for the identity service
    #[arg(long, global = true, env = "OS_PASSWORD", hide_env_values = true)]
    pub os_password: Option<String>,

    /// Tenant to request a scoped token for
    #[arg(long, global = true, env = "OS_TENANT_ID")]
    pub os_tenant_id: Option<String>,

    /// Identity service URL, e.g. http://auth.example.com:5000/v2.0
    #[arg(long, global = true, env = "OS_AUTH_URL")]
    pub os_auth_url: Option<String>,

    /// Scheduler service URL; overrides the service catalog
    #[arg(long, global = true, env = "OS_IMAGE_URL")]
    pub os_image_url: Option<String>,

    /// Pre-obtained token; used with --os-image-url to skip authentication
    #[arg(long, global = true, env = "OS_AUTH_TOKEN", hide_env_values = true)]
    pub os_auth_token: Option<String>,

    /// Region to pick from the service catalog
    #[arg(long, global = true, env = "OS_REGION_NAME")]
    pub os_region_name: Option<String>,

    /// Service type to look up in the catalog [default: scheduler]
    #[arg(long, global = true, env = "OS_SERVICE_TYPE")]
    pub os_service_type: Option<String>,

    /// Catalog interface: public, internal or admin [default: public]
    #[arg(long, global = true, env = "OS_ENDPOINT_TYPE")]
    pub os_endpoint_type: Option<String>,

    /// Scheduler API version
    #[arg(long, global = true, env = "GANTT_API_VERSION", default_value = "1")]
    pub api_version: ApiVersion,

    /// Config file [default: ~/.gantt/config.toml]
    #[arg(long, global = true, env = "GANTT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Do not verify TLS certificates
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Print debug logs to stderr
    #[arg(long, global = true)]
    pub debug: bool,
}

impl GlobalArgs {
    #[must_use]
    pub fn credential_args(&self) -> CredentialArgs {
        CredentialArgs {
            username: self.os_username.clone(),
            password: self.os_password.clone(),
            tenant_id: self.os_tenant_id.clone(),
            auth_url: self.os_auth_url.clone(),
            image_url: self.os_image_url.clone(),
            auth_token: self.os_auth_token.clone(),
            region_name: self.os_region_name.clone(),
            service_type: self.os_service_type.clone(),
            endpoint_type: self.os_endpoint_type.clone(),
        }
    }

    #[must_use]
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout: Duration::from_secs(self.timeout.max(1)),
            insecure: self.insecure,
            retry: RetryConfig::default(),
        }
    }

    fn load_config(&self) -> Result<Option<GanttConfig>> {
        match &self.config {
            Some(path) => GanttConfig::load_from(path)
                .map(Some)
                .with_context(|| format!("loading {}", path.display())),
            None => GanttConfig::load().context("loading config file"),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List child zones
    ZoneList,
    /// Show details of a child zone
    ZoneShow {
        /// Zone id
        id: u64,
    },
    /// Register a child zone
    ZoneAdd {
        /// API URL of the child zone
        api_url: String,
        /// Username the parent uses to reach the child
        username: String,
        /// Password the parent uses to reach the child
        password: String,
        /// Constant added to costs reported by the child
        #[arg(long, default_value_t = 0.0)]
        weight_offset: f64,
        /// Factor applied to costs reported by the child
        #[arg(long, default_value_t = 1.0)]
        weight_scale: f64,
    },
    /// Change settings of a child zone
    ZoneUpdate {
        /// Zone id
        id: u64,
        #[arg(long)]
        api_url: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        weight_offset: Option<f64>,
        #[arg(long)]
        weight_scale: Option<f64>,
    },
    /// Remove a child zone
    ZoneDelete {
        /// Zone id
        id: u64,
    },
    /// Show the name and capabilities of this zone
    ZoneInfo,
    /// Authenticate and print the token and service URL for reuse
    TokenGet,
}

/// Build a session from the parsed arguments and the config file.
pub fn session(global: &GlobalArgs) -> Result<Session> {
    let file = global.load_config()?;
    let args = global.credential_args();
    let auth = AuthSettings::resolve(&args, file.as_ref())?;
    let selection = ServiceSelection::resolve(&args, file.as_ref())?;

    if !auth.can_reauthenticate() {
        tracing::debug!("Using pre-obtained token");
    }

    Ok(Session::new(
        auth,
        selection,
        global.api_version,
        global.client_options(),
    )?)
}

/// Execute one command, writing its output to `out`.
pub async fn run<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    let session = session(&cli.global)?;

    match cli.command {
        Command::ZoneList => {
            let zones = session.run(async |client| client.zones().list().await).await?;
            write!(out, "{}", output::zone_list(&zones).render())?;
        }
        Command::ZoneShow { id } => {
            let zone = session
                .run(async |client| client.zones().get(id).await)
                .await?;
            write!(out, "{}", output::zone_details(&zone).render())?;
        }
        Command::ZoneAdd {
            api_url,
            username,
            password,
            weight_offset,
            weight_scale,
        } => {
            let new_zone =
                NewZone::new(api_url, username, password).with_weights(weight_offset, weight_scale);
            let zone = session
                .run(async |client| client.zones().create(&new_zone).await)
                .await?;
            write!(out, "{}", output::zone_details(&zone).render())?;
        }
        Command::ZoneUpdate {
            id,
            api_url,
            username,
            password,
            weight_offset,
            weight_scale,
        } => {
            let update = ZoneUpdate {
                api_url,
                username,
                password,
                weight_offset,
                weight_scale,
            };
            anyhow::ensure!(!update.is_empty(), "zone-update: nothing to change");
            let zone = session
                .run(async |client| client.zones().update(id, &update).await)
                .await?;
            write!(out, "{}", output::zone_details(&zone).render())?;
        }
        Command::ZoneDelete { id } => {
            session
                .run(async |client| client.zones().delete(id).await)
                .await?;
        }
        Command::ZoneInfo => {
            let info = session.run(async |client| client.zones().info().await).await?;
            write!(out, "{}", output::zone_info(&info).render())?;
        }
        Command::TokenGet => {
            let auth = session.authenticate().await?;
            let mut rows = vec![
                ("token", auth.token.expose().to_string()),
                ("service_url", auth.endpoint.to_string()),
            ];
            if let Some(expires_at) = auth.expires_at {
                rows.push(("expires", expires_at.to_rfc3339()));
            }
            write!(out, "{}", output::properties(rows).render())?;
        }
    }

    out.flush().context("failed to write output")
}
