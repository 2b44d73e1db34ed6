//! Per-invocation authentication.
//!
//! A [`Session`] owns the resolved [`AuthSettings`] and builds a [`Client`]
//! on demand. With a pre-obtained token it never talks to the identity
//! service. With password credentials every [`Session::connect`] performs a
//! fresh password exchange; tokens are never cached between connects.

use chrono::{DateTime, Utc};
use gantt_config::{AuthSettings, ServiceSelection};
use gantt_types::{ApiVersion, AuthToken, Endpoint};

use crate::identity::IdentityClient;
use crate::{Client, ClientOptions, Error, Result, http_client};

/// A token and the scheduler endpoint it is valid for.
#[derive(Debug, Clone)]
pub struct Authorization {
    pub token: AuthToken,
    pub endpoint: Endpoint,
    /// Only known after a password exchange.
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct Session {
    auth: AuthSettings,
    selection: ServiceSelection,
    version: ApiVersion,
    options: ClientOptions,
    http: reqwest::Client,
}

impl Session {
    pub fn new(
        auth: AuthSettings,
        selection: ServiceSelection,
        version: ApiVersion,
        options: ClientOptions,
    ) -> Result<Self> {
        let http = http_client(&options)?;
        Ok(Self {
            auth,
            selection,
            version,
            options,
            http,
        })
    }

    #[must_use]
    pub fn can_reauthenticate(&self) -> bool {
        self.auth.can_reauthenticate()
    }

    #[must_use]
    pub fn version(&self) -> ApiVersion {
        self.version
    }

    /// Obtain a token and the scheduler endpoint it should be used against.
    pub async fn authenticate(&self) -> Result<Authorization> {
        match &self.auth {
            AuthSettings::Token { token, endpoint } => Ok(Authorization {
                token: token.clone(),
                endpoint: endpoint.clone(),
                expires_at: None,
            }),
            AuthSettings::Password {
                credentials,
                auth_url,
                endpoint_override,
            } => {
                let identity = IdentityClient::with_http_client(auth_url.clone(), self.http.clone());
                let access = identity.authenticate(credentials).await?;
                let endpoint = match endpoint_override {
                    Some(endpoint) => endpoint.clone(),
                    None => access.catalog.endpoint_for(&self.selection)?,
                };
                tracing::debug!(endpoint = %endpoint, "Resolved scheduler endpoint");
                Ok(Authorization {
                    expires_at: access.expires_at(),
                    token: access.token,
                    endpoint,
                })
            }
        }
    }

    /// Build a client, authenticating first when holding credentials.
    pub async fn connect(&self) -> Result<Client> {
        let Authorization { token, endpoint, .. } = self.authenticate().await?;
        Ok(Client::with_http_client(
            self.version,
            endpoint,
            token,
            self.http.clone(),
            self.options.retry.clone(),
        ))
    }

    /// Force a new password exchange. Fails in token mode.
    pub async fn reauthenticate(&self) -> Result<Client> {
        if !self.can_reauthenticate() {
            return Err(Error::ReauthenticationUnavailable);
        }
        self.connect().await
    }

    /// Run `op` against a freshly connected client.
    ///
    /// If the service rejects the token and credentials are available, the
    /// session authenticates again and runs `op` one more time.
    pub async fn run<T, F>(&self, op: F) -> Result<T>
    where
        F: AsyncFn(&Client) -> Result<T>,
    {
        let client = self.connect().await?;
        match op(&client).await {
            Err(err) if err.is_unauthorized() && self.can_reauthenticate() => {
                tracing::warn!(error = %err, "Token rejected; reauthenticating");
                let client = self.reauthenticate().await?;
                op(&client).await
            }
            other => other,
        }
    }
}
