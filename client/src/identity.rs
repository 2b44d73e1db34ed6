//! Keystone v2.0 password authentication.
//!
//! `POST {auth_url}/tokens` with the user's password credentials returns an
//! `access` document holding the token and the service catalog. The catalog
//! is how the scheduler endpoint is found when the caller did not pass one.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use gantt_config::{Interface, ServiceSelection};
use gantt_types::{AuthToken, Endpoint, PasswordCredentials};

use crate::retry::{RetryConfig, RetryOutcome, send_with_retry};
use crate::{ClientOptions, Error, Result, decode_json, http_client};

// ============================================================================
// Wire format
// ============================================================================

#[derive(Serialize)]
struct AuthRequest<'a> {
    auth: AuthBody<'a>,
}

#[derive(Serialize)]
struct AuthBody<'a> {
    #[serde(rename = "passwordCredentials")]
    password_credentials: PasswordBody<'a>,
    #[serde(rename = "tenantId", skip_serializing_if = "Option::is_none")]
    tenant_id: Option<&'a str>,
}

#[derive(Serialize)]
struct PasswordBody<'a> {
    username: &'a str,
    password: &'a str,
}

impl<'a> AuthRequest<'a> {
    fn new(credentials: &'a PasswordCredentials) -> Self {
        Self {
            auth: AuthBody {
                password_credentials: PasswordBody {
                    username: credentials.username.as_str(),
                    password: credentials.password.expose(),
                },
                tenant_id: credentials.tenant_id.as_ref().map(|t| t.as_str()),
            },
        }
    }
}

#[derive(Deserialize)]
struct AccessEnvelope {
    access: AccessBody,
}

#[derive(Deserialize)]
struct AccessBody {
    token: TokenBody,
    #[serde(rename = "serviceCatalog", default)]
    service_catalog: Vec<CatalogEntry>,
}

#[derive(Deserialize)]
struct TokenBody {
    id: String,
    expires: Option<String>,
    tenant: Option<TenantBody>,
}

#[derive(Deserialize)]
struct TenantBody {
    id: String,
}

/// One service in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub endpoints: Vec<CatalogEndpoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogEndpoint {
    pub region: Option<String>,
    #[serde(rename = "publicURL")]
    pub public_url: Option<String>,
    #[serde(rename = "internalURL")]
    pub internal_url: Option<String>,
    #[serde(rename = "adminURL")]
    pub admin_url: Option<String>,
}

impl CatalogEndpoint {
    fn url(&self, interface: Interface) -> Option<&str> {
        match interface {
            Interface::Public => self.public_url.as_deref(),
            Interface::Internal => self.internal_url.as_deref(),
            Interface::Admin => self.admin_url.as_deref(),
        }
    }
}

// ============================================================================
// Results
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceCatalog(Vec<CatalogEntry>);

impl ServiceCatalog {
    #[must_use]
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self(entries)
    }

    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.0
    }

    /// Find the endpoint for a service type, region and interface.
    ///
    /// Entries are searched in catalog order; the first endpoint whose region
    /// matches (any region when none is requested) and that publishes the
    /// requested interface wins.
    pub fn endpoint_for(&self, selection: &ServiceSelection) -> Result<Endpoint> {
        let region_matches = |endpoint: &CatalogEndpoint| match &selection.region_name {
            Some(wanted) => endpoint.region.as_deref() == Some(wanted.as_str()),
            None => true,
        };

        let url = self
            .0
            .iter()
            .filter(|entry| entry.service_type == selection.service_type)
            .flat_map(|entry| entry.endpoints.iter())
            .filter(|endpoint| region_matches(endpoint))
            .find_map(|endpoint| endpoint.url(selection.interface))
            .ok_or_else(|| Error::EndpointNotFound {
                service_type: selection.service_type.clone(),
                region: selection.region_name.clone(),
            })?;

        Ok(Endpoint::parse(url)?)
    }
}

/// A successful authentication.
#[derive(Debug, Clone)]
pub struct Access {
    pub token: AuthToken,
    /// Raw expiry timestamp as sent by the identity service.
    pub expires: Option<String>,
    pub tenant_id: Option<String>,
    pub catalog: ServiceCatalog,
}

impl Access {
    /// Expiry as UTC. Accepts RFC 3339 and the zone-less form some
    /// deployments emit (`2012-02-05T00:00:00`).
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.expires.as_deref()?.trim();
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }

    fn from_body(body: AccessBody) -> Result<Self> {
        Ok(Self {
            token: AuthToken::new(body.token.id)?,
            expires: body.token.expires,
            tenant_id: body.token.tenant.map(|t| t.id),
            catalog: ServiceCatalog::new(body.service_catalog),
        })
    }
}

// ============================================================================
// Client
// ============================================================================

#[derive(Debug, Clone)]
pub struct IdentityClient {
    auth_url: Endpoint,
    http: reqwest::Client,
}

impl IdentityClient {
    pub fn new(auth_url: Endpoint, options: &ClientOptions) -> Result<Self> {
        Ok(Self::with_http_client(auth_url, http_client(options)?))
    }

    #[must_use]
    pub fn with_http_client(auth_url: Endpoint, http: reqwest::Client) -> Self {
        Self { auth_url, http }
    }

    #[must_use]
    pub fn auth_url(&self) -> &Endpoint {
        &self.auth_url
    }

    /// Exchange password credentials for a token and service catalog.
    ///
    /// Sent exactly once: a rejected password must not be replayed.
    pub async fn authenticate(&self, credentials: &PasswordCredentials) -> Result<Access> {
        let url = self.auth_url.join("tokens")?;
        let body = AuthRequest::new(credentials);

        tracing::debug!(
            %url,
            username = %credentials.username,
            tenant = credentials.tenant_id.as_ref().map(|t| t.as_str()),
            "Authenticating"
        );

        let outcome = send_with_retry(
            || self.http.post(url.clone()).json(&body),
            &RetryConfig::disabled(),
        )
        .await;

        let response = match outcome {
            RetryOutcome::Success(response) => response,
            RetryOutcome::HttpError(response) => return Err(Error::from_response(response).await),
            RetryOutcome::ConnectionError { attempts, source } => {
                return Err(Error::Exhausted { attempts, source });
            }
            RetryOutcome::NonRetryable(e) => return Err(Error::Transport(e)),
        };

        let envelope: AccessEnvelope = decode_json(response, "identity response").await?;
        let access = Access::from_body(envelope.access)?;
        tracing::info!(
            tenant = access.tenant_id.as_deref(),
            services = access.catalog.entries().len(),
            "Authenticated"
        );
        Ok(access)
    }
}
