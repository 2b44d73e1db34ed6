//! The scheduler API client.

use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

use gantt_types::{ApiVersion, AuthToken, Endpoint};

use crate::retry::{RetryConfig, RetryOutcome, send_with_retry};
use crate::zones::ZonesClient;
use crate::{ClientOptions, Error, Result, decode_json, http_client};

const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Authenticated client for one scheduler endpoint.
///
/// Holds a token for its whole lifetime. Getting a fresh token means building
/// a new client; [`crate::Session`] does that for callers holding credentials.
#[derive(Debug, Clone)]
pub struct Client {
    version: ApiVersion,
    endpoint: Endpoint,
    token: AuthToken,
    http: reqwest::Client,
    retry: RetryConfig,
}

impl Client {
    pub fn new(version: ApiVersion, endpoint: Endpoint, token: AuthToken) -> Result<Self> {
        Self::with_options(version, endpoint, token, &ClientOptions::default())
    }

    pub fn with_options(
        version: ApiVersion,
        endpoint: Endpoint,
        token: AuthToken,
        options: &ClientOptions,
    ) -> Result<Self> {
        Ok(Self::with_http_client(
            version,
            endpoint,
            token,
            http_client(options)?,
            options.retry.clone(),
        ))
    }

    /// Reuse an existing HTTP client (shared connection pool).
    #[must_use]
    pub fn with_http_client(
        version: ApiVersion,
        endpoint: Endpoint,
        token: AuthToken,
        http: reqwest::Client,
        retry: RetryConfig,
    ) -> Self {
        tracing::debug!(%version, endpoint = %endpoint, "Created scheduler client");
        Self {
            version,
            endpoint,
            token,
            http,
            retry,
        }
    }

    #[must_use]
    pub fn version(&self) -> ApiVersion {
        self.version
    }

    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    #[must_use]
    pub fn token(&self) -> &AuthToken {
        &self.token
    }

    #[must_use]
    pub fn zones(&self) -> ZonesClient<'_> {
        ZonesClient::new(self)
    }

    fn request(&self, method: Method, url: reqwest::Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(AUTH_TOKEN_HEADER, self.token.expose())
    }

    /// Send a request and return the successful response.
    ///
    /// Only GET and DELETE are retried. POST and PUT are sent once.
    async fn send<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<reqwest::Response>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint.join(path)?;
        let retry = if method == Method::GET || method == Method::DELETE {
            self.retry.clone()
        } else {
            RetryConfig::disabled()
        };

        tracing::debug!(%method, %url, "Sending request");
        let build = || {
            let request = self.request(method.clone(), url.clone());
            match body {
                Some(body) => request.json(body),
                None => request,
            }
        };

        match send_with_retry(build, &retry).await {
            RetryOutcome::Success(response) => {
                tracing::debug!(status = %response.status(), %url, "Request succeeded");
                Ok(response)
            }
            RetryOutcome::HttpError(response) => {
                let err = Error::from_response(response).await;
                tracing::debug!(error = %err, %url, "Request failed");
                Err(err)
            }
            RetryOutcome::ConnectionError { attempts, source } => {
                Err(Error::Exhausted { attempts, source })
            }
            RetryOutcome::NonRetryable(e) => Err(Error::Transport(e)),
        }
    }

    pub(crate) async fn get_json<T>(&self, path: &str, context: &'static str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.send::<()>(Method::GET, path, None).await?;
        decode_json(response, context).await
    }

    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        context: &'static str,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(method, path, Some(body)).await?;
        decode_json(response, context).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        self.send::<()>(Method::DELETE, path, None).await?;
        Ok(())
    }
}
