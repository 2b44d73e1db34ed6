use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::TypesError;

/// Base URL of a service (identity or scheduler).
///
/// Always absolute `http`/`https`, never carries a query or fragment, and the
/// path always ends in `/` so that [`Endpoint::join`] appends instead of
/// replacing the last segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint(Url);

impl Endpoint {
    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        let trimmed = raw.trim();
        let invalid = |reason: &str| TypesError::InvalidUrl {
            value: trimmed.to_string(),
            reason: reason.to_string(),
        };

        if trimmed.is_empty() {
            return Err(TypesError::Empty { field: "endpoint" });
        }

        let mut url = Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(invalid("missing host"));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("query strings and fragments are not allowed"));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self(url))
    }

    /// Append a relative path to the endpoint.
    pub fn join(&self, path: &str) -> Result<Url, TypesError> {
        self.0
            .join(path.trim_start_matches('/'))
            .map_err(|e| TypesError::InvalidUrl {
                value: path.to_string(),
                reason: e.to_string(),
            })
    }

    #[must_use]
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl FromStr for Endpoint {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
