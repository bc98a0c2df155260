//! Mock client configuration.

use std::env;

use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use url::Url;

use crate::error::{MuzzleError, Result};

const BASE_URI_ENV: &str = "MUZZLE_BASE_URI";

/// Settings applied to every request the mock client sends.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    base_uri: Option<Url>,
    headers: HeaderMap,
    http_errors: bool,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config from environment variables.
    ///
    /// Uses `MUZZLE_BASE_URI` as the base URI when it is set.
    ///
    /// # Errors
    ///
    /// Returns an error if `MUZZLE_BASE_URI` is not a valid URL.
    pub fn from_env() -> Result<Self> {
        match env::var(BASE_URI_ENV) {
            Ok(base_uri) => Self::new().with_base_uri(&base_uri),
            Err(_) => Ok(Self::new()),
        }
    }

    /// Resolve relative request URIs against `base_uri`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_uri` is not a valid URL.
    pub fn with_base_uri(mut self, base_uri: &str) -> Result<Self> {
        self.base_uri = Some(Url::parse(base_uri)?);
        Ok(self)
    }

    /// Send `name: value` on every request that does not set `name` itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or value is not a valid header.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        self.headers
            .append(HeaderName::try_from(name)?, HeaderValue::try_from(value)?);
        Ok(self)
    }

    /// Return 4xx/5xx replies as [`MuzzleError::Status`] errors.
    #[must_use]
    pub fn with_http_errors(mut self, enabled: bool) -> Self {
        self.http_errors = enabled;
        self
    }

    pub fn base_uri(&self) -> Option<&Url> {
        self.base_uri.as_ref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn http_errors(&self) -> bool {
        self.http_errors
    }

    pub fn set_base_uri(&mut self, base_uri: Option<Url>) {
        self.base_uri = base_uri;
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn set_http_errors(&mut self, enabled: bool) {
        self.http_errors = enabled;
    }

    /// Turn `uri` into an absolute URL, joining it onto the base URI when
    /// it is relative.
    pub(crate) fn resolve(&self, uri: &str) -> Result<Url> {
        match Url::parse(uri) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.base_uri {
                Some(base) => Ok(base.join(uri)?),
                None => Err(MuzzleError::MissingBaseUri(uri.to_string())),
            },
            Err(e) => Err(e.into()),
        }
    }
}
