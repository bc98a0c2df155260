//! Request matchers paired with canned replies.

use std::fmt;

use bytes::Bytes;
use http::{Method, Response, StatusCode};
use url::Url;

use crate::assertions::wildcard_match;
use crate::messages::{AssertableRequest, AssertableResponse};

// Relative patterns are normalized against this base; only their path and
// query are compared.
const PATH_ONLY_BASE: &str = "http://localhost/";

/// A configured request matcher and the reply it produces.
///
/// Every criterion is optional; an expectation with none set matches any
/// request. The reply defaults to `200 OK` with an empty body.
///
/// # Example
///
/// ```
/// use http::{Method, Response, StatusCode};
/// use muzzle::Expectation;
///
/// let expectation = Expectation::new()
///     .method(Method::POST)
///     .uri("https://example.com/users/*")
///     .query([("notify", "true")])
///     .reply_status(StatusCode::CREATED);
/// ```
#[derive(Debug)]
pub struct Expectation {
    method: Option<Method>,
    uri: Option<String>,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    reply: Response<Bytes>,
}

impl Default for Expectation {
    fn default() -> Self {
        Self::new()
    }
}

impl Expectation {
    pub fn new() -> Self {
        Self {
            method: None,
            uri: None,
            query: Vec::new(),
            headers: Vec::new(),
            reply: Response::new(Bytes::new()),
        }
    }

    pub fn get(uri: impl Into<String>) -> Self {
        Self::new().method(Method::GET).uri(uri)
    }

    pub fn post(uri: impl Into<String>) -> Self {
        Self::new().method(Method::POST).uri(uri)
    }

    pub fn put(uri: impl Into<String>) -> Self {
        Self::new().method(Method::PUT).uri(uri)
    }

    pub fn patch(uri: impl Into<String>) -> Self {
        Self::new().method(Method::PATCH).uri(uri)
    }

    pub fn delete(uri: impl Into<String>) -> Self {
        Self::new().method(Method::DELETE).uri(uri)
    }

    /// Require the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Require the URI.
    ///
    /// An absolute URI checks scheme, host, port and path; a relative one
    /// checks the path only. Both are percent-encoded the way request URLs
    /// are. `*` in the path matches any run of characters, and a query in
    /// the URI is added to the required query.
    #[must_use]
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Require query pairs. Extra pairs on the request are allowed.
    #[must_use]
    pub fn query<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Require a header value.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Reply with `response`.
    #[must_use]
    pub fn reply_with(mut self, response: impl Into<AssertableResponse>) -> Self {
        self.reply = response.into().into_inner();
        self
    }

    /// Reply with an empty body and the given status.
    #[must_use]
    pub fn reply_status(mut self, status: StatusCode) -> Self {
        *self.reply.status_mut() = status;
        self
    }

    /// The canned reply.
    pub fn reply(&self) -> &Response<Bytes> {
        &self.reply
    }

    pub(crate) fn into_reply(self) -> Response<Bytes> {
        self.reply
    }

    /// Make a relative URI pattern absolute against `base`.
    pub(crate) fn resolve_against(mut self, base: &Url) -> Self {
        if let Some(pattern) = &self.uri {
            if let Err(url::ParseError::RelativeUrlWithoutBase) = Url::parse(pattern) {
                if let Ok(resolved) = base.join(pattern) {
                    self.uri = Some(resolved.to_string());
                }
            }
        }
        self
    }

    /// Check whether `request` satisfies every criterion.
    pub fn matches(&self, request: &AssertableRequest) -> bool {
        if let Some(method) = &self.method {
            if request.method() != method {
                return false;
            }
        }

        let url = request.url();
        let mut required_query = self.query.clone();

        if let Some(pattern) = &self.uri {
            let expected = match Url::parse(pattern) {
                Ok(expected) => {
                    if expected.scheme() != url.scheme()
                        || expected.host_str() != url.host_str()
                        || expected.port_or_known_default() != url.port_or_known_default()
                    {
                        return false;
                    }
                    expected
                }
                Err(url::ParseError::RelativeUrlWithoutBase) => {
                    match Url::parse(PATH_ONLY_BASE).and_then(|base| base.join(pattern)) {
                        Ok(expected) => expected,
                        Err(_) => return false,
                    }
                }
                Err(_) => return false,
            };

            if !wildcard_match(expected.path(), url.path()) {
                return false;
            }
            required_query.extend(
                expected
                    .query_pairs()
                    .map(|(k, v)| (k.into_owned(), v.into_owned())),
            );
        }

        if !required_query.is_empty() {
            let actual = request.query_pairs();
            if !required_query.iter().all(|pair| actual.contains(pair)) {
                return false;
            }
        }

        self.headers.iter().all(|(name, value)| {
            request
                .headers()
                .get_all(name.as_str())
                .iter()
                .any(|v| v.as_bytes() == value.as_bytes())
        })
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.method {
            Some(method) => write!(f, "{method}")?,
            None => write!(f, "ANY")?,
        }
        write!(f, " {}", self.uri.as_deref().unwrap_or("*"))?;

        if !self.query.is_empty() {
            let query = self
                .query
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("&");
            write!(f, " ?{query}")?;
        }
        for (name, value) in &self.headers {
            write!(f, " [{name}: {value}]")?;
        }
        Ok(())
    }
}
