//! Assertable wrapper around `reqwest::Request`.

use std::ops::Deref;

use regex::Regex;
use serde_json::map::Entry;
use serde_json::{Map, Value};
use url::Url;

use super::content::{ContentAssertions, HeaderAssertions, JsonMessage};
use super::percent_decode;
use crate::assertions::{assert_equals, assert_that, format, wildcard_match};

/// A request decorated with chainable assertions.
///
/// Dereferences to the wrapped [`reqwest::Request`], so everything the
/// request exposes stays available. Each `assert_*` method panics with a
/// descriptive message on mismatch and returns `&Self` otherwise.
///
/// # Example
///
/// ```
/// use muzzle::AssertableRequest;
///
/// let request = reqwest::Request::new(
///     reqwest::Method::GET,
///     "https://example.com/users/42?expand=posts".parse().unwrap(),
/// );
///
/// AssertableRequest::from_base_request(request)
///     .assert_method("get")
///     .assert_uri_host("example.com")
///     .assert_uri_path("/users/*")
///     .assert_uri_query_has_key("expand");
/// ```
#[derive(Debug)]
pub struct AssertableRequest {
    inner: reqwest::Request,
}

impl AssertableRequest {
    /// Decorate an existing request.
    pub fn from_base_request(request: reqwest::Request) -> Self {
        Self { inner: request }
    }

    /// Unwrap the decorated request.
    pub fn into_inner(self) -> reqwest::Request {
        self.inner
    }

    /// Path plus query, as it appears on the request line.
    pub fn request_target(&self) -> String {
        let url = self.inner.url();
        match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        }
    }

    /// `user[:password]`, empty when the URL carries no credentials.
    pub fn user_info(&self) -> String {
        let url = self.inner.url();
        match url.password() {
            Some(password) => format!("{}:{}", url.username(), password),
            None => url.username().to_string(),
        }
    }

    /// `[userinfo@]host[:port]`; the port is omitted when it is the
    /// scheme's default.
    pub fn authority(&self) -> String {
        let url = self.inner.url();
        let mut authority = String::new();

        let user_info = self.user_info();
        if !user_info.is_empty() {
            authority.push_str(&user_info);
            authority.push('@');
        }
        authority.push_str(url.host_str().unwrap_or_default());
        if let Some(port) = url.port() {
            authority.push(':');
            authority.push_str(&port.to_string());
        }

        authority
    }

    /// Decoded query pairs in order of appearance.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.inner
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// Query as a JSON object; repeated keys collect into arrays.
    fn query_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        for (key, value) in self.query_pairs() {
            match map.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(Value::String(value));
                }
                Entry::Occupied(mut slot) => match slot.get_mut() {
                    Value::Array(items) => items.push(Value::String(value)),
                    existing => {
                        let first = existing.take();
                        *existing = Value::Array(vec![first, Value::String(value)]);
                    }
                },
            }
        }
        map
    }

    fn decoded_url(&self) -> String {
        percent_decode(self.inner.url().as_str())
    }

    /// Assert that `target` equals the request target.
    #[track_caller]
    pub fn assert_request_target(&self, target: &str) -> &Self {
        assert_equals(target, self.request_target().as_str(), "");
        self
    }

    /// Assert the HTTP method, case-insensitively.
    #[track_caller]
    pub fn assert_method(&self, method: &str) -> &Self {
        let expected = method.to_uppercase();
        let actual = self.inner.method().as_str();
        assert_equals(
            expected.as_str(),
            actual,
            &format!(
                "Expected HTTP method [{}]. Got [{}] for request to {}.",
                expected,
                actual,
                self.decoded_url()
            ),
        );
        self
    }

    /// Assert the URI scheme.
    #[track_caller]
    pub fn assert_uri_scheme(&self, scheme: &str) -> &Self {
        assert_equals(scheme, self.inner.url().scheme(), "");
        self
    }

    /// Assert the URI authority.
    #[track_caller]
    pub fn assert_uri_authority(&self, authority: &str) -> &Self {
        assert_equals(authority, self.authority().as_str(), "");
        self
    }

    /// Assert the URI user information.
    #[track_caller]
    pub fn assert_uri_user_info(&self, user_info: &str) -> &Self {
        assert_equals(user_info, self.user_info().as_str(), "");
        self
    }

    /// Assert the URI host.
    #[track_caller]
    pub fn assert_uri_host(&self, host: &str) -> &Self {
        assert_equals(host, self.inner.url().host_str().unwrap_or_default(), "");
        self
    }

    /// Assert the explicit URI port; `None` means the scheme default.
    #[track_caller]
    pub fn assert_uri_port(&self, port: Option<u16>) -> &Self {
        assert_equals(&port, &self.inner.url().port(), "");
        self
    }

    /// Assert the URI path against a pattern where `*` matches anything.
    #[track_caller]
    pub fn assert_uri_path(&self, pattern: &str) -> &Self {
        let path = self.inner.url().path();
        assert_that(wildcard_match(pattern, path), || {
            format!(
                "The path [{}] does not match the expected pattern [{}].",
                percent_decode(path),
                pattern
            )
        });
        self
    }

    /// Assert the URI path against a regular expression.
    #[track_caller]
    pub fn assert_uri_path_matches(&self, pattern: &str) -> &Self {
        let regex = match Regex::new(pattern) {
            Ok(regex) => regex,
            Err(e) => panic!("Invalid path pattern [{pattern}]: {e}"),
        };
        let path = self.inner.url().path();
        assert_that(regex.is_match(path), || {
            format!(
                "The path [{}] does not match the expected pattern [{}].",
                percent_decode(path),
                pattern
            )
        });
        self
    }

    /// Assert the URI fragment (empty when absent).
    #[track_caller]
    pub fn assert_uri_fragment(&self, fragment: &str) -> &Self {
        assert_equals(fragment, self.inner.url().fragment().unwrap_or_default(), "");
        self
    }

    /// Assert the raw query string (empty when absent).
    #[track_caller]
    pub fn assert_uri_query(&self, query: &str) -> &Self {
        assert_equals(query, self.inner.url().query().unwrap_or_default(), "");
        self
    }

    /// Assert that the query has `key`.
    #[track_caller]
    pub fn assert_uri_query_has_key(&self, key: &str) -> &Self {
        let query = self.query_map();
        assert_that(query.contains_key(key), || {
            format!(
                "Could not find [{}] in the query parameters: {}",
                key,
                format(&query)
            )
        });
        self
    }

    /// Assert that the query does not have `key`.
    #[track_caller]
    pub fn assert_uri_query_not_has_key(&self, key: &str) -> &Self {
        let query = self.query_map();
        assert_that(!query.contains_key(key), || {
            format!(
                "Found unexpected [{}] in the query parameters: {}",
                key,
                format(&query)
            )
        });
        self
    }

    /// Assert that every given pair appears in the query.
    ///
    /// Each pair is looked up on its own, so order is ignored and a
    /// repeated key matches when any of its values does. This is looser
    /// than a positional subset comparison of the parsed query.
    #[track_caller]
    pub fn assert_uri_query_contains<I, K, V>(&self, values: I) -> &Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let expected: Vec<(String, String)> = values
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
            .collect();
        let actual = self.query_pairs();

        assert_that(expected.iter().all(|pair| actual.contains(pair)), || {
            let expected: Map<String, Value> = expected
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            format!(
                "Could not find\n{}\nwithin query\n{}\n",
                format(&expected),
                format(&self.query_map())
            )
        });
        self
    }

    /// Assert that the full URL equals `url`.
    #[track_caller]
    pub fn assert_uri_equals(&self, url: &Url) -> &Self {
        assert_that(self.inner.url() == url, || {
            format!(
                "Failed asserting {} equals {}",
                self.decoded_url(),
                percent_decode(url.as_str())
            )
        });
        self
    }
}

impl Deref for AssertableRequest {
    type Target = reqwest::Request;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl From<reqwest::Request> for AssertableRequest {
    fn from(request: reqwest::Request) -> Self {
        Self::from_base_request(request)
    }
}

impl Clone for AssertableRequest {
    fn clone(&self) -> Self {
        let mut request =
            reqwest::Request::new(self.inner.method().clone(), self.inner.url().clone());
        *request.headers_mut() = self.inner.headers().clone();
        *request.version_mut() = self.inner.version();
        *request.timeout_mut() = self.inner.timeout().copied();
        if let Some(bytes) = self.inner.body().and_then(reqwest::Body::as_bytes) {
            *request.body_mut() = Some(reqwest::Body::from(bytes.to_vec()));
        }

        Self { inner: request }
    }
}

impl JsonMessage for AssertableRequest {
    fn body_bytes(&self) -> &[u8] {
        self.inner
            .body()
            .and_then(reqwest::Body::as_bytes)
            .unwrap_or_default()
    }
}

impl ContentAssertions for AssertableRequest {}

impl HeaderAssertions for AssertableRequest {
    fn header_map(&self) -> &http::HeaderMap {
        self.inner.headers()
    }

    fn message_kind(&self) -> &'static str {
        "request"
    }
}
