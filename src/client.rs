//! The mock HTTP client.
//!
//! [`Muzzle`] never touches the network: each request runs through the
//! middleware stack and ends at a [`MockHandler`] that replays the queued
//! expectations and records every exchange.

use http::Method;
use url::Url;

use crate::assertions::assert_that;
use crate::config::ClientConfig;
use crate::error::{MuzzleError, Result};
use crate::expectation::Expectation;
use crate::handler::MockHandler;
use crate::messages::{AssertableRequest, AssertableResponse, Transaction, Transactions};
use crate::middleware::{HandlerStack, Middleware};

/// Mock HTTP client replaying configured expectations.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use muzzle::{Expectation, Muzzle};
///
/// # fn main() -> muzzle::Result<()> {
/// let mut client = Muzzle::new();
/// client
///     .append(Expectation::post("https://example.com").reply_status(StatusCode::CREATED))
///     .append(Expectation::get("https://example.com"));
///
/// client.post("https://example.com")?.assert_created();
/// client.get("https://example.com")?.assert_ok();
///
/// client.last_request().unwrap().assert_method("GET");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct Muzzle {
    config: ClientConfig,
    stack: HandlerStack,
    handler: MockHandler,
}

impl Muzzle {
    /// Create a client with the default configuration and no expectations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client with the given configuration.
    pub fn make(config: ClientConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Start a [`MuzzleBuilder`].
    pub fn builder() -> MuzzleBuilder {
        MuzzleBuilder::default()
    }

    /// Queue an expectation.
    ///
    /// A relative URI pattern is resolved against the configured base URI,
    /// the same way request URIs are.
    pub fn append(&mut self, expectation: Expectation) -> &mut Self {
        let expectation = match self.config.base_uri() {
            Some(base) => expectation.resolve_against(base),
            None => expectation,
        };
        self.handler.append(expectation);
        self
    }

    /// Add a named middleware at the bottom of the stack.
    pub fn add_middleware(
        &mut self,
        name: impl Into<String>,
        middleware: impl Middleware + 'static,
    ) -> &mut Self {
        self.stack.push(name, middleware);
        self
    }

    /// Remove every middleware called `name`.
    pub fn remove_middleware(&mut self, name: &str) -> &mut Self {
        self.stack.remove(name);
        self
    }

    pub fn stack(&self) -> &HandlerStack {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut HandlerStack {
        &mut self.stack
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Change the configuration in place and return this same client.
    pub fn update_config<F: FnOnce(&mut ClientConfig)>(&mut self, f: F) -> &mut Self {
        f(&mut self.config);
        self
    }

    /// Expectations not consumed yet.
    pub fn pending(&self) -> &[Expectation] {
        self.handler.pending()
    }

    /// Build a request, resolving `uri` against the configured base URI and
    /// carrying the configured default headers.
    ///
    /// # Errors
    ///
    /// Returns an error if `uri` is invalid, or relative with no base URI.
    pub fn request(&self, method: Method, uri: &str) -> Result<reqwest::Request> {
        let url = self.config.resolve(uri)?;
        let mut request = reqwest::Request::new(method, url);
        self.apply_default_headers(&mut request);
        Ok(request)
    }

    fn apply_default_headers(&self, request: &mut reqwest::Request) {
        let defaults = self.config.headers();
        for name in defaults.keys() {
            if !request.headers().contains_key(name) {
                for value in defaults.get_all(name) {
                    request.headers_mut().append(name.clone(), value.clone());
                }
            }
        }
    }

    /// Send a request through the middleware stack to the expectations.
    ///
    /// Default headers from the configuration are added when the request
    /// does not set them.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is a stream, no expectation is queued,
    /// or `http_errors` is enabled and the reply is a 4xx/5xx.
    ///
    /// # Panics
    ///
    /// Panics, failing the test, when expectations are queued but none of
    /// them matches the request.
    #[tracing::instrument(skip(self, request), fields(method = %request.method(), url = %request.url()))]
    pub fn send(&mut self, mut request: reqwest::Request) -> Result<AssertableResponse> {
        if let Some(body) = request.body() {
            if body.as_bytes().is_none() {
                return Err(MuzzleError::StreamingBody);
            }
        }

        self.apply_default_headers(&mut request);

        let uri = request.url().to_string();
        let sent = AssertableRequest::from_base_request(request);
        let snapshot = sent.clone();
        let recorded = self.handler.history().len();

        let reply = self.stack.call(sent.into_inner(), &mut self.handler)?;
        let response = AssertableResponse::new(reply);

        // Record what the caller receives, after every layer has run.
        let history = self.handler.history_mut();
        if history.len() > recorded {
            if let Some(last) = history.last_mut() {
                last.set_response(response.clone());
            }
        } else {
            history.push(
                Transaction::new()
                    .with_request(snapshot)
                    .with_response(response.clone()),
            );
        }

        let status = response.status();
        tracing::debug!(status = status.as_u16(), "mock response");

        if self.config.http_errors() && (status.is_client_error() || status.is_server_error()) {
            return Err(MuzzleError::Status {
                status: status.as_u16(),
                uri,
            });
        }

        Ok(response)
    }

    /// Send a body-less request.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request) and [`send`](Self::send).
    pub fn call(&mut self, method: Method, uri: &str) -> Result<AssertableResponse> {
        let request = self.request(method, uri)?;
        self.send(request)
    }

    pub fn get(&mut self, uri: &str) -> Result<AssertableResponse> {
        self.call(Method::GET, uri)
    }

    pub fn post(&mut self, uri: &str) -> Result<AssertableResponse> {
        self.call(Method::POST, uri)
    }

    pub fn put(&mut self, uri: &str) -> Result<AssertableResponse> {
        self.call(Method::PUT, uri)
    }

    pub fn patch(&mut self, uri: &str) -> Result<AssertableResponse> {
        self.call(Method::PATCH, uri)
    }

    pub fn delete(&mut self, uri: &str) -> Result<AssertableResponse> {
        self.call(Method::DELETE, uri)
    }

    pub fn head(&mut self, uri: &str) -> Result<AssertableResponse> {
        self.call(Method::HEAD, uri)
    }

    pub fn options(&mut self, uri: &str) -> Result<AssertableResponse> {
        self.call(Method::OPTIONS, uri)
    }

    /// Every recorded exchange, oldest first.
    pub fn history(&self) -> &Transactions {
        self.handler.history()
    }

    /// Replace the recorded history.
    pub fn set_history(&mut self, history: Transactions) -> &mut Self {
        self.handler.set_history(history);
        self
    }

    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.handler.history().iter()
    }

    pub fn first_request(&self) -> Option<&AssertableRequest> {
        self.history().first().and_then(Transaction::request)
    }

    pub fn last_request(&self) -> Option<&AssertableRequest> {
        self.history().last().and_then(Transaction::request)
    }

    pub fn first_response(&self) -> Option<&AssertableResponse> {
        self.history().first().and_then(Transaction::response)
    }

    pub fn last_response(&self) -> Option<&AssertableResponse> {
        self.history().last().and_then(Transaction::response)
    }

    /// Assert that every queued expectation was consumed.
    #[track_caller]
    pub fn assert_expectations_met(&self) -> &Self {
        let pending = self.handler.pending();
        assert_that(pending.is_empty(), || {
            let list = pending
                .iter()
                .map(|e| format!("\n  - {e}"))
                .collect::<String>();
            format!("{} expectation(s) were never met:{list}", pending.len())
        });
        self
    }
}

/// Fluent construction of a [`Muzzle`] with its expectations.
///
/// `get`/`post`/`put`/`patch`/`delete` start a new expectation; `query`,
/// `header`, `reply_with` and `reply_status` refine the latest one.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use muzzle::Muzzle;
///
/// # fn main() -> muzzle::Result<()> {
/// let mut client = Muzzle::builder()
///     .post("https://example.com")
///     .reply_status(StatusCode::CREATED)
///     .get("https://example.com")
///     .query([("foo", "bar")])
///     .build();
///
/// client.post("https://example.com")?.assert_created();
/// client.get("https://example.com?foo=bar&baz=qux")?.assert_ok();
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MuzzleBuilder {
    config: ClientConfig,
    expectations: Vec<Expectation>,
}

impl MuzzleBuilder {
    /// Queue a fully-built expectation.
    #[must_use]
    pub fn expect(mut self, expectation: Expectation) -> Self {
        self.expectations.push(expectation);
        self
    }

    #[must_use]
    pub fn get(self, uri: impl Into<String>) -> Self {
        self.expect(Expectation::get(uri))
    }

    #[must_use]
    pub fn post(self, uri: impl Into<String>) -> Self {
        self.expect(Expectation::post(uri))
    }

    #[must_use]
    pub fn put(self, uri: impl Into<String>) -> Self {
        self.expect(Expectation::put(uri))
    }

    #[must_use]
    pub fn patch(self, uri: impl Into<String>) -> Self {
        self.expect(Expectation::patch(uri))
    }

    #[must_use]
    pub fn delete(self, uri: impl Into<String>) -> Self {
        self.expect(Expectation::delete(uri))
    }

    #[must_use]
    pub fn query<I, K, V>(self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.refine(|e| e.query(pairs))
    }

    #[must_use]
    pub fn header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.refine(|e| e.header(name, value))
    }

    #[must_use]
    pub fn reply_with(self, response: impl Into<AssertableResponse>) -> Self {
        self.refine(|e| e.reply_with(response))
    }

    #[must_use]
    pub fn reply_status(self, status: http::StatusCode) -> Self {
        self.refine(|e| e.reply_status(status))
    }

    /// Use `config` for the built client.
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Resolve relative request URIs against `base_uri`.
    #[must_use]
    pub fn base_uri(mut self, base_uri: Url) -> Self {
        self.config.set_base_uri(Some(base_uri));
        self
    }

    pub fn build(self) -> Muzzle {
        let mut client = Muzzle::make(self.config);
        for expectation in self.expectations {
            client.append(expectation);
        }
        client
    }

    fn refine<F: FnOnce(Expectation) -> Expectation>(mut self, f: F) -> Self {
        let current = self.expectations.pop().unwrap_or_default();
        self.expectations.push(f(current));
        self
    }
}
