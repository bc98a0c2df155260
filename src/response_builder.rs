//! Builder for fabricated responses.
//!
//! Responses can carry a literal body, a serialized JSON value, or the
//! contents of a fixture file. Fixtures are looked up in a per-builder
//! directory, then in the process-wide directory, then in the directory
//! named by `MUZZLE_FIXTURE_DIR`.

use std::env;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, Response, StatusCode};
use serde::Serialize;

use crate::error::{MuzzleError, Result};
use crate::messages::{AssertableResponse, Fixture};

const FIXTURE_DIR_ENV: &str = "MUZZLE_FIXTURE_DIR";

static FIXTURE_DIRECTORY: RwLock<Option<PathBuf>> = RwLock::new(None);

/// Accumulates status, headers and body, then produces a response.
///
/// Errors met while chaining (an invalid header, a missing fixture) are
/// kept and reported by [`build`](Self::build).
///
/// # Example
///
/// ```
/// use muzzle::{ResponseBuilder, JsonMessage};
///
/// let response = ResponseBuilder::new()
///     .status(201)
///     .json(&serde_json::json!({"data": {"message": "done"}}))
///     .build()
///     .unwrap();
///
/// response.assert_created();
/// assert_eq!(response.decode().unwrap()["data"]["message"], "done");
/// ```
#[derive(Debug)]
pub struct ResponseBuilder {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    fixture_directory: Option<PathBuf>,
    error: Option<MuzzleError>,
}

impl Default for ResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseBuilder {
    /// Start a `200 OK` response with no headers and an empty body.
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            fixture_directory: None,
            error: None,
        }
    }

    /// Set the status code.
    #[must_use]
    pub fn status<S>(mut self, status: S) -> Self
    where
        StatusCode: TryFrom<S>,
        <StatusCode as TryFrom<S>>::Error: Into<http::Error>,
    {
        match StatusCode::try_from(status) {
            Ok(status) => self.status = status,
            Err(e) => self.fail(MuzzleError::Http(e.into())),
        }
        self
    }

    /// Append a header.
    #[must_use]
    pub fn header<K, V>(mut self, name: K, value: V) -> Self
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        let name = HeaderName::try_from(name).map_err(Into::into);
        let value = HeaderValue::try_from(value).map_err(Into::into);
        match name.and_then(|n| value.map(|v| (n, v))) {
            Ok((name, value)) => {
                self.headers.append(name, value);
            }
            Err(e) => self.fail(MuzzleError::Http(e)),
        }
        self
    }

    /// Replace all headers.
    #[must_use]
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        self.headers.clear();
        headers
            .into_iter()
            .fold(self, |builder, (name, value)| builder.header(name, value))
    }

    /// Set the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Serialize `value` as the body and declare `application/json`.
    #[must_use]
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => {
                self.body = Bytes::from(body);
                self.headers
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            }
            Err(e) => self.fail(e.into()),
        }
        self
    }

    /// Look fixtures up in `directory` for this builder only.
    #[must_use]
    pub fn with_fixture_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.fixture_directory = Some(directory.into());
        self
    }

    /// Use the contents of a fixture file as the body.
    ///
    /// The fixture's content type is declared unless a `Content-Type`
    /// header is already set.
    #[must_use]
    pub fn body_from_fixture(mut self, name: &str) -> Self {
        let directory = match &self.fixture_directory {
            Some(directory) => Ok(directory.clone()),
            None => Self::resolve_fixture_directory(),
        };

        match directory.and_then(|directory| Fixture::load(directory, name)) {
            Ok(fixture) => {
                if !self.headers.contains_key(CONTENT_TYPE) {
                    self.headers
                        .insert(CONTENT_TYPE, HeaderValue::from_static(fixture.content_type()));
                }
                self.body = fixture.body().clone();
            }
            Err(e) => self.fail(e),
        }
        self
    }

    /// Produce the response.
    ///
    /// # Errors
    ///
    /// Returns the first error met while chaining.
    pub fn build(self) -> Result<AssertableResponse> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let mut response = Response::new(self.body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;

        Ok(AssertableResponse::new(response))
    }

    fn fail(&mut self, error: MuzzleError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Set the process-wide fixture directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory does not exist.
    pub fn set_fixture_directory(directory: impl Into<PathBuf>) -> Result<()> {
        let directory = directory.into();
        if !directory.is_dir() {
            return Err(MuzzleError::FixtureDirectoryMissing(directory));
        }

        tracing::debug!(directory = %directory.display(), "fixture directory set");
        *FIXTURE_DIRECTORY
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(directory);
        Ok(())
    }

    /// The process-wide fixture directory, if one was set.
    pub fn current_fixture_directory() -> Option<PathBuf> {
        FIXTURE_DIRECTORY
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forget the process-wide fixture directory.
    pub fn reset_fixture_directory() {
        *FIXTURE_DIRECTORY
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Load a fixture from the process-wide fixture directory.
    ///
    /// # Errors
    ///
    /// Returns an error if no directory is configured or the fixture
    /// cannot be loaded.
    pub fn from_fixture(name: &str) -> Result<Fixture> {
        Fixture::load(Self::resolve_fixture_directory()?, name)
    }

    fn resolve_fixture_directory() -> Result<PathBuf> {
        Self::current_fixture_directory()
            .or_else(|| env::var_os(FIXTURE_DIR_ENV).map(PathBuf::from))
            .ok_or(MuzzleError::FixtureDirectoryNotSet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HeaderAssertions, JsonMessage};
    use serde_json::json;
    use std::fs;

    #[test]
    fn test_build_defaults_to_empty_ok() {
        let response = ResponseBuilder::new().build().unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.body().is_empty());
        assert!(response.headers().is_empty());
    }

    #[test]
    fn test_headers_replace_previous_headers() {
        let response = ResponseBuilder::new()
            .header("x-old", "1")
            .headers([("content-type", "application/json"), ("x-new", "2")])
            .build()
            .unwrap();

        response
            .assert_header("content-type", "application/json")
            .assert_header("x-new", "2")
            .assert_header_missing("x-old");
    }

    #[test]
    fn test_invalid_header_is_reported_at_build() {
        let result = ResponseBuilder::new()
            .header("bad header", "value")
            .body("ignored")
            .build();

        assert!(matches!(result, Err(MuzzleError::Http(_))));
    }

    #[test]
    fn test_invalid_status_is_reported_at_build() {
        let result = ResponseBuilder::new().status(1000u16).build();
        assert!(matches!(result, Err(MuzzleError::Http(_))));
    }

    #[test]
    fn test_json_body() {
        let data = json!({"data": {"message": "done"}});
        let response = ResponseBuilder::new().json(&data).build().unwrap();

        assert_eq!(response.text().unwrap(), data.to_string());
        response.assert_header("content-type", "application/json");
    }

    #[test]
    fn test_fixture_body_from_builder_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("page.html"), "<span>some html</span>").unwrap();

        let response = ResponseBuilder::new()
            .with_fixture_directory(dir.path())
            .body_from_fixture("page.html")
            .build()
            .unwrap();

        assert_eq!(response.text().unwrap(), "<span>some html</span>");
        response.assert_header("content-type", "text/html; charset=utf-8");
    }

    #[test]
    fn test_fixture_keeps_explicit_content_type() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("response.json"), "{}").unwrap();

        let response = ResponseBuilder::new()
            .header("content-type", "application/vnd.api+json")
            .with_fixture_directory(dir.path())
            .body_from_fixture("response.json")
            .build()
            .unwrap();

        response.assert_header("content-type", "application/vnd.api+json");
    }

    #[test]
    fn test_missing_fixture_is_reported_at_build() {
        let dir = tempfile::tempdir().unwrap();

        let result = ResponseBuilder::new()
            .with_fixture_directory(dir.path())
            .body_from_fixture("absent.json")
            .build();

        assert!(matches!(result, Err(MuzzleError::Io { .. })));
    }

    #[test]
    fn test_set_fixture_directory_requires_existing_directory() {
        let result = ResponseBuilder::set_fixture_directory("/definitely/not/a/fixture/dir");
        assert!(matches!(result, Err(MuzzleError::FixtureDirectoryMissing(_))));
    }
}
