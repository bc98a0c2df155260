//! Assertable wrapper around `http::Response`.

use std::ops::Deref;

use bytes::Bytes;
use http::{header, Response, StatusCode};

use super::content::{header_values, ContentAssertions, HeaderAssertions, JsonMessage};
use crate::assertions::{assert_equals, assert_that};

/// A response decorated with chainable assertions.
///
/// Dereferences to the wrapped [`http::Response`].
#[derive(Debug)]
pub struct AssertableResponse {
    inner: Response<Bytes>,
}

impl AssertableResponse {
    /// Decorate an existing response.
    pub fn new(response: Response<Bytes>) -> Self {
        Self { inner: response }
    }

    /// Unwrap the decorated response.
    pub fn into_inner(self) -> Response<Bytes> {
        self.inner
    }

    /// The raw body.
    pub fn bytes(&self) -> &Bytes {
        self.inner.body()
    }

    /// Assert the status code.
    #[track_caller]
    pub fn assert_status(&self, status: impl Into<u16>) -> &Self {
        let expected = status.into();
        let actual = self.inner.status().as_u16();
        assert_equals(
            &expected,
            &actual,
            &format!("Expected status code {expected} but received {actual}."),
        );
        self
    }

    /// Assert a 2xx status.
    #[track_caller]
    pub fn assert_successful(&self) -> &Self {
        let actual = self.inner.status();
        assert_that(actual.is_success(), || {
            format!("Response status code [{}] is not a successful status code.", actual.as_u16())
        });
        self
    }

    /// Assert `200 OK`.
    #[track_caller]
    pub fn assert_ok(&self) -> &Self {
        self.assert_status(StatusCode::OK)
    }

    /// Assert `201 Created`.
    #[track_caller]
    pub fn assert_created(&self) -> &Self {
        self.assert_status(StatusCode::CREATED)
    }

    /// Assert `204 No Content`.
    #[track_caller]
    pub fn assert_no_content(&self) -> &Self {
        self.assert_status(StatusCode::NO_CONTENT)
    }

    /// Assert `404 Not Found`.
    #[track_caller]
    pub fn assert_not_found(&self) -> &Self {
        self.assert_status(StatusCode::NOT_FOUND)
    }

    /// Assert `403 Forbidden`.
    #[track_caller]
    pub fn assert_forbidden(&self) -> &Self {
        self.assert_status(StatusCode::FORBIDDEN)
    }

    /// Assert `401 Unauthorized`.
    #[track_caller]
    pub fn assert_unauthorized(&self) -> &Self {
        self.assert_status(StatusCode::UNAUTHORIZED)
    }

    /// Assert a redirect status, and the `Location` header when given.
    #[track_caller]
    pub fn assert_redirect(&self, location: Option<&str>) -> &Self {
        let actual = self.inner.status();
        assert_that(actual.is_redirection(), || {
            format!(
                "Response status code [{}] is not a redirect status code.",
                actual.as_u16()
            )
        });

        if let Some(location) = location {
            let found = header_values(self.inner.headers(), header::LOCATION.as_str());
            assert_equals(
                &[location.to_string()][..],
                found.as_slice(),
                "Unexpected redirect location.",
            );
        }
        self
    }
}

impl Deref for AssertableResponse {
    type Target = Response<Bytes>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<B: Into<Bytes>> From<Response<B>> for AssertableResponse {
    fn from(response: Response<B>) -> Self {
        Self::new(response.map(Into::into))
    }
}

impl From<AssertableResponse> for Response<Bytes> {
    fn from(response: AssertableResponse) -> Self {
        response.inner
    }
}

impl Clone for AssertableResponse {
    fn clone(&self) -> Self {
        Self::new(clone_response(&self.inner))
    }
}

/// Copy status, version, headers and body; extensions are dropped.
pub(crate) fn clone_response(response: &Response<Bytes>) -> Response<Bytes> {
    let mut copy = Response::new(response.body().clone());
    *copy.status_mut() = response.status();
    *copy.version_mut() = response.version();
    *copy.headers_mut() = response.headers().clone();
    copy
}

impl JsonMessage for AssertableResponse {
    fn body_bytes(&self) -> &[u8] {
        self.inner.body()
    }
}

impl ContentAssertions for AssertableResponse {}

impl HeaderAssertions for AssertableResponse {
    fn header_map(&self) -> &http::HeaderMap {
        self.inner.headers()
    }

    fn message_kind(&self) -> &'static str {
        "response"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn json_response(status: u16, body: serde_json::Value) -> AssertableResponse {
        Response::builder()
            .status(status)
            .header("content-type", "application/json")
            .body(body.to_string())
            .unwrap()
            .into()
    }

    #[test]
    fn test_status_shortcuts() {
        json_response(200, json!({})).assert_ok().assert_successful();
        json_response(201, json!({})).assert_created();
        json_response(404, json!({})).assert_not_found();
        json_response(403, json!({})).assert_forbidden();
        json_response(401, json!({})).assert_unauthorized();
        json_response(204, json!({})).assert_no_content();
    }

    #[test]
    #[should_panic(expected = "Expected status code 200 but received 500.")]
    fn test_status_mismatch_message() {
        json_response(500, json!({})).assert_status(200u16);
    }

    #[test]
    fn test_json_assertions() {
        let response = json_response(
            200,
            json!({"data": [{"id": 1, "name": "a"}, {"id": 2, "name": "b"}], "total": 2}),
        );

        response
            .assert_header("Content-Type", "application/json")
            .assert_json(&json!({"total": 2}))
            .assert_json_fragment(&json!({"id": 2}))
            .assert_json_missing(&json!({"id": 3}))
            .assert_json_structure(&json!(["total", {"data": {"*": ["id", "name"]}}]))
            .assert_json_count(2, "/data")
            .assert_see("\"name\":\"b\"")
            .assert_dont_see("secret");
    }

    #[test]
    #[should_panic(expected = "Could not find")]
    fn test_json_subset_mismatch() {
        json_response(200, json!({"total": 2})).assert_json(&json!({"total": 3}));
    }

    #[test]
    #[should_panic(expected = "Invalid JSON was returned")]
    fn test_invalid_json_body() {
        AssertableResponse::from(Response::new("<html></html>")).assert_json(&json!({}));
    }

    #[test]
    #[should_panic(expected = "Header [x-id] was found, but value(s) [1] does not match [2].")]
    fn test_header_value_mismatch_message() {
        AssertableResponse::from(
            Response::builder().header("x-id", "1").body("").unwrap(),
        )
        .assert_header("x-id", "2");
    }

    #[test]
    fn test_redirect() {
        AssertableResponse::from(
            Response::builder()
                .status(302)
                .header("location", "https://example.com/login")
                .body("")
                .unwrap(),
        )
        .assert_redirect(None)
        .assert_redirect(Some("https://example.com/login"));
    }

    #[test]
    fn test_clone_and_into_inner() {
        let response = json_response(201, json!({"id": 1}));
        let copy = response.clone();
        let inner: Response<Bytes> = copy.into();

        assert_eq!(inner.status(), StatusCode::CREATED);
        assert_eq!(inner.headers()["content-type"], "application/json");
        assert_eq!(response.decode().unwrap(), json!({"id": 1}));
    }
}
