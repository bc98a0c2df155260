//! Error types for muzzle operations.
//!
//! Assertion failures are not errors: they panic like any other test
//! assertion. This enum covers everything that can go wrong while building
//! requests, fabricating responses or loading fixtures.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while driving the mock client or building responses.
#[derive(Debug, Error)]
pub enum MuzzleError {
    /// URI could not be parsed.
    #[error("Invalid URI: {0}")]
    InvalidUri(#[from] url::ParseError),

    /// A relative URI was used without a configured base URI.
    #[error("Cannot resolve relative URI '{0}': no base_uri configured")]
    MissingBaseUri(String),

    /// Building an HTTP message failed.
    #[error("HTTP error: {0}")]
    Http(#[from] http::Error),

    /// Header name is not valid.
    #[error("Invalid header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    /// Header value is not valid.
    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    /// Reading a file failed.
    #[error("Failed to read '{}': {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The fixture directory does not exist.
    #[error("Fixture directory '{}' does not exist", .0.display())]
    FixtureDirectoryMissing(PathBuf),

    /// No fixture directory was configured.
    #[error("No fixture directory configured: call ResponseBuilder::set_fixture_directory or set MUZZLE_FIXTURE_DIR")]
    FixtureDirectoryNotSet,

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Message body is not valid UTF-8.
    #[error("Body is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Request body is a stream and cannot be recorded.
    #[error("Streaming request bodies are not supported")]
    StreamingBody,

    /// A request arrived while no expectation was queued.
    #[error("Mock queue is empty: no expectation left for {method} {uri}")]
    QueueEmpty { method: String, uri: String },

    /// Reply carried an error status and `http_errors` is enabled.
    #[error("HTTP {status} returned for {uri}")]
    Status { status: u16, uri: String },

    /// Mock server failed to start.
    #[error("Mock server error: {0}")]
    Server(String),
}

/// Result type alias for muzzle operations.
pub type Result<T> = core::result::Result<T, MuzzleError>;
