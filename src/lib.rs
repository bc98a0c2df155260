//! Fluent HTTP assertions and a mock HTTP client for tests.
//!
//! `muzzle` lets a test queue canned replies, send requests through a mock
//! client that never touches the network, and then assert on both the
//! responses it got back and the requests that were sent.
//!
//! # Quick Start
//!
//! ```
//! use http::StatusCode;
//! use muzzle::{ContentAssertions, Expectation, Muzzle, ResponseBuilder};
//! use serde_json::json;
//!
//! # fn main() -> muzzle::Result<()> {
//! let reply = ResponseBuilder::new()
//!     .status(201)
//!     .json(&json!({"id": 1, "name": "Ada"}))
//!     .build()?;
//!
//! let mut client = Muzzle::builder()
//!     .post("https://api.example.com/users")
//!     .reply_with(reply)
//!     .build();
//!
//! client
//!     .post("https://api.example.com/users")?
//!     .assert_status(StatusCode::CREATED)
//!     .assert_json(&json!({"name": "Ada"}));
//!
//! client.first_request().unwrap().assert_method("POST");
//! client.assert_expectations_met();
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`AssertableRequest`] / [`AssertableResponse`] wrap the `reqwest` and
//!   `http` message types and add chaining `assert_*` methods.
//! - [`Expectation`] pairs a request matcher with a reply.
//! - [`Muzzle`] sends requests through a [`HandlerStack`] of named
//!   [`Middleware`] down to a [`MockHandler`], which records every
//!   exchange as a [`Transaction`].
//! - [`ResponseBuilder`] assembles replies, optionally from fixture files.
//! - [`mock_server::MockServer`] (feature `server`) serves the same
//!   expectations over a real socket.
//!
//! Assertion failures panic with a descriptive message, so they fail the
//! surrounding test. Operational problems are returned as [`MuzzleError`].
//!
//! # Configuration
//!
//! - `MUZZLE_BASE_URI` (optional) - base URI read by [`ClientConfig::from_env`]
//! - `MUZZLE_FIXTURE_DIR` (optional) - fixture directory used when none was set
//! - `MUZZLE_LOG` (optional) - level for [`logging::init`], defaults to `warn`

pub mod assertions;
mod client;
mod config;
mod error;
mod expectation;
mod handler;
pub mod logging;
mod messages;
mod middleware;
mod response_builder;

#[cfg(feature = "server")]
pub mod mock_server;

// Re-export core types
pub use client::{Muzzle, MuzzleBuilder};
pub use config::ClientConfig;
pub use error::{MuzzleError, Result};
pub use expectation::Expectation;
pub use response_builder::ResponseBuilder;

// Re-export message types and their assertion traits
pub use messages::{
    AssertableRequest, AssertableResponse, ContentAssertions, Fixture, HeaderAssertions,
    HtmlFixture, JsonFixture, JsonMessage, TextFixture, Transaction, Transactions,
};

// Re-export the handler stack
pub use handler::{Handler, MockHandler, Unmatched};
pub use middleware::{map_request, map_response, HandlerStack, MapRequest, MapResponse, Middleware, Next, Tracing};
