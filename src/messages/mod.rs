//! Decorated HTTP messages, recorded transactions and fixtures.

mod content;
mod fixture;
mod request;
mod response;
mod transaction;

pub use content::{ContentAssertions, HeaderAssertions, JsonMessage};
pub use fixture::{Fixture, HtmlFixture, JsonFixture, TextFixture};
pub use request::AssertableRequest;
pub use response::AssertableResponse;
pub use transaction::{Transaction, Transactions};

pub(crate) use response::clone_response;

/// Percent-decode for display, falling back to the input.
pub(crate) fn percent_decode(value: &str) -> String {
    urlencoding::decode(value)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| value.to_string())
}
