//! The terminal handler that replays expectations.

use std::fmt;

use bytes::Bytes;
use http::Response;

use crate::error::{MuzzleError, Result};
use crate::expectation::Expectation;
use crate::messages::{clone_response, percent_decode, AssertableRequest, Transaction, Transactions};

/// The end of a middleware stack: turns a request into a response.
pub trait Handler {
    fn handle(&mut self, request: reqwest::Request) -> Result<Response<Bytes>>;
}

/// Description of a request no pending expectation accepted.
#[derive(Debug, Clone)]
pub struct Unmatched {
    request: String,
    pending: Vec<String>,
}

impl Unmatched {
    /// True when there was nothing left to match against.
    pub fn queue_was_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl fmt::Display for Unmatched {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No expectation matched {}.", self.request)?;
        if self.pending.is_empty() {
            return write!(f, " The mock queue is empty.");
        }
        write!(f, " Pending expectations:")?;
        for expectation in &self.pending {
            write!(f, "\n  - {expectation}")?;
        }
        Ok(())
    }
}

/// Pending expectations plus the history of everything dispatched.
#[derive(Debug, Default)]
pub struct MockHandler {
    expectations: Vec<Expectation>,
    history: Transactions,
}

impl MockHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an expectation behind the existing ones.
    pub fn append(&mut self, expectation: Expectation) {
        self.expectations.push(expectation);
    }

    /// Expectations not consumed yet, in queue order.
    pub fn pending(&self) -> &[Expectation] {
        &self.expectations
    }

    pub fn history(&self) -> &Transactions {
        &self.history
    }

    pub(crate) fn history_mut(&mut self) -> &mut Transactions {
        &mut self.history
    }

    pub fn set_history(&mut self, history: Transactions) {
        self.history = history;
    }

    /// Consume the first pending expectation that matches and return its
    /// reply. The exchange is recorded either way.
    pub fn dispatch(
        &mut self,
        request: AssertableRequest,
    ) -> core::result::Result<Response<Bytes>, Unmatched> {
        let position = self.expectations.iter().position(|e| e.matches(&request));

        match position {
            Some(index) => {
                let expectation = self.expectations.remove(index);
                tracing::debug!(
                    method = %request.method(),
                    url = %request.url(),
                    %expectation,
                    "expectation matched"
                );

                let reply = expectation.into_reply();
                self.history.push(
                    Transaction::new()
                        .with_request(request)
                        .with_response(clone_response(&reply)),
                );
                Ok(reply)
            }
            None => {
                let unmatched = Unmatched {
                    request: format!(
                        "{} {}",
                        request.method(),
                        percent_decode(request.url().as_str())
                    ),
                    pending: self.expectations.iter().map(ToString::to_string).collect(),
                };
                tracing::warn!(%unmatched, "request did not match any expectation");

                self.history.push(
                    Transaction::new()
                        .with_request(request)
                        .with_error(unmatched.to_string()),
                );
                Err(unmatched)
            }
        }
    }
}

impl Handler for MockHandler {
    /// An empty queue is an error; a request that no queued expectation
    /// accepts fails the test.
    fn handle(&mut self, request: reqwest::Request) -> Result<Response<Bytes>> {
        let method = request.method().to_string();
        let uri = request.url().to_string();

        match self.dispatch(AssertableRequest::from_base_request(request)) {
            Ok(reply) => Ok(reply),
            Err(unmatched) if unmatched.queue_was_empty() => {
                Err(MuzzleError::QueueEmpty { method, uri })
            }
            Err(unmatched) => panic!("{unmatched}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode};

    fn request(method: Method, url: &str) -> reqwest::Request {
        reqwest::Request::new(method, url.parse().unwrap())
    }

    #[test]
    fn test_dispatch_consumes_first_match() {
        let mut handler = MockHandler::new();
        handler.append(Expectation::get("https://example.com").reply_status(StatusCode::ACCEPTED));
        handler.append(Expectation::get("https://example.com").reply_status(StatusCode::GONE));

        let first = handler.handle(request(Method::GET, "https://example.com")).unwrap();
        let second = handler.handle(request(Method::GET, "https://example.com")).unwrap();

        assert_eq!(first.status(), StatusCode::ACCEPTED);
        assert_eq!(second.status(), StatusCode::GONE);
        assert!(handler.pending().is_empty());
        assert_eq!(handler.history().len(), 2);
    }

    #[test]
    fn test_out_of_order_requests_find_their_expectation() {
        let mut handler = MockHandler::new();
        handler.append(Expectation::post("https://example.com").reply_status(StatusCode::CREATED));
        handler.append(Expectation::get("https://example.com"));

        let get = handler.handle(request(Method::GET, "https://example.com")).unwrap();
        assert_eq!(get.status(), StatusCode::OK);
        assert_eq!(handler.pending().len(), 1);
    }

    #[test]
    fn test_empty_queue_is_an_error() {
        let mut handler = MockHandler::new();
        let result = handler.handle(request(Method::GET, "https://example.com/a"));

        assert!(matches!(result, Err(MuzzleError::QueueEmpty { .. })));
        assert_eq!(handler.history().len(), 1);
        assert!(handler.history().last().unwrap().error().is_some());
    }

    #[test]
    #[should_panic(expected = "No expectation matched GET https://example.com/b")]
    fn test_mismatch_fails_the_test() {
        let mut handler = MockHandler::new();
        handler.append(Expectation::get("https://example.com/a"));
        let _ = handler.handle(request(Method::GET, "https://example.com/b"));
    }

    #[test]
    fn test_unmatched_lists_pending_expectations() {
        let mut handler = MockHandler::new();
        handler.append(Expectation::post("https://example.com/a"));

        let unmatched = handler
            .dispatch(request(Method::GET, "https://example.com/b").into())
            .unwrap_err();

        assert!(!unmatched.queue_was_empty());
        assert!(unmatched.to_string().contains("- POST https://example.com/a"));
    }
}
