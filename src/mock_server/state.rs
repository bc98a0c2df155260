//! Shared state behind a running mock server.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::expectation::Expectation;
use crate::handler::MockHandler;
use crate::messages::Transactions;

/// Expectations, history and misses of one mock server.
///
/// Wrapped in `Arc<RwLock<_>>` so the server task and the test can both
/// reach it.
#[derive(Debug, Default)]
pub struct MockState {
    handler: MockHandler,
    unmatched: Vec<String>,
}

impl MockState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    /// Queue an expectation.
    #[must_use]
    pub fn with_expectation(mut self, expectation: Expectation) -> Self {
        self.handler.append(expectation);
        self
    }

    pub fn register(&mut self, expectation: Expectation) {
        self.handler.append(expectation);
    }

    pub fn pending(&self) -> &[Expectation] {
        self.handler.pending()
    }

    pub fn history(&self) -> &Transactions {
        self.handler.history()
    }

    /// Descriptions of requests no expectation accepted.
    pub fn unmatched(&self) -> &[String] {
        &self.unmatched
    }

    pub(crate) fn handler_mut(&mut self) -> &mut MockHandler {
        &mut self.handler
    }

    pub(crate) fn record_unmatched(&mut self, description: String) {
        self.unmatched.push(description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_queues_expectations() {
        let mut state = MockState::new().with_expectation(Expectation::get("/a"));
        state.register(Expectation::post("/b"));

        assert_eq!(state.pending().len(), 2);
        assert!(state.history().is_empty());
        assert!(state.unmatched().is_empty());
    }
}
