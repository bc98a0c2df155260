//! Recorded request/response pairs.

use std::slice;
use std::vec;

use super::{AssertableRequest, AssertableResponse};

/// One exchange seen by the mock client.
///
/// Any part may be missing: a transaction can be recorded before a reply
/// exists, or with an error instead of a reply.
#[derive(Debug, Clone, Default)]
pub struct Transaction {
    request: Option<AssertableRequest>,
    response: Option<AssertableResponse>,
    error: Option<String>,
}

impl Transaction {
    /// Create an empty transaction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request.
    #[must_use]
    pub fn with_request(mut self, request: impl Into<AssertableRequest>) -> Self {
        self.request = Some(request.into());
        self
    }

    /// Set the response.
    #[must_use]
    pub fn with_response(mut self, response: impl Into<AssertableResponse>) -> Self {
        self.response = Some(response.into());
        self
    }

    /// Set the error message.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub(crate) fn set_response(&mut self, response: AssertableResponse) {
        self.response = Some(response);
    }

    pub fn request(&self) -> Option<&AssertableRequest> {
        self.request.as_ref()
    }

    pub fn response(&self) -> Option<&AssertableResponse> {
        self.response.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Transactions in the order they happened.
#[derive(Debug, Clone, Default)]
pub struct Transactions {
    items: Vec<Transaction>,
}

impl Transactions {
    #[must_use]
    pub fn new(items: Vec<Transaction>) -> Self {
        Self { items }
    }

    pub fn push(&mut self, transaction: Transaction) {
        self.items.push(transaction);
    }

    pub fn first(&self) -> Option<&Transaction> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&Transaction> {
        self.items.last()
    }

    pub fn get(&self, index: usize) -> Option<&Transaction> {
        self.items.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut Transaction> {
        self.items.last_mut()
    }

    pub fn iter(&self) -> slice::Iter<'_, Transaction> {
        self.items.iter()
    }

    /// Recorded requests, skipping transactions without one.
    pub fn requests(&self) -> impl Iterator<Item = &AssertableRequest> {
        self.items.iter().filter_map(Transaction::request)
    }

    /// Recorded responses, skipping transactions without one.
    pub fn responses(&self) -> impl Iterator<Item = &AssertableResponse> {
        self.items.iter().filter_map(Transaction::response)
    }
}

impl FromIterator<Transaction> for Transactions {
    fn from_iter<I: IntoIterator<Item = Transaction>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for Transactions {
    type Item = Transaction;
    type IntoIter = vec::IntoIter<Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Transactions {
    type Item = &'a Transaction;
    type IntoIter = slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
