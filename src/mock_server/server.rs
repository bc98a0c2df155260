//! Mock HTTP server.
//!
//! An axum server whose single fallback route replays expectations.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use url::Url;

use super::state::MockState;
use crate::error::{MuzzleError, Result};
use crate::expectation::Expectation;
use crate::messages::{AssertableRequest, Transactions};

type SharedState = Arc<RwLock<MockState>>;

/// A mock HTTP server for tests that bring their own client.
///
/// Requests are matched against the queued expectations exactly like
/// [`Muzzle`](crate::Muzzle) does. A request nothing accepts gets a `404`
/// whose body explains the miss.
pub struct MockServer {
    url: String,
    handle: JoinHandle<()>,
    state: SharedState,
}

impl MockServer {
    /// Start a server with no expectations on a random local port.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn start() -> Result<Self> {
        Self::with_state(MockState::new()).await
    }

    /// Start a server with `expectations` already queued.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn with_expectations(expectations: Vec<Expectation>) -> Result<Self> {
        let state = expectations
            .into_iter()
            .fold(MockState::new(), MockState::with_expectation);
        Self::with_state(state).await
    }

    /// Start a server around existing state.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn with_state(state: MockState) -> Result<Self> {
        let shared_state = state.shared();
        let app = Self::create_router(shared_state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| MuzzleError::Server(format!("failed to bind: {e}")))?;
        let addr = listener
            .local_addr()
            .map_err(|e| MuzzleError::Server(format!("no local address: {e}")))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "mock server stopped");
            }
        });

        tracing::debug!(%addr, "mock server listening");

        Ok(Self {
            url: format!("http://{addr}"),
            handle,
            state: shared_state,
        })
    }

    /// Base URL, without a trailing slash.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Absolute URL for `path` on this server.
    pub fn uri(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.url)
        } else {
            format!("{}/{path}", self.url)
        }
    }

    pub fn state(&self) -> SharedState {
        self.state.clone()
    }

    /// Queue another expectation.
    pub async fn register(&self, expectation: Expectation) {
        self.state.write().await.register(expectation);
    }

    /// Every exchange the server has seen.
    pub async fn history(&self) -> Transactions {
        self.state.read().await.history().clone()
    }

    pub async fn received_requests(&self) -> Vec<AssertableRequest> {
        self.state
            .read()
            .await
            .history()
            .requests()
            .cloned()
            .collect()
    }

    /// Panic if a request went unmatched or an expectation was never used.
    pub async fn verify(&self) {
        let state = self.state.read().await;

        if let Some(first) = state.unmatched().first() {
            panic!(
                "{} request(s) did not match any expectation. First: {first}",
                state.unmatched().len()
            );
        }

        let pending = state.pending();
        if !pending.is_empty() {
            let list = pending
                .iter()
                .map(|e| format!("\n  - {e}"))
                .collect::<String>();
            panic!("{} expectation(s) were never met:{list}", pending.len());
        }
    }

    /// Stop the server. Safe to call while requests are in flight.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }

    fn create_router(state: SharedState) -> Router {
        Router::new().fallback(replay).with_state(state)
    }
}

/// Turn the incoming request into a client request and dispatch it.
async fn replay(State(state): State<SharedState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let body = match to_bytes(body, usize::MAX).await {
        Ok(body) => body,
        Err(e) => return (StatusCode::BAD_REQUEST, format!("unreadable body: {e}")).into_response(),
    };

    let host = parts
        .headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");
    let target = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let url = match Url::parse(&format!("http://{host}{target}")) {
        Ok(url) => url,
        Err(e) => return (StatusCode::BAD_REQUEST, format!("bad request target: {e}")).into_response(),
    };

    let mut outgoing = reqwest::Request::new(parts.method, url);
    *outgoing.headers_mut() = parts.headers;
    if !body.is_empty() {
        *outgoing.body_mut() = Some(body.into());
    }

    let mut state = state.write().await;
    match state.handler_mut().dispatch(AssertableRequest::from(outgoing)) {
        Ok(reply) => reply.map(Body::from).into_response(),
        Err(unmatched) => {
            let description = unmatched.to_string();
            state.record_unmatched(description.clone());
            (StatusCode::NOT_FOUND, description).into_response()
        }
    }
}
