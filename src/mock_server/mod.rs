//! Mock HTTP server for code that owns its own client.
//!
//! [`MockServer`] listens on a random local port and answers every request
//! from a queue of [`Expectation`](crate::Expectation)s, using the same
//! matching rules as [`Muzzle`](crate::Muzzle).
//!
//! # Example
//!
//! ```no_run
//! use muzzle::mock_server::MockServer;
//! use muzzle::Expectation;
//!
//! #[tokio::main]
//! async fn main() -> muzzle::Result<()> {
//!     let server = MockServer::with_expectations(vec![Expectation::get("/health")]).await?;
//!
//!     let status = reqwest::get(server.uri("/health")).await.unwrap().status();
//!     assert!(status.is_success());
//!
//!     server.verify().await;
//!     server.shutdown().await;
//!     Ok(())
//! }
//! ```

mod server;
mod state;

pub use server::MockServer;
pub use state::MockState;
