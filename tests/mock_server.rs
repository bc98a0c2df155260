//! E2E tests against the mock server with a real client.

#![cfg(feature = "server")]

use http::StatusCode;
use muzzle::mock_server::MockServer;
use muzzle::{Expectation, HeaderAssertions, ResponseBuilder};

// =============================================================================
// Server Lifecycle Tests
// =============================================================================

#[tokio::test]
async fn test_server_starts_on_random_port() {
    let server1 = MockServer::start().await.unwrap();
    let server2 = MockServer::start().await.unwrap();

    assert_ne!(server1.url(), server2.url());

    server1.shutdown().await;
    server2.shutdown().await;
}

#[tokio::test]
async fn test_server_shutdown_is_clean() {
    let server = MockServer::start().await.unwrap();
    let url = server.uri("/health");

    server.shutdown().await;

    let result = reqwest::Client::new().get(url).send().await;
    assert!(result.is_err());
}

// =============================================================================
// Replay Tests
// =============================================================================

#[tokio::test]
async fn test_expectations_are_consumed_in_order() {
    let server = MockServer::start().await.unwrap();
    server
        .register(Expectation::get("/items").reply_status(StatusCode::OK))
        .await;
    server
        .register(Expectation::get("/items").reply_status(StatusCode::SERVICE_UNAVAILABLE))
        .await;

    let client = reqwest::Client::new();
    let first = client.get(server.uri("/items")).send().await.unwrap();
    let second = client.get(server.uri("/items")).send().await.unwrap();

    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::SERVICE_UNAVAILABLE);

    let history = server.history().await;
    assert_eq!(history.len(), 2);
    history
        .first()
        .unwrap()
        .request()
        .unwrap()
        .assert_method("GET")
        .assert_uri_path("/items");

    server.verify().await;
    server.shutdown().await;
}

#[tokio::test]
async fn test_reply_headers_and_body() {
    let reply = ResponseBuilder::new()
        .status(200)
        .header("x-request-id", "abc-123")
        .body("pong")
        .build()
        .unwrap();
    let server = MockServer::with_expectations(vec![Expectation::get("/ping")
        .query([("verbose", "1")])
        .reply_with(reply)])
    .await
    .unwrap();

    let response = reqwest::Client::new()
        .get(server.uri("/ping?verbose=1&trace=on"))
        .header("authorization", "Bearer secret")
        .send()
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "abc-123");
    assert_eq!(response.text().await.unwrap(), "pong");

    let requests = server.received_requests().await;
    requests[0]
        .assert_header("authorization", "Bearer secret")
        .assert_uri_query_contains([("trace", "on")]);

    server.shutdown().await;
}

#[tokio::test]
async fn test_relative_pattern_with_query() {
    let server = MockServer::with_expectations(vec![
        Expectation::get("/ping?verbose=1").reply_status(StatusCode::ACCEPTED)
    ])
    .await
    .unwrap();

    let response = reqwest::Client::new()
        .get(server.uri("/ping?trace=on&verbose=1"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    server.verify().await;
    server.shutdown().await;
}

#[tokio::test]
async fn test_unmatched_request_gets_404() {
    let server = MockServer::with_expectations(vec![Expectation::post("/orders")])
        .await
        .unwrap();

    let response = reqwest::Client::new()
        .get(server.uri("/orders"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response.text().await.unwrap();
    assert!(body.contains("No expectation matched GET"));
    assert!(body.contains("- POST /orders"));

    server.shutdown().await;
}

#[tokio::test]
#[should_panic(expected = "did not match any expectation")]
async fn test_verify_fails_after_a_miss() {
    let server = MockServer::with_expectations(vec![Expectation::get("/a")])
        .await
        .unwrap();

    let _ = reqwest::Client::new().get(server.uri("/b")).send().await;

    server.verify().await;
}
