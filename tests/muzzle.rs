//! Mock client workflows.

use std::ptr;

use http::{Method, StatusCode};
use muzzle::{
    map_response, ClientConfig, ContentAssertions, Expectation, HeaderAssertions, Muzzle,
    MuzzleError, ResponseBuilder, Tracing,
};
use serde_json::json;

#[test]
fn test_post_then_get() {
    muzzle::logging::init();

    let mut client = Muzzle::new();
    client
        .append(Expectation::post("https://example.com").reply_status(StatusCode::CREATED))
        .append(Expectation::get("https://example.com"));

    client.post("https://example.com").unwrap().assert_created();
    client.get("https://example.com").unwrap().assert_ok();

    client.assert_expectations_met();
    assert_eq!(client.history().len(), 2);
}

#[test]
fn test_builder_with_query() {
    let mut client = Muzzle::builder()
        .post("https://example.com")
        .reply_status(StatusCode::CREATED)
        .get("https://example.com")
        .query([("foo", "bar")])
        .build();

    client.post("https://example.com").unwrap().assert_created();
    client
        .get("https://example.com?foo=bar&baz=qux")
        .unwrap()
        .assert_ok();

    client
        .last_request()
        .unwrap()
        .assert_method("GET")
        .assert_uri_query_contains([("foo", "bar")])
        .assert_uri_query_has_key("baz");
}

#[test]
fn test_update_config_returns_same_client() {
    let mut client = Muzzle::make(ClientConfig::new());
    let before: *const Muzzle = &client;

    let updated = client.update_config(|config| config.set_http_errors(true));

    assert!(ptr::eq(before, &*updated));
    assert!(updated.config().http_errors());
}

#[test]
fn test_remove_middleware() {
    let mut client = Muzzle::new();
    client
        .add_middleware("tracing", Tracing)
        .add_middleware("stamp", map_response(|_| {}));
    assert!(client.stack().has("stamp"));

    client.remove_middleware("stamp");

    assert!(!client.stack().has("stamp"));
    assert_eq!(client.stack().names(), vec!["tracing"]);
}

#[test]
fn test_first_and_last_request() {
    let mut client = Muzzle::builder()
        .get("https://example.com/one")
        .delete("https://example.com/two")
        .build();

    client.get("https://example.com/one").unwrap();
    client.delete("https://example.com/two").unwrap();

    client
        .first_request()
        .unwrap()
        .assert_method("GET")
        .assert_uri_path("/one");
    client
        .last_request()
        .unwrap()
        .assert_method("DELETE")
        .assert_uri_path("/two");
    client.first_response().unwrap().assert_ok();
}

#[test]
fn test_json_request_and_response() {
    let reply = ResponseBuilder::new()
        .status(201)
        .json(&json!({"data": {"id": 12, "tags": ["a", "b"]}}))
        .build()
        .unwrap();

    let mut client = Muzzle::builder()
        .base_uri("https://api.example.com/v2/".parse().unwrap())
        .post("https://api.example.com/v2/posts")
        .header("content-type", "application/json")
        .reply_with(reply)
        .build();

    let mut request = client.request(Method::POST, "posts").unwrap();
    request
        .headers_mut()
        .insert("content-type", "application/json".parse().unwrap());
    *request.body_mut() = Some(json!({"title": "Hello"}).to_string().into());

    client
        .send(request)
        .unwrap()
        .assert_created()
        .assert_header("content-type", "application/json")
        .assert_json_fragment(&json!({"id": 12}))
        .assert_json_structure(&json!({"data": {"id": null, "tags": null}}))
        .assert_json_count(2, "/data/tags");

    client
        .last_request()
        .unwrap()
        .assert_exact_json(&json!({"title": "Hello"}))
        .assert_see("Hello");
}

#[test]
fn test_empty_queue_is_an_error() {
    let mut client = Muzzle::new();
    let result = client.get("https://example.com");

    assert!(matches!(result, Err(MuzzleError::QueueEmpty { .. })));
    assert!(client.last_request().is_some());
    assert!(client.last_response().is_none());
}

#[test]
#[should_panic(expected = "No expectation matched GET https://example.com/missing")]
fn test_unmatched_request_fails() {
    let mut client = Muzzle::builder().get("https://example.com/present").build();
    let _ = client.get("https://example.com/missing");
}
