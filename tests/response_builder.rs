//! Response builder and fixture loading through the process-wide fixture
//! directory.

use std::fs;
use std::sync::{Mutex, MutexGuard, PoisonError};

use muzzle::{ContentAssertions, Fixture, JsonMessage, MuzzleError, ResponseBuilder};
use serde::Deserialize;
use serde_json::json;
use tempfile::TempDir;

// The fixture directory is global, so tests touching it take turns.
static FIXTURE_LOCK: Mutex<()> = Mutex::new(());

fn lock() -> MutexGuard<'static, ()> {
    FIXTURE_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

fn fixture_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("response.json"),
        r#"{"data": {"message": "This is a test response."}}"#,
    )
    .unwrap();
    fs::write(dir.path().join("page.HTML"), "<span>some html</span>").unwrap();
    fs::write(dir.path().join("notes.txt"), "plain words").unwrap();
    dir
}

#[derive(Debug, Deserialize)]
struct Envelope {
    data: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    message: String,
}

#[test]
fn test_json_fixture_is_decoded() {
    let _guard = lock();
    let dir = fixture_dir();
    ResponseBuilder::set_fixture_directory(dir.path()).unwrap();

    let fixture = ResponseBuilder::from_fixture("response.json").unwrap();

    let json = fixture.as_json().expect("json fixture");
    assert_eq!(json.decode()["data"]["message"], "This is a test response.");
    let envelope: Envelope = json.decode_as().unwrap();
    assert_eq!(envelope.data.message, "This is a test response.");

    ResponseBuilder::reset_fixture_directory();
}

#[test]
fn test_html_fixture_by_extension_any_case() {
    let _guard = lock();
    let dir = fixture_dir();
    ResponseBuilder::set_fixture_directory(dir.path()).unwrap();

    let fixture = ResponseBuilder::from_fixture("page.HTML").unwrap();
    assert_eq!(fixture.as_html().unwrap().html(), "<span>some html</span>");

    let text = ResponseBuilder::from_fixture("notes.txt").unwrap();
    assert!(matches!(text, Fixture::Text(_)));
    assert_eq!(text.content_type(), "text/plain; charset=utf-8");

    ResponseBuilder::reset_fixture_directory();
}

#[test]
fn test_body_from_global_fixture_directory() {
    let _guard = lock();
    let dir = fixture_dir();
    ResponseBuilder::set_fixture_directory(dir.path()).unwrap();
    assert_eq!(
        ResponseBuilder::current_fixture_directory().as_deref(),
        Some(dir.path())
    );

    let response = ResponseBuilder::new()
        .status(202)
        .body_from_fixture("response.json")
        .build()
        .unwrap();

    response
        .assert_status(202u16)
        .assert_json(&json!({"data": {"message": "This is a test response."}}))
        .assert_see("test response");
    assert_eq!(response.decode().unwrap()["data"]["message"], "This is a test response.");

    ResponseBuilder::reset_fixture_directory();
}

#[test]
fn test_environment_directory_is_the_fallback() {
    let _guard = lock();
    let dir = fixture_dir();
    ResponseBuilder::reset_fixture_directory();

    std::env::set_var("MUZZLE_FIXTURE_DIR", dir.path());
    let fixture = ResponseBuilder::from_fixture("response.json");
    std::env::remove_var("MUZZLE_FIXTURE_DIR");

    assert!(fixture.unwrap().as_json().is_some());
}

#[test]
fn test_no_directory_configured() {
    let _guard = lock();
    ResponseBuilder::reset_fixture_directory();

    let result = ResponseBuilder::new().body_from_fixture("response.json").build();
    assert!(matches!(result, Err(MuzzleError::FixtureDirectoryNotSet)));
}

#[test]
fn test_json_body_round_trip() {
    let data = json!({"data": {"message": "This is a test response."}});

    let response = ResponseBuilder::new().json(&data).build().unwrap();

    assert_eq!(response.decode().unwrap(), data);
    response.assert_exact_json(&data);
}
