//! Assertion primitives.
//!
//! Every `assert_*` method in this crate ends up in one of these functions.
//! A failed assertion panics with a readable message, so it is reported by
//! the test harness the same way as `assert_eq!`.

use std::fmt::Debug;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

/// Panic with `message` unless `condition` holds.
///
/// The message is built lazily, only on failure.
#[track_caller]
pub fn assert_that<M: FnOnce() -> String>(condition: bool, message: M) {
    if !condition {
        panic!("{}", message());
    }
}

/// Panic with an expected/actual report unless both values are equal.
///
/// `context` is printed on the first line of the failure; pass an empty
/// string to omit it.
#[track_caller]
pub fn assert_equals<T: PartialEq + Debug + ?Sized>(expected: &T, actual: &T, context: &str) {
    if expected == actual {
        return;
    }

    let mut message = String::new();
    if !context.is_empty() {
        message.push_str(context);
        message.push('\n');
    }
    message.push_str(&format!(
        "Failed asserting that two values are equal.\n  expected: {expected:?}\n    actual: {actual:?}"
    ));

    panic!("{message}");
}

/// Check that `expected` is contained in `actual`.
///
/// Objects match when every expected key exists in `actual` with a value
/// that is itself a subset. Arrays are compared index-wise over the
/// expected length. Any other value must be equal.
pub fn json_subset(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Object(expected), Value::Object(actual)) => expected
            .iter()
            .all(|(key, value)| actual.get(key).is_some_and(|a| json_subset(value, a))),
        (Value::Array(expected), Value::Array(actual)) => {
            expected.len() <= actual.len()
                && expected.iter().zip(actual).all(|(e, a)| json_subset(e, a))
        }
        _ => expected == actual,
    }
}

/// Check whether any object nested in `actual` carries every key/value
/// pair of `fragment`.
pub fn json_has_fragment(fragment: &Value, actual: &Value) -> bool {
    if let (Value::Object(fragment), Value::Object(object)) = (fragment, actual) {
        if fragment.iter().all(|(key, value)| object.get(key) == Some(value)) {
            return true;
        }
    }

    match actual {
        Value::Object(object) => object.values().any(|v| json_has_fragment(fragment, v)),
        Value::Array(items) => items.iter().any(|v| json_has_fragment(fragment, v)),
        _ => false,
    }
}

/// Check that `actual` has the shape described by `structure`.
///
/// A string names a required key. An array lists several requirements. An
/// object maps a key to the structure of its value, and the key `*`
/// applies the nested structure to every element of an array or object.
pub fn json_has_structure(structure: &Value, actual: &Value) -> bool {
    match structure {
        Value::Null => true,
        Value::String(key) => actual.get(key.as_str()).is_some(),
        Value::Array(requirements) => requirements
            .iter()
            .all(|requirement| json_has_structure(requirement, actual)),
        Value::Object(nested) => nested.iter().all(|(key, inner)| {
            if key == "*" {
                match actual {
                    Value::Array(items) => items.iter().all(|i| json_has_structure(inner, i)),
                    Value::Object(object) => {
                        object.values().all(|v| json_has_structure(inner, v))
                    }
                    _ => false,
                }
            } else {
                actual
                    .get(key.as_str())
                    .is_some_and(|v| json_has_structure(inner, v))
            }
        }),
        _ => false,
    }
}

/// Match `value` against a pattern where `*` stands for any run of
/// characters.
pub fn wildcard_match(pattern: &str, value: &str) -> bool {
    if pattern == value {
        return true;
    }

    let source = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");

    Regex::new(&format!("(?s)^{source}$"))
        .map(|re| re.is_match(value))
        .unwrap_or(false)
}

/// Render a value as indented JSON for failure messages.
pub fn format<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unformattable: {e}>"))
}
