//! Assertions shared by requests and responses.
//!
//! Both wrappers expose their headers and body through the two accessor
//! methods below and get every assertion from the provided methods.

use http::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::assertions::{
    assert_that, format, json_has_fragment, json_has_structure, json_subset,
};
use crate::error::Result;

/// Access to a message body as text or JSON.
pub trait JsonMessage {
    /// The raw body.
    fn body_bytes(&self) -> &[u8];

    /// The body as UTF-8 text.
    fn text(&self) -> Result<&str> {
        Ok(std::str::from_utf8(self.body_bytes())?)
    }

    /// Decode the body as untyped JSON.
    fn decode(&self) -> Result<Value> {
        Ok(serde_json::from_slice(self.body_bytes())?)
    }

    /// Decode the body into `T`.
    fn decode_as<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(self.body_bytes())?)
    }
}

#[track_caller]
fn decode_or_fail<M: JsonMessage + ?Sized>(message: &M) -> Value {
    match message.decode() {
        Ok(value) => value,
        Err(e) => panic!(
            "Invalid JSON was returned: {e}\n{}",
            String::from_utf8_lossy(message.body_bytes())
        ),
    }
}

/// Body assertions.
pub trait ContentAssertions: JsonMessage {
    /// Assert that the body contains `text`.
    #[track_caller]
    fn assert_see(&self, text: &str) -> &Self
    where
        Self: Sized,
    {
        let body = String::from_utf8_lossy(self.body_bytes());
        assert_that(body.contains(text), || {
            format!("Failed asserting that [{text}] is present in:\n{body}")
        });
        self
    }

    /// Assert that the body does not contain `text`.
    #[track_caller]
    fn assert_dont_see(&self, text: &str) -> &Self
    where
        Self: Sized,
    {
        let body = String::from_utf8_lossy(self.body_bytes());
        assert_that(!body.contains(text), || {
            format!("Failed asserting that [{text}] is not present in:\n{body}")
        });
        self
    }

    /// Assert that the decoded body contains `expected` as a subset.
    #[track_caller]
    fn assert_json(&self, expected: &Value) -> &Self
    where
        Self: Sized,
    {
        let actual = decode_or_fail(self);
        assert_that(json_subset(expected, &actual), || {
            format!(
                "Could not find\n{}\nwithin\n{}",
                format(expected),
                format(&actual)
            )
        });
        self
    }

    /// Assert that the decoded body equals `expected`.
    #[track_caller]
    fn assert_exact_json(&self, expected: &Value) -> &Self
    where
        Self: Sized,
    {
        let actual = decode_or_fail(self);
        assert_that(&actual == expected, || {
            format!(
                "Failed asserting that\n{}\nis identical to\n{}",
                format(&actual),
                format(expected)
            )
        });
        self
    }

    /// Assert that some object in the decoded body carries all of the
    /// fragment's key/value pairs.
    #[track_caller]
    fn assert_json_fragment(&self, fragment: &Value) -> &Self
    where
        Self: Sized,
    {
        let actual = decode_or_fail(self);
        assert_that(json_has_fragment(fragment, &actual), || {
            format!(
                "Unable to find JSON fragment\n{}\nwithin\n{}",
                format(fragment),
                format(&actual)
            )
        });
        self
    }

    /// Assert that no object in the decoded body carries the fragment.
    #[track_caller]
    fn assert_json_missing(&self, fragment: &Value) -> &Self
    where
        Self: Sized,
    {
        let actual = decode_or_fail(self);
        assert_that(!json_has_fragment(fragment, &actual), || {
            format!(
                "Found unexpected JSON fragment\n{}\nwithin\n{}",
                format(fragment),
                format(&actual)
            )
        });
        self
    }

    /// Assert that the decoded body has the given shape.
    ///
    /// See [`json_has_structure`](crate::assertions::json_has_structure)
    /// for the structure notation.
    #[track_caller]
    fn assert_json_structure(&self, structure: &Value) -> &Self
    where
        Self: Sized,
    {
        let actual = decode_or_fail(self);
        assert_that(json_has_structure(structure, &actual), || {
            format!(
                "Failed asserting that\n{}\nhas the structure\n{}",
                format(&actual),
                format(structure)
            )
        });
        self
    }

    /// Assert the number of elements in the array or object found at the
    /// JSON pointer (`""` for the root).
    #[track_caller]
    fn assert_json_count(&self, count: usize, pointer: &str) -> &Self
    where
        Self: Sized,
    {
        let actual = decode_or_fail(self);
        let found = match actual.pointer(pointer) {
            Some(Value::Array(items)) => Some(items.len()),
            Some(Value::Object(object)) => Some(object.len()),
            _ => None,
        };
        assert_that(found == Some(count), || match found {
            Some(n) => format!("Expected {count} items at [{pointer}] but found {n}."),
            None => format!("No array or object found at [{pointer}]."),
        });
        self
    }
}

/// All values of a header, lossily converted to strings.
pub(crate) fn header_values(headers: &HeaderMap, name: &str) -> Vec<String> {
    headers
        .get_all(name)
        .iter()
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .collect()
}

/// Header assertions.
pub trait HeaderAssertions {
    /// The message headers.
    fn header_map(&self) -> &HeaderMap;

    /// "request" or "response", used in failure messages.
    fn message_kind(&self) -> &'static str;

    /// Assert that the header is present.
    #[track_caller]
    fn assert_has_header(&self, name: &str) -> &Self
    where
        Self: Sized,
    {
        assert_that(self.header_map().contains_key(name), || {
            format!("Header [{name}] not present on {}.", self.message_kind())
        });
        self
    }

    /// Assert that the header is present with `value` among its values.
    #[track_caller]
    fn assert_header(&self, name: &str, value: &str) -> &Self
    where
        Self: Sized,
    {
        self.assert_header_values(name, &[value])
    }

    /// Assert that the header is present and carries every value in `values`.
    ///
    /// Order does not matter and extra values on the message are allowed:
    /// each expected value only has to appear somewhere among the actual
    /// ones. This is looser than a positional subset comparison.
    #[track_caller]
    fn assert_header_values(&self, name: &str, values: &[&str]) -> &Self
    where
        Self: Sized,
    {
        self.assert_has_header(name);

        let mut actual = header_values(self.header_map(), name);
        actual.sort();
        let mut expected: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        expected.sort();

        assert_that(expected.iter().all(|e| actual.contains(e)), || {
            format!(
                "Header [{}] was found, but value(s) [{}] does not match [{}].",
                name,
                actual.join(", "),
                expected.join(", ")
            )
        });
        self
    }

    /// Assert that the header is absent.
    #[track_caller]
    fn assert_header_missing(&self, name: &str) -> &Self
    where
        Self: Sized,
    {
        assert_that(!self.header_map().contains_key(name), || {
            format!(
                "Unexpected header [{name}] is present on {}.",
                self.message_kind()
            )
        });
        self
    }
}
