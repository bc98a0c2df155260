//! File-backed response payloads.
//!
//! A fixture is loaded by file name from a fixture directory and typed by
//! its extension: `.json` files are parsed eagerly, `.html`/`.htm` files
//! are read as text, anything else is kept as raw bytes.

use std::fs;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{MuzzleError, Result};

/// A loaded fixture.
#[derive(Debug, Clone)]
pub enum Fixture {
    Json(JsonFixture),
    Html(HtmlFixture),
    Text(TextFixture),
}

impl Fixture {
    /// Load `name` from `directory`, dispatching on the file extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory does not exist, the file cannot
    /// be read, or a `.json` file does not hold valid JSON.
    pub fn load(directory: impl AsRef<Path>, name: &str) -> Result<Self> {
        let directory = directory.as_ref();
        if !directory.is_dir() {
            return Err(MuzzleError::FixtureDirectoryMissing(directory.to_path_buf()));
        }

        let path = directory.join(name);
        let body = fs::read(&path).map_err(|source| MuzzleError::Io {
            path: path.clone(),
            source,
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        tracing::debug!(path = %path.display(), ?extension, "loading fixture");

        let fixture = match extension.as_deref() {
            Some("json") => Fixture::Json(JsonFixture::new(path, Bytes::from(body))?),
            Some("html") | Some("htm") => Fixture::Html(HtmlFixture::new(path, Bytes::from(body))?),
            _ => Fixture::Text(TextFixture {
                path,
                body: Bytes::from(body),
            }),
        };

        Ok(fixture)
    }

    /// Where the fixture was read from.
    pub fn path(&self) -> &Path {
        match self {
            Fixture::Json(f) => &f.path,
            Fixture::Html(f) => &f.path,
            Fixture::Text(f) => &f.path,
        }
    }

    /// The raw file contents.
    pub fn body(&self) -> &Bytes {
        match self {
            Fixture::Json(f) => &f.body,
            Fixture::Html(f) => &f.body,
            Fixture::Text(f) => &f.body,
        }
    }

    /// Content type a response carrying this fixture should declare.
    pub fn content_type(&self) -> &'static str {
        match self {
            Fixture::Json(_) => "application/json",
            Fixture::Html(_) => "text/html; charset=utf-8",
            Fixture::Text(_) => "text/plain; charset=utf-8",
        }
    }

    pub fn as_json(&self) -> Option<&JsonFixture> {
        match self {
            Fixture::Json(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_html(&self) -> Option<&HtmlFixture> {
        match self {
            Fixture::Html(f) => Some(f),
            _ => None,
        }
    }
}

/// A `.json` fixture with its decoded content.
#[derive(Debug, Clone)]
pub struct JsonFixture {
    path: PathBuf,
    body: Bytes,
    value: Value,
}

impl JsonFixture {
    fn new(path: PathBuf, body: Bytes) -> Result<Self> {
        let value = serde_json::from_slice(&body)?;
        Ok(Self { path, body, value })
    }

    /// The decoded document.
    pub fn decode(&self) -> &Value {
        &self.value
    }

    /// Decode the document into `T`.
    pub fn decode_as<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.value.clone())?)
    }
}

/// A `.html` fixture.
#[derive(Debug, Clone)]
pub struct HtmlFixture {
    path: PathBuf,
    body: Bytes,
    html: String,
}

impl HtmlFixture {
    fn new(path: PathBuf, body: Bytes) -> Result<Self> {
        let html = std::str::from_utf8(&body)?.to_string();
        Ok(Self { path, body, html })
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

/// Any other fixture, kept as raw bytes.
#[derive(Debug, Clone)]
pub struct TextFixture {
    path: PathBuf,
    body: Bytes,
}
