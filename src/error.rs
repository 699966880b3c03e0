use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::ParseError as UrlParseError;

/// Crate-wide error type.
///
/// The parsing core only ever propagates [`KmError::EmptyBundle`]; every other
/// anomaly (orphan pages, unresolvable routes, duplicate ids) degrades to a
/// well-defined fallback value. The remaining variants exist for the
/// collaborator seams: configuration loading and bundle sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum KmError {
    #[error("no pages parsed from bundle")]
    EmptyBundle,
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("File system error: {0}")]
    Io(String),
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("(De)serialization error: {0}")]
    Serialization(String),
    #[error("Bundle source error: {0}")]
    Source(String),
}

impl From<io::Error> for KmError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => KmError::NotFound(format!("{x}")),
            _ => KmError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<toml::de::Error> for KmError {
    fn from(src: toml::de::Error) -> KmError {
        KmError::Serialization(format!("Toml deserialization error: {src}"))
    }
}

impl From<serde_json::Error> for KmError {
    fn from(src: serde_json::Error) -> KmError {
        KmError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<UrlParseError> for KmError {
    fn from(src: UrlParseError) -> KmError {
        KmError::Serialization(format!("Invalid URL: {src}"))
    }
}

impl From<regex::Error> for KmError {
    fn from(src: regex::Error) -> KmError {
        KmError::Serialization(format!("Regex parse failed: {src}"))
    }
}
