//! Decoding of uploaded documents.

use serde::Deserialize;
use thiserror::Error;

use crate::document::value::{Document, Value};

/// Errors produced while turning an upload body into a [`Document`].
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The body is not well-formed YAML, or uses unsupported YAML features
    /// (custom tags, duplicate keys, NaN or infinite floats).
    #[error("Invalid YAML: {0}")]
    Syntax(#[from] serde_yaml::Error),

    /// The body parsed, but its top level is a scalar or a list.
    #[error("Top-level YAML must be a mapping")]
    NotAMapping,
}

/// Decode a YAML (or JSON) body into a document.
///
/// An empty body, or one that decodes to `null`, is an empty mapping. Merge
/// keys (`<<`) are applied before conversion.
pub fn decode_yaml(body: &[u8]) -> Result<Document, DecodeError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Document::new());
    }

    let mut raw: serde_yaml::Value = serde_yaml::from_slice(body)?;
    raw.apply_merge()?;

    match Value::deserialize(raw)? {
        Value::Null => Ok(Document::new()),
        Value::Map(map) => Ok(map),
        _ => Err(DecodeError::NotAMapping),
    }
}
