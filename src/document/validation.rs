//! Required-field validation of uploaded documents.
//!
//! # Responsibilities
//! - Check the optional `version` field type
//! - Resolve each required dotted path and check its type
//! - Report every problem in a single pass
//!
//! # Design Decisions
//! - The schema is the [`REQUIRED_FIELDS`] table; the walker is generic
//! - A present `null` counts as absent

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::document::value::{Document, Value};
use crate::versioning::VERSION_FIELD;

/// Expected type of a required field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Mapping,
    String,
    Int,
}

impl FieldType {
    pub fn name(self) -> &'static str {
        match self {
            FieldType::Mapping => "mapping",
            FieldType::String => "string",
            FieldType::Int => "int",
        }
    }

    fn matches(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (FieldType::Mapping, Value::Map(_))
                | (FieldType::String, Value::String(_))
                | (FieldType::Int, Value::Int(_))
        )
    }
}

/// Fields every document must carry, checked in order.
pub const REQUIRED_FIELDS: &[(&str, FieldType)] = &[
    ("database", FieldType::Mapping),
    ("database.host", FieldType::String),
    ("database.port", FieldType::Int),
];

/// Field path → reason, in the order the problems were found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(IndexMap<String, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Reason recorded for `path`, if any.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    fn record(&mut self, path: &str, reason: impl Into<String>) {
        self.0.insert(path.to_owned(), reason.into());
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (path, reason)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{path} {reason}")?;
        }
        Ok(())
    }
}

/// Walk a dotted path through nested mappings.
///
/// Returns `None` when a segment is missing or an intermediate value is not a
/// mapping.
pub fn lookup_path<'a>(document: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut node = document.get(segments.next()?)?;
    for segment in segments {
        node = node.as_map()?.get(segment)?;
    }
    Some(node)
}

/// Validate a document against [`REQUIRED_FIELDS`].
pub fn validate(document: &Document) -> ValidationErrors {
    validate_with(document, REQUIRED_FIELDS)
}

/// Validate a document against an arbitrary required-field table.
pub fn validate_with(document: &Document, fields: &[(&str, FieldType)]) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    match document.get(VERSION_FIELD) {
        None => {}
        Some(Value::Int(v)) if *v < 1 => errors.record(VERSION_FIELD, "must be >= 1"),
        Some(Value::Int(_)) => {}
        Some(_) => errors.record(VERSION_FIELD, "must be int"),
    }

    for &(path, expected) in fields {
        match lookup_path(document, path) {
            None | Some(Value::Null) => errors.record(path, "is required"),
            Some(value) if !expected.matches(value) => {
                errors.record(path, format!("must be {}", expected.name()))
            }
            Some(_) => {}
        }
    }

    errors
}
