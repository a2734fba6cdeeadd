//! Version resolution rules.

use std::fmt;

use thiserror::Error;

use crate::document::{Document, Value};

/// Version number of a stored document. Always >= 1.
pub type Version = i64;

/// Document key that carries the version.
pub const VERSION_FIELD: &str = "version";

/// Which stored version a read targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionSelector {
    Exact(Version),
    Latest,
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSelector::Exact(v) => write!(f, "{v}"),
            VersionSelector::Latest => f.write_str("latest"),
        }
    }
}

/// Auto-increment would overflow the version space.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("no version available after {latest}")]
pub struct VersionExhausted {
    pub latest: Version,
}

/// The integer `version` a document declares, if any.
pub fn declared_version(document: &Document) -> Option<Version> {
    document.get(VERSION_FIELD).and_then(Value::as_int)
}

/// Pick the version an upload is stored under.
///
/// A declared integer `version` is used verbatim. Otherwise the version is
/// one past `latest_known`, or 1 for a service with no versions.
pub fn resolve_upload_version(
    document: &Document,
    latest_known: Option<Version>,
) -> Result<Version, VersionExhausted> {
    if let Some(version) = declared_version(document) {
        return Ok(version);
    }
    let latest = latest_known.unwrap_or(0);
    latest.checked_add(1).ok_or(VersionExhausted { latest })
}

/// Write the resolved version into the document. An existing `version` key
/// keeps its position; otherwise the key is appended.
pub fn stamp_version(document: &mut Document, version: Version) {
    document.insert(VERSION_FIELD.to_owned(), Value::Int(version));
}

/// Select the version a read targets.
pub fn resolve_read_version(requested: Option<Version>) -> VersionSelector {
    requested.map_or(VersionSelector::Latest, VersionSelector::Exact)
}
