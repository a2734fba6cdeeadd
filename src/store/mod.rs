//! Versioned document storage.
//!
//! # Data Flow
//! ```text
//! ConfigService
//!     → ConfigStore trait (latest_version / insert / get / history)
//!     → memory.rs (concurrent map, atomic check-and-insert)
//!     → file.rs (memory + JSON snapshot on disk)
//! ```
//!
//! # Design Decisions
//! - `(service, version)` uniqueness is the only consistency rule
//! - A conflict is always the typed `StoreError::DuplicateVersion`
//! - Entries are immutable once inserted; nothing is ever deleted

pub mod file;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::Document;
use crate::versioning::{Version, VersionSelector};

pub use file::FileStore;
pub use memory::MemoryStore;

/// A stored document revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedEntry {
    pub service: String,
    pub version: Version,
    pub document: Document,
    pub created_at: DateTime<Utc>,
}

/// One row of a service's version history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub version: Version,
    pub created_at: DateTime<Utc>,
}

impl From<&VersionedEntry> for HistoryEntry {
    fn from(entry: &VersionedEntry) -> Self {
        Self {
            version: entry.version,
            created_at: entry.created_at,
        }
    }
}

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The `(service, version)` pair is already recorded.
    #[error("version {version} already exists for service `{service}`")]
    DuplicateVersion { service: String, version: Version },

    /// Reading or writing backing files failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A snapshot could not be encoded or decoded.
    #[error("snapshot encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Persisted data violates the store invariants.
    #[error("corrupt snapshot: {0}")]
    Corrupt(String),

    /// The backend cannot be opened with the given settings.
    #[error("storage misconfigured: {0}")]
    Misconfigured(String),
}

impl StoreError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::DuplicateVersion { .. })
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Storage backend for versioned configuration documents.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Highest stored version for `service`, if it has any.
    async fn latest_version(&self, service: &str) -> StoreResult<Option<Version>>;

    /// Record a new revision. Fails with [`StoreError::DuplicateVersion`] when
    /// the pair already exists; the check and the write are atomic.
    async fn insert(&self, service: &str, version: Version, document: Document) -> StoreResult<VersionedEntry>;

    /// Fetch an exact version, or the highest one for [`VersionSelector::Latest`].
    async fn get(&self, service: &str, selector: VersionSelector) -> StoreResult<Option<VersionedEntry>>;

    /// All versions of `service` in ascending version order. Empty for an
    /// unknown service.
    async fn history(&self, service: &str) -> StoreResult<Vec<HistoryEntry>>;
}
