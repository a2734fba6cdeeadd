//! Version assignment and selection.
//!
//! # Data Flow
//! ```text
//! upload: document + latest stored version
//!     → resolver.rs (explicit `version` wins, else latest + 1)
//!     → version written back into the document
//!
//! read: optional `version` query parameter
//!     → resolver.rs (exact version or latest)
//!     → VersionSelector handed to the store
//! ```
//!
//! # Design Decisions
//! - Explicit versions are accepted verbatim; no monotonicity is enforced
//! - Conflicts are detected by the store, never pre-checked here

pub mod resolver;

pub use resolver::{
    declared_version, resolve_read_version, resolve_upload_version, stamp_version, Version,
    VersionExhausted, VersionSelector, VERSION_FIELD,
};
