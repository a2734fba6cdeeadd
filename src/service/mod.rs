//! Configuration service orchestration.
//!
//! Composes validation, version resolution, storage and rendering into the
//! three operations the HTTP layer exposes: upload, fetch and history.

pub mod engine;
pub mod types;

pub use engine::ConfigService;
pub use types::{FetchedConfig, ServiceError, ServiceResult, UploadReceipt};
