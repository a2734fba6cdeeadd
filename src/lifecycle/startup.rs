//! Startup orchestration.
//!
//! # Responsibilities
//! - Open the configured storage backend
//! - Fail fast: any startup error is fatal

use std::sync::Arc;

use crate::config::{StorageBackend, StorageConfig};
use crate::store::{ConfigStore, FileStore, MemoryStore, StoreError, StoreResult};

/// Build the store selected by `config`.
pub async fn open_store(config: &StorageConfig) -> StoreResult<Arc<dyn ConfigStore>> {
    match config.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; configurations are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::File => {
            let path = config
                .path
                .as_deref()
                .filter(|p| !p.is_empty())
                .ok_or_else(|| StoreError::Misconfigured("storage.path is not set".into()))?;
            Ok(Arc::new(FileStore::open(path).await?))
        }
    }
}
