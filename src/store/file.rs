//! Durable store backed by a JSON snapshot file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::document::Document;
use crate::store::memory::MemoryStore;
use crate::store::{ConfigStore, HistoryEntry, StoreError, StoreResult, VersionedEntry};
use crate::versioning::{Version, VersionSelector};

/// A [`MemoryStore`] whose contents are rewritten to disk after every insert.
///
/// The snapshot is written to a temporary sibling file and renamed over the
/// previous one, so a crash never leaves a half-written snapshot behind.
pub struct FileStore {
    memory: MemoryStore,
    path: PathBuf,
    /// Serializes insert + snapshot so rollbacks never race.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open the store at `path`, loading the snapshot if one exists.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let memory = MemoryStore::new();

        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let entries: Vec<VersionedEntry> = serde_json::from_slice(&bytes)?;
                let count = entries.len();
                for entry in entries {
                    memory.insert_entry(entry).map_err(|err| match err {
                        StoreError::DuplicateVersion { service, version } => StoreError::Corrupt(format!(
                            "version {version} of `{service}` appears more than once"
                        )),
                        other => other,
                    })?;
                }
                tracing::info!(
                    path = %path.display(),
                    entries = count,
                    services = memory.service_count(),
                    "Loaded configuration snapshot"
                );
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No snapshot found, starting empty");
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Self {
            memory,
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Location of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(&self.memory.entries())?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("tmp");
        let written = match tokio::fs::write(&tmp, &bytes).await {
            Ok(()) => tokio::fs::rename(&tmp, &self.path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            // The temp file must not outlive a failed snapshot.
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for FileStore {
    async fn latest_version(&self, service: &str) -> StoreResult<Option<Version>> {
        self.memory.latest_version(service).await
    }

    async fn insert(&self, service: &str, version: Version, document: Document) -> StoreResult<VersionedEntry> {
        let _guard = self.write_lock.lock().await;

        let entry = self.memory.insert(service, version, document).await?;
        if let Err(err) = self.persist().await {
            self.memory.remove_entry(service, version);
            tracing::error!(
                service = %service,
                version,
                path = %self.path.display(),
                error = %err,
                "Failed to persist snapshot, insert rolled back"
            );
            return Err(err);
        }
        Ok(entry)
    }

    async fn get(&self, service: &str, selector: VersionSelector) -> StoreResult<Option<VersionedEntry>> {
        self.memory.get(service, selector).await
    }

    async fn history(&self, service: &str) -> StoreResult<Vec<HistoryEntry>> {
        self.memory.history(service).await
    }
}
