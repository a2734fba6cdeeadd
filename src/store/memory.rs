//! In-memory concurrent store.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use crate::document::Document;
use crate::store::{ConfigStore, HistoryEntry, StoreError, StoreResult, VersionedEntry};
use crate::versioning::{Version, VersionSelector};

/// A thread-safe store keeping every revision in memory.
///
/// Each service maps to a `BTreeMap` ordered by version. The check-and-insert
/// for a service runs under that service's shard lock.
#[derive(Clone, Default)]
pub struct MemoryStore {
    services: Arc<DashMap<String, BTreeMap<Version, VersionedEntry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully-formed entry, enforcing `(service, version)` uniqueness.
    pub fn insert_entry(&self, entry: VersionedEntry) -> StoreResult<()> {
        let mut versions = self.services.entry(entry.service.clone()).or_default();
        match versions.entry(entry.version) {
            btree_map::Entry::Occupied(_) => Err(StoreError::DuplicateVersion {
                service: entry.service,
                version: entry.version,
            }),
            btree_map::Entry::Vacant(slot) => {
                slot.insert(entry);
                Ok(())
            }
        }
    }

    /// Drop a revision. Only used to undo an insert whose persistence failed.
    pub(crate) fn remove_entry(&self, service: &str, version: Version) {
        if let Some(mut versions) = self.services.get_mut(service) {
            versions.remove(&version);
        }
        self.services.remove_if(service, |_, versions| versions.is_empty());
    }

    /// Every stored entry, ordered by service then version.
    pub fn entries(&self) -> Vec<VersionedEntry> {
        let mut services: Vec<String> = self.services.iter().map(|r| r.key().clone()).collect();
        services.sort();

        services
            .iter()
            .filter_map(|service| self.services.get(service))
            .flat_map(|versions| versions.values().cloned().collect::<Vec<_>>())
            .collect()
    }

    /// Number of services with at least one version.
    pub fn service_count(&self) -> usize {
        self.services.len()
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn latest_version(&self, service: &str) -> StoreResult<Option<Version>> {
        Ok(self
            .services
            .get(service)
            .and_then(|versions| versions.keys().next_back().copied()))
    }

    async fn insert(&self, service: &str, version: Version, document: Document) -> StoreResult<VersionedEntry> {
        let entry = VersionedEntry {
            service: service.to_owned(),
            version,
            document,
            created_at: Utc::now(),
        };
        self.insert_entry(entry.clone())?;
        Ok(entry)
    }

    async fn get(&self, service: &str, selector: VersionSelector) -> StoreResult<Option<VersionedEntry>> {
        let Some(versions) = self.services.get(service) else {
            return Ok(None);
        };
        let entry = match selector {
            VersionSelector::Exact(version) => versions.get(&version),
            VersionSelector::Latest => versions.values().next_back(),
        };
        Ok(entry.cloned())
    }

    async fn history(&self, service: &str) -> StoreResult<Vec<HistoryEntry>> {
        Ok(self
            .services
            .get(service)
            .map(|versions| versions.values().map(HistoryEntry::from).collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Value;

    fn document(tag: &str) -> Document {
        let mut doc = Document::new();
        doc.insert("tag".into(), Value::from(tag));
        doc
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = MemoryStore::new();
        assert_eq!(store.latest_version("orders").await.unwrap(), None);

        store.insert("orders", 1, document("a")).await.unwrap();
        store.insert("orders", 2, document("b")).await.unwrap();

        assert_eq!(store.latest_version("orders").await.unwrap(), Some(2));
        let latest = store.get("orders", VersionSelector::Latest).await.unwrap().unwrap();
        assert_eq!(latest.version, 2);
        assert_eq!(latest.document, document("b"));

        let first = store.get("orders", VersionSelector::Exact(1)).await.unwrap().unwrap();
        assert_eq!(first.document, document("a"));

        assert!(store.get("orders", VersionSelector::Exact(9)).await.unwrap().is_none());
        assert!(store.get("billing", VersionSelector::Latest).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_version_is_typed() {
        let store = MemoryStore::new();
        store.insert("orders", 2, document("a")).await.unwrap();

        let err = store.insert("orders", 2, document("different")).await.unwrap_err();
        assert!(err.is_duplicate());
        assert!(matches!(err, StoreError::DuplicateVersion { version: 2, .. }));

        // The original revision is untouched.
        let stored = store.get("orders", VersionSelector::Exact(2)).await.unwrap().unwrap();
        assert_eq!(stored.document, document("a"));
    }

    #[tokio::test]
    async fn test_same_version_in_other_service() {
        let store = MemoryStore::new();
        store.insert("orders", 1, document("a")).await.unwrap();
        store.insert("billing", 1, document("b")).await.unwrap();
        assert_eq!(store.service_count(), 2);
    }

    #[tokio::test]
    async fn test_history_is_ascending_regardless_of_insert_order() {
        let store = MemoryStore::new();
        for version in [3, 1, 2] {
            store.insert("orders", version, document("x")).await.unwrap();
        }
        let versions: Vec<Version> = store
            .history("orders")
            .await
            .unwrap()
            .iter()
            .map(|h| h.version)
            .collect();
        assert_eq!(versions, [1, 2, 3]);
        assert_eq!(store.latest_version("orders").await.unwrap(), Some(3));
        assert!(store.history("unknown").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_inserts_of_one_version() {
        let store = MemoryStore::new();
        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..32 {
            let store = store.clone();
            tasks.spawn(async move { store.insert("orders", 7, document(&i.to_string())).await });
        }

        let mut saved = 0;
        let mut duplicates = 0;
        while let Some(result) = tasks.join_next().await {
            match result.unwrap() {
                Ok(_) => saved += 1,
                Err(err) if err.is_duplicate() => duplicates += 1,
                Err(err) => panic!("unexpected error: {err}"),
            }
        }
        assert_eq!(saved, 1);
        assert_eq!(duplicates, 31);
    }

    #[tokio::test]
    async fn test_remove_entry_drops_empty_service() {
        let store = MemoryStore::new();
        store.insert("orders", 1, document("a")).await.unwrap();
        store.remove_entry("orders", 1);
        assert_eq!(store.service_count(), 0);
        assert_eq!(store.latest_version("orders").await.unwrap(), None);
    }

    #[test]
    fn test_entries_are_sorted() {
        let store = MemoryStore::new();
        let now = Utc::now();
        for (service, version) in [("b", 2), ("a", 1), ("b", 1)] {
            store
                .insert_entry(VersionedEntry {
                    service: service.into(),
                    version,
                    document: Document::new(),
                    created_at: now,
                })
                .unwrap();
        }
        let keys: Vec<(String, Version)> = store
            .entries()
            .into_iter()
            .map(|e| (e.service, e.version))
            .collect();
        assert_eq!(keys, [("a".to_string(), 1), ("b".to_string(), 1), ("b".to_string(), 2)]);
    }
}
