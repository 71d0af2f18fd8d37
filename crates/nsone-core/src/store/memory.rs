// # Memory Record Store
//
// In-memory implementation of RecordStore.
//
// ## Purpose
//
// Stands in for the remote record API in tests and when the core is
// embedded in a process that only needs to plan changes. Nothing survives
// a restart.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{with_create_defaults, with_update_defaults};
use crate::Error;
use crate::record::Record;
use crate::traits::{RecordKey, RecordStore};

/// In-memory record store implementation
///
/// Records live in a HashMap protected by a RwLock. Clones share the same
/// underlying map.
///
/// # Example
///
/// ```rust,no_run
/// use nsone_core::store::MemoryRecordStore;
/// use nsone_core::traits::RecordStore;
/// use nsone_core::{Record, RecordType};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryRecordStore::new();
///
///     let record = Record::new("example.com", "www.example.com", RecordType::A);
///     let stored = store.create(&record).await?;
///     assert!(stored.id.is_some());
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    inner: Arc<RwLock<HashMap<RecordKey, Record>>>,
}

impl MemoryRecordStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of records in the store
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Insert or overwrite a record exactly as given (no computed fields)
    ///
    /// Lets tests seed remote state that didn't come through `create`.
    pub async fn seed(&self, record: Record) {
        self.inner.write().await.insert(record.key(), record);
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create(&self, record: &Record) -> Result<Record, Error> {
        let key = record.key();
        let mut guard = self.inner.write().await;
        if guard.contains_key(&key) {
            return Err(Error::conflict(key.to_string()));
        }
        let stored = with_create_defaults(record);
        guard.insert(key, stored.clone());
        Ok(stored)
    }

    async fn read(&self, key: &RecordKey) -> Result<Record, Error> {
        let guard = self.inner.read().await;
        guard
            .get(key)
            .cloned()
            .ok_or_else(|| Error::not_found(key.to_string()))
    }

    async fn update(&self, record: &Record) -> Result<Record, Error> {
        let key = record.key();
        let mut guard = self.inner.write().await;
        let existing = guard
            .get(&key)
            .ok_or_else(|| Error::not_found(key.to_string()))?;
        let stored = with_update_defaults(record, existing);
        guard.insert(key, stored.clone());
        Ok(stored)
    }

    async fn delete(&self, key: &RecordKey) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(key.to_string()))
    }

    fn store_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordType;

    fn record() -> Record {
        Record::new("example.com", "www.example.com", RecordType::A)
    }

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryRecordStore::new();

        // Initially empty
        assert!(store.is_empty().await);

        let created = store.create(&record()).await.unwrap();
        assert_eq!(store.len().await, 1);

        let read = store.read(&created.key()).await.unwrap();
        assert_eq!(read, created);

        // Delete
        store.delete(&created.key()).await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_memory_store_create_conflict() {
        let store = MemoryRecordStore::new();
        store.create(&record()).await.unwrap();
        let err = store.create(&record()).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn test_memory_store_missing_keys() {
        let store = MemoryRecordStore::new();
        let key = record().key();
        assert!(matches!(store.read(&key).await, Err(Error::NotFound(_))));
        assert!(matches!(store.update(&record()).await, Err(Error::NotFound(_))));
        assert!(matches!(store.delete(&key).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_memory_store_clones_share_state() {
        let store = MemoryRecordStore::new();
        let clone = store.clone();
        store.create(&record()).await.unwrap();
        assert_eq!(clone.len().await, 1);
    }
}
