// # File Record Store
//
// JSON file implementation of RecordStore.
//
// ## Purpose
//
// An offline mirror of the remote record API: `nsone-apply` reconciles
// against it so a configuration can be exercised without network access.
//
// ## Crash Recovery
//
// - Atomic writes: write to `.tmp`, then rename over the store file
// - Backup: the previous file is copied to `.backup` before each write
// - Recovery: a file that fails to parse is replaced by its backup
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "records": {
//     "example.com/www.example.com/A": {
//       "record": { "zone": "example.com", "domain": "www.example.com", "type": "A", ... },
//       "last_updated": "2025-01-09T12:00:00Z"
//     }
//   }
// }
// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use super::{with_create_defaults, with_update_defaults};
use crate::Error;
use crate::record::Record;
use crate::traits::{RecordKey, RecordStore};

/// Store file format version
const STORE_FILE_VERSION: &str = "1.0";

/// A record plus the time it was last written
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StoredRecord {
    pub record: Record,
    pub last_updated: DateTime<Utc>,
}

impl StoredRecord {
    fn new(record: Record) -> Self {
        Self {
            record,
            last_updated: Utc::now(),
        }
    }
}

/// Serializable store file format
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct StoreFileFormat {
    version: String,
    records: BTreeMap<String, StoredRecord>,
}

/// File-based record store with crash recovery
///
/// Every mutation is written through to disk before the call returns.
///
/// # Example
///
/// ```rust,no_run
/// use nsone_core::store::FileRecordStore;
/// use nsone_core::traits::RecordStore;
/// use nsone_core::{Record, RecordType};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileRecordStore::new("/var/lib/nsone/records.json").await?;
///
///     let record = Record::new("example.com", "www.example.com", RecordType::A);
///     store.create(&record).await?;
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileRecordStore {
    path: PathBuf,
    records: Arc<RwLock<BTreeMap<String, StoredRecord>>>,
}

impl FileRecordStore {
    /// Create or load a file record store
    ///
    /// This will:
    /// 1. Create parent directories if needed
    /// 2. Load the existing store file, if any
    /// 3. Fall back to the backup if the file is corrupted
    /// 4. Start empty if both fail to parse
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::config(format!(
                    "Failed to create store directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let records = Self::load_with_recovery(&path).await?;

        Ok(Self {
            path,
            records: Arc::new(RwLock::new(records)),
        })
    }

    /// Load the store file, recovering from the backup on parse errors
    async fn load_with_recovery(path: &Path) -> Result<BTreeMap<String, StoredRecord>, Error> {
        match Self::load(path).await {
            Ok(records) => {
                tracing::debug!("Loaded record store from file: {} records", records.len());
                Ok(records)
            }
            Err(Error::Json(e)) => {
                tracing::warn!(
                    "Record store file appears corrupted: {}. Attempting recovery from backup.",
                    e
                );

                let backup_path = Self::backup_path(path);
                if !backup_path.exists() {
                    tracing::warn!("No backup file found. Starting with empty store.");
                    return Ok(BTreeMap::new());
                }

                match Self::load(&backup_path).await {
                    Ok(records) => {
                        tracing::info!("Recovered record store from backup: {} records", records.len());
                        if let Err(restore_err) = fs::copy(&backup_path, path).await {
                            tracing::error!(
                                "Failed to restore store file from backup: {}",
                                restore_err
                            );
                        }
                        Ok(records)
                    }
                    Err(backup_err) => {
                        tracing::error!(
                            "Backup also corrupted: {}. Starting with empty store.",
                            backup_err
                        );
                        Ok(BTreeMap::new())
                    }
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn load(path: &Path) -> Result<BTreeMap<String, StoredRecord>, Error> {
        if !path.exists() {
            tracing::debug!("Record store file does not exist: {}", path.display());
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(path).await?;
        let file: StoreFileFormat = serde_json::from_str(&content)?;

        if file.version != STORE_FILE_VERSION {
            tracing::warn!(
                "Record store version mismatch: expected {}, got {}. Attempting to load anyway.",
                STORE_FILE_VERSION,
                file.version
            );
        }

        Ok(file.records)
    }

    /// Write the given snapshot atomically
    async fn write(&self, records: &BTreeMap<String, StoredRecord>) -> Result<(), Error> {
        let file = StoreFileFormat {
            version: STORE_FILE_VERSION.to_string(),
            records: records.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        let temp_path = self.temp_path();
        {
            let mut handle = fs::File::create(&temp_path).await.map_err(|e| {
                Error::store(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            handle.write_all(json.as_bytes()).await?;
            handle.flush().await?;
        }

        if self.path.exists() {
            let backup_path = Self::backup_path(&self.path);
            if let Err(e) = fs::copy(&self.path, &backup_path).await {
                tracing::warn!("Failed to create backup: {}", e);
            }
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("Record store written to file: {}", self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }

    /// Keys of all stored records
    pub async fn list(&self) -> Vec<String> {
        self.records.read().await.keys().cloned().collect()
    }

    /// Full stored entry, including the write timestamp
    pub async fn stored(&self, key: &RecordKey) -> Option<StoredRecord> {
        self.records.read().await.get(&key.to_string()).cloned()
    }
}

#[async_trait]
impl RecordStore for FileRecordStore {
    async fn create(&self, record: &Record) -> Result<Record, Error> {
        let key = record.key().to_string();
        let mut guard = self.records.write().await;
        if guard.contains_key(&key) {
            return Err(Error::conflict(key));
        }

        let stored = with_create_defaults(record);
        let mut next = guard.clone();
        next.insert(key, StoredRecord::new(stored.clone()));
        self.write(&next).await?;
        *guard = next;
        Ok(stored)
    }

    async fn read(&self, key: &RecordKey) -> Result<Record, Error> {
        let guard = self.records.read().await;
        guard
            .get(&key.to_string())
            .map(|entry| entry.record.clone())
            .ok_or_else(|| Error::not_found(key.to_string()))
    }

    async fn update(&self, record: &Record) -> Result<Record, Error> {
        let key = record.key().to_string();
        let mut guard = self.records.write().await;
        let existing = guard
            .get(&key)
            .ok_or_else(|| Error::not_found(key.clone()))?;

        let stored = with_update_defaults(record, &existing.record);
        let mut next = guard.clone();
        next.insert(key, StoredRecord::new(stored.clone()));
        self.write(&next).await?;
        *guard = next;
        Ok(stored)
    }

    async fn delete(&self, key: &RecordKey) -> Result<(), Error> {
        let key = key.to_string();
        let mut guard = self.records.write().await;
        if !guard.contains_key(&key) {
            return Err(Error::not_found(key));
        }

        let mut next = guard.clone();
        next.remove(&key);
        self.write(&next).await?;
        *guard = next;
        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "file"
    }
}
