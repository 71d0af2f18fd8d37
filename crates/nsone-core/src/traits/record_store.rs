// # Record Store Trait
//
// Defines the remote system the reconciler translates for.
//
// ## Implementations
//
// - In-memory: `MemoryRecordStore` (tests, embedding)
// - JSON file: `FileRecordStore` (offline mirror of the remote API)
// - Future: the NS1 HTTP API
//
// ## Usage
//
// ```rust,ignore
// use nsone_core::{RecordKey, RecordStore, RecordType};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let store = /* RecordStore implementation */;
//
//     let key = RecordKey::new("example.com", "www.example.com", RecordType::A);
//     let record = store.read(&key).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::record::{Record, RecordType};

/// Identity of a record in the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    pub zone: String,
    pub domain: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
}

impl RecordKey {
    /// Create a record key
    pub fn new(zone: impl Into<String>, domain: impl Into<String>, record_type: RecordType) -> Self {
        Self {
            zone: zone.into(),
            domain: domain.into(),
            record_type,
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zone, self.domain, self.record_type)
    }
}

/// Trait for record store implementations
///
/// The store is the external collaborator of the reconciler: it owns
/// transport, authentication and concurrency control for a key. The
/// reconciler makes exactly one store call per verb and hands every error
/// back to its caller unchanged.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Contract
///
/// - No retries or backoff (a failed call is reported, not repeated)
/// - `create` and `update` return the record as the store now holds it,
///   including computed fields such as `id` and a defaulted `ttl`
/// - `read` of a missing key returns [`Error::NotFound`](crate::Error::NotFound)
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create a new record
    ///
    /// # Returns
    ///
    /// - `Ok(Record)`: The stored record
    /// - `Err(Error)`: If the record exists or the request failed
    async fn create(&self, record: &Record) -> Result<Record, crate::Error>;

    /// Read the current record for a key
    async fn read(&self, key: &RecordKey) -> Result<Record, crate::Error>;

    /// Replace an existing record
    ///
    /// # Returns
    ///
    /// - `Ok(Record)`: The stored record
    /// - `Err(Error)`: If the record doesn't exist or the request failed
    async fn update(&self, record: &Record) -> Result<Record, crate::Error>;

    /// Delete a record
    async fn delete(&self, key: &RecordKey) -> Result<(), crate::Error>;

    /// Get the store name (for logging/debugging)
    fn store_name(&self) -> &'static str;
}
