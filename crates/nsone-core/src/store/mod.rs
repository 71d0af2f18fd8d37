// # Record Store Implementations
//
// Reference implementations of the RecordStore trait. Both behave like the
// remote API for the parts the reconciler depends on: ids are assigned on
// create, an unset TTL takes the account default, and missing or duplicate
// keys are reported as errors.

pub mod file;
pub mod memory;

pub use file::FileRecordStore;
pub use memory::MemoryRecordStore;

use crate::config::StoreConfig;
use crate::error::Result;
use crate::hash::stable_hash;
use crate::record::Record;
use crate::traits::RecordStore;

/// TTL the stores assign when a record doesn't carry one
pub const DEFAULT_TTL: u32 = 3600;

/// Create a record store from configuration
pub async fn open(config: &StoreConfig) -> Result<Box<dyn RecordStore>> {
    config.validate()?;
    match config {
        StoreConfig::Memory => Ok(Box::new(MemoryRecordStore::new())),
        StoreConfig::File { path } => Ok(Box::new(FileRecordStore::new(path).await?)),
    }
}

/// Fill the fields the remote system computes on create
pub(crate) fn with_create_defaults(record: &Record) -> Record {
    let mut stored = record.clone();
    if stored.id.is_none() {
        let key = record.key();
        stored.id = Some(format!(
            "{:016x}",
            stable_hash([key.zone.as_str(), key.domain.as_str(), key.record_type.as_str()])
        ));
    }
    stored.ttl.get_or_insert(DEFAULT_TTL);
    stored
}

/// Carry computed fields of the existing record into an update
pub(crate) fn with_update_defaults(record: &Record, existing: &Record) -> Record {
    let mut stored = record.clone();
    stored.id = existing.id.clone();
    if stored.ttl.is_none() {
        stored.ttl = existing.ttl.or(Some(DEFAULT_TTL));
    }
    stored
}
