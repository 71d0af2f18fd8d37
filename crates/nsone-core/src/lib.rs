// # nsone-core
//
// Reconciliation codec for NS1 DNS records.
//
// ## Architecture Overview
//
// A user authors a record as flattened, order-independent configuration
// (answers and regions are sets, metadata is plain strings). The record API
// speaks a structured, nested form (token lists, typed metadata, region
// maps). This library translates between the two:
//
// - **StableHash**: Deterministic identity of set members
// - **Codecs**: Meta values, answers, regions and filters in both directions
// - **RecordStore**: Trait for the remote record API (create/read/update/delete)
// - **Reconciler**: Builds records for writes, snapshots records on reads
//
// ## Design Principles
//
// 1. **Pure codecs**: Translation never touches the store or logs
// 2. **One call per verb**: The reconciler makes a single store call and
//    returns store errors unchanged
// 3. **Order independence**: Sets are keyed by stable hash, so reordering
//    configuration is not a change

pub mod codec;
pub mod config;
pub mod error;
pub mod hash;
pub mod reconciler;
pub mod record;
pub mod store;
pub mod traits;

// Re-export core types for convenience
pub use config::{AnswerConfig, FilterConfig, MetaConfig, RecordConfig, RegionConfig, StoreConfig};
pub use error::{Error, Result};
pub use hash::{Identity, IdentitySet, StableHasher};
pub use reconciler::{
    ChannelSink, EventSink, NullSink, Operation, ReconcileEvent, Reconciler, TracingSink,
    build_for_write, requires_replacement, snapshot_for_read,
};
pub use record::{
    Answer, Filter, FilterValue, GeoRegion, MetaValue, Record, RecordType, Region, RegionMeta,
};
pub use store::{FileRecordStore, MemoryRecordStore};
pub use traits::{RecordKey, RecordStore};
