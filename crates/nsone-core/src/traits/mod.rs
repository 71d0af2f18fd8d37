//! Core traits for the reconciliation core
//!
//! This module defines the boundary the reconciler delegates to.
//!
//! - [`RecordStore`]: get/create/update/delete of structured records by key

pub mod record_store;

pub use record_store::{RecordKey, RecordStore};
