//! Test doubles and common fixtures for reconciliation contract tests
//!
//! The mock store wraps the in-memory store so contracts can count store
//! calls and inject collaborator failures.

#![allow(dead_code)]

use nsone_core::error::{Error, Result};
use nsone_core::store::MemoryRecordStore;
use nsone_core::traits::{RecordKey, RecordStore};
use nsone_core::{AnswerConfig, FilterConfig, MetaConfig, Record, RecordConfig, RegionConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A RecordStore that tracks calls and can be told to fail
#[derive(Clone, Default)]
pub struct MockRecordStore {
    /// Backing store
    inner: MemoryRecordStore,
    /// Call counters
    create_calls: Arc<AtomicUsize>,
    read_calls: Arc<AtomicUsize>,
    update_calls: Arc<AtomicUsize>,
    delete_calls: Arc<AtomicUsize>,
    /// Order of calls, e.g. ["delete", "create"]
    calls: Arc<Mutex<Vec<&'static str>>>,
    /// Message of the error every call returns, if set
    failure: Arc<Mutex<Option<String>>>,
}

impl MockRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call fail with a store error
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    /// Shared handle to the backing store, for seeding and inspection
    pub fn backing(&self) -> &MemoryRecordStore {
        &self.inner
    }

    pub fn create_call_count(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn read_call_count(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    pub fn update_call_count(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn delete_call_count(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn total_call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record_call(&self, counter: &AtomicUsize, name: &'static str) -> Result<()> {
        counter.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(name);
        match self.failure.lock().unwrap().clone() {
            Some(message) => Err(Error::store(message)),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl RecordStore for MockRecordStore {
    async fn create(&self, record: &Record) -> Result<Record> {
        self.record_call(&self.create_calls, "create")?;
        self.inner.create(record).await
    }

    async fn read(&self, key: &RecordKey) -> Result<Record> {
        self.record_call(&self.read_calls, "read")?;
        self.inner.read(key).await
    }

    async fn update(&self, record: &Record) -> Result<Record> {
        self.record_call(&self.update_calls, "update")?;
        self.inner.update(record).await
    }

    async fn delete(&self, key: &RecordKey) -> Result<()> {
        self.record_call(&self.delete_calls, "delete")?;
        self.inner.delete(key).await
    }

    fn store_name(&self) -> &'static str {
        "mock"
    }
}

/// Geo-targeted A record with two regions, metadata and a filter chain
pub fn geo_record() -> RecordConfig {
    RecordConfig::new("example.com", "www.example.com", "A")
        .with_ttl(300)
        .with_answer(
            AnswerConfig::new("1.2.3.4")
                .with_region("east")
                .with_meta(MetaConfig::feed("up", "feed-east"))
                .with_meta(MetaConfig::value("priority", "1")),
        )
        .with_answer(
            AnswerConfig::new("5.6.7.8")
                .with_region("west")
                .with_meta(MetaConfig::value("country", "CA,US")),
        )
        .with_region(
            RegionConfig::new("east")
                .with_georegion("US-EAST")
                .with_country("US")
                .with_coordinates(40.7, -74.0)
                .with_up(true),
        )
        .with_region(RegionConfig::new("west").with_georegion("US-WEST"))
        .with_filter(FilterConfig::new("up"))
        .with_filter(FilterConfig::new("geotarget_country"))
        .with_filter(FilterConfig::new("select_first_n").with_config("N", "1"))
}

/// Same record with answers and regions supplied in the opposite order
pub fn geo_record_reordered() -> RecordConfig {
    let original = geo_record();
    let mut reordered = RecordConfig::new("example.com", "www.example.com", "A").with_ttl(300);
    let answers: Vec<_> = original.answers.into_iter().collect();
    for answer in answers.into_iter().rev() {
        reordered = reordered.with_answer(answer);
    }
    let regions: Vec<_> = original.regions.into_iter().collect();
    for region in regions.into_iter().rev() {
        reordered = reordered.with_region(region);
    }
    reordered.filters = original.filters;
    reordered
}

/// TXT record whose single answer contains spaces
pub fn txt_record(text: &str) -> RecordConfig {
    RecordConfig::new("example.com", "example.com", "TXT").with_answer(AnswerConfig::new(text))
}

/// CNAME-style record that links to another record
pub fn linked_record(target: &str) -> RecordConfig {
    RecordConfig::new("example.com", "alias.example.com", "CNAME").with_link(target)
}
