//! Record reconciler
//!
//! The Reconciler is responsible for:
//! - Building a structured record from configuration (create/update)
//! - Producing the observed configuration from a structured record (read)
//! - Enforcing the cross-field invariants the codecs don't see
//! - Making exactly one store call per verb
//!
//! ## Flow
//!
//! ```text
//!  write:  RecordConfig ──build_for_write──▶ Record ──▶ RecordStore
//!                                                          │
//!  read:   RecordConfig ◀──snapshot_for_read── Record ◀────┘
//! ```
//!
//! A failed build never reaches the store, and a failed store call is
//! returned exactly as the store reported it, so a failed verb leaves no
//! observed configuration behind.

pub mod events;

pub use events::{ChannelSink, EventSink, NullSink, Operation, ReconcileEvent, TracingSink};

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::codec::{answer, filter, meta, region};
use crate::config::RecordConfig;
use crate::error::{Error, Result};
use crate::hash::IdentitySet;
use crate::record::{Record, RecordType};
use crate::traits::{RecordKey, RecordStore};

/// Assemble the structured record described by a configuration
///
/// # Errors
///
/// - [`Error::Validation`]: unsupported record type or georegion, empty
///   zone/domain, `link` together with answers, an answer region that names
///   no configured region, or a region name defined twice
/// - [`Error::TypeCoercion`]: a meta entry without feed or value
pub fn build_for_write(config: &RecordConfig) -> Result<Record> {
    let record_type: RecordType = config.record_type.parse()?;

    if config.zone.is_empty() {
        return Err(Error::validation("zone cannot be empty"));
    }
    if config.domain.is_empty() {
        return Err(Error::validation("domain cannot be empty"));
    }

    let link = config.link.clone().filter(|l| !l.is_empty());
    if link.is_some() && !config.answers.is_empty() {
        return Err(Error::validation(format!(
            "record {} cannot have both link and answers",
            config.domain
        )));
    }

    let mut regions = BTreeMap::new();
    for entry in &config.regions {
        let (name, built) = region::to_structured(entry)?;
        if regions.insert(name.clone(), built).is_some() {
            return Err(Error::validation(format!(
                "region '{}' is defined more than once",
                name
            )));
        }
    }

    let mut answers = Vec::with_capacity(config.answers.len());
    for entry in &config.answers {
        let built = answer::to_structured(entry, record_type)?;
        if let Some(label) = &built.region
            && !regions.contains_key(label)
        {
            return Err(Error::validation(format!(
                "answer '{}' references undefined region '{}'",
                entry.answer, label
            )));
        }
        answers.push(built);
    }

    Ok(Record {
        id: config.id.clone(),
        zone: config.zone.clone(),
        domain: config.domain.clone(),
        record_type,
        ttl: config.ttl,
        link,
        use_client_subnet: config.use_client_subnet,
        answers,
        regions,
        filters: filter::to_structured(&config.filters),
    })
}

/// Produce the observed configuration of a structured record
///
/// Answers and regions land in identity sets, so the result does not depend
/// on the order the store returned them in.
pub fn snapshot_for_read(record: &Record) -> RecordConfig {
    RecordConfig {
        id: record.id.clone(),
        zone: record.zone.clone(),
        domain: record.domain.clone(),
        record_type: record.record_type.to_string(),
        ttl: record.ttl,
        link: record.link.clone().filter(|l| !l.is_empty()),
        use_client_subnet: record.use_client_subnet,
        answers: record.answers.iter().map(answer::to_config).collect::<IdentitySet<_>>(),
        regions: record
            .regions
            .iter()
            .map(|(name, r)| region::to_config(name, r))
            .collect::<IdentitySet<_>>(),
        filters: filter::to_config(&record.filters),
    }
}

/// Names of changed fields that can't be updated in place
///
/// `zone`, `domain`, `type` and `link` are fixed for the lifetime of a
/// record; changing any of them means delete and recreate.
pub fn requires_replacement(observed: &RecordConfig, desired: &RecordConfig) -> Vec<String> {
    let link = |c: &RecordConfig| c.link.clone().filter(|l| !l.is_empty());

    let mut changed = Vec::new();
    if observed.zone != desired.zone {
        changed.push("zone".to_string());
    }
    if observed.domain != desired.domain {
        changed.push("domain".to_string());
    }
    if observed.record_type != desired.record_type {
        changed.push("type".to_string());
    }
    if link(observed) != link(desired) {
        changed.push("link".to_string());
    }
    changed
}

/// Translates configuration to store calls and store results back to
/// observed configuration
///
/// Holds no state between calls; concurrent calls on distinct records are
/// safe. Ordering of concurrent calls on the same record is left to the
/// store.
pub struct Reconciler {
    /// Record store the verbs delegate to
    store: Box<dyn RecordStore>,

    /// Observability sink
    sink: Arc<dyn EventSink>,
}

impl Reconciler {
    /// Create a reconciler that logs events through `tracing`
    pub fn new(store: Box<dyn RecordStore>) -> Self {
        Self {
            store,
            sink: Arc::new(TracingSink),
        }
    }

    /// Replace the event sink
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Build the record that `create`/`update` would send, without sending it
    pub fn plan(&self, config: &RecordConfig) -> Result<Record> {
        let record = build_for_write(config)?;
        let key = record.key().to_string();

        for entry in config.answers.iter().flat_map(|a| a.meta.iter()) {
            if meta::feed_shadows_value(entry) {
                self.sink.emit(ReconcileEvent::FeedShadowsValue {
                    key: key.clone(),
                    field: entry.field.clone(),
                });
            }
        }

        self.sink.emit(ReconcileEvent::RecordBuilt {
            key,
            answers: record.answers.len(),
            regions: record.regions.len(),
            filters: record.filters.len(),
        });
        Ok(record)
    }

    /// Create the record and return its observed configuration
    pub async fn create(&self, config: &RecordConfig) -> Result<RecordConfig> {
        let record = self.plan(config)?;
        let key = record.key().to_string();
        let stored = self
            .observe(&key, Operation::Create, self.store.create(&record))
            .await?;
        Ok(self.snapshot(&stored))
    }

    /// Read the record and return its observed configuration
    pub async fn read(&self, key: &RecordKey) -> Result<RecordConfig> {
        let stored = self
            .observe(&key.to_string(), Operation::Read, self.store.read(key))
            .await?;
        Ok(self.snapshot(&stored))
    }

    /// Update the record in place and return its observed configuration
    pub async fn update(&self, config: &RecordConfig) -> Result<RecordConfig> {
        let record = self.plan(config)?;
        let key = record.key().to_string();
        let stored = self
            .observe(&key, Operation::Update, self.store.update(&record))
            .await?;
        Ok(self.snapshot(&stored))
    }

    /// Delete the record
    pub async fn delete(&self, key: &RecordKey) -> Result<()> {
        self.observe(&key.to_string(), Operation::Delete, self.store.delete(key))
            .await
    }

    /// Read the record if it exists
    ///
    /// A missing record is `Ok(None)` and is reported as
    /// [`ReconcileEvent::RecordAbsent`] rather than a failed call. Any other
    /// store error is returned unchanged.
    pub async fn find(&self, key: &RecordKey) -> Result<Option<RecordConfig>> {
        let label = key.to_string();
        self.sink.emit(ReconcileEvent::StoreCallStarted {
            key: label.clone(),
            operation: Operation::Read,
        });

        match self.store.read(key).await {
            Ok(stored) => {
                self.sink.emit(ReconcileEvent::StoreCallSucceeded {
                    key: label,
                    operation: Operation::Read,
                });
                Ok(Some(self.snapshot(&stored)))
            }
            Err(Error::NotFound(_)) => {
                self.sink.emit(ReconcileEvent::RecordAbsent { key: label });
                Ok(None)
            }
            Err(e) => {
                self.sink.emit(ReconcileEvent::StoreCallFailed {
                    key: label,
                    operation: Operation::Read,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Converge the store on `desired`
    ///
    /// - no observed configuration: create
    /// - force-new fields changed: replace the observed record
    /// - otherwise: update in place
    ///
    /// A replacement that moves the record to a new key creates the new
    /// record first and deletes the observed one only after that succeeded,
    /// so a failed create leaves the observed record in place. A replacement
    /// under the same key (a `link` change) has to delete first.
    ///
    /// The desired configuration is validated before any store call.
    pub async fn apply(
        &self,
        desired: &RecordConfig,
        observed: Option<&RecordConfig>,
    ) -> Result<RecordConfig> {
        let Some(observed) = observed else {
            return self.create(desired).await;
        };

        let fields = requires_replacement(observed, desired);
        if fields.is_empty() {
            return self.update(desired).await;
        }

        build_for_write(desired)?;
        let old_key = observed.key()?;
        let new_key = desired.key()?;
        self.sink.emit(ReconcileEvent::ReplacementRequired {
            key: old_key.to_string(),
            fields,
        });

        let mut fresh = desired.clone();
        fresh.id = None;

        if old_key == new_key {
            self.delete(&old_key).await?;
            return self.create(&fresh).await;
        }

        let created = self.create(&fresh).await?;
        match self.delete(&old_key).await {
            // Already gone is the state we wanted
            Ok(()) | Err(Error::NotFound(_)) => Ok(created),
            Err(e) => Err(e),
        }
    }

    fn snapshot(&self, record: &Record) -> RecordConfig {
        let observed = snapshot_for_read(record);
        self.sink.emit(ReconcileEvent::SnapshotTaken {
            key: record.key().to_string(),
            answers: observed.answers.len(),
            regions: observed.regions.len(),
        });
        observed
    }

    /// Await one store call, reporting it to the sink
    async fn observe<T, F>(&self, key: &str, operation: Operation, call: F) -> Result<T>
    where
        F: std::future::Future<Output = Result<T>>,
    {
        self.sink.emit(ReconcileEvent::StoreCallStarted {
            key: key.to_string(),
            operation,
        });

        match call.await {
            Ok(value) => {
                self.sink.emit(ReconcileEvent::StoreCallSucceeded {
                    key: key.to_string(),
                    operation,
                });
                Ok(value)
            }
            Err(e) => {
                self.sink.emit(ReconcileEvent::StoreCallFailed {
                    key: key.to_string(),
                    operation,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Name of the underlying store
    pub fn store_name(&self) -> &'static str {
        self.store.store_name()
    }
}
