//! Reconciler events and the sinks that receive them
//!
//! The codecs never log. Everything observable about a reconciliation goes
//! through the [`EventSink`] injected into the
//! [`Reconciler`](super::Reconciler).

use std::fmt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Store call made by the reconciler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Events emitted by the Reconciler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileEvent {
    /// Structured record assembled from configuration
    RecordBuilt {
        key: String,
        answers: usize,
        regions: usize,
        filters: usize,
    },

    /// A meta entry set both feed and value; the value was ignored
    FeedShadowsValue { key: String, field: String },

    /// Force-new fields changed, so the record is deleted and recreated
    ReplacementRequired { key: String, fields: Vec<String> },

    /// Store call started
    StoreCallStarted { key: String, operation: Operation },

    /// Store call succeeded
    StoreCallSucceeded { key: String, operation: Operation },

    /// Lookup found no record under the key
    RecordAbsent { key: String },

    /// Store call failed; the error is returned to the caller unchanged
    StoreCallFailed {
        key: String,
        operation: Operation,
        error: String,
    },

    /// Observed configuration produced from a structured record
    SnapshotTaken {
        key: String,
        answers: usize,
        regions: usize,
    },
}

/// Receiver of reconciler events
pub trait EventSink: Send + Sync {
    /// Handle one event; must not block
    fn emit(&self, event: ReconcileEvent);
}

/// Sink that logs every event through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: ReconcileEvent) {
        match event {
            ReconcileEvent::RecordBuilt {
                key,
                answers,
                regions,
                filters,
            } => debug!(
                "Built record {} ({} answers, {} regions, {} filters)",
                key, answers, regions, filters
            ),
            ReconcileEvent::FeedShadowsValue { key, field } => warn!(
                "Record {}: meta field '{}' sets both feed and value, using feed",
                key, field
            ),
            ReconcileEvent::ReplacementRequired { key, fields } => info!(
                "Record {} must be replaced, changed fields: {}",
                key,
                fields.join(", ")
            ),
            ReconcileEvent::StoreCallStarted { key, operation } => {
                debug!("Store {} started for {}", operation, key)
            }
            ReconcileEvent::StoreCallSucceeded { key, operation } => {
                info!("Store {} succeeded for {}", operation, key)
            }
            ReconcileEvent::RecordAbsent { key } => debug!("No record stored for {}", key),
            ReconcileEvent::StoreCallFailed {
                key,
                operation,
                error,
            } => warn!("Store {} failed for {}: {}", operation, key, error),
            ReconcileEvent::SnapshotTaken {
                key,
                answers,
                regions,
            } => debug!(
                "Snapshot of {} ({} answers, {} regions)",
                key, answers, regions
            ),
        }
    }
}

/// Sink that forwards events to a bounded channel
///
/// When the channel is full the event is dropped with a warning, so a slow
/// consumer never stalls reconciliation.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<ReconcileEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiver that yields its events
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<ReconcileEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: ReconcileEvent) {
        if self.tx.try_send(event).is_err() {
            warn!("Event channel full or closed, dropping reconcile event");
        }
    }
}

/// Sink that discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: ReconcileEvent) {}
}
