//! Error types for the reconciliation core
//!
//! Codec failures (`Validation`, `TypeCoercion`) are raised before anything
//! is sent to the record store. Every other variant originates in a
//! [`RecordStore`](crate::traits::RecordStore) implementation and is handed
//! back to the caller exactly as the store produced it.

use thiserror::Error;

/// Result type alias for reconciliation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the reconciliation core
#[derive(Error, Debug)]
pub enum Error {
    /// A cross-field invariant or enumerated value was violated
    #[error("Validation error: {0}")]
    Validation(String),

    /// A metadata value could not be interpreted under the decoding rules
    #[error("Cannot interpret meta field '{field}': {message}")]
    TypeCoercion {
        /// Metadata field name
        field: String,
        /// What was wrong with the value
        message: String,
    },

    /// Record store failure
    #[error("Record store error: {0}")]
    Store(String),

    /// Record not found in the store
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Record already exists in the store
    #[error("Record already exists: {0}")]
    Conflict(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a metadata coercion error
    pub fn type_coercion(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TypeCoercion {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a record store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True for errors raised by the codecs before any store call
    pub fn is_codec_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::TypeCoercion { .. })
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
