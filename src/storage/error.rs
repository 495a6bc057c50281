//! Storage error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// Broad category of a storage failure.
///
/// Only [`StorageErrorKind::QuotaExceeded`] is recoverable: the guarded
/// write path evicts log keys and retries once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum StorageErrorKind {
    /// The backend refused a write because its byte budget is spent.
    #[display("QuotaExceededError")]
    QuotaExceeded,
    /// A value could not be converted to or from JSON.
    #[display("SerializationError")]
    Serialization,
    /// The backing medium failed.
    #[display("BackendError")]
    Backend,
}

/// Storage error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("{}: {} at {}:{}", kind, message, file, line)]
pub struct StorageError {
    /// What went wrong.
    pub kind: StorageErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl StorageError {
    /// Creates a new storage error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: StorageErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Shorthand for a quota failure.
    #[track_caller]
    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        Self::new(StorageErrorKind::QuotaExceeded, message)
    }

    /// Shorthand for a backend failure.
    #[track_caller]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::new(StorageErrorKind::Backend, message)
    }

    /// Returns true when the write was refused for lack of space.
    pub fn is_quota_exceeded(&self) -> bool {
        self.kind == StorageErrorKind::QuotaExceeded
    }
}

impl From<serde_json::Error> for StorageError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(StorageErrorKind::Serialization, format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for StorageError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(StorageErrorKind::Backend, format!("I/O error: {}", err))
    }
}
