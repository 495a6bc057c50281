//! Key/value persistence in the shape of browser `localStorage`.
//!
//! Backends store string values under string keys and may enforce a byte
//! budget. Callers normally go through the guarded primitives on
//! [`crate::ValidationEngine`] rather than using a backend directly.

mod error;
mod file;
mod memory;

pub use error::{StorageError, StorageErrorKind};
pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::collections::BTreeMap;

/// A string-keyed, string-valued store.
pub trait LocalStorage {
    /// Returns the value stored under `key`, if any.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;

    /// All keys currently stored, in ascending order.
    fn keys(&self) -> Vec<String>;

    /// Removes every key.
    fn clear(&mut self) -> Result<(), StorageError>;

    /// Number of stored keys.
    fn len(&self) -> usize {
        self.keys().len()
    }

    /// Returns true when nothing is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bytes occupied by `entries` once `key` holds `value`.
fn footprint_with(entries: &BTreeMap<String, String>, key: &str, value: &str) -> usize {
    let others: usize = entries
        .iter()
        .filter(|(k, _)| k.as_str() != key)
        .map(|(k, v)| k.len() + v.len())
        .sum();
    others + key.len() + value.len()
}

/// Refuses the write when a budget is set and would be exceeded.
fn enforce_quota(
    entries: &BTreeMap<String, String>,
    quota: Option<usize>,
    key: &str,
    value: &str,
) -> Result<(), StorageError> {
    match quota {
        Some(limit) => {
            let needed = footprint_with(entries, key, value);
            if needed > limit {
                Err(StorageError::quota_exceeded(format!(
                    "writing '{}' needs {} bytes, budget is {}",
                    key, needed, limit
                )))
            } else {
                Ok(())
            }
        }
        None => Ok(()),
    }
}
