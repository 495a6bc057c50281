//! In-process storage backend.

use super::{LocalStorage, StorageError, enforce_quota};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Storage held entirely in memory, with an optional byte budget.
///
/// The budget counts key and value bytes, which is enough to reproduce
/// quota pressure in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
    quota_bytes: Option<usize>,
}

impl MemoryStorage {
    /// Creates an unbounded store.
    #[instrument]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that refuses writes beyond `quota_bytes`.
    #[instrument]
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Bytes currently used by keys and values.
    pub fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    #[instrument(skip(self, value), fields(bytes = value.len()))]
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        enforce_quota(&self.entries, self.quota_bytes, key, value)?;
        self.entries.insert(key.to_string(), value.to_string());
        debug!(used = self.used_bytes(), "Stored item");
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.entries.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let mut store = MemoryStorage::new();
        store.set_item("a", "1").expect("set failed");
        assert_eq!(store.get_item("a").expect("get failed").as_deref(), Some("1"));
        store.remove_item("a").expect("remove failed");
        assert!(store.get_item("a").expect("get failed").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_quota_refuses_oversized_write() {
        let mut store = MemoryStorage::with_quota(10);
        store.set_item("k", "12345").expect("fits");
        let err = store.set_item("j", "1234567").unwrap_err();
        assert!(err.is_quota_exceeded());
        assert!(store.get_item("j").expect("get failed").is_none());
    }

    #[test]
    fn test_quota_counts_replacement_not_sum() {
        let mut store = MemoryStorage::with_quota(10);
        store.set_item("k", "123456789").expect("fits");
        // Replacing the same key reuses its bytes.
        store.set_item("k", "987654321").expect("replacement fits");
        assert_eq!(store.used_bytes(), 10);
    }
}
