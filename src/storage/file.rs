//! JSON-file storage backend.

use super::{LocalStorage, StorageError, enforce_quota};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Storage persisted as a single JSON object on disk.
///
/// The whole map is rewritten on every mutation, which keeps the file a
/// faithful snapshot after each call.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
    quota_bytes: Option<usize>,
}

impl FileStorage {
    /// Opens (or prepares to create) the store at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the file exists but cannot be read or
    /// is not a JSON object of strings.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>, quota_bytes: Option<usize>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            debug!("Storage file absent, starting empty");
            BTreeMap::new()
        };
        info!(keys = entries.len(), "File storage opened");
        Ok(Self {
            path,
            entries,
            quota_bytes,
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[instrument(skip(self))]
    fn flush(&self) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    #[instrument(skip(self, value), fields(bytes = value.len()))]
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        enforce_quota(&self.entries, self.quota_bytes, key, value)?;
        let previous = self.entries.insert(key.to_string(), value.to_string());
        if let Err(err) = self.flush() {
            // Keep memory and disk in agreement.
            match previous {
                Some(old) => self.entries.insert(key.to_string(), old),
                None => self.entries.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.entries.clear();
        self.flush()
    }
}
