//! Storage backends for the error ledger.

use super::failure::FailureSet;
use crate::errors::LedgerError;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A persisted failure set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// The recorded failures.
    pub failures: FailureSet,
    /// When the failures were recorded.
    pub recorded_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Stamps a failure set with the current time.
    #[must_use]
    pub fn new(failures: FailureSet) -> Self {
        Self {
            failures,
            recorded_at: Utc::now(),
        }
    }
}

/// Protocol for error ledger storage.
///
/// Implementations only need the atomicity of a single key write or delete.
pub trait LedgerStore: Send + Sync {
    /// Stores an entry, overwriting any previous one.
    fn put(&self, key: &str, entry: LedgerEntry) -> Result<(), LedgerError>;

    /// Reads and deletes an entry.
    fn take(&self, key: &str) -> Result<Option<LedgerEntry>, LedgerError>;

    /// Deletes an entry, if present.
    fn remove(&self, key: &str) -> Result<(), LedgerError>;
}

/// In-memory ledger storage.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    entries: DashMap<String, LedgerEntry>,
}

impl InMemoryLedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Peeks at an entry without consuming it.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<LedgerEntry> {
        self.entries.get(key).map(|entry| entry.clone())
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn put(&self, key: &str, entry: LedgerEntry) -> Result<(), LedgerError> {
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    fn take(&self, key: &str) -> Result<Option<LedgerEntry>, LedgerError> {
        Ok(self.entries.remove(key).map(|(_, entry)| entry))
    }

    fn remove(&self, key: &str) -> Result<(), LedgerError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Ledger storage keeping one JSON document per key in a directory.
#[derive(Debug, Clone)]
pub struct JsonFileLedgerStore {
    dir: PathBuf,
}

impl JsonFileLedgerStore {
    /// Opens (and creates if needed) a ledger directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|e| LedgerError::io(dir.display().to_string(), e))?;
        Ok(Self { dir })
    }

    /// Returns the ledger directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

impl LedgerStore for JsonFileLedgerStore {
    fn put(&self, key: &str, entry: LedgerEntry) -> Result<(), LedgerError> {
        let bytes =
            serde_json::to_vec_pretty(&entry).map_err(|e| LedgerError::serialization(key, e))?;
        std::fs::write(self.path_for(key), bytes).map_err(|e| LedgerError::io(key, e))
    }

    fn take(&self, key: &str) -> Result<Option<LedgerEntry>, LedgerError> {
        let path = self.path_for(key);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(LedgerError::io(key, e)),
        };
        self.remove(key)?;

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| LedgerError::serialization(key, e))
    }

    fn remove(&self, key: &str) -> Result<(), LedgerError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LedgerError::io(key, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::ValidationFailure;

    fn entry() -> LedgerEntry {
        let mut failures = FailureSet::new();
        failures.insert("post_title", ValidationFailure::new("post_title", "Title is required"));
        LedgerEntry::new(failures)
    }

    #[test]
    fn test_in_memory_take_consumes() {
        let store = InMemoryLedgerStore::new();
        store.put("k", entry()).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.peek("k").is_some());

        assert!(store.take("k").unwrap().is_some());
        assert!(store.take("k").unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_in_memory_put_overwrites() {
        let store = InMemoryLedgerStore::new();
        store.put("k", entry()).unwrap();
        store.put("k", LedgerEntry::new(FailureSet::new())).unwrap();

        assert!(store.take("k").unwrap().unwrap().failures.is_empty());
    }

    #[test]
    fn test_file_store_take_consumes() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileLedgerStore::open(dir.path().join("ledger")).unwrap();
        let written = entry();

        store.put("save_post_error_4_2", written.clone()).unwrap();
        assert!(store.dir().join("save_post_error_4_2.json").exists());

        let read = store.take("save_post_error_4_2").unwrap();
        assert_eq!(read, Some(written));
        assert!(store.take("save_post_error_4_2").unwrap().is_none());
    }

    #[test]
    fn test_file_store_remove_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileLedgerStore::open(dir.path()).unwrap();
        assert!(store.remove("absent").is_ok());
    }

    #[test]
    fn test_file_store_corrupt_entry_is_an_error_and_is_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileLedgerStore::open(dir.path()).unwrap();
        std::fs::write(dir.path().join("bad.json"), b"not json").unwrap();

        let err = store.take("bad").unwrap_err();
        assert!(matches!(err, LedgerError::Serialization { .. }));
        assert!(store.take("bad").unwrap().is_none());
    }

    #[test]
    fn test_file_names_are_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileLedgerStore::open(dir.path()).unwrap();
        store.put("../escape", entry()).unwrap();
        assert!(dir.path().join("___escape.json").exists());
    }
}
