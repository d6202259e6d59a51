//! The error ledger: failures carried across the redirect after a save.
//!
//! Entries are keyed by content item and acting user. The runner resets the
//! entry at the start of every attempt and writes it only when something
//! failed. The edit screen takes the entry exactly once, which deletes it.

mod failure;
mod store;

pub use failure::{FailureEntry, FailureSet, ValidationFailure};
pub use store::{InMemoryLedgerStore, JsonFileLedgerStore, LedgerEntry, LedgerStore};

use crate::errors::LedgerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Identifies a ledger entry: one content item edited by one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerKey {
    /// Content item id.
    pub item_id: u64,
    /// Acting user id.
    pub user_id: u64,
}

impl LedgerKey {
    /// Creates a new key.
    #[must_use]
    pub const fn new(item_id: u64, user_id: u64) -> Self {
        Self { item_id, user_id }
    }

    /// Returns the backend storage key.
    #[must_use]
    pub fn storage_key(&self) -> String {
        format!("save_post_error_{}_{}", self.item_id, self.user_id)
    }
}

impl fmt::Display for LedgerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.storage_key())
    }
}

/// Transient store of validation failures per (item, user).
#[derive(Clone)]
pub struct ErrorLedger {
    store: Arc<dyn LedgerStore>,
}

impl ErrorLedger {
    /// Creates a ledger over a storage backend.
    #[must_use]
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Creates a ledger backed by memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryLedgerStore::new()))
    }

    /// Stores failures for `key`, overwriting whatever was there.
    pub fn put(&self, key: LedgerKey, failures: FailureSet) -> Result<(), LedgerError> {
        debug!(key = %key, failures = failures.len(), "Recording failures");
        self.store.put(&key.storage_key(), LedgerEntry::new(failures))
    }

    /// Clears the entry for `key`.
    pub fn reset(&self, key: LedgerKey) -> Result<(), LedgerError> {
        self.store.remove(&key.storage_key())
    }

    /// Reads the failures for `key` and deletes the entry.
    ///
    /// A second call for the same key returns an empty set.
    pub fn take(&self, key: LedgerKey) -> Result<FailureSet, LedgerError> {
        let entry = self.store.take(&key.storage_key())?;
        Ok(entry.map(|e| e.failures).unwrap_or_default())
    }
}

impl fmt::Debug for ErrorLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorLedger").finish_non_exhaustive()
    }
}
