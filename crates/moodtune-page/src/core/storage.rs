//! Durable key-value storage seam.
//!
//! # Design
//! - The controller only needs string get/set, so the trait stays that small.
//! - Reads treat every failure as "absent"; writes surface a [`StorageError`]
//!   so callers can log it.

use std::collections::BTreeMap;

use crate::error::StorageError;

/// Origin-scoped string storage that survives page loads.
pub trait KeyValueStore {
    /// Read a value, returning `None` when it is absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;

    /// Persist a value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] when the backend rejects the write.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store used natively and in tests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    read_only: bool,
}

impl MemoryStore {
    /// Empty, writable store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with a single entry.
    #[must_use]
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(key.into(), value.into());
        Self {
            entries,
            read_only: false,
        }
    }

    /// Make every subsequent write fail, as a full or disabled browser store would.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::Write {
                key: key.to_string(),
                detail: "store is read-only".to_string(),
            });
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_returns_latest_value() -> Result<(), StorageError> {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("theme"), None);
        store.set("theme", "dark")?;
        store.set("theme", "light")?;
        assert_eq!(store.get("theme").as_deref(), Some("light"));
        Ok(())
    }

    #[test]
    fn read_only_store_rejects_writes_and_keeps_values() {
        let mut store = MemoryStore::with_entry("theme", "dark");
        store.set_read_only(true);
        let err = store.set("theme", "light");
        assert_eq!(
            err,
            Err(StorageError::Write {
                key: "theme".to_string(),
                detail: "store is read-only".to_string(),
            })
        );
        assert_eq!(store.get("theme").as_deref(), Some("dark"));
    }
}
