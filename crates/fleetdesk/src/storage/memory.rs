//! In-memory record store.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use super::RecordStore;
use crate::error::Result;

/// A [`RecordStore`] kept entirely in memory.
///
/// Nothing survives the process. Every call to [`RecordStore::write`] is
/// counted so tests can assert that a no-op really wrote nothing.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
    writes: Cell<usize>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of payload writes performed so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl RecordStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.entries.borrow_mut().remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.borrow().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_missing() {
        let store = MemoryStore::new();
        assert!(store.read("vehicles").unwrap().is_none());
    }

    #[test]
    fn test_write_replaces() {
        let store = MemoryStore::new();
        store.write("vehicles", "[1]").unwrap();
        store.write("vehicles", "[2]").unwrap();
        assert_eq!(store.read("vehicles").unwrap().as_deref(), Some("[2]"));
        assert_eq!(store.write_count(), 2);
    }

    #[test]
    fn test_write_all_uses_sequential_default() {
        let store = MemoryStore::new();
        store
            .write_all(&[("vehicles", "[]"), ("drivers", "[]")])
            .unwrap();
        assert_eq!(store.write_count(), 2);
        assert_eq!(store.keys().unwrap(), vec!["drivers", "vehicles"]);
    }

    #[test]
    fn test_remove() {
        let store = MemoryStore::new();
        store.write("tires", "[]").unwrap();
        assert!(store.remove("tires").unwrap());
        assert!(!store.remove("tires").unwrap());
        assert!(store.keys().unwrap().is_empty());
    }
}
