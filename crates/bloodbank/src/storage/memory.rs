//! In-memory key-value backend.

use std::collections::BTreeMap;

use tracing::trace;

use super::KeyValueStore;
use crate::error::{Error, Result};

/// A process-local store with an optional size quota.
///
/// Usage is counted as the byte length of every key plus its value. A write
/// that would take usage past the quota fails with `StorageUnavailable`,
/// mirroring a browser's local storage quota.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    /// Create an empty, unbounded store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that refuses writes past `quota_bytes`.
    #[must_use]
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Bytes currently used by keys and values.
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some(quota) = self.quota_bytes {
            let replaced = self.entries.get(key).map_or(0, |old| key.len() + old.len());
            let needed = self.used_bytes() - replaced + key.len() + value.len();
            if needed > quota {
                return Err(Error::storage_unavailable(format!(
                    "writing '{key}' needs {needed} bytes, quota is {quota}"
                )));
            }
        }
        trace!(key, bytes = value.len(), "memory store write");
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_absent() {
        let store = MemoryStore::new();
        assert!(store.get("donors").unwrap().is_none());
    }

    #[test]
    fn test_set_and_get() {
        let mut store = MemoryStore::new();
        store.set("donors", "[]").unwrap();
        assert_eq!(store.get("donors").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_set_replaces() {
        let mut store = MemoryStore::new();
        store.set("theme", "light").unwrap();
        store.set("theme", "dark").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(store.keys().unwrap().len(), 1);
    }

    #[test]
    fn test_used_bytes() {
        let mut store = MemoryStore::new();
        store.set("ab", "cde").unwrap();
        assert_eq!(store.used_bytes(), 5);
    }

    #[test]
    fn test_quota_rejects_oversized_write() {
        let mut store = MemoryStore::with_quota(16);
        store.set("donors", "[]").unwrap();

        let err = store.set("donors", "[1,2,3,4,5,6,7,8,9]").unwrap_err();
        assert!(err.is_storage_unavailable());
        // The previous value survives the failed write.
        assert_eq!(store.get("donors").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_quota_counts_replaced_value_once() {
        let mut store = MemoryStore::with_quota(10);
        store.set("k", "123456789").unwrap();
        // Replacing with an equal-sized value must still fit.
        store.set("k", "987654321").unwrap();
        assert_eq!(store.used_bytes(), 10);
    }

    #[test]
    fn test_keys_sorted() {
        let mut store = MemoryStore::new();
        store.set("theme", "dark").unwrap();
        store.set("donors", "[]").unwrap();
        assert_eq!(store.keys().unwrap(), vec!["donors", "theme"]);
    }
}
