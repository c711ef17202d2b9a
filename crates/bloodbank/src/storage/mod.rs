//! Durable key-value surface for bloodbank.
//!
//! Every collection is stored as one JSON value under a fixed key, the way a
//! browser's local storage holds it. [`KeyValueStore`] is that surface; the
//! record layer only ever reads a whole value and writes a whole value back.
//!
//! Two backends are provided:
//! - [`MemoryStore`]: process-local map with an optional byte quota
//! - [`SqliteStore`]: a single `SQLite` table, persistent across runs

mod memory;
pub mod migrations;
pub mod schema;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::config::{Backend, Config};
use crate::error::Result;

/// A string-keyed, string-valued durable store.
///
/// Reads take `&self` and writes take `&mut self`; callers hold the single
/// writer, so implementations need no locking.
pub trait KeyValueStore: std::fmt::Debug {
    /// Fetch the raw value under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StorageUnavailable`] if the backend refuses the
    /// write (full, over quota, read-only). The previous value is left intact.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// All keys currently present, in ascending order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn keys(&self) -> Result<Vec<String>>;

    /// Check whether `key` holds a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Short human-readable description of where data lives.
    fn describe(&self) -> String;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }

    fn contains(&self, key: &str) -> Result<bool> {
        (**self).contains(key)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Open the backend selected by `config`.
///
/// # Errors
///
/// Returns an error if the `SQLite` database cannot be opened.
pub fn open_backend(config: &Config) -> Result<Box<dyn KeyValueStore>> {
    match config.storage.backend {
        Backend::Sqlite => Ok(Box::new(SqliteStore::open(config.database_path())?)),
        Backend::Memory => Ok(Box::new(
            config
                .quota()
                .map_or_else(MemoryStore::new, MemoryStore::with_quota),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boxed_store_delegates() {
        let mut store: Box<dyn KeyValueStore> = Box::new(MemoryStore::new());
        store.set("theme", "dark").unwrap();

        assert!(store.contains("theme").unwrap());
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(store.keys().unwrap(), vec!["theme".to_string()]);
        assert!(!store.contains("donors").unwrap());
        assert_eq!(store.describe(), "memory");
    }

    #[test]
    fn test_open_backend_memory() {
        let mut config = Config::default();
        config.storage.backend = Backend::Memory;
        let store = open_backend(&config).unwrap();
        assert_eq!(store.describe(), "memory");
    }

    #[test]
    fn test_open_backend_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.database_path = Some(dir.path().join("bloodbank.db"));

        let store = open_backend(&config).unwrap();
        assert!(store.describe().ends_with("bloodbank.db"));
    }
}
