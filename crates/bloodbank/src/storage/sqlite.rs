//! `SQLite` key-value backend.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, ErrorCode, OptionalExtension};
use tracing::{debug, info};

use super::{migrations, KeyValueStore};
use crate::error::{Error, Result};

/// Persistent key-value store backed by a single `SQLite` table.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a database at the given path.
    ///
    /// Creates parent directories and initializes the schema as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory database, mainly for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Map write failures that mean "the surface cannot take this write" to
/// `StorageUnavailable`; everything else stays a query error.
fn write_error(key: &str, err: rusqlite::Error) -> Error {
    match err.sqlite_error_code() {
        Some(
            code @ (ErrorCode::DiskFull
            | ErrorCode::ReadOnly
            | ErrorCode::CannotOpen
            | ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked),
        ) => Error::storage_unavailable(format!("cannot write '{key}': {code:?}")),
        _ => Error::DatabaseQuery(err),
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM entries WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                r"
                INSERT INTO entries (key, value, updated_at)
                VALUES (?1, ?2, datetime('now'))
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                ",
                (key, value),
            )
            .map_err(|e| write_error(key, e))?;
        debug!(key, bytes = value.len(), "stored entry");
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM entries ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> SqliteStore {
        SqliteStore::open_in_memory().expect("failed to create test store")
    }

    #[test]
    fn test_open_in_memory() {
        let store = create_test_store();
        assert_eq!(store.path(), Path::new(":memory:"));
    }

    #[test]
    fn test_get_absent() {
        let store = create_test_store();
        assert!(store.get("donors").unwrap().is_none());
    }

    #[test]
    fn test_set_and_get() {
        let mut store = create_test_store();
        store.set("donors", r#"[{"id":"1"}]"#).unwrap();
        assert_eq!(
            store.get("donors").unwrap().as_deref(),
            Some(r#"[{"id":"1"}]"#)
        );
    }

    #[test]
    fn test_set_overwrites() {
        let mut store = create_test_store();
        store.set("theme", "light").unwrap();
        store.set("theme", "dark").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(store.keys().unwrap(), vec!["theme".to_string()]);
    }

    #[test]
    fn test_keys_sorted() {
        let mut store = create_test_store();
        store.set("donors", "[]").unwrap();
        store.set("acceptors", "[]").unwrap();
        assert_eq!(
            store.keys().unwrap(),
            vec!["acceptors".to_string(), "donors".to_string()]
        );
    }

    #[test]
    fn test_contains() {
        let mut store = create_test_store();
        assert!(!store.contains("theme").unwrap());
        store.set("theme", "dark").unwrap();
        assert!(store.contains("theme").unwrap());
    }

    #[test]
    fn test_read_only_write_is_storage_unavailable() {
        let mut store = create_test_store();
        store.set("theme", "light").unwrap();
        store.conn.execute_batch("PRAGMA query_only = ON;").unwrap();

        let err = store.set("theme", "dark").unwrap_err();
        assert!(err.is_storage_unavailable(), "unexpected error: {err}");
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("bloodbank.db");

        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.set("bloodInventory", r#"{"A+":45}"#).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(
            store.get("bloodInventory").unwrap().as_deref(),
            Some(r#"{"A+":45}"#)
        );
        assert!(path.exists());
        assert!(store.describe().starts_with("sqlite:"));
    }
}
