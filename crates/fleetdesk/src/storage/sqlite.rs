//! `SQLite`-backed record store.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::{migrations, RecordStore, StoreStats};
use crate::error::{Error, Result};

/// Durable record store using `SQLite`.
///
/// Each collection is one row of the `collections` table. Writing a payload
/// identical to the stored one is skipped, and [`RecordStore::write_all`]
/// runs inside a single transaction.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a store database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
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

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store instance for testing.
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

    /// Get store statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StoreStats> {
        let (collections, payload_bytes, last_write): (i64, Option<i64>, Option<String>) =
            self.conn.query_row(
                r"
                SELECT COUNT(*), SUM(LENGTH(CAST(value AS BLOB))), MAX(updated_at)
                FROM collections
                ",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )?;

        let last_write = last_write
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StoreStats {
            collections,
            payload_bytes: payload_bytes.unwrap_or(0),
            last_write,
            db_size_bytes,
        })
    }

    /// Insert or replace one payload on the given connection.
    ///
    /// Returns `false` if the stored payload already had the same hash.
    fn upsert(conn: &Connection, key: &str, value: &str) -> Result<bool> {
        let hash = blake3::hash(value.as_bytes()).to_hex().to_string();

        let stored: Option<String> = conn
            .query_row(
                "SELECT value_hash FROM collections WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        if stored.as_deref() == Some(hash.as_str()) {
            debug!("Skipping unchanged write to {}", key);
            return Ok(false);
        }

        conn.execute(
            r"
            INSERT INTO collections (key, value, value_hash, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                value_hash = excluded.value_hash,
                updated_at = excluded.updated_at
            ",
            params![key, value, hash, Utc::now().to_rfc3339()],
        )?;
        debug!("Wrote {} bytes to {}", value.len(), key);
        Ok(true)
    }
}

impl RecordStore for SqliteStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM collections WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        Self::upsert(&self.conn, key, value)?;
        Ok(())
    }

    fn write_all(&self, entries: &[(&str, &str)]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        for (key, value) in entries {
            Self::upsert(&tx, key, value)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM collections WHERE key = ?1", [key])?;
        Ok(affected > 0)
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM collections ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> SqliteStore {
        SqliteStore::open_in_memory().expect("failed to create test store")
    }

    fn updated_at(store: &SqliteStore, key: &str) -> String {
        store
            .conn
            .query_row(
                "SELECT updated_at FROM collections WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .unwrap()
    }

    #[test]
    fn test_open_in_memory() {
        assert!(SqliteStore::open_in_memory().is_ok());
    }

    #[test]
    fn test_path() {
        let store = create_test_store();
        assert_eq!(store.path().to_string_lossy(), ":memory:");
    }

    #[test]
    fn test_write_and_read() {
        let store = create_test_store();
        store.write("vehicles", r#"[{"id":"v1"}]"#).unwrap();
        assert_eq!(
            store.read("vehicles").unwrap().as_deref(),
            Some(r#"[{"id":"v1"}]"#)
        );
        assert!(store.read("drivers").unwrap().is_none());
    }

    #[test]
    fn test_write_replaces_payload() {
        let store = create_test_store();
        store.write("vehicles", "[1]").unwrap();
        store.write("vehicles", "[2]").unwrap();
        assert_eq!(store.read("vehicles").unwrap().as_deref(), Some("[2]"));
        assert_eq!(store.keys().unwrap(), vec!["vehicles"]);
    }

    #[test]
    fn test_unchanged_write_is_skipped() {
        let store = create_test_store();
        assert!(SqliteStore::upsert(&store.conn, "vehicles", "[]").unwrap());
        let first = updated_at(&store, "vehicles");
        assert!(!SqliteStore::upsert(&store.conn, "vehicles", "[]").unwrap());
        assert_eq!(updated_at(&store, "vehicles"), first);
    }

    #[test]
    fn test_write_all_is_atomic() {
        let store = create_test_store();
        store
            .conn
            .execute_batch(
                r"
                CREATE TRIGGER reject_drivers BEFORE INSERT ON collections
                WHEN NEW.key = 'drivers'
                BEGIN SELECT RAISE(ABORT, 'quota exceeded'); END;
                ",
            )
            .unwrap();

        let result = store.write_all(&[("vehicles", "[1]"), ("drivers", "[2]")]);
        assert!(result.is_err());
        assert!(store.read("vehicles").unwrap().is_none());
        assert!(store.read("drivers").unwrap().is_none());
    }

    #[test]
    fn test_write_all_commits() {
        let store = create_test_store();
        store
            .write_all(&[("vehicles", "[1]"), ("drivers", "[2]")])
            .unwrap();
        assert_eq!(store.read("vehicles").unwrap().as_deref(), Some("[1]"));
        assert_eq!(store.read("drivers").unwrap().as_deref(), Some("[2]"));
    }

    #[test]
    fn test_remove() {
        let store = create_test_store();
        store.write("tires", "[]").unwrap();
        assert!(store.remove("tires").unwrap());
        assert!(!store.remove("tires").unwrap());
    }

    #[test]
    fn test_stats_empty() {
        let store = create_test_store();
        let stats = store.stats().unwrap();
        assert_eq!(stats.collections, 0);
        assert_eq!(stats.payload_bytes, 0);
        assert!(stats.last_write.is_none());
        assert_eq!(stats.db_size_bytes, 0);
    }

    #[test]
    fn test_stats_counts_bytes() {
        let store = create_test_store();
        store.write("vehicles", "[]").unwrap();
        store.write("drivers", "[\"Jo\u{e3}o\"]").unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.collections, 2);
        assert_eq!(stats.payload_bytes, 2 + "[\"Jo\u{e3}o\"]".len() as i64);
        assert!(stats.last_write.is_some());
    }

    #[test]
    fn test_open_file_based_persists() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("fleet.db");

        {
            let store = SqliteStore::open(&db_path).unwrap();
            store.write("vehicles", "[]").unwrap();
            assert_eq!(store.path(), db_path);
            assert!(store.stats().unwrap().db_size_bytes > 0);
        }

        let reopened = SqliteStore::open(&db_path).unwrap();
        assert_eq!(reopened.read("vehicles").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let nested_path = dir.path().join("nested/deeper/fleet.db");

        let _store = SqliteStore::open(&nested_path).unwrap();
        assert!(nested_path.exists());
    }
}
