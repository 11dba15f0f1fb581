//! SQLite-backed [`KeyValueStore`].

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use super::{KeyValueStore, StoreKey};
use crate::error::Result;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv (
    key   TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
)";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening store");
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: StoreKey) -> Result<Option<String>> {
        let value = self
            .conn()
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key.as_ref()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: StoreKey, value: &str) -> Result<()> {
        self.conn().execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key.as_ref(), value],
        )?;
        Ok(())
    }

    fn remove(&self, key: StoreKey) -> Result<()> {
        self.conn().execute("DELETE FROM kv WHERE key = ?1", params![key.as_ref()])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_and_remove() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.get(StoreKey::Favorites).unwrap(), None);

        store.set(StoreKey::Favorites, "[]").unwrap();
        store.set(StoreKey::Favorites, r#"[{"id":"330"}]"#).unwrap();
        assert_eq!(
            store.get(StoreKey::Favorites).unwrap().as_deref(),
            Some(r#"[{"id":"330"}]"#)
        );
        assert_eq!(store.get(StoreKey::Recents).unwrap(), None);

        store.remove(StoreKey::Favorites).unwrap();
        assert_eq!(store.get(StoreKey::Favorites).unwrap(), None);
    }

    #[test]
    fn test_persists_across_connections() {
        let path = std::env::temp_dir().join(format!("helpbus-store-{}.sqlite3", std::process::id()));
        let _ = std::fs::remove_file(&path);

        SqliteStore::open(&path).unwrap().set(StoreKey::Recents, "[1,2]").unwrap();
        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.get(StoreKey::Recents).unwrap().as_deref(), Some("[1,2]"));

        drop(reopened);
        let _ = std::fs::remove_file(&path);
    }
}
