//! SQLite-backed persistent medium over the `kv_entries` table.
//!
//! # Invariants
//! - Connections handed in must come from `db::open_db*` so `kv_entries` exists.
//! - One row per namespaced key; writes upsert, removes delete.

use super::medium::{MediumResult, StorageMedium};
use crate::db::{open_db, open_db_in_memory};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Persistent medium storing JSON text rows in SQLite.
pub struct SqliteMedium {
    conn: Connection,
}

impl SqliteMedium {
    /// Wraps an already-bootstrapped connection.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens (or creates) a database file and applies migrations.
    pub fn open(path: impl AsRef<Path>) -> MediumResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn open_in_memory() -> MediumResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Namespaced keys currently stored, sorted.
    pub fn keys(&self) -> MediumResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM kv_entries ORDER BY key ASC;")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}

impl StorageMedium for SqliteMedium {
    fn read(&self, key: &str) -> MediumResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&mut self, key: &str, value: &str) -> MediumResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> MediumResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteMedium;
    use crate::store::StorageMedium;

    #[test]
    fn write_upserts_single_row() {
        let mut medium = SqliteMedium::open_in_memory().expect("open medium");
        medium.write("goh_team", "[1]").expect("first write");
        medium.write("goh_team", "[1,2]").expect("second write");

        assert_eq!(
            medium.read("goh_team").expect("read").as_deref(),
            Some("[1,2]")
        );
        assert_eq!(medium.keys().expect("keys"), vec!["goh_team".to_string()]);
    }

    #[test]
    fn remove_missing_key_is_ok() {
        let mut medium = SqliteMedium::open_in_memory().expect("open medium");
        medium.remove("goh_absent").expect("remove");
        assert!(medium.read("goh_absent").expect("read").is_none());
    }
}
