// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! One connection per [`Database`], guarded by a mutex. Every query module
//! goes through [`Database::with_conn`]; do not open a second connection to
//! the same file for writes.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::Connection;
use spref_config::model::StoreConfig;
use spref_core::SprefError;
use tracing::{debug, info};

use crate::migrations;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A migrated SQLite database holding every preference namespace.
pub struct Database {
    conn: Mutex<Connection>,
    path: String,
}

impl Database {
    /// Open (or create) the database at `path` in WAL mode and run migrations.
    pub fn open(path: &str) -> Result<Self, SprefError> {
        Self::open_with_options(path, true)
    }

    /// Open the database described by a `[store]` config section.
    pub fn open_from_config(config: &StoreConfig) -> Result<Self, SprefError> {
        Self::open_with_options(&config.database_path, config.wal_mode)
    }

    /// Open (or create) the database at `path`, creating parent directories.
    pub fn open_with_options(path: &str, wal_mode: bool) -> Result<Self, SprefError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(SprefError::storage)?;
            }
        }

        let mut conn = Connection::open(path).map_err(map_sqlite_err)?;
        apply_pragmas(&conn, wal_mode)?;
        migrations::run_migrations(&mut conn)?;

        info!(path = %path, wal_mode, "settings database opened");
        Ok(Self {
            conn: Mutex::new(conn),
            path: path.to_string(),
        })
    }

    /// Open a private in-memory database. Contents vanish on drop.
    pub fn open_in_memory() -> Result<Self, SprefError> {
        let mut conn = Connection::open_in_memory().map_err(map_sqlite_err)?;
        apply_pragmas(&conn, false)?;
        migrations::run_migrations(&mut conn)?;
        debug!("in-memory settings database opened");
        Ok(Self {
            conn: Mutex::new(conn),
            path: ":memory:".to_string(),
        })
    }

    /// Filesystem path of the database, or `:memory:`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Run `f` with exclusive access to the connection.
    pub fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> rusqlite::Result<T>,
    ) -> Result<T, SprefError> {
        let mut conn = self.lock()?;
        f(&mut conn).map_err(map_sqlite_err)
    }

    /// Checkpoint the WAL and close the connection.
    pub fn close(self) -> Result<(), SprefError> {
        let conn = self
            .conn
            .into_inner()
            .map_err(|_| SprefError::storage("database lock poisoned"))?;
        conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
            .map_err(map_sqlite_err)?;
        conn.close().map_err(|(_, e)| map_sqlite_err(e))?;
        debug!(path = %self.path, "settings database closed");
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SprefError> {
        self.conn
            .lock()
            .map_err(|_| SprefError::storage("database lock poisoned"))
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").field("path", &self.path).finish()
    }
}

fn apply_pragmas(conn: &Connection, wal_mode: bool) -> Result<(), SprefError> {
    conn.busy_timeout(BUSY_TIMEOUT).map_err(map_sqlite_err)?;
    if wal_mode {
        // journal_mode returns the resulting mode as a row.
        let mode: String = conn
            .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
            .map_err(map_sqlite_err)?;
        debug!(journal_mode = %mode, "journal mode set");
    }
    conn.pragma_update(None, "synchronous", "NORMAL")
        .map_err(map_sqlite_err)?;
    Ok(())
}

/// Convert a rusqlite error into a [`SprefError::Storage`].
pub fn map_sqlite_err(err: rusqlite::Error) -> SprefError {
    SprefError::storage(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_creates_parent_dirs_and_schema() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested/deeper/settings.db");
        let db = Database::open(db_path.to_str().unwrap()).unwrap();

        let tables: i64 = db
            .with_conn(|conn| {
                conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'preferences'",
                    [],
                    |row| row.get(0),
                )
            })
            .unwrap();
        assert_eq!(tables, 1);
        assert!(db_path.exists());
        db.close().unwrap();
    }

    #[test]
    fn wal_mode_is_enabled() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("wal.db").to_str().unwrap()).unwrap();
        let mode: String = db
            .with_conn(|conn| conn.query_row("PRAGMA journal_mode", [], |row| row.get(0)))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[test]
    fn reopening_runs_migrations_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reopen.db");
        Database::open(path.to_str().unwrap()).unwrap().close().unwrap();
        let db = Database::open(path.to_str().unwrap()).unwrap();
        let applied: i64 = db
            .with_conn(|conn| {
                conn.query_row("SELECT COUNT(*) FROM refinery_schema_history", [], |row| {
                    row.get(0)
                })
            })
            .unwrap();
        assert_eq!(applied, 1);
    }

    #[test]
    fn in_memory_database_is_migrated() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.path(), ":memory:");
        let count: i64 = db
            .with_conn(|conn| conn.query_row("SELECT COUNT(*) FROM preferences", [], |row| row.get(0)))
            .unwrap();
        assert_eq!(count, 0);
    }
}
