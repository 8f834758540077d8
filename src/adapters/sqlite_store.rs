//! SQLite record store: one row per key in a `records` table.

use crate::domain::error::TraderError;
use crate::ports::config_port::ConfigPort;
use crate::ports::storage_port::StoragePort;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OptionalExtension, params};

pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
}

fn pool_error(e: r2d2::Error) -> TraderError {
    TraderError::Storage {
        reason: e.to_string(),
    }
}

fn query_error(e: rusqlite::Error) -> TraderError {
    TraderError::Storage {
        reason: e.to_string(),
    }
}

impl SqliteStore {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TraderError> {
        let db_path = config
            .get_string("store", "path")
            .ok_or_else(|| TraderError::ConfigMissing {
                section: "store".into(),
                key: "path".into(),
            })?;
        let pool_size = match config.get_string("store", "pool_size") {
            None => 4,
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|&n| n > 0)
                .ok_or_else(|| TraderError::ConfigInvalid {
                    section: "store".into(),
                    key: "pool_size".into(),
                    reason: format!("{raw} is not a valid connection count"),
                })?,
        };

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(pool_error)?;

        let store = Self { pool };
        store.initialize_schema()?;
        Ok(store)
    }

    /// A single-connection pool, so every checkout sees the same database.
    pub fn in_memory() -> Result<Self, TraderError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(pool_error)?;

        let store = Self { pool };
        store.initialize_schema()?;
        Ok(store)
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, TraderError> {
        self.pool.get().map_err(pool_error)
    }

    fn initialize_schema(&self) -> Result<(), TraderError> {
        self.conn()?
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS records (
                    key TEXT PRIMARY KEY,
                    body TEXT NOT NULL,
                    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
                );",
            )
            .map_err(query_error)
    }
}

impl StoragePort for SqliteStore {
    fn put(&self, key: &str, body: &str) -> Result<(), TraderError> {
        self.conn()?
            .execute(
                "INSERT OR REPLACE INTO records (key, body, updated_at)
                 VALUES (?1, ?2, CURRENT_TIMESTAMP)",
                params![key, body],
            )
            .map_err(query_error)?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, TraderError> {
        self.conn()?
            .query_row(
                "SELECT body FROM records WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(query_error)
    }
}
