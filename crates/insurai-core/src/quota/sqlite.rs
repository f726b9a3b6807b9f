//! SQLite-backed quota store
//!
//! Values live as strings in a `local_storage` key/value table, so the file
//! looks the same as browser local storage would: an ISO date under
//! [`DATE_KEY`] and a decimal count under [`CALLS_KEY`].

use std::path::Path;

use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OptionalExtension, TransactionBehavior};
use tracing::{info, warn};

use crate::error::Result;

use super::QuotaStore;

pub const DATE_KEY: &str = "insurai_demo_date";
pub const CALLS_KEY: &str = "insurai_demo_calls";

type DbPool = Pool<SqliteConnectionManager>;
type DbConn = PooledConnection<SqliteConnectionManager>;

/// Quota store with connection pooling
#[derive(Clone)]
pub struct SqliteQuotaStore {
    pool: DbPool,
    db_path: String,
}

impl SqliteQuotaStore {
    /// Open (or create) the store at `path`, creating parent directories
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.busy_timeout(std::time::Duration::from_secs(5))?;
            Ok(())
        });
        let pool = Pool::builder().max_size(4).build(manager)?;

        let store = Self {
            pool,
            db_path: path.display().to_string(),
        };
        store.run_migrations()?;
        info!(path = %store.db_path, "Opened quota store");
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    ///
    /// A single pooled connection keeps every caller on the same database.
    pub fn in_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager)?;
        let store = Self {
            pool,
            db_path: ":memory:".to_string(),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn path(&self) -> &str {
        &self.db_path
    }

    fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS local_storage (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            "#,
        )?;
        Ok(())
    }

    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO local_storage (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
            "#,
            [key, value],
        )?;
        Ok(())
    }
}

fn parse_calls(raw: &str) -> u32 {
    raw.trim().parse().unwrap_or_else(|_| {
        warn!(value = %raw, "Unreadable stored call count, treating as 0");
        0
    })
}

impl QuotaStore for SqliteQuotaStore {
    fn get_date(&self) -> Result<Option<NaiveDate>> {
        Ok(self.get_item(DATE_KEY)?.and_then(|raw| {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map_err(|_| warn!(value = %raw, "Unreadable stored quota date, ignoring"))
                .ok()
        }))
    }

    fn set_date(&self, date: NaiveDate) -> Result<()> {
        self.set_item(DATE_KEY, &date.format("%Y-%m-%d").to_string())
    }

    fn get_calls(&self) -> Result<u32> {
        Ok(self
            .get_item(CALLS_KEY)?
            .map(|raw| parse_calls(&raw))
            .unwrap_or(0))
    }

    fn set_calls(&self, calls: u32) -> Result<()> {
        self.set_item(CALLS_KEY, &calls.to_string())
    }

    fn increment_calls(&self) -> Result<u32> {
        let mut conn = self.conn()?;
        // IMMEDIATE takes the write lock up front so concurrent processes
        // cannot both read the same count.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current: Option<String> = tx
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                [CALLS_KEY],
                |row| row.get(0),
            )
            .optional()?;
        let next = current
            .map(|raw| parse_calls(&raw))
            .unwrap_or(0)
            .saturating_add(1);
        tx.execute(
            r#"
            INSERT INTO local_storage (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
            "#,
            [CALLS_KEY, next.to_string().as_str()],
        )?;
        tx.commit()?;
        Ok(next)
    }
}
