//! DuckDB backend wrapper
//!
//! Synchronous by design: the core pipeline is single-threaded and
//! batch-oriented. The connection sits behind a `Mutex` so a backend
//! handle can be shared, but DuckDB connection objects are never used from
//! two threads at once — read-side consumers open their own read-only
//! handle instead of sharing this one.

use crate::error::{DbError, DbResult};
use duckdb::{AccessMode, Config, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Wrapper around one DuckDB connection.
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Open (or create) the database file in write mode and apply the
    /// engine tunables from the environment.
    pub fn open(path: &Path) -> DbResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| DbError::ConnectionError(format!("{}: {e}", parent.display())))?;
        }
        let conn = Connection::open(path)?;
        let backend = Self {
            conn: Mutex::new(conn),
        };
        backend.apply_engine_hints()?;
        Ok(backend)
    }

    /// Open the database file read-only. Readers never contend with the
    /// single writer.
    pub fn open_read_only(path: &Path) -> DbResult<Self> {
        let config = Config::default().access_mode(AccessMode::ReadOnly)?;
        let conn = Connection::open_with_flags(path, config)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory database (tests and scratch queries).
    pub fn in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    /// `SET memory_limit` / `SET threads` from the environment, when given.
    fn apply_engine_hints(&self) -> DbResult<()> {
        if let Ok(limit) = std::env::var("ENEM_DUCKDB_MEMORY_LIMIT") {
            if !limit.is_empty() {
                self.execute_batch(&format!("SET memory_limit = '{limit}'"))?;
                log::info!("duckdb memory_limit set to {limit}");
            }
        }
        if let Ok(threads) = std::env::var("ENEM_DUCKDB_THREADS") {
            if let Ok(n) = threads.parse::<usize>() {
                self.execute_batch(&format!("SET threads = {n}"))?;
                log::info!("duckdb threads set to {n}");
            }
        }
        Ok(())
    }

    pub fn execute(&self, sql: &str) -> DbResult<usize> {
        let conn = self.lock()?;
        conn.execute(sql, [])
            .map_err(|e| DbError::ExecutionError(format!("{e}: {sql}")))
    }

    pub fn execute_batch(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql).map_err(DbError::from)
    }

    /// Row count of an arbitrary SELECT.
    pub fn query_count(&self, sql: &str) -> DbResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM ({sql})"), [], |row| {
                row.get(0)
            })
            .map_err(DbError::from)?;
        Ok(count as usize)
    }

    /// Single i64 scalar from a query.
    pub fn query_i64(&self, sql: &str) -> DbResult<i64> {
        let conn = self.lock()?;
        conn.query_row(sql, [], |row| row.get(0))
            .map_err(DbError::from)
    }

    pub fn relation_exists(&self, name: &str) -> DbResult<bool> {
        let conn = self.lock()?;
        let sql = "SELECT COUNT(*) FROM information_schema.tables \
                   WHERE table_schema = 'main' AND table_name = ?";
        let count: i64 = conn
            .query_row(sql, duckdb::params![name], |row| row.get(0))
            .map_err(DbError::from)?;
        Ok(count > 0)
    }

    pub fn create_view_as(&self, name: &str, select: &str) -> DbResult<()> {
        self.execute(&format!("CREATE OR REPLACE VIEW {name} AS {select}"))?;
        Ok(())
    }

    /// `CREATE OR REPLACE TABLE`: old data is fully superseded, not merged.
    pub fn create_table_as(&self, name: &str, select: &str) -> DbResult<()> {
        self.execute(&format!("CREATE OR REPLACE TABLE {name} AS {select}"))?;
        Ok(())
    }

    pub fn drop_if_exists(&self, name: &str) -> DbResult<()> {
        // Try dropping as view first, then as table.
        let _ = self.execute(&format!("DROP VIEW IF EXISTS {name}"));
        let _ = self.execute(&format!("DROP TABLE IF EXISTS {name}"));
        Ok(())
    }
}

#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;
