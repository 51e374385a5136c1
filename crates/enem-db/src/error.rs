//! Error types for enem-db

use thiserror::Error;

/// Database backend errors
#[derive(Error, Debug)]
pub enum DbError {
    /// D001: Connection error
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// D002: SQL execution error
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// D003: Another writer holds the database; callers can retry later
    #[error("[D003] Database is locked by another writer: {0}")]
    LockContention(String),

    /// D004: Data quality gate failure — materialized tables must not be
    /// trusted until a successful re-run
    #[error("[D004] Data quality checks failed: {0}")]
    QualityGate(String),

    /// D005: Mutex poisoned
    #[error("[D005] Database mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// D006: Upstream pipeline failure while refreshing gold artifacts
    #[error("[D006] {0}")]
    Etl(#[from] enem_etl::EtlError),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error does not expose structured variants, so lock
        // conflicts are classified by message. Narrow patterns keep
        // ordinary execution errors out of the lock bucket.
        let msg = err.to_string();
        if msg.contains("Could not set lock")
            || msg.contains("Conflicting lock")
            || msg.contains("lock on file")
        {
            DbError::LockContention(msg)
        } else {
            DbError::ExecutionError(msg)
        }
    }
}
