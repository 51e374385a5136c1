//! enem-db - Embedded analytical backend for the ENEM aggregation engine
//!
//! Owns the DuckDB database file next to the data lake: registers one view
//! per gold Parquet artifact, materializes the dashboard tables behind the
//! data quality gate, and enforces single-writer access with a fail-fast
//! lock error.

pub mod backend;
pub mod error;
pub mod materialize;
pub mod quality;
pub mod views;

pub use backend::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use materialize::{init_sql_backend, BackendState, MaterializeOutcome};
pub use quality::{assert_gold_checks, run_gold_checks, CheckResult, Severity};
pub use views::register_parquet_views;
