//! Materialization workflow
//!
//! `UNINITIALIZED → VIEWS_REGISTERED → MATERIALIZED → QUALITY_PASSED`, or a
//! quality-gate failure after MATERIALIZED — in which case physical tables
//! exist but must not be trusted until a successful re-run. Write access is
//! single-writer: a second in-process attempt fails fast on the process
//! lock, a second OS process fails fast on DuckDB's file lock, both with
//! the dedicated lock error.

use crate::backend::DuckDbBackend;
use crate::error::{DbError, DbResult};
use crate::quality::{assert_gold_checks, CheckResult};
use crate::views::register_parquet_views;
use enem_core::brackets::ScoreBracket;
use enem_core::DataPaths;
use std::path::PathBuf;
use std::sync::Mutex;

/// Serializes write-mode access within this process.
static MATERIALIZE_LOCK: Mutex<()> = Mutex::new(());

/// Where a materialization run ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendState {
    /// Views registered, physical tables untouched
    ViewsRegistered,
    /// Tables replaced and the quality gate passed — consumable
    QualityPassed,
}

/// Successful outcome of [`init_sql_backend`].
#[derive(Debug)]
pub struct MaterializeOutcome {
    pub db_path: PathBuf,
    pub state: BackendState,
    pub views: Vec<String>,
    pub checks: Vec<CheckResult>,
}

/// Tables copied from their views into physical form.
const MATERIALIZED_TABLES: [&str; 3] = ["tb_notas", "tb_notas_stats", "tb_notas_geo"];

/// Initialize the SQL backend over the gold layer.
///
/// 1. Optionally rebuild every gold artifact for `years`.
/// 2. Open (or create) the database file and register the parquet views.
/// 3. When `materialize_tables`: copy each dashboard view into a physical
///    table with `CREATE OR REPLACE`, then run the quality gate. A gate
///    failure fails the whole run; the tables it leaves behind are not to
///    be advertised as consumable.
pub fn init_sql_backend(
    years: &[i32],
    paths: &DataPaths,
    brackets: &[ScoreBracket],
    materialize_tables: bool,
    build_gold: bool,
) -> DbResult<MaterializeOutcome> {
    let _guard = MATERIALIZE_LOCK.try_lock().map_err(|_| {
        DbError::LockContention("another materialization is in progress in this process".into())
    })?;

    if build_gold {
        log::info!("refreshing gold artifacts for {} years", years.len());
        enem_etl::gold::build_all_gold(years, paths, brackets)?;
    }

    let db_path = paths.db_path();
    let db = DuckDbBackend::open(&db_path)?;
    let views = register_parquet_views(&db, paths)?;

    if !materialize_tables {
        log::info!("views registered only; consumers read gold_tb_* views");
        return Ok(MaterializeOutcome {
            db_path,
            state: BackendState::ViewsRegistered,
            views,
            checks: Vec::new(),
        });
    }

    log::info!("materializing dashboard tables from gold views");
    for table in MATERIALIZED_TABLES {
        db.create_table_as(table, &format!("SELECT * FROM gold_{table}"))?;
    }

    let checks = assert_gold_checks(&db)?;
    log::info!(
        "materialization complete at {}; quality gate passed",
        db_path.display()
    );

    Ok(MaterializeOutcome {
        db_path,
        state: BackendState::QualityPassed,
        views,
        checks,
    })
}

#[cfg(test)]
#[path = "materialize_test.rs"]
mod tests;
