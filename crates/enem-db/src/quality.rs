//! Data quality gate
//!
//! Invariant checks over the freshly materialized tables. Every result is
//! logged before any exception is raised so partial diagnostics survive a
//! hard failure.

use crate::backend::DuckDbBackend;
use crate::error::{DbError, DbResult};
use enem_core::Subject;

/// How a failing check is treated by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// Structured outcome of one data check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub severity: Severity,
    pub details: String,
}

/// Primary tables that must be non-empty after materialization.
const PRIMARY_TABLES: [&str; 3] = ["tb_notas", "tb_notas_stats", "tb_notas_geo"];

fn check_row_count_positive(db: &DuckDbBackend, table: &str, min_rows: i64) -> DbResult<CheckResult> {
    let row_count = db.query_i64(&format!("SELECT COUNT(*) FROM {table}"))?;
    Ok(CheckResult {
        name: format!("{table}.row_count>={min_rows}"),
        passed: row_count >= min_rows,
        severity: Severity::Error,
        details: format!("row_count={row_count}"),
    })
}

/// Score columns must lie inside [0, 1000], ignoring nulls.
fn check_notas_range(
    db: &DuckDbBackend,
    table: &str,
    columns: &[String],
    min_allowed: f64,
    max_allowed: f64,
) -> DbResult<CheckResult> {
    let conditions: Vec<String> = columns
        .iter()
        .map(|col| format!("{col} < {min_allowed} OR {col} > {max_allowed}"))
        .collect();
    let sql = format!(
        "SELECT COUNT(*) FROM {table} WHERE {}",
        conditions.join(" OR ")
    );
    let out_of_range = db.query_i64(&sql)?;
    Ok(CheckResult {
        name: format!("{table}.notas_in_range[{min_allowed},{max_allowed}]"),
        passed: out_of_range == 0,
        severity: Severity::Error,
        details: format!("out_of_range_rows={out_of_range}"),
    })
}

/// Run the minimum data checks over the materialized dashboard tables.
pub fn run_gold_checks(db: &DuckDbBackend) -> DbResult<Vec<CheckResult>> {
    let mut checks = Vec::new();

    for table in PRIMARY_TABLES {
        checks.push(check_row_count_positive(db, table, 1)?);
    }

    let stats_columns: Vec<String> = Subject::ALL
        .iter()
        .flat_map(|s| {
            ["min", "max", "mean"]
                .into_iter()
                .map(|suffix| format!("{}_{suffix}", s.score_column()))
        })
        .collect();
    checks.push(check_notas_range(
        db,
        "tb_notas_stats",
        &stats_columns,
        0.0,
        1000.0,
    )?);

    let geo_columns: Vec<String> = Subject::ALL
        .iter()
        .map(|s| format!("{}_mean", s.score_column()))
        .collect();
    checks.push(check_notas_range(db, "tb_notas_geo", &geo_columns, 0.0, 1000.0)?);

    // Log every result before anyone gets to raise on them.
    for check in &checks {
        if check.passed {
            log::info!(
                "[data-quality] {} | passed=true | {}",
                check.name,
                check.details
            );
        } else {
            log::error!(
                "[data-quality] {} | passed=false | severity={:?} | {}",
                check.name,
                check.severity,
                check.details
            );
        }
    }

    Ok(checks)
}

/// Run the checks and fail the materialization when any error-severity
/// check does not pass. The error message names every failing check.
pub fn assert_gold_checks(db: &DuckDbBackend) -> DbResult<Vec<CheckResult>> {
    let checks = run_gold_checks(db)?;
    let failing: Vec<&CheckResult> = checks
        .iter()
        .filter(|c| !c.passed && c.severity == Severity::Error)
        .collect();
    if !failing.is_empty() {
        let summary = failing
            .iter()
            .map(|c| format!("{} ({})", c.name, c.details))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(DbError::QualityGate(summary));
    }
    Ok(checks)
}

#[cfg(test)]
#[path = "quality_test.rs"]
mod tests;
