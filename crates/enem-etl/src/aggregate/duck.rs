//! DuckDB aggregation engine
//!
//! Pushes the geography group-bys down to DuckDB over the cleaned Parquet
//! artifact. Presence conditions are only added for presence columns that
//! actually carry data in the file, mirroring the column-availability probe
//! of the in-memory engine.

use crate::aggregate::AggregateEngine;
use crate::error::{EtlError, EtlResult};
use duckdb::Connection;
use enem_core::Subject;
use enem_frame::gold::{GeoRow, GeoUfRow, SubjectCountMean};
use std::path::Path;

/// DuckDB-backed aggregation strategy.
#[derive(Debug, Default, Clone, Copy)]
pub struct DuckDbEngine;

fn quoted_path(path: &Path) -> String {
    path.to_string_lossy().replace('\'', "''")
}

/// Non-null counts of the four presence columns; zero means the column is
/// unavailable for this year and the range check alone applies.
fn presence_counts(conn: &Connection, path: &str) -> EtlResult<[i64; 4]> {
    let sql = format!(
        "SELECT CAST(COUNT(TP_PRESENCA_CN) AS BIGINT), \
                CAST(COUNT(TP_PRESENCA_CH) AS BIGINT), \
                CAST(COUNT(TP_PRESENCA_LC) AS BIGINT), \
                CAST(COUNT(TP_PRESENCA_MT) AS BIGINT) \
         FROM read_parquet('{path}')"
    );
    let counts = conn.query_row(&sql, [], |row| {
        Ok([row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?])
    })?;
    Ok(counts)
}

/// `SUM(CASE ...)`/`AVG(CASE ...)` select list for the five subjects.
fn subject_selects(presence_available: &[i64; 4]) -> String {
    let mut selects = Vec::new();
    for subject in Subject::ALL {
        let col = subject.score_column();
        let mut conditions = vec![format!("{col} BETWEEN 0 AND 1000")];
        if presence_available[subject.presence_index()] > 0 {
            conditions.push(format!("{} = 1", subject.presence_column()));
        }
        let cond = conditions.join(" AND ");
        selects.push(format!(
            "CAST(SUM(CASE WHEN {cond} THEN 1 ELSE 0 END) AS BIGINT) AS {col}_count"
        ));
        selects.push(format!(
            "CAST(AVG(CASE WHEN {cond} THEN {col} END) AS DOUBLE) AS {col}_mean"
        ));
    }
    selects.join(", ")
}

/// Distinct registrations, with a group-size fallback when the identifier
/// column is entirely null (matches the in-memory engine).
const INSCRITOS_EXPR: &str = "CAST(CASE WHEN COUNT(ID_INSCRICAO) = 0 THEN COUNT(*) \
     ELSE COUNT(DISTINCT ID_INSCRICAO) END AS BIGINT) AS INSCRITOS";

fn read_subjects(row: &duckdb::Row<'_>, offset: usize) -> duckdb::Result<[SubjectCountMean; 5]> {
    let mut out = [SubjectCountMean::default(); 5];
    for (i, slot) in out.iter_mut().enumerate() {
        slot.count = row.get(offset + i * 2)?;
        slot.mean = row.get(offset + i * 2 + 1)?;
    }
    Ok(out)
}

impl AggregateEngine for DuckDbEngine {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn municipality_year(&self, cleaned: &Path, year: i32) -> EtlResult<Vec<GeoRow>> {
        let conn = Connection::open_in_memory()?;
        let path = quoted_path(cleaned);
        let presence = presence_counts(&conn, &path)?;

        let sql = format!(
            "SELECT COALESCE(CAST(ANO AS INTEGER), {year}) AS ANO, \
                    SG_UF_PROVA, \
                    CAST(CO_MUNICIPIO_PROVA AS INTEGER) AS CO_MUNICIPIO_PROVA, \
                    NO_MUNICIPIO_PROVA, \
                    {INSCRITOS_EXPR}, \
                    {selects} \
             FROM read_parquet('{path}') \
             WHERE SG_UF_PROVA IS NOT NULL \
               AND CO_MUNICIPIO_PROVA IS NOT NULL \
               AND NO_MUNICIPIO_PROVA IS NOT NULL \
             GROUP BY 1, 2, 3, 4 \
             ORDER BY 1, 2, 3, 4",
            selects = subject_selects(&presence),
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(GeoRow {
                    ano: row.get(0)?,
                    uf: row.get(1)?,
                    municipio_codigo: row.get(2)?,
                    municipio_nome: row.get(3)?,
                    inscritos: row.get(4)?,
                    subjects: read_subjects(row, 5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn state_year(&self, cleaned: &Path, year: i32) -> EtlResult<Vec<GeoUfRow>> {
        let conn = Connection::open_in_memory()?;
        let path = quoted_path(cleaned);
        let presence = presence_counts(&conn, &path)?;

        let sql = format!(
            "SELECT COALESCE(CAST(ANO AS INTEGER), {year}) AS ANO, \
                    SG_UF_PROVA, \
                    {INSCRITOS_EXPR}, \
                    {selects} \
             FROM read_parquet('{path}') \
             WHERE SG_UF_PROVA IS NOT NULL \
             GROUP BY 1, 2 \
             ORDER BY 1, 2",
            selects = subject_selects(&presence),
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(GeoUfRow {
                    ano: row.get(0)?,
                    uf: row.get(1)?,
                    inscritos: row.get(2)?,
                    subjects: read_subjects(row, 3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

/// Run the preferred engine with a fallback to the in-memory strategy when
/// DuckDB fails on a given artifact (odd encodings, exotic schemas).
pub fn with_fallback<T>(
    cleaned: &Path,
    year: i32,
    run: impl Fn(&dyn AggregateEngine, &Path, i32) -> EtlResult<T>,
) -> EtlResult<T> {
    let duck = DuckDbEngine;
    match run(&duck, cleaned, year) {
        Ok(rows) => Ok(rows),
        Err(EtlError::Engine(message)) => {
            log::warn!("duckdb engine failed for {year} ({message}); falling back to in-memory");
            run(&super::InMemoryEngine, cleaned, year)
        }
        Err(other) => Err(other),
    }
}
