//! Municipality dimension
//!
//! `dim_municipio` keys geography by the IBGE code rather than exam-site
//! data: the state comes from the code's two-digit prefix and the display
//! name is the most frequent spelling across all years. Duplicate keys are
//! a hard error, not a warning.

use crate::error::{EtlError, EtlResult};
use duckdb::Connection;
use enem_core::DataPaths;
use enem_frame::gold::MunicipalityRow;
use enem_frame::write_batch;
use std::collections::HashSet;

/// Official IBGE mapping: state code prefix of the municipality code.
pub const IBGE_UF_MAP: &[(i32, &str)] = &[
    (11, "RO"),
    (12, "AC"),
    (13, "AM"),
    (14, "RR"),
    (15, "PA"),
    (16, "AP"),
    (17, "TO"),
    (21, "MA"),
    (22, "PI"),
    (23, "CE"),
    (24, "RN"),
    (25, "PB"),
    (26, "PE"),
    (27, "AL"),
    (28, "SE"),
    (29, "BA"),
    (31, "MG"),
    (32, "ES"),
    (33, "RJ"),
    (35, "SP"),
    (41, "PR"),
    (42, "SC"),
    (43, "RS"),
    (50, "MS"),
    (51, "MT"),
    (52, "GO"),
    (53, "DF"),
];

fn uf_from_code(codigo: i32) -> Option<&'static str> {
    let prefix = codigo / 100_000;
    IBGE_UF_MAP
        .iter()
        .find(|(code, _)| *code == prefix)
        .map(|(_, uf)| *uf)
}

/// Build `dim_municipio` from every available cleaned year.
pub fn build_dim_municipio(years: &[i32], paths: &DataPaths) -> EtlResult<Vec<MunicipalityRow>> {
    let out_path = paths.gold_table("dim_municipio");

    let files: Vec<String> = years
        .iter()
        .map(|&y| paths.cleaned_path(y))
        .filter(|p| p.exists())
        .map(|p| format!("'{}'", p.to_string_lossy().replace('\'', "''")))
        .collect();

    if files.is_empty() {
        log::warn!("no cleaned artifacts found; dim_municipio will be empty");
        write_batch(&MunicipalityRow::to_record_batch(&[])?, &out_path)?;
        return Ok(Vec::new());
    }

    // Rank name spellings per code by frequency, alphabetical tie-break.
    let sql = format!(
        "WITH all_municipios AS ( \
             SELECT CAST(CO_MUNICIPIO_PROVA AS INTEGER) AS codigo, \
                    NO_MUNICIPIO_PROVA AS nome, \
                    COUNT(*) AS frequency \
             FROM read_parquet([{files}]) \
             WHERE CO_MUNICIPIO_PROVA IS NOT NULL \
               AND NO_MUNICIPIO_PROVA IS NOT NULL \
             GROUP BY 1, 2 \
         ), ranked_names AS ( \
             SELECT codigo, nome, \
                    ROW_NUMBER() OVER ( \
                        PARTITION BY codigo \
                        ORDER BY frequency DESC, nome ASC \
                    ) AS rn \
             FROM all_municipios \
         ) \
         SELECT codigo, nome FROM ranked_names WHERE rn = 1 ORDER BY codigo",
        files = files.join(", "),
    );

    let conn = Connection::open_in_memory()?;
    let mut stmt = conn.prepare(&sql)?;
    let raw_rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, i32>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut rows = Vec::with_capacity(raw_rows.len());
    let mut dropped = 0usize;
    for (codigo, nome) in raw_rows {
        match uf_from_code(codigo) {
            Some(uf) => rows.push(MunicipalityRow {
                codigo,
                nome,
                uf: uf.to_string(),
            }),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        log::warn!("{dropped} municipalities dropped for an invalid state prefix");
    }

    let mut seen = HashSet::new();
    for row in &rows {
        if !seen.insert(row.codigo) {
            return Err(EtlError::Engine(format!(
                "duplicate municipality key {} in dim_municipio",
                row.codigo
            )));
        }
    }

    log::info!("dim_municipio written with {} municipalities", rows.len());
    write_batch(&MunicipalityRow::to_record_batch(&rows)?, &out_path)?;
    Ok(rows)
}

#[cfg(test)]
#[path = "dimensions_test.rs"]
mod tests;
