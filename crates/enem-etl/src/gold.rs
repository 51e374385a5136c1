//! Gold-table builders
//!
//! Each builder walks the requested years over the cleaned layer, skipping
//! missing years with a warning (empty-year resilience), and writes one
//! columnar artifact with the table's fixed column set. When no year
//! contributes anything, an empty artifact preserving the schema is still
//! written so consumers never hit "file not found".

use crate::aggregate::duck::with_fallback;
use crate::aggregate::InMemoryEngine;
use crate::dimensions::build_dim_municipio;
use crate::error::EtlResult;
use crate::stream::gold_stream_rows;
use enem_core::brackets::ScoreBracket;
use enem_core::DataPaths;
use enem_frame::gold::{
    notas_batch_from_frame, notas_schema, AnnualStatsRow, GeoRow, GeoUfRow, HistogramRow,
    MediaUfRow, RaceRow, SocioRow,
};
use enem_frame::{
    open_batch_reader, read_frame, write_batch, CandidateFrame, IncrementalParquetWriter,
};
use std::path::PathBuf;

pub const HISTOGRAM_BINS: usize = 50;

/// Years whose cleaned artifact exists; the rest are logged and skipped.
fn available_years(years: &[i32], paths: &DataPaths) -> Vec<(i32, PathBuf)> {
    let mut available = Vec::new();
    for &year in years {
        let path = paths.cleaned_path(year);
        if path.exists() {
            available.push((year, path));
        } else {
            log::warn!(
                "cleaned artifact missing for year {year} at {}; skipping",
                path.display()
            );
        }
    }
    available
}

/// Row-level union of all years, streamed batch by batch.
pub fn build_tb_notas(years: &[i32], paths: &DataPaths) -> EtlResult<u64> {
    let out = paths.gold_table("tb_notas");
    let mut writer = IncrementalParquetWriter::create(&out)?;
    let chunk_rows = gold_stream_rows();

    for (year, cleaned) in available_years(years, paths) {
        log::info!("building tb_notas (streaming) from year {year}");
        let (_, reader) = open_batch_reader(&cleaned, chunk_rows)?;
        for batch in reader {
            let frame = CandidateFrame::from_record_batch(&batch?)?;
            writer.write(&notas_batch_from_frame(&frame)?)?;
        }
    }

    let rows = writer.finish(&notas_schema())?;
    log::info!("tb_notas written with {rows} rows");
    Ok(rows)
}

/// Per-year national statistics table.
pub fn build_tb_notas_stats(years: &[i32], paths: &DataPaths) -> EtlResult<Vec<AnnualStatsRow>> {
    let mut rows = Vec::new();
    for (year, cleaned) in available_years(years, paths) {
        let frame = read_frame(&cleaned)?;
        let mut stats = InMemoryEngine.annual_stats(&frame);
        log::info!("tb_notas_stats: year {year} contributed {} rows", stats.len());
        rows.append(&mut stats);
    }

    write_batch(
        &AnnualStatsRow::to_record_batch(&rows)?,
        &paths.gold_table("tb_notas_stats"),
    )?;
    Ok(rows)
}

/// Municipality-level aggregate (DuckDB strategy with in-memory fallback).
pub fn build_tb_notas_geo(years: &[i32], paths: &DataPaths) -> EtlResult<Vec<GeoRow>> {
    let mut rows = Vec::new();
    for (year, cleaned) in available_years(years, paths) {
        let mut year_rows = with_fallback(&cleaned, year, |engine, path, y| {
            log::info!("tb_notas_geo: year {y} via {} engine", engine.name());
            engine.municipality_year(path, y)
        })?;
        rows.append(&mut year_rows);
    }

    write_batch(&GeoRow::to_record_batch(&rows)?, &paths.gold_table("tb_notas_geo"))?;
    Ok(rows)
}

/// State-level aggregate (DuckDB strategy with in-memory fallback).
pub fn build_tb_notas_geo_uf(years: &[i32], paths: &DataPaths) -> EtlResult<Vec<GeoUfRow>> {
    let mut rows = Vec::new();
    for (year, cleaned) in available_years(years, paths) {
        let mut year_rows = with_fallback(&cleaned, year, |engine, path, y| {
            log::info!("tb_notas_geo_uf: year {y} via {} engine", engine.name());
            engine.state_year(path, y)
        })?;
        rows.append(&mut year_rows);
    }

    write_batch(
        &GeoUfRow::to_record_batch(&rows)?,
        &paths.gold_table("tb_notas_geo_uf"),
    )?;
    Ok(rows)
}

/// Race/color aggregate per year.
pub fn build_tb_notas_race(years: &[i32], paths: &DataPaths) -> EtlResult<Vec<RaceRow>> {
    let mut rows = Vec::new();
    for (year, cleaned) in available_years(years, paths) {
        let frame = read_frame(&cleaned)?;
        let mut year_rows = InMemoryEngine.race_year(&frame);
        if year_rows.is_empty() {
            log::warn!("tb_notas_race: no race data for year {year}");
        }
        rows.append(&mut year_rows);
    }

    write_batch(
        &RaceRow::to_record_batch(&rows)?,
        &paths.gold_table("tb_notas_race"),
    )?;
    Ok(rows)
}

/// Score histograms per year and subject.
pub fn build_tb_notas_histogram(years: &[i32], paths: &DataPaths) -> EtlResult<Vec<HistogramRow>> {
    let mut rows = Vec::new();
    for (_, cleaned) in available_years(years, paths) {
        let frame = read_frame(&cleaned)?;
        rows.append(&mut InMemoryEngine.histogram(&frame, HISTOGRAM_BINS));
    }

    write_batch(
        &HistogramRow::to_record_batch(&rows)?,
        &paths.gold_table("tb_notas_histogram"),
    )?;
    Ok(rows)
}

/// Socioeconomic class distribution of the overall score.
pub fn build_tb_socio_economico(years: &[i32], paths: &DataPaths) -> EtlResult<Vec<SocioRow>> {
    let mut rows = Vec::new();
    for (year, cleaned) in available_years(years, paths) {
        let frame = read_frame(&cleaned)?;
        let mut year_rows = InMemoryEngine.socio_economico(&frame);
        if year_rows.is_empty() {
            log::warn!("tb_socio_economico: no fully-present candidates for year {year}");
        }
        rows.append(&mut year_rows);
    }

    // Stable class ordering across all years for the consuming charts.
    rows.sort_by_key(|r| {
        crate::aggregate::memory::INCOME_CLASS_ORDER
            .iter()
            .position(|c| *c == r.classe)
            .unwrap_or(usize::MAX)
    });

    write_batch(
        &SocioRow::to_record_batch(&rows)?,
        &paths.gold_table("tb_socio_economico"),
    )?;
    Ok(rows)
}

/// Bracketed five-subject averages per state.
pub fn build_tb_media_uf(
    years: &[i32],
    paths: &DataPaths,
    brackets: &[ScoreBracket],
) -> EtlResult<Vec<MediaUfRow>> {
    let mut rows = Vec::new();
    for (year, cleaned) in available_years(years, paths) {
        log::info!("building media per state for year {year}");
        let frame = read_frame(&cleaned)?;
        rows.append(&mut InMemoryEngine.media_uf(&frame, brackets));
    }

    rows.sort_by(|a, b| {
        (a.ano, &a.uf, a.id_faixa).cmp(&(b.ano, &b.uf, b.id_faixa))
    });

    write_batch(
        &MediaUfRow::to_record_batch(&rows)?,
        &paths.gold_table("tb_media_uf"),
    )?;
    Ok(rows)
}

/// Summary counts for one full gold build.
#[derive(Debug, Clone, Default)]
pub struct GoldBuildSummary {
    pub notas_rows: u64,
    pub stats_rows: usize,
    pub geo_rows: usize,
    pub geo_uf_rows: usize,
    pub race_rows: usize,
    pub histogram_rows: usize,
    pub socio_rows: usize,
    pub media_uf_rows: usize,
    pub municipality_rows: usize,
}

/// Build every gold artifact for the requested years.
pub fn build_all_gold(
    years: &[i32],
    paths: &DataPaths,
    brackets: &[ScoreBracket],
) -> EtlResult<GoldBuildSummary> {
    let summary = GoldBuildSummary {
        notas_rows: build_tb_notas(years, paths)?,
        stats_rows: build_tb_notas_stats(years, paths)?.len(),
        geo_rows: build_tb_notas_geo(years, paths)?.len(),
        geo_uf_rows: build_tb_notas_geo_uf(years, paths)?.len(),
        race_rows: build_tb_notas_race(years, paths)?.len(),
        histogram_rows: build_tb_notas_histogram(years, paths)?.len(),
        socio_rows: build_tb_socio_economico(years, paths)?.len(),
        media_uf_rows: build_tb_media_uf(years, paths, brackets)?.len(),
        municipality_rows: build_dim_municipio(years, paths)?.len(),
    };
    log::info!(
        "gold build complete: {} notas rows, {} stats rows, {} geo rows",
        summary.notas_rows,
        summary.stats_rows,
        summary.geo_rows
    );
    Ok(summary)
}

#[cfg(test)]
#[path = "gold_test.rs"]
mod tests;
