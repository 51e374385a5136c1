//! Raw to silver
//!
//! Ingests one year's raw CSV, normalizes it onto the canonical schema and
//! writes the silver Parquet artifact. Ingestion is always chunked; the
//! hardware profile only decides how loudly we announce the streaming mode
//! and how large the chunks are.

use crate::error::{EtlError, EtlResult};
use crate::ingest::CsvChunkReader;
use crate::normalize::normalize_chunk;
use enem_core::{DataPaths, HardwareProfile};
use enem_frame::{CandidateFrame, IncrementalParquetWriter};
use std::path::PathBuf;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Outcome of one year's raw-to-silver run.
#[derive(Debug, Clone)]
pub struct SilverResult {
    pub year: i32,
    pub path: PathBuf,
    pub row_count: u64,
    pub streamed: bool,
}

/// Build the silver artifact for one year.
///
/// A missing raw file is a structural failure for that year; sibling years
/// are unaffected (the caller iterates).
pub fn build_silver_for_year(
    year: i32,
    paths: &DataPaths,
    profile: &HardwareProfile,
) -> EtlResult<SilverResult> {
    let raw_path = paths.raw_data_path(year);
    if !raw_path.exists() {
        return Err(EtlError::RawInputMissing {
            year,
            path: raw_path.display().to_string(),
        });
    }

    let size_gb = std::fs::metadata(&raw_path)?.len() as f64 / GIB;
    let streamed = profile.requires_streaming(size_gb);
    if streamed {
        log::info!(
            "year {year}: raw file is {size_gb:.2} GB (>= {:.2} GB threshold), streaming ingestion",
            profile.streaming_threshold_gb
        );
    }

    let silver_path = paths.silver_path(year);
    let reader = CsvChunkReader::open(&raw_path, profile.csv_chunk_rows)?;
    let mut writer = IncrementalParquetWriter::create(&silver_path)?;

    for chunk in reader {
        let frame = normalize_chunk(&chunk?, year);
        writer.write(&frame.to_record_batch()?)?;
    }

    let row_count = writer.finish(&CandidateFrame::schema())?;
    log::info!(
        "year {year}: silver artifact written to {} ({row_count} rows)",
        silver_path.display()
    );

    Ok(SilverResult {
        year,
        path: silver_path,
        row_count,
        streamed,
    })
}

#[cfg(test)]
#[path = "silver_test.rs"]
mod tests;
