//! Streaming materializer
//!
//! Drives a stage function over a Parquet input in fixed-size batches,
//! appending results to a single growing artifact. The concatenation of
//! per-batch outputs is row-equivalent to running the stage once over the
//! whole input; streaming is purely a memory-management strategy.

use crate::error::{EtlError, EtlResult};
use arrow::record_batch::RecordBatch;
use enem_core::HardwareProfile;
use enem_frame::{open_batch_reader, parquet_num_rows, IncrementalParquetWriter};
use std::path::Path;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Apply `stage` to every batch of `input` and append the results to
/// `output`. Returns the number of rows written.
///
/// The first produced batch pins the output schema; a later batch with a
/// different schema aborts the stream (structural failure). When the input
/// yields no batches at all, an empty artifact carrying the input schema is
/// written so downstream consumers never see "file not found" for a
/// legitimately empty year.
pub fn stream_process<F>(
    input: &Path,
    output: &Path,
    mut stage: F,
    chunk_rows: usize,
) -> EtlResult<u64>
where
    F: FnMut(RecordBatch) -> EtlResult<RecordBatch>,
{
    let (input_schema, reader) = open_batch_reader(input, chunk_rows)?;
    let mut writer = IncrementalParquetWriter::create(output)?;

    for batch in reader {
        let produced = stage(batch?)?;
        writer.write(&produced)?;
    }

    writer.finish(&input_schema).map_err(EtlError::from)
}

/// Whether a stage should run in streaming mode for `input`.
///
/// True when explicitly forced (`ENEM_FORCE_STREAMING` or the caller's
/// flag), when the file exceeds the profile's streaming threshold, or when
/// the row count exceeds a single chunk.
pub fn should_stream(input: &Path, profile: &HardwareProfile, force: bool) -> EtlResult<bool> {
    if force || env_force_streaming() {
        return Ok(true);
    }

    let size_gb = std::fs::metadata(input)
        .map_err(|e| EtlError::ArtifactMissing {
            path: format!("{} ({e})", input.display()),
        })?
        .len() as f64
        / GIB;
    if profile.requires_streaming(size_gb) {
        return Ok(true);
    }

    let rows = parquet_num_rows(input)?;
    Ok(rows > profile.csv_chunk_rows as i64)
}

fn env_force_streaming() -> bool {
    std::env::var("ENEM_FORCE_STREAMING")
        .map(|v| !v.is_empty() && v != "0")
        .unwrap_or(false)
}

/// Gold-layer streaming batch size (`ENEM_PARQUET_STREAM_ROWS`), with a
/// safe fallback against gigantic batches.
pub fn gold_stream_rows() -> usize {
    std::env::var("ENEM_PARQUET_STREAM_ROWS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(200_000)
}

#[cfg(test)]
#[path = "stream_test.rs"]
mod tests;
