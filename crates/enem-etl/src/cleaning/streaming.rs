//! Streaming cleaning
//!
//! Same semantics as the single-pass pipeline, executed over bounded
//! batches with duplicate tracking carried across batch boundaries. The
//! cleaned output is row-equivalent to a single pass over the full input.

use crate::cleaning::pipeline::{
    apply_domains, assemble_report, numeric_invalid_mask, split_duplicates,
};
use crate::error::EtlResult;
use enem_core::ReferenceMetadata;
use enem_frame::gold::CleaningReportRow;
use enem_frame::{open_batch_reader, CandidateFrame, IncrementalParquetWriter};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Accumulated outcome of a streaming cleaning run.
#[derive(Debug, Clone)]
pub struct StreamingCleaningResult {
    pub cleaned_path: PathBuf,
    pub row_count: u64,
    pub report: Vec<CleaningReportRow>,
    pub invalid_rows: CandidateFrame,
    pub duplicates: CandidateFrame,
}

/// Clean a silver artifact in bounded-memory batches.
///
/// Quarantine frames and report counters are merged across batches; only
/// the cleaned rows stream to disk incrementally. Duplicate detection uses
/// one identifier set spanning the whole run, so an ID first seen in batch
/// one is still quarantined when it reappears batches later.
pub fn stream_clean_to_parquet(
    silver_path: &Path,
    clean_path: &Path,
    year: i32,
    chunk_rows: usize,
    metadata: &ReferenceMetadata,
) -> EtlResult<StreamingCleaningResult> {
    let metadata_year = metadata.for_year(year);
    let (_, reader) = open_batch_reader(silver_path, chunk_rows.max(1))?;
    let mut writer = IncrementalParquetWriter::create(clean_path)?;

    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut invalid_rows = CandidateFrame::default();
    let mut duplicates = CandidateFrame::default();
    let mut domain_counts: BTreeMap<String, i64> = BTreeMap::new();

    for batch in reader {
        let frame = CandidateFrame::from_record_batch(&batch?)?;

        let invalid_mask = numeric_invalid_mask(&frame);
        invalid_rows.append(&frame.filter(&invalid_mask));
        let keep_mask: Vec<bool> = invalid_mask.iter().map(|&v| !v).collect();
        let valid = frame.filter(&keep_mask);

        let (mut cleaned, batch_dups) = split_duplicates(&valid, &mut seen_ids);
        duplicates.append(&batch_dups);

        apply_domains(&mut cleaned, &metadata_year, &mut domain_counts);

        writer.write(&cleaned.to_record_batch()?)?;
    }

    let row_count = writer.finish(&CandidateFrame::schema())?;
    let report = assemble_report(invalid_rows.len(), duplicates.len(), &domain_counts);

    log::info!(
        "streaming cleaning finished for {year}: {row_count} valid, {} invalid, {} duplicates",
        invalid_rows.len(),
        duplicates.len()
    );

    Ok(StreamingCleaningResult {
        cleaned_path: clean_path.to_path_buf(),
        row_count,
        report,
        invalid_rows,
        duplicates,
    })
}

#[cfg(test)]
#[path = "streaming_test.rs"]
mod tests;
