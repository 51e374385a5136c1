//! Per-year pipeline orchestration
//!
//! One year is processed raw → silver → cleaned as a unit; a failure in
//! one year never aborts its siblings. Cross-year parallelism is an
//! operational concern (one OS process per year), not an in-process one,
//! so peak memory stays bounded by a single year's batches.

use crate::cleaning::{clean_year, CleaningRunResult};
use crate::error::EtlResult;
use crate::silver::{build_silver_for_year, SilverResult};
use enem_core::{DataPaths, HardwareProfile, ReferenceMetadata};

/// Outcome of the raw-to-cleaned run for one year.
#[derive(Debug, Clone)]
pub struct EtlYearResult {
    pub silver: SilverResult,
    pub cleaning: CleaningRunResult,
}

/// Run raw → silver → cleaned for one year.
pub fn run_etl_for_year(
    year: i32,
    paths: &DataPaths,
    profile: &HardwareProfile,
    metadata: &ReferenceMetadata,
    force_streaming: bool,
) -> EtlResult<EtlYearResult> {
    let silver = build_silver_for_year(year, paths, profile)?;
    let cleaning = clean_year(year, paths, profile, metadata, force_streaming)?;
    Ok(EtlYearResult { silver, cleaning })
}

/// Run the full ETL for a sequence of years, collecting per-year outcomes.
///
/// Failed years are logged and reported back; successful years proceed
/// regardless of their neighbors.
pub fn run_etl_for_years(
    years: &[i32],
    paths: &DataPaths,
    profile: &HardwareProfile,
    metadata: &ReferenceMetadata,
    force_streaming: bool,
) -> Vec<(i32, EtlResult<EtlYearResult>)> {
    log::info!(
        "hardware profile: {} cores, {:.1} GB RAM ({:.1} GB available), \
         {:.1} GB per pipeline, chunks of {} rows, streaming >= {:.1} GB",
        profile.logical_cores,
        profile.ram_total_gb,
        profile.ram_available_gb,
        profile.max_ram_for_pipeline_gb,
        profile.csv_chunk_rows,
        profile.streaming_threshold_gb
    );

    let mut results = Vec::with_capacity(years.len());
    for &year in years {
        log::info!("starting ETL workflow for {year}");
        let outcome = run_etl_for_year(year, paths, profile, metadata, force_streaming);
        match &outcome {
            Ok(result) => log::info!(
                "ETL workflow finished for {year}: {} cleaned rows",
                result.cleaning.row_count
            ),
            Err(e) => log::error!("ETL workflow failed for {year}: {e}"),
        }
        results.push((year, outcome));
    }
    results
}
