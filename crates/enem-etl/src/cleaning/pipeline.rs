//! Single-pass cleaning pipeline

use crate::cleaning::rules::{rule_value, DEFAULT_NUMERIC_RULES};
use crate::cleaning::streaming::stream_clean_to_parquet;
use crate::error::{EtlError, EtlResult};
use crate::stream::should_stream;
use enem_core::{ColumnMeta, DataPaths, HardwareProfile, ReferenceMetadata};
use enem_frame::gold::CleaningReportRow;
use enem_frame::{read_frame, write_batch, write_frame, CandidateFrame};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

/// Everything one cleaning run produces.
#[derive(Debug, Clone)]
pub struct CleaningArtifacts {
    pub cleaned: CandidateFrame,
    pub report: Vec<CleaningReportRow>,
    pub invalid_rows: CandidateFrame,
    pub duplicates: CandidateFrame,
}

/// Run the cleaning pipeline over one in-memory frame.
///
/// 1. Quarantine rows violating a numeric range (non-null values only).
/// 2. Quarantine duplicate candidate identifiers, keeping first occurrence.
/// 3. Replace out-of-domain values with UNKNOWN/null per reference metadata.
/// 4. Assemble the report, one row per violated rule class.
pub fn run_cleaning_pipeline(
    frame: &CandidateFrame,
    year: i32,
    metadata: &ReferenceMetadata,
) -> CleaningArtifacts {
    let invalid_mask = numeric_invalid_mask(frame);
    let invalid_rows = frame.filter(&invalid_mask);
    let keep_mask: Vec<bool> = invalid_mask.iter().map(|&v| !v).collect();
    let valid = frame.filter(&keep_mask);

    let mut seen = HashSet::new();
    let (mut cleaned, duplicates) = split_duplicates(&valid, &mut seen);

    let mut domain_counts = BTreeMap::new();
    apply_domains(&mut cleaned, &metadata.for_year(year), &mut domain_counts);

    let report = assemble_report(invalid_rows.len(), duplicates.len(), &domain_counts);
    log::info!(
        "cleaning finished for {year}: {} valid, {} invalid, {} duplicates",
        cleaned.len(),
        invalid_rows.len(),
        duplicates.len()
    );

    CleaningArtifacts {
        cleaned,
        report,
        invalid_rows,
        duplicates,
    }
}

/// True where a row violates any numeric rule with a non-null value.
pub(crate) fn numeric_invalid_mask(frame: &CandidateFrame) -> Vec<bool> {
    let mut mask = vec![false; frame.len()];
    for rule in DEFAULT_NUMERIC_RULES {
        for (row, flag) in mask.iter_mut().enumerate() {
            if let Some(value) = rule_value(frame, rule.column, row) {
                if rule.violates(value) {
                    *flag = true;
                }
            }
        }
    }
    mask
}

/// Split off rows whose non-null identifier was already seen (in this frame
/// or, for streaming, in a previous batch via the shared `seen` set).
/// Null identifiers never participate in deduplication.
pub(crate) fn split_duplicates(
    frame: &CandidateFrame,
    seen: &mut HashSet<String>,
) -> (CandidateFrame, CandidateFrame) {
    let mut keep_mask = vec![true; frame.len()];
    for (row, id) in frame.id_inscricao.iter().enumerate() {
        if let Some(id) = id {
            if !seen.insert(id.clone()) {
                keep_mask[row] = false;
            }
        }
    }
    let dup_mask: Vec<bool> = keep_mask.iter().map(|&v| !v).collect();
    (frame.filter(&keep_mask), frame.filter(&dup_mask))
}

/// Apply the finite value domains from reference metadata, replacing
/// out-of-domain non-null values with "UNKNOWN" (text) or null (numeric)
/// and recording affected-row counts per column.
pub(crate) fn apply_domains(
    frame: &mut CandidateFrame,
    metadata: &[&ColumnMeta],
    counts: &mut BTreeMap<String, i64>,
) {
    for meta in metadata {
        let Some(domain) = meta.dominio_valores.as_ref() else {
            continue;
        };
        let affected = apply_one_domain(frame, &meta.nome_padrao, domain);
        if affected > 0 {
            *counts.entry(meta.nome_padrao.clone()).or_insert(0) += affected;
        }
    }
}

fn apply_one_domain(frame: &mut CandidateFrame, column: &str, domain: &[String]) -> i64 {
    let allowed: HashSet<&str> = domain.iter().map(String::as_str).collect();

    fn sanitize_text(values: &mut [Option<String>], allowed: &HashSet<&str>) -> i64 {
        let mut affected = 0;
        for value in values.iter_mut() {
            if let Some(v) = value {
                if !allowed.contains(v.as_str()) {
                    *value = Some("UNKNOWN".to_string());
                    affected += 1;
                }
            }
        }
        affected
    }

    fn sanitize_int<T: Copy + ToString>(values: &mut [Option<T>], allowed: &HashSet<&str>) -> i64 {
        let mut affected = 0;
        for value in values.iter_mut() {
            if let Some(v) = *value {
                if !allowed.contains(v.to_string().as_str()) {
                    *value = None;
                    affected += 1;
                }
            }
        }
        affected
    }

    match column {
        "TP_SEXO" => sanitize_text(&mut frame.sexo, &allowed),
        "SG_UF_PROVA" => sanitize_text(&mut frame.uf_prova, &allowed),
        "RENDA_FAMILIAR" => sanitize_text(&mut frame.renda_familiar, &allowed),
        "NO_MUNICIPIO_PROVA" => sanitize_text(&mut frame.municipio_nome, &allowed),
        "TP_COR_RACA" => sanitize_int(&mut frame.cor_raca, &allowed),
        "TP_STATUS_REDACAO" => sanitize_int(&mut frame.status_redacao, &allowed),
        "TP_PRESENCA_CN" => sanitize_int(&mut frame.presenca[0], &allowed),
        "TP_PRESENCA_CH" => sanitize_int(&mut frame.presenca[1], &allowed),
        "TP_PRESENCA_LC" => sanitize_int(&mut frame.presenca[2], &allowed),
        "TP_PRESENCA_MT" => sanitize_int(&mut frame.presenca[3], &allowed),
        // Column unknown to the canonical frame: the schema evolved, skip.
        other => {
            log::debug!("domain rule for unmapped column '{other}' skipped");
            0
        }
    }
}

/// One report row per violated rule class, in stable order.
pub(crate) fn assemble_report(
    invalid: usize,
    duplicates: usize,
    domain_counts: &BTreeMap<String, i64>,
) -> Vec<CleaningReportRow> {
    let mut report = Vec::new();
    if invalid > 0 {
        report.push(CleaningReportRow {
            rule: "invalid_rows".to_string(),
            affected_rows: invalid as i64,
        });
    }
    if duplicates > 0 {
        report.push(CleaningReportRow {
            rule: "duplicates".to_string(),
            affected_rows: duplicates as i64,
        });
    }
    for (column, count) in domain_counts {
        report.push(CleaningReportRow {
            rule: format!("domain:{column}"),
            affected_rows: *count,
        });
    }
    report
}

/// Outcome of one year's silver-to-cleaned run.
#[derive(Debug, Clone)]
pub struct CleaningRunResult {
    pub year: i32,
    pub cleaned_path: PathBuf,
    pub row_count: u64,
    pub report: Vec<CleaningReportRow>,
    pub invalid_count: u64,
    pub duplicate_count: u64,
    pub streamed: bool,
}

/// Clean one year's silver artifact into the cleaned gold layer, choosing
/// single-pass or streaming mode from the hardware profile.
pub fn clean_year(
    year: i32,
    paths: &DataPaths,
    profile: &HardwareProfile,
    metadata: &ReferenceMetadata,
    force_streaming: bool,
) -> EtlResult<CleaningRunResult> {
    let silver_path = paths.silver_path(year);
    if !silver_path.exists() {
        return Err(EtlError::ArtifactMissing {
            path: silver_path.display().to_string(),
        });
    }
    let cleaned_path = paths.cleaned_path(year);

    let result = if should_stream(&silver_path, profile, force_streaming)? {
        log::info!("year {year}: cleaning in streaming mode");
        let streamed = stream_clean_to_parquet(
            &silver_path,
            &cleaned_path,
            year,
            profile.csv_chunk_rows,
            metadata,
        )?;
        CleaningRunResult {
            year,
            cleaned_path,
            row_count: streamed.row_count,
            invalid_count: streamed.invalid_rows.len() as u64,
            duplicate_count: streamed.duplicates.len() as u64,
            report: streamed.report,
            streamed: true,
        }
    } else {
        let frame = read_frame(&silver_path)?;
        let artifacts = run_cleaning_pipeline(&frame, year, metadata);
        write_frame(&artifacts.cleaned, &cleaned_path)?;
        CleaningRunResult {
            year,
            cleaned_path,
            row_count: artifacts.cleaned.len() as u64,
            invalid_count: artifacts.invalid_rows.len() as u64,
            duplicate_count: artifacts.duplicates.len() as u64,
            report: artifacts.report,
            streamed: false,
        }
    };

    let report_batch = CleaningReportRow::to_record_batch(&result.report)?;
    write_batch(&report_batch, &paths.cleaning_report_path(year))?;

    Ok(result)
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
