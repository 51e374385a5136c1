//! Layer audit
//!
//! Read-only row/column census across the silver, cleaned and classes
//! layers, persisted as a timestamped YAML report. The audit never mutates
//! data; it exists so a long 1998-2024 backfill can be sanity-checked
//! without re-reading every artifact by hand.

use crate::error::EtlResult;
use chrono::Utc;
use enem_core::DataPaths;
use enem_frame::{parquet_num_rows, parquet_schema};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Census of one artifact in one layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerAudit {
    pub year: i32,
    pub layer: String,
    pub path: String,
    pub exists: bool,
    pub rows: i64,
    pub columns: usize,
}

/// The full audit report as written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub generated_at: String,
    pub entries: Vec<LayerAudit>,
}

fn audit_artifact(year: i32, layer: &str, path: &Path) -> EtlResult<LayerAudit> {
    if !path.exists() {
        return Ok(LayerAudit {
            year,
            layer: layer.to_string(),
            path: path.display().to_string(),
            exists: false,
            rows: 0,
            columns: 0,
        });
    }
    Ok(LayerAudit {
        year,
        layer: layer.to_string(),
        path: path.display().to_string(),
        exists: true,
        rows: parquet_num_rows(path)?,
        columns: parquet_schema(path)?.fields().len(),
    })
}

/// Run the audit over the requested years and persist the report.
pub fn run_layer_audit(years: &[i32], paths: &DataPaths) -> EtlResult<(AuditReport, PathBuf)> {
    let mut entries = Vec::new();
    for &year in years {
        entries.push(audit_artifact(year, "silver", &paths.silver_path(year))?);
        entries.push(audit_artifact(year, "cleaned", &paths.cleaned_path(year))?);
        entries.push(audit_artifact(year, "classes", &paths.classes_path(year))?);
    }

    let missing = entries.iter().filter(|e| !e.exists).count();
    if missing > 0 {
        log::warn!("audit: {missing} artifacts missing across the requested years");
    }

    let report = AuditReport {
        generated_at: Utc::now().to_rfc3339(),
        entries,
    };

    let report_path = paths.audit_report_path();
    if let Some(parent) = report_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let yaml = serde_yaml::to_string(&report).map_err(enem_core::CoreError::from)?;
    std::fs::write(&report_path, yaml)?;
    log::info!("audit report written to {}", report_path.display());

    Ok((report, report_path))
}

#[cfg(test)]
#[path = "audit_test.rs"]
mod tests;
