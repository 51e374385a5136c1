//! Class engineering
//!
//! Derives categorical columns over the cleaned layer: standardized age
//! bands, a global score quantile label, and an income-bracket category.
//! The streaming variant merges per-batch value frequencies into a single
//! summary table instead of holding the dataset in memory.

use crate::error::{EtlError, EtlResult};
use crate::stream::should_stream;
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use enem_core::{DataPaths, HardwareProfile, Subject};
use enem_frame::gold::ClassSummaryRow;
use enem_frame::{
    open_batch_reader, write_batch, CandidateFrame, IncrementalParquetWriter,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const CLASS_COLUMNS: [&str; 3] = [
    "CLASS_FAIXA_ETARIA",
    "CLASS_NOTA_GLOBAL",
    "CLASS_RENDA_FAMILIAR",
];

/// Standardized age bands for demographic slices.
pub fn faixa_etaria(idade: Option<i16>) -> &'static str {
    match idade {
        None => "NA",
        Some(v) if v < 15 => "<15",
        Some(v) if v <= 17 => "15-17",
        Some(v) if v <= 20 => "18-20",
        Some(v) if v <= 25 => "21-25",
        Some(v) if v <= 35 => "26-35",
        Some(v) if v <= 50 => "36-50",
        Some(_) => "50+",
    }
}

/// Quantile label for a score value.
pub fn nota_quantil(nota: f64) -> &'static str {
    if nota < 400.0 {
        "BAIXA"
    } else if nota < 600.0 {
        "MEDIA"
    } else if nota < 800.0 {
        "ALTA"
    } else {
        "EXCELENTE"
    }
}

/// Global label from the language and math scores, ignoring missing values;
/// "NA" when both are missing.
pub fn nota_global(linguagens: Option<f32>, matematica: Option<f32>) -> &'static str {
    let values: Vec<f64> = [linguagens, matematica]
        .into_iter()
        .flatten()
        .map(f64::from)
        .collect();
    if values.is_empty() {
        return "NA";
    }
    nota_quantil(values.iter().sum::<f64>() / values.len() as f64)
}

/// Income bracket letter to salary-range category. Letters outside the
/// mapped vintage pass through unchanged (later-vintage questionnaires use
/// a longer alphabet that consumers bucket themselves).
pub fn renda_categoria(renda: Option<&str>) -> String {
    let Some(raw) = renda else {
        return "NA".to_string();
    };
    let upper = raw.trim().to_uppercase();
    match upper.as_str() {
        "A" => "0-1 SM".to_string(),
        "B" => "1-3 SM".to_string(),
        "C" => "3-5 SM".to_string(),
        "D" => "5-10 SM".to_string(),
        "E" => "10+ SM".to_string(),
        "" => "NA".to_string(),
        other => other.to_string(),
    }
}

/// Derived class values for every row of a frame, in [`CLASS_COLUMNS`] order.
pub fn derive_classes(frame: &CandidateFrame) -> [Vec<String>; 3] {
    let mut faixa = Vec::with_capacity(frame.len());
    let mut global = Vec::with_capacity(frame.len());
    let mut renda = Vec::with_capacity(frame.len());
    for row in 0..frame.len() {
        faixa.push(faixa_etaria(frame.idade[row]).to_string());
        global.push(
            nota_global(
                frame.nota(Subject::LinguagensCodigos, row),
                frame.nota(Subject::Matematica, row),
            )
            .to_string(),
        );
        renda.push(renda_categoria(frame.renda_familiar[row].as_deref()));
    }
    [faixa, global, renda]
}

/// Schema of the classes artifact: the canonical columns plus the three
/// derived class columns.
pub fn classes_schema() -> SchemaRef {
    let base = CandidateFrame::schema();
    let mut fields: Vec<Field> = base
        .fields()
        .iter()
        .map(|f| f.as_ref().clone())
        .collect();
    for name in CLASS_COLUMNS {
        fields.push(Field::new(name, DataType::Utf8, false));
    }
    Arc::new(Schema::new(fields))
}

/// Candidate batch extended with the derived class columns.
pub fn classes_batch(frame: &CandidateFrame) -> EtlResult<RecordBatch> {
    let base = frame.to_record_batch()?;
    let classes = derive_classes(frame);
    let mut columns: Vec<ArrayRef> = base.columns().to_vec();
    for values in classes {
        let array: StringArray = values.iter().map(|v| Some(v.as_str())).collect();
        columns.push(Arc::new(array));
    }
    RecordBatch::try_new(classes_schema(), columns).map_err(|e| EtlError::Frame(e.into()))
}

/// Merge one frame's class-value frequencies into running counters.
fn merge_summary(counts: &mut BTreeMap<(String, String), i64>, classes: &[Vec<String>; 3]) {
    for (name, values) in CLASS_COLUMNS.iter().zip(classes) {
        for value in values {
            *counts.entry((name.to_string(), value.clone())).or_insert(0) += 1;
        }
    }
}

fn summary_rows(counts: BTreeMap<(String, String), i64>) -> Vec<ClassSummaryRow> {
    counts
        .into_iter()
        .map(|((class_name, class_value), total)| ClassSummaryRow {
            class_name,
            class_value,
            total,
        })
        .collect()
}

/// Result of a class-engineering run for one year.
#[derive(Debug, Clone)]
pub struct ClassRunResult {
    pub year: i32,
    pub classes_path: PathBuf,
    pub row_count: u64,
    pub summary: Vec<ClassSummaryRow>,
    pub streamed: bool,
}

/// Stream the class pipeline over a cleaned artifact.
pub fn stream_class_pipeline(
    clean_path: &Path,
    classes_path: &Path,
    chunk_rows: usize,
) -> EtlResult<(u64, Vec<ClassSummaryRow>)> {
    let (_, reader) = open_batch_reader(clean_path, chunk_rows.max(1))?;
    let mut writer = IncrementalParquetWriter::create(classes_path)?;
    let mut counts = BTreeMap::new();

    for batch in reader {
        let frame = CandidateFrame::from_record_batch(&batch?)?;
        merge_summary(&mut counts, &derive_classes(&frame));
        writer.write(&classes_batch(&frame)?)?;
    }

    let rows = writer.finish(&classes_schema())?;
    Ok((rows, summary_rows(counts)))
}

/// Build the classes artifact for one year, streaming when the profile
/// demands it. The per-class value-frequency summary is written next to
/// the per-year artifacts.
pub fn build_classes_for_year(
    year: i32,
    paths: &DataPaths,
    profile: &HardwareProfile,
    force_streaming: bool,
) -> EtlResult<ClassRunResult> {
    let clean_path = paths.cleaned_path(year);
    if !clean_path.exists() {
        return Err(EtlError::ArtifactMissing {
            path: clean_path.display().to_string(),
        });
    }
    let classes_path = paths.classes_path(year);

    let streamed = should_stream(&clean_path, profile, force_streaming)?;
    let (row_count, summary) = if streamed {
        log::info!("year {year}: class engineering in streaming mode");
        stream_class_pipeline(&clean_path, &classes_path, profile.csv_chunk_rows)?
    } else {
        let frame = enem_frame::read_frame(&clean_path)?;
        let mut counts = BTreeMap::new();
        merge_summary(&mut counts, &derive_classes(&frame));
        write_batch(&classes_batch(&frame)?, &classes_path)?;
        (frame.len() as u64, summary_rows(counts))
    };

    let summary_path = paths
        .classes_dir()
        .join(format!("classes_summary_{year}.parquet"));
    write_batch(&ClassSummaryRow::to_record_batch(&summary)?, &summary_path)?;

    Ok(ClassRunResult {
        year,
        classes_path,
        row_count,
        summary,
        streamed,
    })
}

#[cfg(test)]
#[path = "classes_test.rs"]
mod tests;
