//! Parquet read/write helpers
//!
//! All artifacts are written with Snappy compression. The incremental
//! writer is the backbone of every streaming stage: the first batch pins
//! the output schema, later batches must conform, and an input that yields
//! no batches still produces an empty artifact with the expected schema so
//! downstream consumers never see "file not found" for a legitimately
//! empty year.

use crate::candidate::CandidateFrame;
use crate::error::{FrameError, FrameResult};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::{Path, PathBuf};

fn io_err(path: &Path, source: std::io::Error) -> FrameError {
    FrameError::IoWithPath {
        path: path.display().to_string(),
        source,
    }
}

fn create_output_file(path: &Path) -> FrameResult<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(path, e))?;
    }
    File::create(path).map_err(|e| io_err(path, e))
}

fn writer_props() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

/// Write a single record batch as a complete artifact.
pub fn write_batch(batch: &RecordBatch, path: &Path) -> FrameResult<()> {
    let file = create_output_file(path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(writer_props()))?;
    writer.write(batch)?;
    writer.close()?;
    log::info!("wrote {} rows to {}", batch.num_rows(), path.display());
    Ok(())
}

/// Write an empty artifact carrying the expected schema.
pub fn write_empty(schema: &SchemaRef, path: &Path) -> FrameResult<()> {
    let batch = RecordBatch::new_empty(schema.clone());
    write_batch(&batch, path)
}

/// Write a candidate frame as one artifact.
pub fn write_frame(frame: &CandidateFrame, path: &Path) -> FrameResult<()> {
    write_batch(&frame.to_record_batch()?, path)
}

/// Read a whole artifact into a candidate frame.
pub fn read_frame(path: &Path) -> FrameResult<CandidateFrame> {
    let mut out = CandidateFrame::default();
    let (_, reader) = open_batch_reader(path, 65_536)?;
    for batch in reader {
        let chunk = CandidateFrame::from_record_batch(&batch?)?;
        out.append(&chunk);
    }
    Ok(out)
}

/// Open a batch reader over a Parquet artifact, returning the file schema
/// and an iterator of record batches of at most `batch_size` rows.
pub fn open_batch_reader(
    path: &Path,
    batch_size: usize,
) -> FrameResult<(SchemaRef, impl Iterator<Item = FrameResult<RecordBatch>>)> {
    let file = File::open(path).map_err(|e| io_err(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let reader = builder.with_batch_size(batch_size.max(1)).build()?;
    Ok((schema, reader.map(|r| r.map_err(FrameError::from))))
}

/// Read every batch of an artifact (test and audit helper).
pub fn read_all_batches(path: &Path) -> FrameResult<Vec<RecordBatch>> {
    let (_, reader) = open_batch_reader(path, 65_536)?;
    reader.collect()
}

/// Arrow schema of a Parquet artifact, without reading row data.
pub fn parquet_schema(path: &Path) -> FrameResult<SchemaRef> {
    let file = File::open(path).map_err(|e| io_err(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    Ok(builder.schema().clone())
}

/// Total row count of a Parquet artifact from its footer metadata.
pub fn parquet_num_rows(path: &Path) -> FrameResult<i64> {
    let file = File::open(path).map_err(|e| io_err(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    Ok(builder.metadata().file_metadata().num_rows())
}

/// Incremental Parquet writer for streaming stages.
///
/// The first written batch defines the artifact schema; every subsequent
/// batch must match it exactly or the stream aborts with a structural
/// error. `finish` closes the artifact, writing an empty file with the
/// provided fallback schema when no batch ever arrived.
pub struct IncrementalParquetWriter {
    path: PathBuf,
    writer: Option<ArrowWriter<File>>,
    schema: Option<SchemaRef>,
    rows: u64,
}

impl IncrementalParquetWriter {
    pub fn create(path: &Path) -> FrameResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_err(path, e))?;
        }
        Ok(Self {
            path: path.to_path_buf(),
            writer: None,
            schema: None,
            rows: 0,
        })
    }

    pub fn rows_written(&self) -> u64 {
        self.rows
    }

    /// Append one batch, opening the artifact on first use.
    pub fn write(&mut self, batch: &RecordBatch) -> FrameResult<()> {
        match (&mut self.writer, &self.schema) {
            (None, _) => {
                let file = File::create(&self.path).map_err(|e| io_err(&self.path, e))?;
                let writer = ArrowWriter::try_new(file, batch.schema(), Some(writer_props()))?;
                self.schema = Some(batch.schema());
                self.writer = Some(writer);
            }
            (Some(_), Some(schema)) => {
                if batch.schema() != *schema {
                    return Err(FrameError::SchemaMismatch {
                        path: self.path.display().to_string(),
                        detail: format!(
                            "batch schema {:?} differs from first batch {:?}",
                            batch.schema().fields(),
                            schema.fields()
                        ),
                    });
                }
            }
            (Some(_), None) => unreachable!("writer open implies schema pinned"),
        }

        if let Some(writer) = &mut self.writer {
            writer.write(batch)?;
            self.rows += batch.num_rows() as u64;
        }
        Ok(())
    }

    /// Close the artifact, materializing an empty file with `empty_schema`
    /// when no batch was ever written. Returns the total row count.
    pub fn finish(self, empty_schema: &SchemaRef) -> FrameResult<u64> {
        match self.writer {
            Some(writer) => {
                writer.close()?;
                log::info!("wrote {} rows to {}", self.rows, self.path.display());
                Ok(self.rows)
            }
            None => {
                write_empty(empty_schema, &self.path)?;
                log::info!(
                    "no batches produced; wrote empty artifact {}",
                    self.path.display()
                );
                Ok(0)
            }
        }
    }
}

#[cfg(test)]
#[path = "io_test.rs"]
mod tests;
