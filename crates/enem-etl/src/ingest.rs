//! Raw CSV ingestion
//!
//! Microdata dumps are semicolon-delimited with a header row. Most years
//! ship Latin-1 encoded, a few UTF-8; decoding is per cell (valid UTF-8 is
//! taken as-is, anything else is read as Latin-1, whose bytes map 1:1 onto
//! code points). Rows are yielded in bounded chunks so ingestion memory is
//! capped by the hardware profile regardless of file size.

use crate::error::{EtlError, EtlResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One bounded chunk of raw rows, still untyped.
#[derive(Debug, Clone)]
pub struct RawChunk {
    /// Header names shared by every chunk of the same file
    pub headers: Arc<Vec<String>>,
    /// Cells in header order; short rows are padded with `None`
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawChunk {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Decode a raw cell: UTF-8 when valid, Latin-1 otherwise.
fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Decode and trim a cell; empty cells become `None`.
fn decode_cell(bytes: &[u8]) -> Option<String> {
    let text = decode_text(bytes);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Chunked reader over one raw CSV file.
pub struct CsvChunkReader {
    reader: csv::Reader<std::fs::File>,
    headers: Arc<Vec<String>>,
    chunk_rows: usize,
    path: PathBuf,
    done: bool,
}

impl CsvChunkReader {
    pub fn open(path: &Path, chunk_rows: usize) -> EtlResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(|e| EtlError::Csv {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        let headers: Vec<String> = reader
            .byte_headers()
            .map_err(|e| EtlError::Csv {
                path: path.display().to_string(),
                message: e.to_string(),
            })?
            .iter()
            .map(decode_text)
            .map(|h| h.trim().to_string())
            .collect();

        Ok(Self {
            reader,
            headers: Arc::new(headers),
            chunk_rows: chunk_rows.max(1),
            path: path.to_path_buf(),
            done: false,
        })
    }

    pub fn headers(&self) -> &Arc<Vec<String>> {
        &self.headers
    }
}

impl Iterator for CsvChunkReader {
    type Item = EtlResult<RawChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let width = self.headers.len();
        let mut rows = Vec::with_capacity(self.chunk_rows.min(65_536));
        let mut record = csv::ByteRecord::new();

        while rows.len() < self.chunk_rows {
            match self.reader.read_byte_record(&mut record) {
                Ok(true) => {
                    let mut cells: Vec<Option<String>> =
                        record.iter().take(width).map(decode_cell).collect();
                    // Short rows happen in malformed dumps; pad instead of raising.
                    cells.resize(width, None);
                    rows.push(cells);
                }
                Ok(false) => {
                    self.done = true;
                    break;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(EtlError::Csv {
                        path: self.path.display().to_string(),
                        message: e.to_string(),
                    }));
                }
            }
        }

        if rows.is_empty() {
            None
        } else {
            Some(Ok(RawChunk {
                headers: self.headers.clone(),
                rows,
            }))
        }
    }
}

#[cfg(test)]
#[path = "ingest_test.rs"]
mod tests;
