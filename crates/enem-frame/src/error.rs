//! Error types for enem-frame

use thiserror::Error;

/// Columnar-layer errors. All of these are structural: data-quality
/// problems never surface here.
#[derive(Error, Debug)]
pub enum FrameError {
    /// F001: Arrow error
    #[error("[F001] Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// F002: Parquet error
    #[error("[F002] Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// F003: IO error with file path context
    #[error("[F003] Failed to access '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// F004: A batch arrived with a schema that differs from the one the
    /// output artifact was opened with (fatal mid-stream)
    #[error("[F004] Output schema mismatch in '{path}': {detail}")]
    SchemaMismatch { path: String, detail: String },

    /// F005: A required column is missing or has an unexpected type
    #[error("[F005] Column '{column}' unavailable: {detail}")]
    ColumnUnavailable { column: String, detail: String },
}

/// Result type alias for FrameError
pub type FrameResult<T> = Result<T, FrameError>;
