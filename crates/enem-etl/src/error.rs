//! Error types for enem-etl

use enem_core::CoreError;
use enem_frame::FrameError;
use thiserror::Error;

/// Pipeline error type.
///
/// Only structural problems surface here; data-quality issues are always
/// routed to quarantine frames and cleaning reports instead.
#[derive(Error, Debug)]
pub enum EtlError {
    /// P001: Raw source file missing for a requested year
    #[error("[P001] Raw input not found for year {year}: {path}")]
    RawInputMissing { year: i32, path: String },

    /// P002: Expected intermediate artifact missing
    #[error("[P002] Artifact not found: {path}")]
    ArtifactMissing { path: String },

    /// P003: CSV read failure
    #[error("[P003] CSV read failed for '{path}': {message}")]
    Csv { path: String, message: String },

    /// P004: Aggregation engine failure
    #[error("[P004] Aggregation engine failed: {0}")]
    Engine(String),

    /// P005: Core error
    #[error("[P005] {0}")]
    Core(#[from] CoreError),

    /// P006: Columnar layer error
    #[error("[P006] {0}")]
    Frame(#[from] FrameError),

    /// P007: IO error
    #[error("[P007] IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for EtlError
pub type EtlResult<T> = Result<T, EtlError>;

impl From<duckdb::Error> for EtlError {
    fn from(err: duckdb::Error) -> Self {
        EtlError::Engine(err.to_string())
    }
}
