//! Cleaning stage
//!
//! Validates numeric ranges, quarantines duplicates, sanitizes value
//! domains and emits an auditable report. Designed to always produce
//! output: bad data is routed to quarantine, never raised.

pub mod pipeline;
pub mod rules;
pub mod streaming;

pub use pipeline::{clean_year, run_cleaning_pipeline, CleaningArtifacts, CleaningRunResult};
pub use rules::{NumericRule, DEFAULT_NUMERIC_RULES};
pub use streaming::{stream_clean_to_parquet, StreamingCleaningResult};
