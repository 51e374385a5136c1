//! enem-core - Core library for the ENEM aggregation engine
//!
//! This crate provides the shared vocabulary used across the pipeline:
//! runtime settings, data-layer path conventions, the hardware profile that
//! bounds batch sizes, the canonical candidate schema (with 26 years of
//! column aliases), score-bracket configuration, and the reference metadata
//! contract consumed by the cleaning stage.

pub mod brackets;
pub mod error;
pub mod hardware;
pub mod metadata;
pub mod paths;
pub mod schema;
pub mod settings;
pub mod subject;

pub use brackets::{load_brackets, ScoreBracket};
pub use error::{CoreError, CoreResult};
pub use hardware::{resolve_profile, HardwareProfile};
pub use metadata::{ColumnMeta, ReferenceMetadata};
pub use paths::DataPaths;
pub use schema::{CanonicalColumn, ColumnKind, CANONICAL_COLUMNS};
pub use settings::Settings;
pub use subject::Subject;
