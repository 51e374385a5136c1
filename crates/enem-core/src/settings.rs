//! Central runtime settings

use std::path::PathBuf;

/// Years covered by the microdata archive (1998 through 2024).
pub const FIRST_YEAR: i32 = 1998;
pub const LAST_YEAR: i32 = 2024;

/// Central settings for an engine run.
///
/// The data directory can be overridden with `ENEM_DATA_DIR`; everything
/// else is derived from it via [`crate::paths::DataPaths`].
#[derive(Debug, Clone)]
pub struct Settings {
    /// Root of the data lake (raw/silver/gold layers live underneath)
    pub data_dir: PathBuf,

    /// Years configured for processing, ascending
    pub years: Vec<i32>,
}

impl Settings {
    /// Build settings from the environment, falling back to `./data`.
    pub fn from_env() -> Self {
        let data_dir = std::env::var("ENEM_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));
        Self::with_data_dir(data_dir)
    }

    /// Build settings rooted at an explicit data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            years: (FIRST_YEAR..=LAST_YEAR).collect(),
        }
    }

    /// Restrict the configured years to an inclusive range.
    pub fn restrict_years(&mut self, start: Option<i32>, end: Option<i32>) {
        let lo = start.unwrap_or(FIRST_YEAR);
        let hi = end.unwrap_or(LAST_YEAR);
        self.years.retain(|y| (lo..=hi).contains(y));
    }
}
