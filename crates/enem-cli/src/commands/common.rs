//! Shared command helpers

use crate::cli::GlobalArgs;
use enem_core::{DataPaths, Settings};

/// Settings and paths for the invocation's data directory.
pub fn load_environment(global: &GlobalArgs) -> (Settings, DataPaths) {
    let settings = Settings::with_data_dir(global.data_dir.clone());
    let paths = DataPaths::new(&settings);
    (settings, paths)
}
