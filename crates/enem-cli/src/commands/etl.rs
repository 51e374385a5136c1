//! Etl command implementation

use crate::cli::{EtlArgs, GlobalArgs};
use crate::commands::common::load_environment;
use anyhow::{bail, Result};
use enem_core::{resolve_profile, ReferenceMetadata};
use enem_etl::workflow::run_etl_for_years;

pub fn execute(args: &EtlArgs, global: &GlobalArgs) -> Result<()> {
    let (settings, paths) = load_environment(global);
    let years = args.years.resolve(&settings);
    let profile = resolve_profile();
    let metadata = ReferenceMetadata::load(&paths.metadata_path())?;

    let results = run_etl_for_years(&years, &paths, &profile, &metadata, args.force_streaming);

    let mut failed = 0usize;
    for (year, outcome) in &results {
        match outcome {
            Ok(result) => println!(
                "{year}: {} silver rows, {} cleaned rows ({} invalid, {} duplicates){}",
                result.silver.row_count,
                result.cleaning.row_count,
                result.cleaning.invalid_count,
                result.cleaning.duplicate_count,
                if result.cleaning.streamed { " [streamed]" } else { "" },
            ),
            Err(e) => {
                failed += 1;
                eprintln!("{year}: FAILED — {e}");
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} years failed", results.len());
    }
    Ok(())
}
