//! Classes command implementation

use crate::cli::{ClassesArgs, GlobalArgs};
use crate::commands::common::load_environment;
use anyhow::{bail, Result};
use enem_core::resolve_profile;
use enem_etl::classes::build_classes_for_year;

pub fn execute(args: &ClassesArgs, global: &GlobalArgs) -> Result<()> {
    let (settings, paths) = load_environment(global);
    let years = args.years.resolve(&settings);
    let profile = resolve_profile();

    let mut failed = 0usize;
    for year in &years {
        match build_classes_for_year(*year, &paths, &profile, args.force_streaming) {
            Ok(result) => println!(
                "{year}: {} class rows in {} value groups{}",
                result.row_count,
                result.summary.len(),
                if result.streamed { " [streamed]" } else { "" },
            ),
            Err(e) => {
                failed += 1;
                eprintln!("{year}: FAILED — {e}");
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} years failed", years.len());
    }
    Ok(())
}
