//! Audit command implementation

use crate::cli::{AuditArgs, GlobalArgs};
use crate::commands::common::load_environment;
use anyhow::{Context, Result};
use enem_etl::audit::run_layer_audit;

pub fn execute(args: &AuditArgs, global: &GlobalArgs) -> Result<()> {
    let (settings, paths) = load_environment(global);
    let years = args.years.resolve(&settings);

    let (report, report_path) =
        run_layer_audit(&years, &paths).context("layer audit failed")?;

    let present = report.entries.iter().filter(|e| e.exists).count();
    println!(
        "audited {} artifacts ({present} present) — report at {}",
        report.entries.len(),
        report_path.display()
    );
    Ok(())
}
