//! Quality command implementation

use crate::cli::GlobalArgs;
use crate::commands::common::load_environment;
use anyhow::{bail, Context, Result};
use enem_db::{run_gold_checks, DuckDbBackend, Severity};

pub fn execute(global: &GlobalArgs) -> Result<()> {
    let (_, paths) = load_environment(global);
    let db_path = paths.db_path();
    if !db_path.exists() {
        bail!(
            "no database at {}; run `enem backend` first",
            db_path.display()
        );
    }

    let db = DuckDbBackend::open_read_only(&db_path).context("failed to open database")?;
    let checks = run_gold_checks(&db).context("quality checks failed to run")?;

    let mut failing = 0usize;
    for check in &checks {
        let status = if check.passed { "PASS" } else { "FAIL" };
        println!("{status}  {}  {}", check.name, check.details);
        if !check.passed && check.severity == Severity::Error {
            failing += 1;
        }
    }

    if failing > 0 {
        bail!("{failing} of {} checks failed", checks.len());
    }
    println!("all {} checks passed", checks.len());
    Ok(())
}
