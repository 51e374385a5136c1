//! Backend command implementation

use crate::cli::{BackendArgs, GlobalArgs};
use crate::commands::common::load_environment;
use anyhow::{bail, Context, Result};
use enem_core::load_brackets;
use enem_db::{init_sql_backend, BackendState, DbError};

pub fn execute(args: &BackendArgs, global: &GlobalArgs) -> Result<()> {
    let (settings, paths) = load_environment(global);
    let years = args.years.resolve(&settings);
    let brackets =
        load_brackets(&args.brackets_config).context("failed to load bracket config")?;

    let outcome = match init_sql_backend(
        &years,
        &paths,
        &brackets,
        !args.views_only,
        !args.skip_build,
    ) {
        Ok(outcome) => outcome,
        Err(DbError::LockContention(detail)) => {
            bail!("another process is writing to the database ({detail}); retry once it finishes")
        }
        Err(DbError::QualityGate(summary)) => {
            bail!("materialized tables failed the quality gate and must not be trusted: {summary}")
        }
        Err(other) => return Err(other).context("backend initialization failed"),
    };

    match outcome.state {
        BackendState::QualityPassed => println!(
            "SQL backend ready at {} ({} views, {} checks passed)",
            outcome.db_path.display(),
            outcome.views.len(),
            outcome.checks.len(),
        ),
        BackendState::ViewsRegistered => println!(
            "SQL backend at {} with {} views registered (no tables materialized)",
            outcome.db_path.display(),
            outcome.views.len(),
        ),
    }
    Ok(())
}
