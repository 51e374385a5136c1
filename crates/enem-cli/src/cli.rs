//! Command-line interface definition

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "enem",
    version,
    about = "ENEM microdata aggregation engine",
    long_about = "Ingests annual ENEM microdata, cleans it, derives gold aggregate \
                  tables and materializes them into an embedded DuckDB backend."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Data lake root directory
    #[arg(long, env = "ENEM_DATA_DIR", default_value = "data", global = true)]
    pub data_dir: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Year selection shared by the processing commands.
#[derive(Args, Clone)]
pub struct YearArgs {
    /// Single year to process (e.g. 2022)
    #[arg(short = 'a', long)]
    pub year: Option<i32>,

    /// First year of an inclusive range
    #[arg(long)]
    pub from: Option<i32>,

    /// Last year of an inclusive range
    #[arg(long)]
    pub to: Option<i32>,

    /// Explicit comma-separated list of years (e.g. 1998,1999,2000)
    #[arg(long, value_delimiter = ',')]
    pub years: Option<Vec<i32>>,
}

impl YearArgs {
    /// Resolve to a sorted, deduplicated year list; defaults to every
    /// configured year when nothing is given.
    pub fn resolve(&self, settings: &enem_core::Settings) -> Vec<i32> {
        if let Some(years) = &self.years {
            let mut sorted: Vec<i32> = years.clone();
            sorted.sort_unstable();
            sorted.dedup();
            return sorted;
        }
        if let Some(year) = self.year {
            return vec![year];
        }
        if self.from.is_some() || self.to.is_some() {
            let mut restricted = settings.clone();
            restricted.restrict_years(self.from, self.to);
            return restricted.years;
        }
        settings.years.clone()
    }
}

#[derive(Args)]
pub struct EtlArgs {
    #[command(flatten)]
    pub years: YearArgs,

    /// Force the streaming path regardless of input size
    #[arg(long)]
    pub force_streaming: bool,
}

#[derive(Args)]
pub struct ClassesArgs {
    #[command(flatten)]
    pub years: YearArgs,

    /// Force the streaming path regardless of input size
    #[arg(long)]
    pub force_streaming: bool,
}

#[derive(Args)]
pub struct GoldArgs {
    #[command(flatten)]
    pub years: YearArgs,

    /// Score-bracket configuration file
    #[arg(long, default_value = "config/faixas_media.yml")]
    pub brackets_config: PathBuf,
}

#[derive(Args)]
pub struct BackendArgs {
    #[command(flatten)]
    pub years: YearArgs,

    /// Score-bracket configuration file
    #[arg(long, default_value = "config/faixas_media.yml")]
    pub brackets_config: PathBuf,

    /// Register views only; skip table materialization and the gate
    #[arg(long)]
    pub views_only: bool,

    /// Materialize from existing gold artifacts without rebuilding them
    #[arg(long)]
    pub skip_build: bool,
}

#[derive(Args)]
pub struct AuditArgs {
    #[command(flatten)]
    pub years: YearArgs,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run raw → silver → cleaned for the selected years
    Etl(EtlArgs),
    /// Derive class-engineering columns over the cleaned layer
    Classes(ClassesArgs),
    /// Build every gold aggregate table
    Gold(GoldArgs),
    /// Initialize the SQL backend (views + materialized tables + gate)
    Backend(BackendArgs),
    /// Run the data quality checks against the materialized backend
    Quality,
    /// Row/column audit of the silver, cleaned and classes layers
    Audit(AuditArgs),
    /// Print the resolved hardware profile
    Profile,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
