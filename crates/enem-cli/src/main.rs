//! ENEM aggregation engine CLI

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::{audit, backend, classes, etl, gold, profile, quality};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.global.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match &cli.command {
        cli::Commands::Etl(args) => etl::execute(args, &cli.global),
        cli::Commands::Classes(args) => classes::execute(args, &cli.global),
        cli::Commands::Gold(args) => gold::execute(args, &cli.global),
        cli::Commands::Backend(args) => backend::execute(args, &cli.global),
        cli::Commands::Quality => quality::execute(&cli.global),
        cli::Commands::Audit(args) => audit::execute(args, &cli.global),
        cli::Commands::Profile => profile::execute(),
    }
}
