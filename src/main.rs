mod catalog;
mod cli;
mod config;
mod errors;
mod output;
mod parse;
mod resolve;
mod sdk;
mod walk;

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> miette::Result<()> {
    // Warnings about skipped files and unresolved clients show by default
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    cli::dispatch(cli::Cli::parse()).map_err(miette::Report::new)
}
