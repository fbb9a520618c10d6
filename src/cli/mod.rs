pub mod autogen;
pub mod config;
pub mod scan;
pub mod sdk;

use crate::errors::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "apiscan",
    version,
    about = "Extract the cloud API calls made by Terraform provider resources"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan provider sources and write one API document per resource
    Scan(scan::ScanArgs),
    /// Convert the API descriptions of generated resources into documents
    Autogen(autogen::AutogenArgs),
    /// Print the endpoint table of one SDK package directory
    Sdk(sdk::SdkArgs),
    /// Inspect resolved configuration
    Config(config::ConfigArgs),
}

/// Dispatch to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Scan(args) => scan::run(&args),
        Commands::Autogen(args) => autogen::run(&args),
        Commands::Sdk(args) => sdk::run(&args),
        Commands::Config(args) => config::run(&args),
    }
}
