use crate::config::resolve::{resolve_config, CliOverrides};
use crate::config::show::render_show;
use crate::errors::{ApiscanError, Result};
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print every resolved setting and the layer it came from
    Show {
        /// Section to print, e.g. `paths` or `targeting`
        section: Option<String>,
        /// Provider checkout to resolve from (defaults to current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

pub fn run(args: &ConfigArgs) -> Result<()> {
    let ConfigAction::Show { section, path } = &args.action;
    let working_dir = resolve_working_dir(path.as_deref())?;
    let config = resolve_config(&working_dir, &CliOverrides::default())?;
    render_show(&mut std::io::stdout().lock(), &config, section.as_deref())?;
    Ok(())
}

/// Canonical working directory for a command, `.` when none is given.
pub(crate) fn resolve_working_dir(path: Option<&Path>) -> Result<PathBuf> {
    let dir = path.unwrap_or(Path::new("."));
    dir.canonicalize().map_err(|e| {
        ApiscanError::Config(format!("Invalid path: {} ({e})", dir.display()))
    })
}
