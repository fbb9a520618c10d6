use crate::errors::{ApiscanError, Result};
use crate::output::OutputFormat;
use crate::sdk::generated::GeneratedConvention;
use crate::sdk::rest::RestConvention;
use crate::sdk::source::{FsSource, SourceProvider};
use crate::sdk::{ConventionKind, EndpointTable, SdkConvention, SdkResolver};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct SdkArgs {
    /// SDK package directory
    pub dir: PathBuf,

    /// Output format
    #[arg(long, default_value = "yaml")]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
pub struct PackageReport {
    pub convention: ConventionKind,
    pub directory: PathBuf,
    pub functions: EndpointTable,
}

pub fn run(args: &SdkArgs) -> Result<()> {
    let report = package_report(&args.dir)?;
    let mut stdout = std::io::stdout().lock();
    match args.format {
        OutputFormat::Yaml => serde_yaml::to_writer(&mut stdout, &report)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut stdout, &report)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

/// Endpoint table of one package directory, generated layout first.
pub fn package_report(dir: &Path) -> Result<PackageReport> {
    let generated = GeneratedConvention::default();
    let rest = RestConvention::default();
    let convention: &dyn SdkConvention = if generated.detect(dir, &FsSource) {
        &generated
    } else if rest.detect(dir, &FsSource) {
        &rest
    } else {
        return Err(ApiscanError::Config(format!(
            "not an SDK package directory: {}",
            dir.display()
        )));
    };

    let mut resolver = SdkResolver::new(FsSource, PathBuf::new())?;
    let functions = resolver.resolve_dir(convention, dir).unwrap_or_default();
    tracing::debug!(
        "{} {} functions in {}",
        functions.len(),
        convention.kind(),
        dir.display()
    );
    Ok(PackageReport {
        convention: convention.kind(),
        directory: dir.to_path_buf(),
        functions,
    })
}
