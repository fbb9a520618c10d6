use crate::cli::config::resolve_working_dir;
use crate::config::resolve::{resolve_config, CliOverrides};
use crate::config::ResolvedConfig;
use crate::errors::{ApiscanError, Result};
use crate::output::autogen::AutogenApi;
use crate::output::document::{output_name, ApiDocument};
use crate::output::OutputFormat;
use crate::parse::schema::ProviderSchema;
use crate::walk::discover_api_descriptions;
use clap::Args;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Args)]
pub struct AutogenArgs {
    /// Directory holding the generated resources' API description files
    pub input_dir: PathBuf,

    /// Provider repository root used for configuration (defaults to current directory)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Directory for the converted API documents
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Provider name substituted into document titles and file names
    #[arg(long)]
    pub provider: Option<String>,

    /// Provider version written into every document
    #[arg(long = "version", value_name = "VERSION")]
    pub api_version: Option<String>,

    /// Output of `terraform providers schema -json`
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Document format
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Suppress the summary line
    #[arg(long)]
    pub quiet: bool,
}

/// Outcome of a conversion run.
#[derive(Debug, Default)]
pub struct AutogenSummary {
    pub documents: Vec<PathBuf>,
    /// Description files left out: not exported or unreadable
    pub skipped: usize,
}

pub fn run(args: &AutogenArgs) -> Result<()> {
    let start = Instant::now();
    let working_dir = resolve_working_dir(args.path.as_deref())?;
    let cli = CliOverrides {
        base_path: args.path.as_ref().map(|_| working_dir.clone()),
        output_dir: args.output_dir.clone(),
        provider: args.provider.clone(),
        version: args.api_version.clone(),
        schema: args.schema.clone(),
        format: args.format,
        quiet: args.quiet,
        ..CliOverrides::default()
    };
    let config = resolve_config(&working_dir, &cli)?;
    let summary = convert(&config, &args.input_dir)?;

    if !config.quiet {
        eprintln!(
            "Converted {} generated resources ({} skipped) in {:.2}s",
            summary.documents.len(),
            summary.skipped,
            start.elapsed().as_secs_f64()
        );
    }
    Ok(())
}

/// Convert every exported description file under `input_dir`.
pub fn convert(config: &ResolvedConfig, input_dir: &Path) -> Result<AutogenSummary> {
    let schema = match &config.paths.schema {
        Some(path) => ProviderSchema::load(&config.paths.base_path.join(path), &config.provider)?,
        None => ProviderSchema::accept_all(&config.provider),
    };

    let inputs = discover_api_descriptions(input_dir);
    if inputs.is_empty() {
        return Err(ApiscanError::NoFiles {
            path: input_dir.to_path_buf(),
        });
    }

    let output_dir = config.paths.base_path.join(&config.output_dir);
    std::fs::create_dir_all(&output_dir)?;

    let mut summary = AutogenSummary::default();
    for input in &inputs {
        let Some(resource) = input.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if !schema.is_exported(resource) {
            tracing::debug!("{resource} is not exported by {}", config.provider);
            summary.skipped += 1;
            continue;
        }
        let api = match std::fs::read_to_string(input)
            .map_err(ApiscanError::from)
            .and_then(|content| AutogenApi::from_yaml(&content))
        {
            Ok(api) => api,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", input.display(), e);
                summary.skipped += 1;
                continue;
            }
        };

        let document = ApiDocument::from_autogen(resource, &api, &config.provider, &config.version);
        tracing::debug!("{}: {} paths", resource, document.paths.len());
        let target = output_dir.join(format!(
            "{}.{}",
            output_name(resource, &config.provider),
            config.format.extension()
        ));
        let mut out = std::io::BufWriter::new(std::fs::File::create(&target)?);
        document.write(&mut out, config.format)?;
        out.flush()?;
        summary.documents.push(target);
    }

    tracing::info!(
        "Converted {} of {} description files",
        summary.documents.len(),
        inputs.len()
    );
    Ok(summary)
}
