use crate::catalog::index::{CatalogIndex, ConstructorStyle};
use crate::catalog::CatalogRegistry;
use crate::cli::config::resolve_working_dir;
use crate::config::resolve::{resolve_config, CliOverrides};
use crate::config::ResolvedConfig;
use crate::errors::{ApiscanError, Result};
use crate::output::document::{output_name, ApiDocument, DocumentSettings};
use crate::output::OutputFormat;
use crate::parse::go::{append_companion, GoFile, GoParser};
use crate::parse::resource_name;
use crate::parse::schema::ProviderSchema;
use crate::resolve::engine::Engine;
use crate::sdk::cache::CacheStats;
use crate::sdk::generated::GeneratedConvention;
use crate::sdk::rest::RestConvention;
use crate::sdk::source::FsSource;
use crate::sdk::SdkResolver;
use crate::walk::{self, DiscoveryOptions, SkipReason, SkippedFile};
use clap::Args;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

pub const SKIP_LIST_FILE: &str = "skip_files.txt";

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Provider repository root (defaults to current directory)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Directory for the generated API documents
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

    /// Only scan resource files whose path contains this text
    #[arg(long)]
    pub filter: Option<String>,

    /// Exclude glob patterns
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Document format
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Suppress progress output
    #[arg(long)]
    pub quiet: bool,
}

/// Outcome of a scan run.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    pub documents: Vec<PathBuf>,
    pub skipped: Vec<SkippedFile>,
    pub records: usize,
    /// Records whose client could not be traced
    pub unresolved: usize,
    pub stats: CacheStats,
}

pub fn run(args: &ScanArgs) -> Result<()> {
    let start = Instant::now();
    let working_dir = resolve_working_dir(args.path.as_deref())?;
    let cli = CliOverrides {
        base_path: args.path.as_ref().map(|_| working_dir.clone()),
        output_dir: args.output_dir.clone(),
        provider: args.provider.clone(),
        version: args.api_version.clone(),
        schema: args.schema.clone(),
        filter: args.filter.clone(),
        exclude: args.exclude.clone(),
        format: args.format,
        quiet: args.quiet,
    };
    let config = resolve_config(&working_dir, &cli)?;
    let summary = scan(&config)?;

    if !config.quiet {
        eprintln!(
            "Wrote {} documents ({} records, {} with unknown service, {} files skipped) in {:.2}s",
            summary.documents.len(),
            summary.records,
            summary.unresolved,
            summary.skipped.len(),
            start.elapsed().as_secs_f64()
        );
    }
    Ok(())
}

/// Run the whole pipeline for a resolved configuration.
pub fn scan(config: &ResolvedConfig) -> Result<ScanSummary> {
    let index = build_index(config)?;
    let registry = CatalogRegistry::load(&config.paths.catalog_path())?;
    tracing::info!(
        "Loaded {} config functions and {} service catalogs",
        index.len(),
        registry.len()
    );
    if index.is_empty() || registry.is_empty() {
        tracing::warn!("No client constructors or service catalogs found; categories will be blank");
    }

    let schema = match &config.paths.schema {
        Some(path) => ProviderSchema::load(&config.paths.base_path.join(path), &config.provider)?,
        None => ProviderSchema::accept_all(&config.provider),
    };

    let root = config
        .paths
        .source_root()
        .canonicalize()
        .map_err(|_| ApiscanError::NoFiles {
            path: config.paths.source_root(),
        })?;
    let ignore_and_exclude: Vec<String> = config
        .targeting
        .exclude
        .iter()
        .chain(&config.ignore_patterns)
        .cloned()
        .collect();
    let discovery = walk::discover_resources(
        &root,
        &DiscoveryOptions {
            filter: config.targeting.filter.as_deref(),
            exclude: &ignore_and_exclude,
            skip_dirs: &config.targeting.skip_dirs,
            deprecated: &config.targeting.deprecated,
            generated_markers: &config.targeting.generated_markers,
            schema: &schema,
        },
    )?;
    if discovery.resources.is_empty() {
        return Err(ApiscanError::NoFiles { path: root });
    }

    let companions = companions_by_resource(&config.companions);
    let skipped = Mutex::new(discovery.skipped);

    // Progress bar for parsing phase
    let progress = if !config.quiet {
        let pb = indicatif::ProgressBar::new(discovery.resources.len() as u64);
        pb.set_style(
            indicatif::ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} files ({eta})")
                .unwrap()
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    // Parallel parse: one tree-sitter parser per rayon worker
    let parsed: Vec<GoFile> = discovery
        .resources
        .par_iter()
        .map_init(GoParser::new, |parser, path| {
            if let Some(ref pb) = progress {
                pb.inc(1);
            }
            let result = match parser {
                Ok(parser) => read_resource(parser, path, &companions),
                Err(e) => Err(ApiscanError::ParseError {
                    file: path.clone(),
                    message: e.to_string(),
                }),
            };
            match result {
                Ok(file) => Some(file),
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                    if let Ok(mut skipped) = skipped.lock() {
                        skipped.push(SkippedFile {
                            path: path.clone(),
                            reason: SkipReason::Unparseable(e.to_string()),
                        });
                    }
                    None
                }
            }
        })
        .flatten()
        .collect();

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    let mut skipped = skipped.into_inner().unwrap_or_default();

    // Sequential resolution: the SDK caches are shared by every file
    let sdk = SdkResolver::new(FsSource, config.paths.vendor_root())?;
    let mut engine = Engine::new(
        sdk,
        index,
        registry,
        RestConvention::new(&config.sdk.rest_prefix),
        GeneratedConvention::new(&config.sdk.generated_prefix),
    );

    let output_dir = config.paths.base_path.join(&config.output_dir);
    std::fs::create_dir_all(&output_dir)?;
    let settings = DocumentSettings {
        provider: config.provider.clone(),
        version: config.version.clone(),
        host: config.host.clone(),
    };

    let mut summary = ScanSummary::default();
    for file in &parsed {
        let stem = file
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let resource = resource_name(stem);
        let records = match engine.resource_records(file, config.targeting.annotations) {
            Ok(records) => records,
            Err(conflict) => {
                tracing::warn!("Skipping {}: {}", file.path.display(), conflict);
                skipped.push(SkippedFile {
                    path: file.path.clone(),
                    reason: SkipReason::ConflictingAnnotations(conflict.to_string()),
                });
                continue;
            }
        };
        tracing::debug!("{}: {} records", resource, records.len());
        summary.records += records.len();
        summary.unresolved += records.iter().filter(|r| r.service.is_unknown()).count();

        let document = ApiDocument::build(
            &resource,
            &records,
            config.targeting.is_pending_upgrade(&resource),
            &settings,
            engine.registry(),
        );
        let target = output_dir.join(format!(
            "{}.{}",
            output_name(&resource, &config.provider),
            config.format.extension()
        ));
        let mut out = std::io::BufWriter::new(std::fs::File::create(&target)?);
        document.write(&mut out, config.format)?;
        out.flush()?;
        summary.documents.push(target);
    }

    skipped.sort_by(|a, b| a.path.cmp(&b.path));
    write_skip_list(&output_dir.join(SKIP_LIST_FILE), &skipped)?;
    summary.skipped = skipped;

    summary.stats = engine.stats();
    tracing::info!(
        "Parsed {} SDK packages and {} URL files ({} endpoints) for {} lookups",
        summary.stats.sdk_packages,
        summary.stats.url_files,
        summary.stats.endpoints,
        summary.stats.lookups
    );

    Ok(summary)
}

/// Config constructor index. The primary config file is required, the
/// generated-SDK config file is optional.
fn build_index(config: &ResolvedConfig) -> Result<CatalogIndex> {
    let mut parser = GoParser::new()?;
    let mut index = CatalogIndex::new();

    let config_path = config.paths.config_path();
    let bytes = std::fs::read(&config_path).map_err(|_| ApiscanError::MissingInput {
        what: "provider config file",
        path: config_path.clone(),
    })?;
    let config_file = parser.parse_bytes(&config_path, bytes)?;
    index.ingest(&config_file, ConstructorStyle::ServiceClient);

    let hc_path = config.paths.hc_config_path();
    match std::fs::read(&hc_path) {
        Ok(bytes) => match parser.parse_bytes(&hc_path, bytes) {
            Ok(hc_file) => {
                index.ingest(&hc_file, ConstructorStyle::HcClient);
            }
            Err(e) => tracing::warn!("Skipping {}: {}", hc_path.display(), e),
        },
        Err(_) => tracing::debug!("No generated-SDK config at {}", hc_path.display()),
    }
    Ok(index)
}

/// resource file name -> companion file names
fn companions_by_resource(companions: &BTreeMap<String, String>) -> BTreeMap<&str, Vec<&str>> {
    let mut by_resource: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (companion, resource) in companions {
        by_resource
            .entry(resource.as_str())
            .or_default()
            .push(companion.as_str());
    }
    by_resource
}

/// Read and parse a resource file with its companions appended.
fn read_resource(
    parser: &mut GoParser,
    path: &Path,
    companions: &BTreeMap<&str, Vec<&str>>,
) -> Result<GoFile> {
    let bytes = std::fs::read(path)?;
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let Some(extra) = companions.get(name) else {
        return parser.parse_bytes(path, bytes);
    };

    let mut source = String::from_utf8(bytes).map_err(|_| ApiscanError::ParseError {
        file: path.to_path_buf(),
        message: "not valid UTF-8".to_string(),
    })?;
    for companion in extra {
        let companion_path = path.with_file_name(companion);
        match std::fs::read_to_string(&companion_path) {
            Ok(companion_src) => {
                tracing::debug!("Appending {} to {}", companion, name);
                source = append_companion(&source, &companion_src);
            }
            Err(e) => tracing::debug!("No companion {}: {}", companion_path.display(), e),
        }
    }
    parser.parse_source(path, source)
}

fn write_skip_list(path: &Path, skipped: &[SkippedFile]) -> Result<()> {
    let mut out = std::io::BufWriter::new(std::fs::File::create(path)?);
    for entry in skipped {
        writeln!(out, "{}: {}", entry.path.display(), entry.reason)?;
    }
    out.flush()?;
    Ok(())
}
