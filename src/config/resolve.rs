use crate::config::provenance::{ProvenanceMap, Source};
use crate::config::schema::FileConfig;
use crate::config::ResolvedConfig;
use crate::errors::{ApiscanError, Result};
use crate::output::OutputFormat;
use clap::ValueEnum;
use std::path::{Path, PathBuf};

/// CLI overrides extracted from command arguments.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub base_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub provider: Option<String>,
    pub version: Option<String>,
    pub schema: Option<PathBuf>,
    pub filter: Option<String>,
    pub exclude: Vec<String>,
    pub format: Option<OutputFormat>,
    pub quiet: bool,
}

/// Resolve configuration by applying layers bottom-up:
/// 1. Built-in defaults
/// 2. User config (~/.config/apiscan/config.toml)
/// 3. Project config (nearest .apiscan.toml walking up from working_dir)
/// 4. CLI overrides
pub fn resolve_config(working_dir: &Path, cli: &CliOverrides) -> Result<ResolvedConfig> {
    let mut prov = ProvenanceMap::new();
    let mut loaded_files = Vec::new();

    // 1. Start with built-in defaults
    let mut config = ResolvedConfig::defaults();
    config.paths.base_path = working_dir.to_path_buf();
    set_all_default_provenance(&mut prov);

    // 2. User config
    if let Some(user_config_path) = find_user_config() {
        if user_config_path.exists() {
            let file_config = read_config_file(&user_config_path, "user")?;
            apply_file_config(
                &mut config,
                &file_config,
                Source::UserConfig(user_config_path.clone()),
                None,
                &mut prov,
            );
            loaded_files.push(user_config_path);
        }
    }

    // 3. Project config (walk up from working_dir)
    if let Some(project_config_path) = find_project_config(working_dir) {
        let file_config = read_config_file(&project_config_path, "project")?;
        apply_file_config(
            &mut config,
            &file_config,
            Source::ProjectConfig(project_config_path.clone()),
            project_config_path.parent(),
            &mut prov,
        );
        loaded_files.push(project_config_path);
    }

    // 4. CLI overrides
    apply_cli_overrides(&mut config, cli, &mut prov);

    let ignore_file = crate::config::ignore::find_ignore_file(working_dir);
    if let Some(path) = ignore_file.path {
        tracing::debug!("{} ignore patterns from {}", ignore_file.patterns.len(), path.display());
        prov.set("targeting.ignore_patterns", Source::IgnoreFile(path));
        config.ignore_patterns = ignore_file.patterns;
    }

    config.provenance = prov;
    config.loaded_files = loaded_files;

    Ok(config)
}

fn read_config_file(path: &Path, layer: &str) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path).map_err(|_| {
        ApiscanError::Config(format!(
            "Could not read {layer} config: {}",
            path.display()
        ))
    })?;
    FileConfig::from_toml(&content)
        .map_err(|e| ApiscanError::Config(format!("Invalid {layer} config: {e}")))
}

fn find_user_config() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("apiscan").join("config.toml"))
}

fn find_project_config(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let config_path = dir.join(".apiscan.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

fn set_all_default_provenance(prov: &mut ProvenanceMap) {
    let defaults = [
        "defaults.provider",
        "defaults.version",
        "defaults.output_dir",
        "defaults.format",
        "defaults.quiet",
        "defaults.host",
        "paths.base_path",
        "paths.source_dir",
        "paths.config_file",
        "paths.hc_config_file",
        "paths.catalog_file",
        "paths.vendor_dir",
        "paths.schema",
        "sdk.rest_prefix",
        "sdk.generated_prefix",
        "targeting.filter",
        "targeting.exclude",
        "targeting.skip_dirs",
        "targeting.deprecated",
        "targeting.generated_markers",
        "targeting.pending_upgrade",
        "targeting.annotations",
        "companions",
    ];
    for key in defaults {
        prov.set(key, Source::Default);
    }
}

/// `base_path` from a project file is relative to the file's directory.
fn apply_file_config(
    config: &mut ResolvedConfig,
    file: &FileConfig,
    source: Source,
    config_dir: Option<&Path>,
    prov: &mut ProvenanceMap,
) {
    // Defaults
    if let Some(ref provider) = file.defaults.provider {
        config.provider = provider.clone();
        prov.set("defaults.provider", source.clone());
    }
    if let Some(ref version) = file.defaults.version {
        config.version = version.clone();
        prov.set("defaults.version", source.clone());
    }
    if let Some(ref output_dir) = file.defaults.output_dir {
        config.output_dir = PathBuf::from(output_dir);
        prov.set("defaults.output_dir", source.clone());
    }
    if let Some(ref format) = file.defaults.format {
        match OutputFormat::from_str(format, true) {
            Ok(f) => {
                config.format = f;
                prov.set("defaults.format", source.clone());
            }
            Err(_) => tracing::warn!("Ignoring unknown format '{format}' from {source}"),
        }
    }
    if let Some(quiet) = file.defaults.quiet {
        config.quiet = quiet;
        prov.set("defaults.quiet", source.clone());
    }
    if let Some(ref host) = file.defaults.host {
        config.host = host.clone();
        prov.set("defaults.host", source.clone());
    }

    // Paths
    let paths = &mut config.paths;
    if let Some(ref base_path) = file.paths.base_path {
        paths.base_path = match config_dir {
            Some(dir) => dir.join(base_path),
            None => PathBuf::from(base_path),
        };
        prov.set("paths.base_path", source.clone());
    }
    let path_fields: [(&Option<String>, &mut PathBuf, &str); 5] = [
        (&file.paths.source_dir, &mut paths.source_dir, "paths.source_dir"),
        (&file.paths.config_file, &mut paths.config_file, "paths.config_file"),
        (&file.paths.hc_config_file, &mut paths.hc_config_file, "paths.hc_config_file"),
        (&file.paths.catalog_file, &mut paths.catalog_file, "paths.catalog_file"),
        (&file.paths.vendor_dir, &mut paths.vendor_dir, "paths.vendor_dir"),
    ];
    for (value, slot, key) in path_fields {
        if let Some(value) = value {
            *slot = PathBuf::from(value);
            prov.set(key, source.clone());
        }
    }
    if let Some(ref schema) = file.paths.schema {
        paths.schema = Some(PathBuf::from(schema));
        prov.set("paths.schema", source.clone());
    }

    // SDK
    if let Some(ref prefix) = file.sdk.rest_prefix {
        config.sdk.rest_prefix = prefix.clone();
        prov.set("sdk.rest_prefix", source.clone());
    }
    if let Some(ref prefix) = file.sdk.generated_prefix {
        config.sdk.generated_prefix = prefix.clone();
        prov.set("sdk.generated_prefix", source.clone());
    }

    // Targeting
    let targeting = &mut config.targeting;
    if let Some(ref filter) = file.targeting.filter {
        targeting.filter = Some(filter.clone());
        prov.set("targeting.filter", source.clone());
    }
    if !file.targeting.exclude.is_empty() {
        targeting.exclude = file.targeting.exclude.clone();
        prov.set("targeting.exclude", source.clone());
    }
    let list_fields: [(&Option<Vec<String>>, &mut Vec<String>, &str); 4] = [
        (&file.targeting.skip_dirs, &mut targeting.skip_dirs, "targeting.skip_dirs"),
        (&file.targeting.deprecated, &mut targeting.deprecated, "targeting.deprecated"),
        (
            &file.targeting.generated_markers,
            &mut targeting.generated_markers,
            "targeting.generated_markers",
        ),
        (
            &file.targeting.pending_upgrade,
            &mut targeting.pending_upgrade,
            "targeting.pending_upgrade",
        ),
    ];
    for (value, slot, key) in list_fields {
        if let Some(value) = value {
            *slot = value.clone();
            prov.set(key, source.clone());
        }
    }
    if let Some(annotations) = file.targeting.annotations {
        targeting.annotations = annotations;
        prov.set("targeting.annotations", source.clone());
    }

    // Companions extend the built-in table
    if !file.companions.is_empty() {
        config.companions.extend(file.companions.clone());
        prov.set("companions", source.clone());
    }
}

fn apply_cli_overrides(config: &mut ResolvedConfig, cli: &CliOverrides, prov: &mut ProvenanceMap) {
    if let Some(ref base_path) = cli.base_path {
        config.paths.base_path = base_path.clone();
        prov.set("paths.base_path", Source::CliFlag("--path".into()));
    }
    if let Some(ref output_dir) = cli.output_dir {
        config.output_dir = output_dir.clone();
        prov.set("defaults.output_dir", Source::CliFlag("--output-dir".into()));
    }
    if let Some(ref provider) = cli.provider {
        config.provider = provider.clone();
        prov.set("defaults.provider", Source::CliFlag("--provider".into()));
    }
    if let Some(ref version) = cli.version {
        config.version = version.clone();
        prov.set("defaults.version", Source::CliFlag("--version".into()));
    }
    if let Some(ref schema) = cli.schema {
        config.paths.schema = Some(schema.clone());
        prov.set("paths.schema", Source::CliFlag("--schema".into()));
    }
    if let Some(ref filter) = cli.filter {
        config.targeting.filter = Some(filter.clone());
        prov.set("targeting.filter", Source::CliFlag("--filter".into()));
    }
    if !cli.exclude.is_empty() {
        config.targeting.exclude = cli.exclude.clone();
        prov.set("targeting.exclude", Source::CliFlag("--exclude".into()));
    }
    if let Some(format) = cli.format {
        config.format = format;
        prov.set("defaults.format", Source::CliFlag("--format".into()));
    }
    if cli.quiet {
        config.quiet = true;
        prov.set("defaults.quiet", Source::CliFlag("--quiet".into()));
    }
}
