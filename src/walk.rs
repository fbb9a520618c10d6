use crate::errors::Result;
use crate::parse::schema::ProviderSchema;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::io::{BufRead, BufReader};
use std::path::{Component, Path, PathBuf};

/// Lines scanned for a generated-code marker.
const MARKER_LINES: usize = 20;

const RESOURCE_PREFIXES: [&str; 2] = ["resource_", "data_source_"];

/// Why a resource file was left out of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    SkipDir(String),
    Deprecated(String),
    Excluded,
    NotExported,
    Generated(String),
    Unparseable(String),
    ConflictingAnnotations(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::SkipDir(dir) => write!(f, "under skipped directory {dir}"),
            SkipReason::Deprecated(name) => write!(f, "deprecated ({name})"),
            SkipReason::Excluded => write!(f, "excluded by pattern"),
            SkipReason::NotExported => write!(f, "not exported by the provider schema"),
            SkipReason::Generated(marker) => write!(f, "generated code ({marker})"),
            SkipReason::Unparseable(message) => write!(f, "unparseable: {message}"),
            SkipReason::ConflictingAnnotations(message) => {
                write!(f, "conflicting API annotations: {message}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Resource files to analyze and the ones that were skipped, both sorted.
#[derive(Debug, Default)]
pub struct Discovery {
    pub resources: Vec<PathBuf>,
    pub skipped: Vec<SkippedFile>,
}

/// Filters applied while walking the provider sources.
#[derive(Debug)]
pub struct DiscoveryOptions<'a> {
    pub filter: Option<&'a str>,
    pub exclude: &'a [String],
    pub skip_dirs: &'a [String],
    pub deprecated: &'a [String],
    pub generated_markers: &'a [String],
    pub schema: &'a ProviderSchema,
}

/// Whether a file name looks like a resource or data source implementation.
pub fn is_resource_file(name: &str) -> bool {
    name.ends_with(".go")
        && !name.ends_with("_test.go")
        && RESOURCE_PREFIXES.iter().any(|p| name.starts_with(p))
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// Discover resource files under `root`.
///
/// - Respects `.gitignore`
/// - Ignores non-resource files and `*_test.go`
/// - Records every filtered resource file with its reason
/// - Returns sorted paths for deterministic output
pub fn discover_resources(root: &Path, opts: &DiscoveryOptions<'_>) -> Result<Discovery> {
    let exclude_set = build_globset(opts.exclude)?;

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .build();

    let mut discovery = Discovery::default();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::debug!("Walk error: {e}");
                continue;
            }
        };

        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !is_resource_file(name) {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        if let Some(filter) = opts.filter {
            if !relative.to_string_lossy().contains(filter) {
                continue;
            }
        }

        match skip_reason(path, relative, name, &exclude_set, opts) {
            Some(reason) => {
                tracing::info!("Skipping {}: {}", path.display(), reason);
                discovery.skipped.push(SkippedFile {
                    path: path.to_path_buf(),
                    reason,
                });
            }
            None => discovery.resources.push(path.to_path_buf()),
        }
    }

    // Sort for deterministic output
    discovery.resources.sort();
    discovery.skipped.sort_by(|a, b| a.path.cmp(&b.path));

    Ok(discovery)
}

/// API description files (`*.yaml`) of generated resources under `root`,
/// sorted.
pub fn discover_api_descriptions(root: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .build()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e.into_path()),
            Err(e) => {
                tracing::debug!("Walk error: {e}");
                None
            }
        })
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "yaml"))
        .collect();
    found.sort();
    found
}

fn skip_reason(
    path: &Path,
    relative: &Path,
    name: &str,
    exclude_set: &GlobSet,
    opts: &DiscoveryOptions<'_>,
) -> Option<SkipReason> {
    let parent = relative.parent().unwrap_or(Path::new(""));
    for component in parent.components() {
        if let Component::Normal(dir) = component {
            let dir = dir.to_string_lossy();
            if opts.skip_dirs.iter().any(|s| *s == dir) {
                return Some(SkipReason::SkipDir(dir.into_owned()));
            }
        }
    }

    if let Some(stem) = opts.deprecated.iter().find(|d| name.contains(d.as_str())) {
        return Some(SkipReason::Deprecated(stem.clone()));
    }

    if exclude_set.is_match(relative) || exclude_set.is_match(path) || exclude_set.is_match(name) {
        return Some(SkipReason::Excluded);
    }

    let stem = name.trim_end_matches(".go");
    if !opts.schema.is_exported(stem) {
        return Some(SkipReason::NotExported);
    }

    generated_marker(path, opts.generated_markers).map(SkipReason::Generated)
}

/// First configured marker found in the head of a file.
fn generated_marker(path: &Path, markers: &[String]) -> Option<String> {
    if markers.is_empty() {
        return None;
    }
    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::debug!("Cannot open {}: {}", path.display(), e);
            return None;
        }
    };
    BufReader::new(file)
        .lines()
        .take(MARKER_LINES)
        .map_while(|line| line.ok())
        .find_map(|line| markers.iter().find(|m| line.contains(m.as_str())).cloned())
}
