use std::path::{Path, PathBuf};

pub const IGNORE_FILE: &str = ".apiscanignore";

/// Exclude globs from the nearest `.apiscanignore`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreFile {
    pub path: Option<PathBuf>,
    pub patterns: Vec<String>,
}

/// Find `.apiscanignore` in `start` or the closest ancestor. An unreadable
/// file is treated as absent.
pub fn find_ignore_file(start: &Path) -> IgnoreFile {
    let Some(path) = start
        .ancestors()
        .map(|dir| dir.join(IGNORE_FILE))
        .find(|p| p.is_file())
    else {
        return IgnoreFile::default();
    };
    match std::fs::read_to_string(&path) {
        Ok(content) => IgnoreFile {
            patterns: parse_ignore_patterns(&content),
            path: Some(path),
        },
        Err(e) => {
            tracing::warn!("Cannot read {}: {}", path.display(), e);
            IgnoreFile::default()
        }
    }
}

/// Gitignore-style lines as globs: blank lines and `#` comments are
/// dropped, a trailing `/` matches everything under the directory.
fn parse_ignore_patterns(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|l| match l.strip_suffix('/') {
            Some(dir) => format!("{dir}/**"),
            None => l.to_string(),
        })
        .collect()
}
