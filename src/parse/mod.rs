pub mod annotations;
pub mod go;
pub mod schema;

use regex::Regex;

/// Compile a pattern built from source identifiers. Interpolated names must
/// already be escaped; a pattern that still fails to compile is logged and
/// treated as a non-match.
pub fn dynamic_pattern(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::debug!("Invalid pattern {pattern}: {e}");
            None
        }
    }
}

/// Resource name of a provider source file: file stem with a trailing
/// `_v<N>` version suffix removed.
pub fn resource_name(file_stem: &str) -> String {
    static VERSION_SUFFIX: std::sync::LazyLock<Regex> =
        std::sync::LazyLock::new(|| Regex::new(r"_v\d+$").expect("valid regex"));
    VERSION_SUFFIX.replace(file_stem, "").into_owned()
}
