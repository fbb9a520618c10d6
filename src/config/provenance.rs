use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Where a configuration value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Default,
    UserConfig(PathBuf),
    ProjectConfig(PathBuf),
    IgnoreFile(PathBuf),
    CliFlag(String),
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Default => write!(f, "default"),
            Source::UserConfig(path) => write!(f, "user config ({})", path.display()),
            Source::ProjectConfig(path) => write!(f, "project config ({})", path.display()),
            Source::IgnoreFile(path) => write!(f, "ignore file ({})", path.display()),
            Source::CliFlag(name) => write!(f, "CLI flag ({})", name),
        }
    }
}

/// Source of each setting, keyed `section.name` (or just `section` for
/// table-valued sections such as `companions`).
#[derive(Debug, Clone, Default)]
pub struct ProvenanceMap {
    entries: BTreeMap<String, Source>,
}

impl ProvenanceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, source: Source) {
        self.entries.insert(key.into(), source);
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&Source> {
        self.entries.get(key)
    }

    pub fn sorted_entries(&self) -> Vec<(&str, &Source)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v)).collect()
    }

    /// Entries of one section. `paths` matches `paths.vendor_dir` but not
    /// `paths_extra.x`.
    pub fn section_entries(&self, section: &str) -> Vec<(&str, &Source)> {
        self.entries
            .iter()
            .filter(|(k, _)| section_of(k) == section)
            .map(|(k, v)| (k.as_str(), v))
            .collect()
    }

    /// Distinct section names, sorted.
    pub fn sections(&self) -> BTreeSet<&str> {
        self.entries.keys().map(|k| section_of(k)).collect()
    }
}

fn section_of(key: &str) -> &str {
    key.split_once('.').map_or(key, |(section, _)| section)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProvenanceMap {
        let mut map = ProvenanceMap::new();
        map.set("defaults.provider", Source::Default);
        map.set("paths.config_file", Source::Default);
        map.set(
            "paths.vendor_dir",
            Source::ProjectConfig(PathBuf::from("/project/.apiscan.toml")),
        );
        map.set("companions", Source::Default);
        map
    }

    #[test]
    fn later_layers_overwrite() {
        let mut map = sample();
        map.set("paths.vendor_dir", Source::CliFlag("--path".to_string()));
        assert_eq!(
            map.get("paths.vendor_dir"),
            Some(&Source::CliFlag("--path".to_string()))
        );
        assert_eq!(map.get("paths.schema"), None);
    }

    #[test]
    fn section_entries_match_whole_section_names() {
        let mut map = sample();
        map.set("pathsx.other", Source::Default);

        let keys: Vec<&str> = map.section_entries("paths").iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["paths.config_file", "paths.vendor_dir"]);
        assert_eq!(map.section_entries("companions").len(), 1);
        assert!(map.section_entries("rules").is_empty());
    }

    #[test]
    fn sections_are_distinct() {
        let map = sample();
        let sections: Vec<&str> = map.sections().into_iter().collect();
        assert_eq!(sections, vec!["companions", "defaults", "paths"]);
    }

    #[test]
    fn source_display() {
        assert_eq!(format!("{}", Source::Default), "default");
        assert_eq!(
            format!(
                "{}",
                Source::ProjectConfig(PathBuf::from("/project/.apiscan.toml"))
            ),
            "project config (/project/.apiscan.toml)"
        );
        assert_eq!(
            format!("{}", Source::IgnoreFile(PathBuf::from("/project/.apiscanignore"))),
            "ignore file (/project/.apiscanignore)"
        );
        assert_eq!(
            format!("{}", Source::CliFlag("--provider".to_string())),
            "CLI flag (--provider)"
        );
    }
}
