use crate::sdk::SdkEndpoint;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Counters reported at the end of a scan.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub sdk_packages: usize,
    pub url_files: usize,
    pub endpoints: usize,
    pub lookups: usize,
}

/// Memoization tables shared by every resource file of a run.
///
/// Entries are written once and never invalidated. A directory or URL file
/// is marked as parsed before its contents are inspected, so a failed
/// resolution is remembered as well and the file is never read twice.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    /// `<url file>.<builder function>` -> URL template
    url_by_uri_function: HashMap<String, String>,
    /// `<sdk directory>.<function>` -> endpoint
    endpoint_by_sdk_function: HashMap<String, SdkEndpoint>,
    parsed_url_files: HashSet<PathBuf>,
    parsed_sdk_dirs: HashSet<PathBuf>,
    lookups: usize,
}

fn key(path: &Path, function: &str) -> String {
    format!("{}.{}", path.display(), function)
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the directory was already marked.
    pub fn mark_sdk_dir(&mut self, dir: &Path) -> bool {
        self.parsed_sdk_dirs.insert(dir.to_path_buf())
    }

    pub fn insert_endpoint(&mut self, dir: &Path, function: &str, endpoint: SdkEndpoint) {
        self.endpoint_by_sdk_function
            .entry(key(dir, function))
            .or_insert(endpoint);
    }

    pub fn endpoint(&mut self, dir: &Path, function: &str) -> Option<&SdkEndpoint> {
        self.lookups += 1;
        self.endpoint_by_sdk_function.get(&key(dir, function))
    }

    pub fn mark_url_file(&mut self, file: &Path) -> bool {
        self.parsed_url_files.insert(file.to_path_buf())
    }

    pub fn insert_url(&mut self, file: &Path, function: &str, url: String) {
        self.url_by_uri_function
            .entry(key(file, function))
            .or_insert(url);
    }

    pub fn url(&self, file: &Path, function: &str) -> Option<&str> {
        self.url_by_uri_function
            .get(&key(file, function))
            .map(String::as_str)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            sdk_packages: self.parsed_sdk_dirs.len(),
            url_files: self.parsed_url_files.len(),
            endpoints: self.endpoint_by_sdk_function.len(),
            lookups: self.lookups,
        }
    }
}
