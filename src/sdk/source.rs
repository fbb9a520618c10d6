use std::path::Path;

/// Filesystem access used while resolving SDK packages.
pub trait SourceProvider {
    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>>;

    fn is_file(&self, path: &Path) -> bool;

    /// Names of the regular files directly inside `dir`, sorted.
    fn list_files(&self, dir: &Path) -> std::io::Result<Vec<String>>;
}

/// Reads straight from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSource;

impl SourceProvider for FsSource {
    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn list_files(&self, dir: &Path) -> std::io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
pub mod memory {
    use super::SourceProvider;
    use std::cell::Cell;
    use std::collections::BTreeMap;
    use std::path::{Path, PathBuf};

    /// In-memory source tree that counts reads.
    #[derive(Debug, Default)]
    pub struct MemorySource {
        files: BTreeMap<PathBuf, String>,
        reads: Cell<usize>,
    }

    impl MemorySource {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_file(mut self, path: impl Into<PathBuf>, content: &str) -> Self {
            self.files.insert(path.into(), content.to_string());
            self
        }

        pub fn reads(&self) -> usize {
            self.reads.get()
        }
    }

    impl SourceProvider for MemorySource {
        fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
            self.reads.set(self.reads.get() + 1);
            self.files
                .get(path)
                .map(|s| s.as_bytes().to_vec())
                .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound))
        }

        fn is_file(&self, path: &Path) -> bool {
            self.files.contains_key(path)
        }

        fn list_files(&self, dir: &Path) -> std::io::Result<Vec<String>> {
            Ok(self
                .files
                .keys()
                .filter(|p| p.parent() == Some(dir))
                .filter_map(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .collect())
        }
    }
}
