pub mod cache;
pub mod generated;
pub mod overrides;
pub mod rest;
pub mod source;

use crate::catalog::index::CatalogIndex;
use crate::errors::Result;
use crate::parse::go::{GoFile, GoImport, GoParser};
use crate::resolve::record::HttpMethod;
use cache::{CacheStats, ResolutionCache};
use serde::Serialize;
use source::SourceProvider;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Which SDK source layout a package follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConventionKind {
    /// Generic REST client: `requests.go` + `urls.go`
    Rest,
    /// Generated request/response SDK: `*_client.go` + `*_meta.go`
    Generated,
}

impl std::fmt::Display for ConventionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConventionKind::Rest => write!(f, "rest"),
            ConventionKind::Generated => write!(f, "generated"),
        }
    }
}

/// An SDK package imported by a resource file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkPackage {
    pub alias: String,
    pub import_path: String,
}

/// A call into an SDK found in a resource function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub function: String,
    /// Variable holding the service client
    pub receiver: String,
    /// Text following the receiver on the same line
    pub trailing: String,
}

/// URL template and verb of one SDK function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SdkEndpoint {
    pub url: String,
    pub method: HttpMethod,
}

pub type EndpointTable = BTreeMap<String, SdkEndpoint>;

/// How a client parameter is bound when the receiver is a function parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterClient {
    /// Supplied by a caller at this 1-based argument position
    ViaCaller { position: usize },
    /// The parameter type names the client directly
    Typed(String),
}

/// Order in which a convention looks for the origin of a client variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientLookup {
    /// Parameters of the enclosing function, then local declarations
    ParametersFirst,
    /// Local declarations, then parameters of plain (non-method) functions
    DeclarationsFirst,
}

/// Everything a convention may touch while resolving one package directory.
pub struct SdkContext<'a> {
    pub source: &'a dyn SourceProvider,
    pub parser: &'a mut GoParser,
    pub cache: &'a mut ResolutionCache,
}

impl SdkContext<'_> {
    /// Read and parse an SDK file. Failures are logged and yield `None`.
    pub fn parse_file(&mut self, path: &Path) -> Option<GoFile> {
        let bytes = match self.source.read(path) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", path.display(), e);
                return None;
            }
        };
        match self.parser.parse_bytes(path, bytes) {
            Ok(file) => Some(file),
            Err(e) => {
                tracing::warn!("{e}");
                None
            }
        }
    }

    /// First of `names` present in `dir`.
    pub fn first_existing(&self, dir: &Path, names: &[&str]) -> Option<PathBuf> {
        names
            .iter()
            .map(|name| dir.join(name))
            .find(|path| self.source.is_file(path))
    }
}

/// Strategy for one SDK generation.
pub trait SdkConvention {
    fn kind(&self) -> ConventionKind;

    /// SDK packages among a resource file's imports.
    fn packages(&self, imports: &[GoImport]) -> Vec<SdkPackage>;

    /// SDK calls made in one resource function.
    fn invocations(&self, function_src: &str, package: &SdkPackage) -> Vec<Invocation>;

    /// Build the function table of a package directory. `None` when the
    /// directory does not hold this convention's files.
    fn resolve_package(&self, dir: &Path, ctx: &mut SdkContext<'_>) -> Option<EndpointTable>;

    fn client_lookup(&self) -> ClientLookup {
        ClientLookup::ParametersFirst
    }

    /// Whether `receiver` is a client parameter in `params`.
    fn parameter_client(&self, receiver: &str, params: &str) -> Option<ParameterClient>;

    /// Constructor named by a local declaration of `receiver`.
    fn declared_client(&self, receiver: &str, function_src: &str) -> Option<String>;

    /// Catalog key for a client constructor.
    fn category_for(&self, constructor: &str, index: &CatalogIndex) -> Option<String>;

    /// Whether a directory looks like this convention.
    fn detect(&self, dir: &Path, source: &dyn SourceProvider) -> bool;
}

/// Resolves SDK functions to endpoints, parsing each package directory at
/// most once per run.
pub struct SdkResolver<S: SourceProvider> {
    source: S,
    vendor_root: PathBuf,
    parser: GoParser,
    cache: ResolutionCache,
}

impl<S: SourceProvider> SdkResolver<S> {
    pub fn new(source: S, vendor_root: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            source,
            vendor_root: vendor_root.into(),
            parser: GoParser::new()?,
            cache: ResolutionCache::new(),
        })
    }

    pub fn package_dir(&self, import_path: &str) -> PathBuf {
        self.vendor_root.join(import_path)
    }

    /// Endpoint of `function` in the package at `import_path`.
    pub fn endpoint(
        &mut self,
        convention: &dyn SdkConvention,
        import_path: &str,
        function: &str,
    ) -> Option<SdkEndpoint> {
        let dir = self.package_dir(import_path);
        if self.cache.mark_sdk_dir(&dir) {
            tracing::debug!("Resolving {} package {}", convention.kind(), dir.display());
            if let Some(table) = self.resolve_dir(convention, &dir) {
                for (name, endpoint) in table {
                    self.cache.insert_endpoint(&dir, &name, endpoint);
                }
            } else {
                tracing::debug!("No {} sources in {}", convention.kind(), dir.display());
            }
        }
        self.cache.endpoint(&dir, function).cloned()
    }

    /// Resolve a directory without consulting the endpoint cache.
    pub fn resolve_dir(
        &mut self,
        convention: &dyn SdkConvention,
        dir: &Path,
    ) -> Option<EndpointTable> {
        let mut ctx = SdkContext {
            source: &self.source,
            parser: &mut self.parser,
            cache: &mut self.cache,
        };
        convention.resolve_package(dir, &mut ctx)
    }

    #[cfg(test)]
    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    #[cfg(test)]
    pub fn reset_cache(&mut self) {
        self.cache = ResolutionCache::new();
    }
}

#[cfg(test)]
mod tests {
    use super::rest::RestConvention;
    use super::source::memory::MemorySource;
    use super::*;

    const REQUESTS: &str = r#"package antiddos

func ListStatus(client *golangsdk.ServiceClient, opts ListStatusOpts) (r ListStatusResult) {
    _, r.Err = client.Get(listStatusURL(client), &r.Body, nil)
    return
}
"#;

    const URLS: &str = r#"package antiddos

const statusPath = "status"

func listStatusURL(c *golangsdk.ServiceClient) string {
    return c.ServiceURL(statusPath)
}
"#;

    fn resolver() -> SdkResolver<MemorySource> {
        let source = MemorySource::new()
            .with_file("/vendor/sdk/antiddos/requests.go", REQUESTS)
            .with_file("/vendor/sdk/antiddos/urls.go", URLS);
        SdkResolver::new(source, "/vendor").unwrap()
    }

    #[test]
    fn second_lookup_does_not_touch_filesystem() {
        let rest = RestConvention::default();
        let mut resolver = resolver();

        let first = resolver.endpoint(&rest, "sdk/antiddos", "ListStatus").unwrap();
        let reads = resolver.source().reads();
        let second = resolver.endpoint(&rest, "sdk/antiddos", "ListStatus").unwrap();

        assert_eq!(first, second);
        assert_eq!(first.url, "status");
        assert_eq!(first.method, HttpMethod::Get);
        assert_eq!(resolver.source().reads(), reads);
    }

    #[test]
    fn failed_directory_is_parsed_once() {
        let rest = RestConvention::default();
        let mut resolver = resolver();

        assert!(resolver.endpoint(&rest, "sdk/missing", "Get").is_none());
        assert!(resolver.endpoint(&rest, "sdk/missing", "List").is_none());
        assert_eq!(resolver.stats().sdk_packages, 1);
        assert_eq!(resolver.source().reads(), 0);
    }

    #[test]
    fn reset_forgets_everything() {
        let rest = RestConvention::default();
        let mut resolver = resolver();
        resolver.endpoint(&rest, "sdk/antiddos", "ListStatus");
        let reads = resolver.source().reads();
        resolver.reset_cache();
        assert_eq!(resolver.stats(), CacheStats::default());
        resolver.endpoint(&rest, "sdk/antiddos", "ListStatus");
        assert_eq!(resolver.source().reads(), reads * 2);
    }
}
