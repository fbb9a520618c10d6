use super::client::ClientResolver;
use super::dedup::dedup_records;
use super::record::CallRecord;
use super::tags;
use crate::catalog::index::CatalogIndex;
use crate::catalog::{CatalogRegistry, ServiceCategory};
use crate::parse::annotations::{annotated_records, AnnotationConflict};
use crate::parse::go::{FunctionDecl, GoFile};
use crate::sdk::cache::CacheStats;
use crate::sdk::generated::GeneratedConvention;
use crate::sdk::rest::RestConvention;
use crate::sdk::source::SourceProvider;
use crate::sdk::{ConventionKind, SdkConvention, SdkResolver};

/// Response-extraction helpers share names with SDK calls but never hit the
/// network.
const EXTRACT_PREFIX: &str = "Extract";

/// Resolves the API calls of resource files. Holds every table that outlives
/// a single file.
pub struct Engine<S: SourceProvider> {
    sdk: SdkResolver<S>,
    index: CatalogIndex,
    registry: CatalogRegistry,
    rest: RestConvention,
    generated: GeneratedConvention,
}

impl<S: SourceProvider> Engine<S> {
    pub fn new(
        sdk: SdkResolver<S>,
        index: CatalogIndex,
        registry: CatalogRegistry,
        rest: RestConvention,
        generated: GeneratedConvention,
    ) -> Self {
        Self {
            sdk,
            index,
            registry,
            rest,
            generated,
        }
    }

    pub fn registry(&self) -> &CatalogRegistry {
        &self.registry
    }

    pub fn stats(&self) -> CacheStats {
        self.sdk.stats()
    }

    /// Convention of a resource file: generated SDK imports take precedence.
    pub fn convention_kind(&self, file: &GoFile) -> ConventionKind {
        if self.generated.packages(&file.imports).is_empty() {
            ConventionKind::Rest
        } else {
            ConventionKind::Generated
        }
    }

    /// Deduplicated records of one resource file, including `// API:`
    /// annotations when requested. Conflicting annotations reject the file.
    pub fn resource_records(
        &mut self,
        file: &GoFile,
        annotations: bool,
    ) -> Result<Vec<CallRecord>, AnnotationConflict> {
        let mut records = self.analyze(file);
        if annotations {
            records.extend(annotated_records(file)?);
        }
        Ok(dedup_records(records))
    }

    /// Every resolved SDK call of a file in declaration order, duplicates
    /// included.
    pub fn analyze(&mut self, file: &GoFile) -> Vec<CallRecord> {
        let kind = self.convention_kind(file);
        let Self {
            sdk,
            index,
            registry,
            rest,
            generated,
        } = self;
        let convention: &dyn SdkConvention = match kind {
            ConventionKind::Rest => &*rest,
            ConventionKind::Generated => &*generated,
        };

        let packages = convention.packages(&file.imports);
        if packages.is_empty() {
            tracing::debug!(
                "{} (package {}) imports no SDK package",
                file.path.display(),
                file.package.as_deref().unwrap_or("?")
            );
        }
        let clients = ClientResolver::new(file, convention);
        let lookup = CategoryLookup {
            clients: &clients,
            convention,
            index: &*index,
            registry: &*registry,
        };

        let mut records = Vec::new();
        for function in &file.functions {
            let src = file.function_source(function);
            for package in &packages {
                for call in convention.invocations(src, package) {
                    if call.function.starts_with(EXTRACT_PREFIX) {
                        tracing::debug!("Skipping extraction helper {}", call.function);
                        continue;
                    }
                    let found = sdk.endpoint(convention, &package.import_path, &call.function);
                    let endpoint = match found {
                        Some(endpoint) if !endpoint.url.is_empty() => endpoint,
                        _ => {
                            tracing::debug!(
                                "No URL for {}.{} called in {}",
                                package.alias,
                                call.function,
                                function.name
                            );
                            continue;
                        }
                    };
                    let service = lookup.service(&call.receiver, function);
                    let mut record = CallRecord::from_endpoint(
                        &endpoint,
                        &call.function,
                        service,
                        &package.import_path,
                    );
                    if kind == ConventionKind::Rest && package.alias == tags::TAGS_ALIAS {
                        tags::rewrite_tag_url(&call, &mut record);
                    }
                    tracing::debug!(
                        "{} {} {} via {}",
                        function.name,
                        record.http_method,
                        record.url,
                        record.sdk_path
                    );
                    records.push(record);
                }
            }

            if kind == ConventionKind::Rest {
                if let Some(helper) = tags::find_tag_helper(src) {
                    let service = lookup.service(&helper.receiver, function);
                    records.push(tags::tag_helper_record(&helper, service));
                }
            }
        }
        records
    }
}

struct CategoryLookup<'a> {
    clients: &'a ClientResolver<'a>,
    convention: &'a dyn SdkConvention,
    index: &'a CatalogIndex,
    registry: &'a CatalogRegistry,
}

impl CategoryLookup<'_> {
    /// Service category of the client held by `receiver`. Untraceable
    /// clients are `unknown`; a client without a registry entry gets an
    /// empty category.
    fn service(&self, receiver: &str, function: &FunctionDecl) -> ServiceCategory {
        let binding = match self.clients.resolve(receiver, function) {
            Ok(binding) => binding,
            Err(miss) => {
                tracing::warn!(
                    "Unresolved client {} in {} (line {}): {}",
                    receiver,
                    function.name,
                    function.line,
                    miss
                );
                return ServiceCategory::unknown();
            }
        };
        let Some(key) = self.convention.category_for(&binding.constructor, self.index) else {
            tracing::error!(
                "No service category for client {} held by {}",
                binding.constructor,
                binding.receiver
            );
            return ServiceCategory::default();
        };
        match self.registry.get(&key) {
            Some(category) => category.clone(),
            None => {
                tracing::error!("Cannot find service catalog of {key}");
                ServiceCategory::default()
            }
        }
    }
}
