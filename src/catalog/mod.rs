pub mod index;

use crate::errors::{ApiscanError, Result};
use crate::parse::go::GoParser;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

/// Name of the registry map in a provider's `endpoints.go`.
pub const CATALOG_VARIABLE: &str = "allServiceCatalog";

/// A backend service as described by the provider's service registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCategory {
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(default, alias = "Version")]
    pub version: String,
    #[serde(default, alias = "ResourceBase")]
    pub resource_base: String,
    #[serde(default, alias = "WithOutProjectID")]
    pub without_project_id: bool,
    #[serde(default, alias = "Product")]
    pub product: String,
}

impl ServiceCategory {
    pub const UNKNOWN: &'static str = "unknown";

    /// Category for calls whose client could not be traced.
    pub fn unknown() -> Self {
        Self::named(Self::UNKNOWN)
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn includes_project_id(&self) -> bool {
        !self.without_project_id
    }

    pub fn is_unknown(&self) -> bool {
        self.name == Self::UNKNOWN
    }
}

static ENTRY_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\w+)\s*:\s*("(?:[^"\\]|\\.)*"|true|false)"#).expect("valid regex")
});

/// Read-only lookup from catalog key to service category.
#[derive(Debug, Clone, Default)]
pub struct CatalogRegistry {
    entries: BTreeMap<String, ServiceCategory>,
}

impl CatalogRegistry {
    pub fn from_entries(entries: impl IntoIterator<Item = (String, ServiceCategory)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Load from `endpoints.go`, YAML or JSON depending on the extension.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|_| ApiscanError::MissingInput {
            what: "service catalog",
            path: path.to_path_buf(),
        })?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        match ext {
            "go" => Self::from_go_source(path, &content),
            "yaml" | "yml" => Ok(Self::from_entries(serde_yaml::from_str::<
                BTreeMap<String, ServiceCategory>,
            >(&content)?)),
            "json" => Ok(Self::from_entries(serde_json::from_str::<
                BTreeMap<String, ServiceCategory>,
            >(&content)?)),
            other => Err(ApiscanError::Config(format!(
                "unsupported service catalog format '{other}': {}",
                path.display()
            ))),
        }
    }

    /// Read the `allServiceCatalog` map literal of a provider config package.
    pub fn from_go_source(path: &Path, source: &str) -> Result<Self> {
        let mut parser = GoParser::new()?;
        let entries = parser
            .map_literal_entries(path, source, CATALOG_VARIABLE)?
            .ok_or_else(|| {
                ApiscanError::Config(format!(
                    "{CATALOG_VARIABLE} not found in {}",
                    path.display()
                ))
            })?;

        let mut registry = Self::default();
        for (key, body) in entries {
            match parse_entry(&key, &body) {
                Some(category) => {
                    registry.entries.insert(key, category);
                }
                None => tracing::warn!("Skipping service catalog entry {key}: not a literal"),
            }
        }
        Ok(registry)
    }

    pub fn get(&self, key: &str) -> Option<&ServiceCategory> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fields of one `ServiceCatalog{...}` literal. An entry without a `Name`
/// takes its map key.
fn parse_entry(key: &str, body: &str) -> Option<ServiceCategory> {
    if !body.trim_start().starts_with('{') {
        return None;
    }
    let mut category = ServiceCategory::named(key);
    for caps in ENTRY_FIELD.captures_iter(body) {
        let value = caps[2].trim_matches('"');
        match &caps[1] {
            "Name" => category.name = value.to_string(),
            "Version" => category.version = value.to_string(),
            "ResourceBase" => category.resource_base = value.to_string(),
            "Product" => category.product = value.to_string(),
            "WithOutProjectID" => category.without_project_id = value == "true",
            _ => {}
        }
    }
    Some(category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ENDPOINTS: &str = r#"package config

type ServiceCatalog struct {
    Name             string
    Version          string
    Scope            string
    Admin            bool
    ResourceBase     string
    WithOutProjectID bool
    Product          string
}

var allServiceCatalog = map[string]ServiceCatalog{
    "ecs": {
        Name:    "ecs",
        Version: "v1",
        Product: "ECS",
    },
    "dns": {
        Name:             "dns",
        Version:          "v2",
        WithOutProjectID: true,
        Product:          "DNS",
    },
    "cceAddonV3": {
        Name:         "cce",
        Version:      "api/v3",
        ResourceBase: "addons",
        Product:      "CCE",
    },
    "legacy": defaultCatalog,
}
"#;

    #[test]
    fn reads_endpoints_go() {
        let registry = CatalogRegistry::from_go_source(Path::new("endpoints.go"), ENDPOINTS).unwrap();
        assert_eq!(registry.len(), 3);

        let dns = registry.get("dns").unwrap();
        assert!(!dns.includes_project_id());
        assert_eq!(dns.product, "DNS");

        assert_eq!(
            registry.get("cceAddonV3").unwrap(),
            &ServiceCategory {
                name: "cce".into(),
                version: "api/v3".into(),
                resource_base: "addons".into(),
                without_project_id: false,
                product: "CCE".into(),
            }
        );
        assert!(registry.get("legacy").is_none());
    }

    #[test]
    fn missing_catalog_variable_is_an_error() {
        let err = CatalogRegistry::from_go_source(Path::new("endpoints.go"), "package config\n")
            .unwrap_err();
        assert!(matches!(err, ApiscanError::Config(_)));
    }

    #[test]
    fn loads_yaml_with_either_field_spelling() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("catalog.yaml");
        std::fs::write(
            &path,
            "ecs:\n  name: ecs\n  version: v1\n  product: ECS\ndns:\n  Name: dns\n  Version: v2\n  WithOutProjectID: true\n",
        )
        .unwrap();
        let registry = CatalogRegistry::load(&path).unwrap();
        assert_eq!(registry.get("ecs").unwrap().version, "v1");
        assert!(registry.get("dns").unwrap().without_project_id);
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = CatalogRegistry::load(Path::new("/nonexistent/endpoints.go")).unwrap_err();
        assert!(matches!(err, ApiscanError::MissingInput { .. }));
    }

    #[test]
    fn unknown_category() {
        let unknown = ServiceCategory::unknown();
        assert!(unknown.is_unknown());
        assert!(unknown.includes_project_id());
        assert!(unknown.version.is_empty());
    }
}
