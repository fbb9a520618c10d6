//! Filter resource files by the provider's exported schema
//! (`terraform providers schema -json`).

use super::resource_name;
use crate::errors::{ApiscanError, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

const DEFAULT_PROVIDER: &str = "huaweicloud";

#[derive(Debug, Deserialize)]
struct SchemaDump {
    #[serde(default)]
    provider_schemas: BTreeMap<String, ProviderEntry>,
}

#[derive(Debug, Deserialize)]
struct ProviderEntry {
    #[serde(default)]
    resource_schemas: BTreeMap<String, TypeSchema>,
    #[serde(default)]
    data_source_schemas: BTreeMap<String, TypeSchema>,
}

#[derive(Debug, Deserialize)]
struct TypeSchema {
    #[serde(default)]
    block: Block,
}

#[derive(Debug, Default, Deserialize)]
struct Block {
    #[serde(default)]
    deprecated: Option<serde_json::Value>,
}

/// Exported, non-deprecated resource and data source type names.
#[derive(Debug, Clone, Default)]
pub struct ProviderSchema {
    provider: String,
    resources: HashSet<String>,
    data_sources: HashSet<String>,
}

impl ProviderSchema {
    /// A schema that accepts every file.
    pub fn accept_all(provider: &str) -> Self {
        Self {
            provider: provider.to_string(),
            ..Self::default()
        }
    }

    pub fn load(path: &Path, provider: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|_| ApiscanError::MissingInput {
            what: "provider schema",
            path: path.to_path_buf(),
        })?;
        Self::from_json(&content, provider)
    }

    pub fn from_json(content: &str, provider: &str) -> Result<Self> {
        let dump: SchemaDump = serde_json::from_str(content)?;
        let mut schema = Self::accept_all(provider);
        for (key, entry) in dump
            .provider_schemas
            .iter()
            .filter(|(key, _)| key.contains(provider))
        {
            tracing::debug!("Reading exported types of {key}");
            schema.resources.extend(exported(&entry.resource_schemas));
            schema.data_sources.extend(exported(&entry.data_source_schemas));
        }
        Ok(schema)
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty() && self.data_sources.is_empty()
    }

    /// Whether a resource file stem names an exported type. An empty schema
    /// accepts everything.
    pub fn is_exported(&self, file_stem: &str) -> bool {
        if self.is_empty() {
            return true;
        }
        let (names, type_name) = if let Some(rest) = file_stem.strip_prefix("data_source_") {
            (&self.data_sources, rest)
        } else if let Some(rest) = file_stem.strip_prefix("resource_") {
            (&self.resources, rest)
        } else {
            return false;
        };
        let normalized = resource_name(type_name).replace(DEFAULT_PROVIDER, &self.provider);
        names.contains(&normalized)
    }
}

/// Names with their `_vN` suffix removed, deprecated types excluded.
fn exported(types: &BTreeMap<String, TypeSchema>) -> impl Iterator<Item = String> + '_ {
    types
        .iter()
        .filter(|(name, schema)| {
            let deprecated = schema
                .block
                .deprecated
                .as_ref()
                .is_some_and(|v| !v.is_null());
            if deprecated {
                tracing::debug!("Skipping deprecated type {name}");
            }
            !deprecated
        })
        .map(|(name, _)| resource_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"{
  "format_version": "1.0",
  "provider_schemas": {
    "registry.terraform.io/huaweicloud/huaweicloud": {
      "resource_schemas": {
        "huaweicloud_compute_instance": { "version": 1, "block": {} },
        "huaweicloud_networking_port_v2": { "version": 0, "block": {} },
        "huaweicloud_vbs_backup": { "version": 0, "block": { "deprecated": true } }
      },
      "data_source_schemas": {
        "huaweicloud_antiddos": { "version": 0, "block": {} }
      }
    },
    "registry.terraform.io/hashicorp/null": {
      "resource_schemas": {
        "null_resource": { "version": 0, "block": {} }
      }
    }
  }
}"#;

    #[test]
    fn filters_by_exported_names() {
        let schema = ProviderSchema::from_json(SCHEMA, "huaweicloud").unwrap();
        assert!(schema.is_exported("resource_huaweicloud_compute_instance_v2"));
        assert!(schema.is_exported("resource_huaweicloud_compute_instance"));
        assert!(schema.is_exported("resource_huaweicloud_networking_port_v2"));
        assert!(schema.is_exported("data_source_huaweicloud_antiddos_v1"));
        assert!(!schema.is_exported("resource_huaweicloud_vbs_backup"));
        assert!(!schema.is_exported("resource_null_resource"));
        assert!(!schema.is_exported("data_source_huaweicloud_compute_instance"));
    }

    #[test]
    fn renamed_provider() {
        let dump = SCHEMA.replace("huaweicloud", "g42cloud");
        let schema = ProviderSchema::from_json(&dump, "g42cloud").unwrap();
        assert!(schema.is_exported("resource_huaweicloud_compute_instance_v2"));
    }

    #[test]
    fn empty_schema_accepts_everything() {
        let schema = ProviderSchema::accept_all("huaweicloud");
        assert!(schema.is_exported("resource_huaweicloud_anything"));
    }

    #[test]
    fn missing_schema_file_is_fatal() {
        let err = ProviderSchema::load(Path::new("/nonexistent/schema.json"), "huaweicloud")
            .unwrap_err();
        assert!(matches!(err, ApiscanError::MissingInput { .. }));
    }
}
