use super::OutputFormat;
use crate::catalog::{CatalogRegistry, ServiceCategory};
use crate::errors::Result;
use crate::resolve::record::{CallRecord, RecordOrigin};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;

pub const PENDING_UPGRADE_DESCRIPTION: &str =
    "404.This resource is waiting to be upgraded, so there is none method output.";

/// Provider name used in the source tree's file names.
const SOURCE_PROVIDER: &str = "huaweicloud";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiDocument {
    pub info: Info,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<String>,
    pub host: String,
    pub tags: Vec<Tag>,
    pub paths: BTreeMap<String, BTreeMap<String, Operation>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Info {
    pub version: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operation {
    pub tag: String,
    #[serde(rename = "operationId", skip_serializing_if = "String::is_empty")]
    pub operation_id: String,
}

/// Document-wide settings shared by every resource of a run.
#[derive(Debug, Clone)]
pub struct DocumentSettings {
    pub provider: String,
    pub version: String,
    pub host: String,
}

/// Request path of a record: version, project id, resource base and URL
/// joined with empty parts dropped. Annotation URLs are already complete.
pub fn full_path(record: &CallRecord) -> String {
    if record.origin == RecordOrigin::Annotation {
        return record.url.clone();
    }
    let service = &record.service;
    let project = if service.includes_project_id() {
        "{project_id}"
    } else {
        ""
    };
    let parts: Vec<&str> = [
        service.version.as_str(),
        project,
        service.resource_base.as_str(),
        record.url.as_str(),
    ]
    .into_iter()
    .map(|p| p.trim_matches('/'))
    .filter(|p| !p.is_empty())
    .collect();
    format!("/{}", parts.join("/"))
}

impl ApiDocument {
    pub fn build(
        resource: &str,
        records: &[CallRecord],
        pending_upgrade: bool,
        settings: &DocumentSettings,
        registry: &CatalogRegistry,
    ) -> Self {
        let mut paths: BTreeMap<String, BTreeMap<String, Operation>> = BTreeMap::new();
        let mut tags: Vec<Tag> = Vec::new();
        for record in records {
            let tag = record.service.name.clone();
            if !tags.iter().any(|t| t.name == tag) {
                tags.push(Tag { name: tag.clone() });
            }
            paths
                .entry(full_path(record))
                .or_default()
                .entry(record.http_method.as_str().to_string())
                .or_insert_with(|| Operation {
                    tag,
                    operation_id: record.operation_id.clone(),
                });
        }
        if tags.is_empty() {
            if let Some(name) = fallback_tag(resource, registry) {
                tags.push(Tag { name });
            }
        }

        let description = if pending_upgrade {
            tracing::info!("{resource}: {PENDING_UPGRADE_DESCRIPTION}");
            PENDING_UPGRADE_DESCRIPTION.to_string()
        } else {
            String::new()
        };

        Self {
            info: Info {
                version: settings.version.clone(),
                title: output_name(resource, &settings.provider),
                description,
            },
            servers: Vec::new(),
            schemes: vec!["https".to_string()],
            host: settings.host.clone(),
            tags,
            paths,
        }
    }

    pub fn write<W: Write>(&self, writer: &mut W, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Yaml => serde_yaml::to_writer(&mut *writer, self)?,
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *writer, self)?;
                writeln!(writer)?;
            }
        }
        Ok(())
    }
}

/// Resource name as published under the target provider.
pub fn output_name(resource: &str, provider: &str) -> String {
    resource.replace(SOURCE_PROVIDER, provider)
}

/// Tag for a resource without records, derived from the service segment of
/// its name (`resource_huaweicloud_<svc>_...`, `data_source_huaweicloud_<svc>_...`).
fn fallback_tag(resource: &str, registry: &CatalogRegistry) -> Option<String> {
    let parts: Vec<&str> = resource.split('_').collect();
    let service = if resource.starts_with("data_source_") {
        parts.get(3)
    } else {
        parts.get(2)
    }?;
    let tag = registry
        .get(service)
        .map(|c: &ServiceCategory| c.product.clone())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| service.to_uppercase());
    Some(tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::record::HttpMethod;
    use pretty_assertions::assert_eq;

    fn settings() -> DocumentSettings {
        DocumentSettings {
            provider: "huaweicloud".into(),
            version: "1.2.3".into(),
            host: "huaweicloud.com".into(),
        }
    }

    fn record(url: &str, method: HttpMethod, op: &str, service: ServiceCategory) -> CallRecord {
        CallRecord {
            url: url.into(),
            http_method: method,
            operation_id: op.into(),
            service,
            sdk_path: String::new(),
            origin: RecordOrigin::Sdk,
        }
    }

    fn antiddos() -> ServiceCategory {
        ServiceCategory {
            version: "v1".into(),
            ..ServiceCategory::named("anti-ddos")
        }
    }

    #[test]
    fn path_composition() {
        assert_eq!(
            full_path(&record("antiddos/status", HttpMethod::Get, "ListStatus", antiddos())),
            "/v1/{project_id}/antiddos/status"
        );
        let dns = ServiceCategory {
            version: "v2".into(),
            without_project_id: true,
            ..ServiceCategory::named("dns")
        };
        assert_eq!(
            full_path(&record("zones/{id}", HttpMethod::Get, "Get", dns)),
            "/v2/zones/{id}"
        );
        let cce = ServiceCategory {
            version: "api/v3".into(),
            resource_base: "addons".into(),
            ..ServiceCategory::named("cce")
        };
        assert_eq!(
            full_path(&record("{id}", HttpMethod::Get, "Get", cce)),
            "/api/v3/{project_id}/addons/{id}"
        );
        let mut annotated = record("/v1/custom", HttpMethod::Post, "", ServiceCategory::named("X"));
        annotated.origin = RecordOrigin::Annotation;
        assert_eq!(full_path(&annotated), "/v1/custom");
    }

    #[test]
    fn first_operation_per_path_and_method_wins() {
        let records = vec![
            record("servers", HttpMethod::Post, "Create", antiddos()),
            record("servers", HttpMethod::Post, "CreateAgain", antiddos()),
            record("servers", HttpMethod::Get, "List", antiddos()),
        ];
        let doc = ApiDocument::build(
            "resource_huaweicloud_antiddos",
            &records,
            false,
            &settings(),
            &CatalogRegistry::default(),
        );
        let ops = &doc.paths["/v1/{project_id}/servers"];
        assert_eq!(ops.len(), 2);
        assert_eq!(ops["post"].operation_id, "Create");
        assert_eq!(doc.tags, vec![Tag { name: "anti-ddos".into() }]);
    }

    #[test]
    fn empty_resource_falls_back_to_name_tag() {
        let registry = CatalogRegistry::from_entries([(
            "obs".to_string(),
            ServiceCategory {
                product: "OBS".into(),
                ..ServiceCategory::named("obs")
            },
        )]);
        let doc = ApiDocument::build(
            "resource_huaweicloud_obs_bucket",
            &[],
            true,
            &settings(),
            &registry,
        );
        assert_eq!(doc.tags, vec![Tag { name: "OBS".into() }]);
        assert_eq!(doc.info.description, PENDING_UPGRADE_DESCRIPTION);
        assert!(doc.paths.is_empty());

        let doc = ApiDocument::build(
            "data_source_huaweicloud_cdm_flavors",
            &[],
            false,
            &settings(),
            &registry,
        );
        assert_eq!(doc.tags, vec![Tag { name: "CDM".into() }]);
    }

    #[test]
    fn yaml_layout() {
        let records = vec![record("antiddos/status", HttpMethod::Get, "ListStatus", antiddos())];
        let settings = DocumentSettings {
            provider: "g42cloud".into(),
            ..settings()
        };
        let doc = ApiDocument::build(
            "data_source_huaweicloud_antiddos",
            &records,
            false,
            &settings,
            &CatalogRegistry::default(),
        );
        let mut out = Vec::new();
        doc.write(&mut out, OutputFormat::Yaml).unwrap();
        let yaml = String::from_utf8(out).unwrap();
        assert!(yaml.contains("title: data_source_g42cloud_antiddos"));
        assert!(yaml.contains("- https"));
        assert!(yaml.contains("/v1/{project_id}/antiddos/status:"));
        assert!(yaml.contains("operationId: ListStatus"));
    }

    #[test]
    fn annotation_without_operation_omits_id() {
        let mut annotated = record("/v1/custom", HttpMethod::Post, "", ServiceCategory::named("X"));
        annotated.origin = RecordOrigin::Annotation;
        let doc = ApiDocument::build(
            "resource_huaweicloud_x",
            &[annotated],
            false,
            &settings(),
            &CatalogRegistry::default(),
        );
        let mut out = Vec::new();
        doc.write(&mut out, OutputFormat::Json).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["paths"]["/v1/custom"]["post"]["tag"], "X");
        assert!(json["paths"]["/v1/custom"]["post"].get("operationId").is_none());
    }
}
