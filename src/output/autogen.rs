//! Documents for resources emitted by the provider's code generator. Their
//! API description files already name each endpoint through `x-ref-api`
//! (`"METHOD /path"`) and `x-ref-product`.

use super::document::{output_name, ApiDocument, Info, Operation, Server, Tag};
use crate::errors::Result;
use crate::resolve::record::HttpMethod;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

/// Host written into converted documents.
pub const AUTOGEN_HOST: &str = "myhuaweicloud.com";

/// The parts of a generated resource's API description that are carried over.
#[derive(Debug, Default, Deserialize)]
pub struct AutogenApi {
    #[serde(default)]
    pub info: AutogenInfo,
    #[serde(default)]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub paths: BTreeMap<String, BTreeMap<String, AutogenOperation>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AutogenInfo {
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AutogenOperation {
    #[serde(rename = "operationId", default)]
    pub operation_id: String,
    #[serde(rename = "x-ref-product", default)]
    pub product: String,
    #[serde(rename = "x-ref-api", default)]
    pub api: String,
}

impl AutogenApi {
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }
}

/// Method and path of an `x-ref-api` value.
fn split_ref_api(api: &str) -> Option<(HttpMethod, &str)> {
    let (method, path) = api.trim().split_once(' ')?;
    let path = path.trim();
    if path.is_empty() || path.contains(' ') {
        return None;
    }
    Some((method.parse().ok()?, path))
}

impl ApiDocument {
    /// Re-key a generated resource's operations by the endpoint they call.
    /// Operations with an unusable `x-ref-api` are logged and dropped; the
    /// first operation for a path and method wins.
    pub fn from_autogen(resource: &str, api: &AutogenApi, provider: &str, version: &str) -> Self {
        let mut paths: BTreeMap<String, BTreeMap<String, Operation>> = BTreeMap::new();
        let mut products = BTreeSet::new();
        for operation in api.paths.values().flat_map(|methods| methods.values()) {
            let Some((method, path)) = split_ref_api(&operation.api) else {
                tracing::warn!(
                    "{resource}: bad x-ref-api {:?} on {}",
                    operation.api,
                    operation.operation_id
                );
                continue;
            };
            if !operation.product.is_empty() {
                products.insert(operation.product.clone());
            }
            paths
                .entry(path.to_string())
                .or_default()
                .entry(method.as_str().to_string())
                .or_insert_with(|| Operation {
                    tag: operation.product.clone(),
                    operation_id: operation.operation_id.clone(),
                });
        }

        Self {
            info: Info {
                version: version.to_string(),
                title: output_name(resource, provider),
                description: api.info.description.clone(),
            },
            servers: api.servers.clone(),
            schemes: Vec::new(),
            host: AUTOGEN_HOST.to_string(),
            tags: products.into_iter().map(|name| Tag { name }).collect(),
            paths,
        }
    }
}
