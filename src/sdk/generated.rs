//! Generated request/response SDK packages (`<service>_client.go` +
//! `<service>_meta.go`).

use super::source::SourceProvider;
use super::{
    ClientLookup, ConventionKind, EndpointTable, Invocation, ParameterClient, SdkContext,
    SdkConvention, SdkEndpoint, SdkPackage,
};
use crate::catalog::index::CatalogIndex;
use crate::parse::dynamic_pattern;
use crate::parse::go::GoImport;
use crate::resolve::record::HttpMethod;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

pub const DEFAULT_PREFIX: &str = "github.com/huaweicloud/huaweicloud-sdk-go-v3/services/";

const META_PREFIX: &str = "GenReqDefFor";

static INVOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"= (.*[cC]lient)\.(\w*)\((.*[){])").expect("valid regex")
});

static META_METHOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"WithMethod\(http\.Method(\w*)\)").expect("valid regex"));

static META_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"WithPath\("(.*)"\)"#).expect("valid regex"));

static META_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":= (GenReqDefFor\w*)\(\)").expect("valid regex"));

/// Packages emitted by the SDK code generator.
#[derive(Debug, Clone)]
pub struct GeneratedConvention {
    prefix: String,
}

impl Default for GeneratedConvention {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl GeneratedConvention {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

/// Last `*_client.go` and `*_meta.go` in directory order.
fn client_and_meta(dir: &Path, source: &dyn SourceProvider) -> Option<(PathBuf, PathBuf)> {
    let names = match source.list_files(dir) {
        Ok(names) => names,
        Err(e) => {
            tracing::debug!("Cannot list {}: {}", dir.display(), e);
            return None;
        }
    };
    let client = names.iter().rev().find(|n| n.ends_with("_client.go"))?;
    let meta = names.iter().rev().find(|n| n.ends_with("_meta.go"))?;
    Some((dir.join(client), dir.join(meta)))
}

/// `GenReqDefFor*` function -> (verb, path) from a meta file.
fn meta_requests(meta: &crate::parse::go::GoFile) -> HashMap<String, SdkEndpoint> {
    let mut requests = HashMap::new();
    for function in meta
        .functions
        .iter()
        .filter(|f| f.name.starts_with(META_PREFIX))
    {
        let src = meta.function_source(function);
        let method = META_METHOD.captures(src).and_then(|c| c.get(1));
        let path = META_PATH.captures(src).and_then(|c| c.get(1));
        let (Some(method), Some(path)) = (method, path) else {
            continue;
        };
        let Some(method) = HttpMethod::from_sdk_verb(method.as_str()) else {
            tracing::debug!("Unsupported method {} in {}", method.as_str(), function.name);
            continue;
        };
        requests.insert(
            function.name.clone(),
            SdkEndpoint {
                url: path.as_str().to_string(),
                method,
            },
        );
    }
    requests
}

impl SdkConvention for GeneratedConvention {
    fn kind(&self) -> ConventionKind {
        ConventionKind::Generated
    }

    fn packages(&self, imports: &[GoImport]) -> Vec<SdkPackage> {
        let mut packages: Vec<SdkPackage> = Vec::new();
        for import in imports.iter().filter(|i| i.path.contains(&self.prefix)) {
            let import_path = import.path.trim_end_matches("/model").to_string();
            if packages.iter().any(|p| p.import_path == import_path) {
                continue;
            }
            let alias = match &import.alias {
                Some(alias) => alias.clone(),
                None => import_path
                    .rsplit('/')
                    .next()
                    .unwrap_or(&import_path)
                    .to_string(),
            };
            packages.push(SdkPackage { alias, import_path });
        }
        packages
    }

    fn invocations(&self, function_src: &str, _package: &SdkPackage) -> Vec<Invocation> {
        INVOCATION
            .captures_iter(function_src)
            .map(|c| Invocation {
                function: c[2].to_string(),
                receiver: c[1].to_string(),
                trailing: c[3].to_string(),
            })
            .collect()
    }

    fn resolve_package(&self, dir: &Path, ctx: &mut SdkContext<'_>) -> Option<EndpointTable> {
        let Some((client_path, meta_path)) = client_and_meta(dir, ctx.source) else {
            tracing::debug!("No client/meta files in {}", dir.display());
            return None;
        };
        let meta = ctx.parse_file(&meta_path)?;
        let requests = meta_requests(&meta);
        let client = ctx.parse_file(&client_path)?;

        let mut table = EndpointTable::new();
        for function in &client.functions {
            let src = client.function_source(function);
            let Some(generator) = META_CALL.captures(src).and_then(|c| c.get(1)) else {
                continue;
            };
            match requests.get(generator.as_str()) {
                Some(endpoint) => {
                    table.insert(function.name.clone(), endpoint.clone());
                }
                None => tracing::warn!(
                    "{} is used by {} but not defined in {}",
                    generator.as_str(),
                    function.name,
                    meta_path.display()
                ),
            }
        }
        Some(table)
    }

    fn client_lookup(&self) -> ClientLookup {
        ClientLookup::DeclarationsFirst
    }

    fn parameter_client(&self, receiver: &str, params: &str) -> Option<ParameterClient> {
        let re = dynamic_pattern(&format!(
            r"\b{}\s+\*?\w+\.(\w+Client)\b",
            regex::escape(receiver)
        ))?;
        re.captures(params)
            .and_then(|c| c.get(1))
            .map(|m| ParameterClient::Typed(m.as_str().to_string()))
    }

    fn declared_client(&self, receiver: &str, function_src: &str) -> Option<String> {
        let re = dynamic_pattern(&format!(
            r"\b{}, \w+ := \w*.(.+Client)",
            regex::escape(receiver)
        ))?;
        re.captures(function_src)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }

    fn category_for(&self, constructor: &str, index: &CatalogIndex) -> Option<String> {
        index.category_or_suffix(constructor)
    }

    fn detect(&self, dir: &Path, source: &dyn SourceProvider) -> bool {
        client_and_meta(dir, source).is_some()
    }
}
