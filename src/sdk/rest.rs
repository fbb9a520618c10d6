//! Generic REST-client SDK packages.
//!
//! A package has a request file whose functions call a client verb method
//! (`client.Get(listURL(client), ...)`) and a URL file whose builder
//! functions join path segments with `client.ServiceURL(...)`.

use super::overrides::{self, URL_BUILDERS};
use super::source::SourceProvider;
use super::{
    ConventionKind, EndpointTable, Invocation, ParameterClient, SdkContext, SdkConvention,
    SdkEndpoint, SdkPackage,
};
use crate::catalog::index::CatalogIndex;
use crate::parse::dynamic_pattern;
use crate::parse::go::{GoFile, GoImport};
use crate::resolve::record::HttpMethod;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

pub const DEFAULT_PREFIX: &str = "github.com/chnsz/golangsdk/openstack/";

const REQUEST_FILES: [&str; 2] = ["requests.go", "request.go"];
const URL_FILES: [&str; 3] = ["urls.go", "url.go", "utils.go"];

const VERBS: &str =
    "Head|Get|Post|Put|Patch|Delete|DeleteWithBody|DeleteWithResponse|DeleteWithBodyResp";

static VERB_INLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\.({VERBS})\((\w*)\(")).expect("valid regex")
});

static VERB_VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\.({VERBS})\((\w*),")).expect("valid regex")
});

static PAGER_INLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"NewPager\(\w*,\s*(\w*)\(").expect("valid regex"));

static PAGER_VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"NewPager\(\w*,\s*(\w*),").expect("valid regex"));

static DELEGATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"return\s(\w+)\(").expect("valid regex"));

/// Packages built on the shared REST service client.
#[derive(Debug, Clone)]
pub struct RestConvention {
    prefix: String,
}

impl Default for RestConvention {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

/// How a request function reaches its URL builder.
enum UrlSource<'a> {
    Builder(&'a str),
    Variable(&'a str),
}

impl RestConvention {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

/// Endpoint of one request function. `None` if the function matches no call
/// shape, `Some(None)` if it does but the URL stayed unresolved. The last
/// matching call in the function wins.
fn direct_endpoint(
    function_src: &str,
    url_file: &Path,
    ctx: &mut SdkContext<'_>,
) -> Option<Option<SdkEndpoint>> {
    let calls: Vec<(HttpMethod, UrlSource<'_>)> = if VERB_INLINE.is_match(function_src) {
        VERB_INLINE
            .captures_iter(function_src)
            .filter_map(|c| {
                let method = HttpMethod::from_sdk_verb(c.get(1)?.as_str())?;
                Some((method, UrlSource::Builder(c.get(2)?.as_str())))
            })
            .collect()
    } else if VERB_VARIABLE.is_match(function_src) {
        VERB_VARIABLE
            .captures_iter(function_src)
            .filter_map(|c| {
                let method = HttpMethod::from_sdk_verb(c.get(1)?.as_str())?;
                Some((method, UrlSource::Variable(c.get(2)?.as_str())))
            })
            .collect()
    } else if PAGER_INLINE.is_match(function_src) {
        PAGER_INLINE
            .captures_iter(function_src)
            .filter_map(|c| Some((HttpMethod::Get, UrlSource::Builder(c.get(1)?.as_str()))))
            .collect()
    } else if PAGER_VARIABLE.is_match(function_src) {
        PAGER_VARIABLE
            .captures_iter(function_src)
            .filter_map(|c| Some((HttpMethod::Get, UrlSource::Variable(c.get(1)?.as_str()))))
            .collect()
    } else {
        return None;
    };

    let mut resolved = None;
    for (method, url_source) in calls {
        let builder = match url_source {
            UrlSource::Builder(name) => Some(name.to_string()),
            UrlSource::Variable(var) => variable_builder(var, function_src),
        };
        let Some(builder) = builder else {
            tracing::debug!("No URL declaration found in request function");
            continue;
        };
        if let Some(url) = url_for(url_file, &builder, ctx) {
            resolved = Some(SdkEndpoint { url, method });
        }
    }
    Some(resolved)
}

/// `u := builderURL(...)` for a URL variable.
fn variable_builder(var: &str, function_src: &str) -> Option<String> {
    let re = dynamic_pattern(&format!(r"\b{}\s*:=\s*(\w*)", regex::escape(var)))?;
    re.captures(function_src)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|name| !name.is_empty())
}

/// URL template of a builder function, parsing the URL file on first use.
fn url_for(url_file: &Path, builder: &str, ctx: &mut SdkContext<'_>) -> Option<String> {
    if ctx.cache.mark_url_file(url_file) {
        parse_url_file(url_file, ctx);
    }
    let url = ctx.cache.url(url_file, builder).map(str::to_string);
    if url.is_none() {
        tracing::warn!(
            "Failed to resolve URL of {} in {}",
            builder,
            url_file.display()
        );
    }
    url
}

fn parse_url_file(url_file: &Path, ctx: &mut SdkContext<'_>) {
    let Some(file) = ctx.parse_file(url_file) else {
        return;
    };

    let mut delegations = Vec::new();
    for function in &file.functions {
        let src = file.function_source(function);
        if let Some(url) = builder_url(src, &file.literals) {
            store_url(url_file, &function.name, url, ctx);
        } else if let Some(callee) = DELEGATION.captures(src).and_then(|c| c.get(1)) {
            delegations.push((function.name.as_str(), callee.as_str().to_string()));
        } else {
            tracing::warn!(
                "Cannot parse URL function {} in {}",
                function.name,
                url_file.display()
            );
        }
    }

    // single hop: the callee must have been resolved directly
    for (function, callee) in delegations {
        match ctx.cache.url(url_file, &callee).map(str::to_string) {
            Some(url) => store_url(url_file, function, url, ctx),
            None => tracing::warn!(
                "Cannot parse URL function {} delegating to {} in {}",
                function,
                callee,
                url_file.display()
            ),
        }
    }
}

fn store_url(url_file: &Path, function: &str, url: String, ctx: &mut SdkContext<'_>) {
    let url = match overrides::url_override(url_file, function) {
        Some(fixed) => fixed.to_string(),
        None => url,
    };
    ctx.cache.insert_url(url_file, function, url);
}

/// Evaluate the first URL-builder primitive call in a function.
pub fn builder_url(function_src: &str, literals: &HashMap<String, String>) -> Option<String> {
    let (args, builder) = URL_BUILDERS.iter().find_map(|builder| {
        builder
            .pattern
            .captures(function_src)
            .and_then(|c| c.get(1))
            .map(|m| (m.as_str(), builder))
    })?;
    tracing::trace!("{} arguments: {}", builder.name, args);

    let segments: Vec<String> = args
        .split(',')
        .skip(builder.skip_args)
        .map(str::trim)
        .filter(|arg| !arg.is_empty())
        .map(|arg| path_segment(arg, literals))
        .collect();
    Some(segments.join("/"))
}

fn path_segment(arg: &str, literals: &HashMap<String, String>) -> String {
    if arg.contains('"') {
        return arg.replace('"', "");
    }
    if let Some(value) = literals.get(arg) {
        return value.clone();
    }
    if arg.ends_with(".ProjectID") {
        return "{project_id}".to_string();
    }
    format!("{{{arg}}}")
}

impl SdkConvention for RestConvention {
    fn kind(&self) -> ConventionKind {
        ConventionKind::Rest
    }

    fn packages(&self, imports: &[GoImport]) -> Vec<SdkPackage> {
        let mut packages: Vec<SdkPackage> = Vec::new();
        for import in imports.iter().filter(|i| i.path.contains(&self.prefix)) {
            let alias = import.local_name().to_string();
            if packages.iter().any(|p| p.alias == alias) {
                continue;
            }
            packages.push(SdkPackage {
                alias,
                import_path: import.path.clone(),
            });
        }
        packages
    }

    fn invocations(&self, function_src: &str, package: &SdkPackage) -> Vec<Invocation> {
        let Some(re) = dynamic_pattern(&format!(
            r"\b({})\.(\w*)\((\w*)(.*)",
            regex::escape(&package.alias)
        )) else {
            return Vec::new();
        };
        re.captures_iter(function_src)
            .map(|c| Invocation {
                function: c[2].to_string(),
                receiver: c[3].to_string(),
                trailing: c[4].to_string(),
            })
            .collect()
    }

    fn resolve_package(&self, dir: &Path, ctx: &mut SdkContext<'_>) -> Option<EndpointTable> {
        let Some(request_path) = ctx.first_existing(dir, &REQUEST_FILES) else {
            tracing::debug!("No request file in {}", dir.display());
            return None;
        };
        let Some(url_path) = ctx.first_existing(dir, &URL_FILES) else {
            tracing::debug!("No URL file in {}", dir.display());
            return None;
        };
        let request_file = ctx.parse_file(&request_path)?;

        let mut table = EndpointTable::new();
        let mut deferred = Vec::new();
        for function in &request_file.functions {
            let src = request_file.function_source(function);
            match direct_endpoint(src, &url_path, ctx) {
                Some(Some(endpoint)) => {
                    table.insert(function.name.clone(), endpoint);
                }
                Some(None) => {}
                None => deferred.push(function),
            }
        }

        copy_local_delegations(&request_file, &deferred, &mut table);
        Some(table)
    }

    fn parameter_client(&self, receiver: &str, params: &str) -> Option<ParameterClient> {
        let re = dynamic_pattern(&format!(
            r"\b{}\s\*golangsdk\.ServiceClient\b",
            regex::escape(receiver)
        ))?;
        let found = re.find(params)?;
        let position = params[..found.start()].matches(',').count() + 1;
        Some(ParameterClient::ViaCaller { position })
    }

    fn declared_client(&self, receiver: &str, function_src: &str) -> Option<String> {
        let re = dynamic_pattern(&format!(
            r"\b{}\s*,\s*\w*\s*:?=\s*\w*\.(\w*)",
            regex::escape(receiver)
        ))?;
        re.captures(function_src)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .filter(|name| !name.is_empty())
    }

    fn category_for(&self, constructor: &str, index: &CatalogIndex) -> Option<String> {
        index.category(constructor).map(str::to_string)
    }

    fn detect(&self, dir: &Path, source: &dyn SourceProvider) -> bool {
        REQUEST_FILES.iter().any(|f| source.is_file(&dir.join(f)))
            && URL_FILES.iter().any(|f| source.is_file(&dir.join(f)))
    }
}

/// Second pass: a function that matched no call shape takes the endpoint of
/// any already-resolved function of the same file that it calls.
fn copy_local_delegations(
    file: &GoFile,
    deferred: &[&crate::parse::go::FunctionDecl],
    table: &mut EndpointTable,
) {
    if table.is_empty() || deferred.is_empty() {
        return;
    }
    let names: Vec<String> = table.keys().map(|k| regex::escape(k)).collect();
    let Some(re) = dynamic_pattern(&format!(r"\b({})\(", names.join("|"))) else {
        return;
    };

    for function in deferred {
        let src = file.function_source(function);
        let mut copied = None;
        for caps in re.captures_iter(src) {
            if let Some(endpoint) = table.get(&caps[1]) {
                copied = Some(endpoint.clone());
            }
        }
        if let Some(endpoint) = copied {
            tracing::debug!("{} delegates to a resolved request function", function.name);
            table.insert(function.name.clone(), endpoint);
        }
    }
}
