use crate::catalog::ServiceCategory;
use crate::sdk::SdkEndpoint;
use serde::{Deserialize, Serialize};

/// Canonical HTTP verb of a resolved call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

impl HttpMethod {
    /// Map an SDK verb spelling (`Get`, `DeleteWithBodyResp`, `http.MethodPost`'s
    /// `Post`, `GET`) onto the canonical verb.
    pub fn from_sdk_verb(verb: &str) -> Option<Self> {
        if verb.starts_with("DeleteWith") {
            return Some(HttpMethod::Delete);
        }
        verb.parse().ok()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
            HttpMethod::Head => "head",
        }
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "get" => Ok(HttpMethod::Get),
            "post" => Ok(HttpMethod::Post),
            "put" => Ok(HttpMethod::Put),
            "patch" => Ok(HttpMethod::Patch),
            "delete" => Ok(HttpMethod::Delete),
            "head" => Ok(HttpMethod::Head),
            _ => Err(format!("unsupported HTTP method: {s}")),
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a record was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOrigin {
    /// An SDK function invocation resolved through the SDK sources
    Sdk,
    /// A synthesized tag-update helper call
    TagHelper,
    /// A `// API:` comment in the resource file
    Annotation,
}

/// One backend API operation used by a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub url: String,
    pub http_method: HttpMethod,
    pub operation_id: String,
    pub service: ServiceCategory,
    /// Import path of the SDK package the call went through
    pub sdk_path: String,
    pub origin: RecordOrigin,
}

impl CallRecord {
    pub fn from_endpoint(
        endpoint: &SdkEndpoint,
        operation_id: &str,
        service: ServiceCategory,
        sdk_path: &str,
    ) -> Self {
        Self {
            url: strip_query(&endpoint.url).to_string(),
            http_method: endpoint.method,
            operation_id: operation_id.to_string(),
            service,
            sdk_path: sdk_path.to_string(),
            origin: RecordOrigin::Sdk,
        }
    }

    /// Case-insensitive identity used for deduplication and ordering.
    pub fn dedup_key(&self) -> (String, String, String) {
        (
            self.url.to_lowercase(),
            self.http_method.as_str().to_string(),
            self.service.name.to_lowercase(),
        )
    }
}

/// Drop a `?query` suffix. A URL that starts with `?` is left alone.
pub fn strip_query(url: &str) -> &str {
    match url.find('?') {
        Some(idx) if idx > 0 => &url[..idx],
        _ => url,
    }
}
