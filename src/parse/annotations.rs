use crate::catalog::ServiceCategory;
use crate::parse::go::GoFile;
use crate::resolve::record::{CallRecord, HttpMethod, RecordOrigin};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static API_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"//\s*API:\s*(.*)").expect("valid regex"));

/// Two annotations give one endpoint to different products.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{method} {url} is annotated as both {first} and {second}")]
pub struct AnnotationConflict {
    pub url: String,
    pub method: HttpMethod,
    pub first: String,
    pub second: String,
}

/// Records declared by `// API: PRODUCT METHOD url` comments. The URL is kept
/// verbatim and the product becomes the category name. A file whose
/// annotations disagree on the product of an endpoint yields no records.
pub fn annotated_records(file: &GoFile) -> Result<Vec<CallRecord>, AnnotationConflict> {
    let mut records: Vec<CallRecord> = Vec::new();
    for (idx, line) in file.source.lines().enumerate() {
        let Some(caps) = API_COMMENT.captures(line) else {
            continue;
        };
        let parts: Vec<&str> = caps[1].split_whitespace().collect();
        let [product, method, url] = parts.as_slice() else {
            tracing::warn!(
                "Skipping malformed API annotation at {}:{}: {}",
                file.path.display(),
                idx + 1,
                line.trim()
            );
            continue;
        };
        let http_method = match method.parse::<HttpMethod>() {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("{}:{}: {}", file.path.display(), idx + 1, e);
                continue;
            }
        };
        if let Some(earlier) = records
            .iter()
            .find(|r| r.url == *url && r.http_method == http_method)
        {
            if earlier.service.name != *product {
                return Err(AnnotationConflict {
                    url: url.to_string(),
                    method: http_method,
                    first: earlier.service.name.clone(),
                    second: product.to_string(),
                });
            }
        }
        records.push(CallRecord {
            url: url.to_string(),
            http_method,
            operation_id: String::new(),
            service: ServiceCategory::named(*product),
            sdk_path: String::new(),
            origin: RecordOrigin::Annotation,
        });
    }
    Ok(records)
}
