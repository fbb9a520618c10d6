//! Shared tag-update helper and the `tags` SDK package placeholder.

use super::record::{CallRecord, HttpMethod, RecordOrigin};
use crate::catalog::ServiceCategory;
use crate::sdk::Invocation;
use regex::Regex;
use std::sync::LazyLock;

/// Import alias of the shared tags package.
pub const TAGS_ALIAS: &str = "tags";

const RESOURCE_TYPE_PLACEHOLDER: &str = "{resourceType}";

static TAG_HELPER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"utils\.UpdateResourceTags\((\w*),\s(\w*),\s"(.*)",\s(.*)\)"#)
        .expect("valid regex")
});

static RESOURCE_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#",\s"(.*)","#).expect("valid regex"));

/// A call to `utils.UpdateResourceTags(client, d, "service", id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagHelperCall {
    pub receiver: String,
    pub service_type: String,
}

/// First tag helper call in a function.
pub fn find_tag_helper(function_src: &str) -> Option<TagHelperCall> {
    let caps = TAG_HELPER.captures(function_src)?;
    Some(TagHelperCall {
        receiver: caps[1].to_string(),
        service_type: caps[3].to_string(),
    })
}

/// The batch tag update a helper call performs. Tag URLs always carry the
/// project id.
pub fn tag_helper_record(call: &TagHelperCall, mut service: ServiceCategory) -> CallRecord {
    service.without_project_id = false;
    CallRecord {
        url: format!("{}/{{id}}/tags/action", call.service_type),
        http_method: HttpMethod::Post,
        operation_id: "batchUpdate".to_string(),
        service,
        sdk_path: String::new(),
        origin: RecordOrigin::TagHelper,
    }
}

/// Fill `{resourceType}` from the string literal passed to a `tags` package
/// call.
pub fn rewrite_tag_url(call: &Invocation, record: &mut CallRecord) {
    record.service.without_project_id = false;
    let Some(resource_type) = RESOURCE_TYPE.captures(&call.trailing).and_then(|c| c.get(1)) else {
        tracing::debug!("No resource type literal in tags.{} call", call.function);
        return;
    };
    record.url = record
        .url
        .replace(RESOURCE_TYPE_PLACEHOLDER, resource_type.as_str());
}
