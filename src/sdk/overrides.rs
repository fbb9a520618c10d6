//! Fixed exceptions to the general resolution rules, checked in table order.

use crate::parse::dynamic_pattern;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// A URL-building primitive and how many leading arguments are not path
/// segments.
pub struct UrlBuilder {
    pub name: &'static str,
    pub pattern: &'static LazyLock<Regex>,
    pub skip_args: usize,
}

static SERVICE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.ServiceURL\((.*)\)").expect("valid regex"));

// The CCE client takes (region, project) before the path segments.
static CCE_SERVICE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"return\s.*CCEServiceURL\((.*)\)").expect("valid regex"));

pub static URL_BUILDERS: [UrlBuilder; 2] = [
    UrlBuilder {
        name: "ServiceURL",
        pattern: &SERVICE_URL,
        skip_args: 0,
    },
    UrlBuilder {
        name: "CCEServiceURL",
        pattern: &CCE_SERVICE_URL,
        skip_args: 2,
    },
];

/// Builder functions whose URL is assembled at runtime.
pub struct UrlOverride {
    /// Trailing path of the URL file, `/`-separated
    pub file_suffix: &'static str,
    pub functions: &'static [&'static str],
    pub url: &'static str,
}

pub static URL_OVERRIDES: [UrlOverride; 1] = [UrlOverride {
    file_suffix: "dns/v2/ptrrecords/urls.go",
    functions: &["baseURL", "resourceURL"],
    url: "reverse/floatingips/{region}:{floatingip_id}",
}];

/// Fixed URL for a builder function, if one applies.
pub fn url_override(url_file: &Path, function: &str) -> Option<&'static str> {
    let normalized = url_file.to_string_lossy().replace('\\', "/");
    URL_OVERRIDES
        .iter()
        .find(|o| normalized.ends_with(o.file_suffix) && o.functions.contains(&function))
        .map(|o| o.url)
}

/// A helper that returns a client picked at runtime.
pub struct ClientChooser {
    pub function: &'static str,
    pub client: &'static str,
}

pub static CLIENT_CHOOSERS: [ClientChooser; 1] = [ClientChooser {
    function: "chooseDNSClientbyZoneID",
    client: "DnsV2Client",
}];

/// Client name when `receiver` is assigned from a known chooser helper.
pub fn chosen_client(receiver: &str, function_src: &str) -> Option<&'static str> {
    CLIENT_CHOOSERS.iter().find_map(|chooser| {
        let pattern = format!(
            r"\b{}\b.*:=\s{}\b",
            regex::escape(receiver),
            regex::escape(chooser.function)
        );
        let re = dynamic_pattern(&pattern)?;
        re.is_match(function_src).then_some(chooser.client)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ptr_record_builders_are_overridden() {
        let file = Path::new("vendor/github.com/chnsz/golangsdk/openstack/dns/v2/ptrrecords/urls.go");
        assert_eq!(
            url_override(file, "baseURL"),
            Some("reverse/floatingips/{region}:{floatingip_id}")
        );
        assert_eq!(
            url_override(file, "resourceURL"),
            Some("reverse/floatingips/{region}:{floatingip_id}")
        );
        assert_eq!(url_override(file, "listURL"), None);
        assert_eq!(
            url_override(Path::new("vendor/dns/v2/zones/urls.go"), "baseURL"),
            None
        );
    }

    #[test]
    fn builder_table_order() {
        assert_eq!(URL_BUILDERS[0].name, "ServiceURL");
        let caps = URL_BUILDERS[1]
            .pattern
            .captures("    return c.CCEServiceURL(region, projectID, clusterPath, id)")
            .unwrap();
        assert_eq!(&caps[1], "region, projectID, clusterPath, id");
        assert!(!URL_BUILDERS[0]
            .pattern
            .is_match("return c.CCEServiceURL(a, b, c)"));
    }

    #[test]
    fn dns_chooser_is_recognized() {
        let src = "dnsClient, zoneType, err := chooseDNSClientbyZoneID(d, zoneID, meta)";
        assert_eq!(chosen_client("dnsClient", src), Some("DnsV2Client"));
        assert_eq!(chosen_client("otherClient", src), None);
    }
}
