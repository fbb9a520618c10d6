use crate::parse::go::GoFile;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static SERVICE_CLIENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"NewServiceClient\("([^"]*)""#).expect("valid regex"));

static HC_CLIENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"NewHcClient\(.*, "([^"]*)""#).expect("valid regex"));

static CLIENT_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)Client$").expect("valid regex"));

/// How a config file's constructor functions name their category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructorStyle {
    /// `c.NewServiceClient("elb", region)`
    ServiceClient,
    /// `NewHcClient(c, region, "aom")`
    HcClient,
}

impl ConstructorStyle {
    fn pattern(self) -> &'static Regex {
        match self {
            ConstructorStyle::ServiceClient => &*SERVICE_CLIENT,
            ConstructorStyle::HcClient => &*HC_CLIENT,
        }
    }
}

/// Config constructor function name -> catalog key.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    categories: HashMap<String, String>,
}

impl CatalogIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the category declared by every function of a config file.
    /// Functions without a constructor call are skipped; when a function
    /// declares several, the last one is kept. Returns the number of
    /// functions indexed.
    pub fn ingest(&mut self, file: &GoFile, style: ConstructorStyle) -> usize {
        let pattern = style.pattern();
        let mut indexed = 0;
        for function in &file.functions {
            let src = file.function_source(function);
            let Some(category) = pattern.captures_iter(src).filter_map(|c| c.get(1)).last() else {
                tracing::debug!("Skipping config function {}", function.name);
                continue;
            };
            self.categories
                .insert(function.name.clone(), category.as_str().to_string());
            indexed += 1;
        }
        indexed
    }

    pub fn category(&self, constructor: &str) -> Option<&str> {
        self.categories.get(constructor).map(String::as_str)
    }

    /// Table lookup, falling back to the lowercased client type name without
    /// its `Client` suffix.
    pub fn category_or_suffix(&self, constructor: &str) -> Option<String> {
        if let Some(category) = self.category(constructor) {
            return Some(category.to_string());
        }
        CLIENT_SUFFIX
            .captures(constructor)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
