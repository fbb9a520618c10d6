use serde::Deserialize;
use std::collections::BTreeMap;

/// TOML-deserializable config file. All fields are Option for layered merging.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub defaults: DefaultsFileConfig,
    #[serde(default)]
    pub paths: PathsFileConfig,
    #[serde(default)]
    pub sdk: SdkFileConfig,
    #[serde(default)]
    pub targeting: TargetingFileConfig,
    /// companion file name -> resource file name
    #[serde(default)]
    pub companions: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DefaultsFileConfig {
    pub provider: Option<String>,
    pub version: Option<String>,
    pub output_dir: Option<String>,
    pub format: Option<String>,
    pub quiet: Option<bool>,
    pub host: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PathsFileConfig {
    pub base_path: Option<String>,
    pub source_dir: Option<String>,
    pub config_file: Option<String>,
    pub hc_config_file: Option<String>,
    pub catalog_file: Option<String>,
    pub vendor_dir: Option<String>,
    pub schema: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SdkFileConfig {
    pub rest_prefix: Option<String>,
    pub generated_prefix: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TargetingFileConfig {
    pub filter: Option<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    pub skip_dirs: Option<Vec<String>>,
    pub deprecated: Option<Vec<String>>,
    pub generated_markers: Option<Vec<String>>,
    pub pending_upgrade: Option<Vec<String>>,
    pub annotations: Option<bool>,
}

impl FileConfig {
    /// Load from a TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}
