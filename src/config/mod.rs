pub mod ignore;
pub mod provenance;
pub mod resolve;
pub mod schema;
pub mod show;

use crate::output::OutputFormat;
use crate::sdk::{generated, rest};
use provenance::ProvenanceMap;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const DEFAULT_PROVIDER: &str = "huaweicloud";
pub const DEFAULT_HOST: &str = "huaweicloud.com";
pub const DEFAULT_VERSION: &str = "latest";

pub const DEFAULT_SKIP_DIRS: &[&str] = &["acceptance", "deprecated", "internal", "helper", "utils"];

pub const DEFAULT_GENERATED_MARKERS: &[&str] = &["AUTO GENERATED CODE", "Code generated"];

/// Resources kept in the tree for compatibility only.
pub const DEFAULT_DEPRECATED: &[&str] = &[
    "data_source_huaweicloud_antiddos_v1",
    "data_source_huaweicloud_compute_availability_zones_v2",
    "data_source_huaweicloud_csbs_backup_policy_v1",
    "data_source_huaweicloud_csbs_backup_v1",
    "data_source_huaweicloud_networking_network_v2",
    "data_source_huaweicloud_networking_subnet_v2",
    "data_source_huaweicloud_vbs_backup_policy_v2",
    "data_source_huaweicloud_vbs_backup_v2",
    "data_source_huaweicloud_cts_tracker_v1",
    "resource_huaweicloud_blockstorage_volume_v2",
    "resource_huaweicloud_compute_floatingip_v2",
    "resource_huaweicloud_compute_floatingip_associate_v2",
    "resource_huaweicloud_compute_secgroup_v2",
    "resource_huaweicloud_csbs_backup_policy_v1",
    "resource_huaweicloud_csbs_backup_v1",
    "resource_huaweicloud_dms_instance_v1",
    "resource_huaweicloud_ecs_instance_v1",
    "resource_huaweicloud_fw_firewall_group_v2",
    "resource_huaweicloud_fw_policy_v2",
    "resource_huaweicloud_fw_rule_v2",
    "resource_huaweicloud_networking_floatingip_v2",
    "resource_huaweicloud_networking_floatingip_associate_v2",
    "resource_huaweicloud_networking_network_v2",
    "resource_huaweicloud_networking_router_interface_v2",
    "resource_huaweicloud_networking_router_route_v2",
    "resource_huaweicloud_networking_router_v2",
    "resource_huaweicloud_networking_subnet_v2",
    "resource_huaweicloud_vbs_backup_policy_v2",
    "resource_huaweicloud_vbs_backup_v2",
    "resource_huaweicloud_rts_stack_v1",
    "resource_huaweicloud_rts_software_config_v1",
];

/// Resources not yet migrated to an SDK.
pub const DEFAULT_PENDING_UPGRADE: &[&str] = &[
    "data_source_huaweicloud_cdm_flavors_v1",
    "data_source_huaweicloud_gaussdb_mysql_flavors",
    "data_source_huaweicloud_obs_bucket_object",
    "data_source_huaweicloud_rds_flavors_v3",
    "resource_huaweicloud_cdm_cluster_v1",
    "resource_huaweicloud_cloudtable_cluster_v2",
    "resource_huaweicloud_dws_cluster",
    "resource_huaweicloud_ges_graph_v1",
    "resource_huaweicloud_mls_instance",
    "resource_huaweicloud_nat_dnat_rule_v2",
    "resource_huaweicloud_obs_bucket_object",
    "resource_huaweicloud_obs_bucket_policy",
    "resource_huaweicloud_obs_bucket",
];

pub const DEFAULT_COMPANIONS: &[(&str, &str)] = &[
    (
        "compute_instance_v2_networking.go",
        "resource_huaweicloud_compute_instance.go",
    ),
    (
        "compute_interface_attach_v2.go",
        "resource_huaweicloud_compute_interface_attach.go",
    ),
    (
        "networking_port_v2.go",
        "resource_huaweicloud_networking_port_v2.go",
    ),
];

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Fully resolved configuration. Only optional inputs stay `Option`.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    // Operational
    pub provider: String,
    pub version: String,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    pub quiet: bool,
    pub host: String,

    pub paths: ResolvedPaths,
    pub sdk: ResolvedSdk,
    pub targeting: ResolvedTargeting,
    pub companions: BTreeMap<String, String>,
    pub ignore_patterns: Vec<String>,

    // Provenance
    pub provenance: ProvenanceMap,
    pub loaded_files: Vec<PathBuf>,
}

/// Input locations. Relative entries are resolved against `base_path`.
#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub base_path: PathBuf,
    pub source_dir: PathBuf,
    pub config_file: PathBuf,
    pub hc_config_file: PathBuf,
    pub catalog_file: PathBuf,
    pub vendor_dir: PathBuf,
    pub schema: Option<PathBuf>,
}

impl Default for ResolvedPaths {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("."),
            source_dir: PathBuf::from("huaweicloud"),
            config_file: PathBuf::from("huaweicloud/config/config.go"),
            hc_config_file: PathBuf::from("huaweicloud/config/hcconfig.go"),
            catalog_file: PathBuf::from("huaweicloud/config/endpoints.go"),
            vendor_dir: PathBuf::from("vendor"),
            schema: None,
        }
    }
}

impl ResolvedPaths {
    fn under_base(&self, path: &PathBuf) -> PathBuf {
        self.base_path.join(path)
    }

    pub fn source_root(&self) -> PathBuf {
        self.under_base(&self.source_dir)
    }

    pub fn config_path(&self) -> PathBuf {
        self.under_base(&self.config_file)
    }

    pub fn hc_config_path(&self) -> PathBuf {
        self.under_base(&self.hc_config_file)
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.under_base(&self.catalog_file)
    }

    pub fn vendor_root(&self) -> PathBuf {
        self.under_base(&self.vendor_dir)
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedSdk {
    pub rest_prefix: String,
    pub generated_prefix: String,
}

impl Default for ResolvedSdk {
    fn default() -> Self {
        Self {
            rest_prefix: rest::DEFAULT_PREFIX.to_string(),
            generated_prefix: generated::DEFAULT_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedTargeting {
    /// Only files whose path contains this substring
    pub filter: Option<String>,
    pub exclude: Vec<String>,
    pub skip_dirs: Vec<String>,
    pub deprecated: Vec<String>,
    pub generated_markers: Vec<String>,
    pub pending_upgrade: Vec<String>,
    pub annotations: bool,
}

impl Default for ResolvedTargeting {
    fn default() -> Self {
        Self {
            filter: None,
            exclude: Vec::new(),
            skip_dirs: owned(DEFAULT_SKIP_DIRS),
            deprecated: owned(DEFAULT_DEPRECATED),
            generated_markers: owned(DEFAULT_GENERATED_MARKERS),
            pending_upgrade: owned(DEFAULT_PENDING_UPGRADE),
            annotations: true,
        }
    }
}

impl ResolvedTargeting {
    pub fn is_pending_upgrade(&self, resource: &str) -> bool {
        self.pending_upgrade.iter().any(|name| resource.contains(name.as_str()))
    }
}

impl ResolvedConfig {
    /// Built-in defaults, before any file or flag is applied.
    pub fn defaults() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            version: DEFAULT_VERSION.to_string(),
            output_dir: PathBuf::from("api"),
            format: OutputFormat::default(),
            quiet: false,
            host: DEFAULT_HOST.to_string(),
            paths: ResolvedPaths::default(),
            sdk: ResolvedSdk::default(),
            targeting: ResolvedTargeting::default(),
            companions: DEFAULT_COMPANIONS
                .iter()
                .map(|(c, r)| (c.to_string(), r.to_string()))
                .collect(),
            ignore_patterns: Vec::new(),
            provenance: ProvenanceMap::new(),
            loaded_files: Vec::new(),
        }
    }
}
