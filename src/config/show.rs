use crate::config::ResolvedConfig;
use std::io::Write;

/// Render `config show` output, optionally limited to one section.
pub fn render_show<W: Write>(
    w: &mut W,
    config: &ResolvedConfig,
    section: Option<&str>,
) -> std::io::Result<()> {
    // Loaded files
    if config.loaded_files.is_empty() {
        writeln!(w, "Loaded config files: (none)")?;
    } else {
        writeln!(w, "Loaded config files:")?;
        for (i, path) in config.loaded_files.iter().enumerate() {
            writeln!(w, "  {}. {}", i + 1, path.display())?;
        }
    }
    writeln!(w)?;

    let entries = match section {
        Some(section) => config
            .provenance
            .section_entries(section.trim_end_matches('.')),
        None => config.provenance.sorted_entries(),
    };
    if entries.is_empty() {
        writeln!(w, "Unknown section: {}", section.unwrap_or_default())?;
        let sections: Vec<&str> = config.provenance.sections().into_iter().collect();
        writeln!(w, "Available sections: {}", sections.join(", "))?;
        return Ok(());
    }

    writeln!(w, "Resolved settings:")?;
    for (key, source) in entries {
        let value = get_value_for_key(config, key);
        writeln!(w, "  {}: {} <- {}", key, value, source)?;
    }

    Ok(())
}

fn list(items: &[String]) -> String {
    if items.len() > 4 {
        format!("[{}, ... {} entries]", items[..3].join(", "), items.len())
    } else {
        format!("{:?}", items)
    }
}

fn get_value_for_key(config: &ResolvedConfig, key: &str) -> String {
    let paths = &config.paths;
    let targeting = &config.targeting;
    match key {
        "defaults.provider" => config.provider.clone(),
        "defaults.version" => config.version.clone(),
        "defaults.output_dir" => config.output_dir.display().to_string(),
        "defaults.format" => config.format.to_string(),
        "defaults.quiet" => config.quiet.to_string(),
        "defaults.host" => config.host.clone(),
        "paths.base_path" => paths.base_path.display().to_string(),
        "paths.source_dir" => paths.source_dir.display().to_string(),
        "paths.config_file" => paths.config_file.display().to_string(),
        "paths.hc_config_file" => paths.hc_config_file.display().to_string(),
        "paths.catalog_file" => paths.catalog_file.display().to_string(),
        "paths.vendor_dir" => paths.vendor_dir.display().to_string(),
        "paths.schema" => paths
            .schema
            .as_ref()
            .map_or("(none)".to_string(), |p| p.display().to_string()),
        "sdk.rest_prefix" => config.sdk.rest_prefix.clone(),
        "sdk.generated_prefix" => config.sdk.generated_prefix.clone(),
        "targeting.filter" => targeting.filter.clone().unwrap_or_else(|| "(all)".to_string()),
        "targeting.exclude" => list(&targeting.exclude),
        "targeting.skip_dirs" => list(&targeting.skip_dirs),
        "targeting.deprecated" => list(&targeting.deprecated),
        "targeting.generated_markers" => list(&targeting.generated_markers),
        "targeting.pending_upgrade" => list(&targeting.pending_upgrade),
        "targeting.ignore_patterns" => list(&config.ignore_patterns),
        "targeting.annotations" => targeting.annotations.to_string(),
        "companions" => format!("{} entries", config.companions.len()),
        _ => "(unknown)".to_string(),
    }
}
