use lending_core::config::LendingConfig;
use std::fs;
use std::path::Path;

/// Load lending defaults from `path`, or the built-in defaults when absent.
///
/// `.yaml` / `.yml` files are read as YAML, anything else as JSON.
pub fn load_config(path: Option<&str>) -> Result<LendingConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(LendingConfig::default());
    };

    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config '{}': {}", path, e))?;
    let is_yaml = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext, "yaml" | "yml"));

    let config: LendingConfig = if is_yaml {
        serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config '{}': {}", path, e))?
    } else {
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse config '{}': {}", path, e))?
    };
    config.validate()?;
    tracing::debug!(path, ?config, "config loaded");
    Ok(config)
}
