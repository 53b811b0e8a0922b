//! `load_config`: reads an optional YAML file into a validated [`ForgeConfig`].
//!
//! Every key is optional; missing keys keep their defaults. Unknown keys are rejected so
//! a typo does not silently fall back to a default. CLI flags are applied on top of the
//! result by [`crate::cli`].

use crate::config::ForgeConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{error, info};

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ForgeConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!("Failed to read config file {:?}: {}", path_ref, e));
        }
    };

    let config: ForgeConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    config
        .validate()
        .with_context(|| format!("Invalid configuration in {}", path_ref.display()))?;

    Ok(config)
}
