//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::SessionConfig;
use std::path::Path;

/// Name of the configuration file within a host directory.
const CONFIG_FILE: &str = "gaia.toml";

/// Loads and validates a `gaia.toml` configuration from a directory.
///
/// Reads `<dir>/gaia.toml`, parses it, and validates directory names.
/// A missing file yields the default configuration; any other read
/// failure is an error.
pub fn load_config(dir: &Path) -> Result<SessionConfig, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    let content = match std::fs::read_to_string(&config_path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(SessionConfig::default());
        }
        Err(e) => return Err(ConfigError::IoError(e)),
    };
    load_config_from_str(&content)
}

/// Parses and validates a `gaia.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<SessionConfig, ConfigError> {
    let config: SessionConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that directory names are usable as path components.
fn validate_config(config: &SessionConfig) -> Result<(), ConfigError> {
    if config.dir_name.is_empty() {
        return Err(ConfigError::ValidationError(
            "dir_name must not be empty".to_string(),
        ));
    }
    if config.asset_subdir.is_empty() {
        return Err(ConfigError::ValidationError(
            "asset_subdir must not be empty".to_string(),
        ));
    }
    Ok(())
}
