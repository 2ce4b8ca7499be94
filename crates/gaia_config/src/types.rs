//! Configuration types deserialized from `gaia.toml`.

use gaia_diagnostics::Severity;
use serde::Deserialize;
use std::path::PathBuf;

/// Session configuration parsed from `gaia.toml`.
///
/// Controls where a cache session creates its temporary directories and
/// the minimum severity the console sink reports. All fields default, so
/// `SessionConfig::default()` is a fully usable configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Base directory for session temp roots. Defaults to the system
    /// temporary directory joined with [`dir_name`](Self::dir_name).
    #[serde(default)]
    pub temp_root: Option<PathBuf>,

    /// Directory name under the system temporary directory, used when
    /// [`temp_root`](Self::temp_root) is not set.
    #[serde(default = "default_dir_name")]
    pub dir_name: String,

    /// Subdirectory of the session root that holds materialized assets.
    #[serde(default = "default_asset_subdir")]
    pub asset_subdir: String,

    /// Minimum severity reported by the console sink.
    #[serde(default = "default_min_log_level")]
    pub min_log_level: Severity,
}

fn default_dir_name() -> String {
    "gaia".to_string()
}

fn default_asset_subdir() -> String {
    "generated_assets".to_string()
}

fn default_min_log_level() -> Severity {
    Severity::Info
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            temp_root: None,
            dir_name: default_dir_name(),
            asset_subdir: default_asset_subdir(),
            min_log_level: default_min_log_level(),
        }
    }
}
