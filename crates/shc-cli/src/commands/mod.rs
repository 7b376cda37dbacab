//! Subcommand implementations.

pub mod batch;
pub mod config;
pub mod output;
pub mod parse;
pub mod scan;

use std::path::{Path, PathBuf};

use shc_core::ShcConfig;
use tracing::debug;

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("shc")
        .join("config.json")
}

/// Configuration file in effect: the `--config` path or the default location.
pub fn config_path(explicit: Option<&str>) -> PathBuf {
    explicit.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load configuration.
///
/// An explicit path must exist; the default location is optional.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<ShcConfig> {
    if let Some(path) = explicit {
        return Ok(ShcConfig::from_file(Path::new(path))?);
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading configuration from {}", path.display());
        Ok(ShcConfig::from_file(&path)?)
    } else {
        Ok(ShcConfig::default())
    }
}
