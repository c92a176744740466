//! Subcommands of the `mplan` binary.

pub mod batch;
pub mod config;
pub mod inspect;
pub mod parse;

use std::path::{Path, PathBuf};

use mplan_core::MplanConfig;

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mplan")
        .join("config.json")
}

/// Load the configuration from `config_path`, else from the default
/// location if that file exists, else use defaults.
pub fn load_config(config_path: Option<&Path>) -> anyhow::Result<MplanConfig> {
    if let Some(path) = config_path {
        return Ok(MplanConfig::from_file(path)?);
    }

    let path = default_config_path();
    if path.exists() {
        Ok(MplanConfig::from_file(&path)?)
    } else {
        Ok(MplanConfig::default())
    }
}
