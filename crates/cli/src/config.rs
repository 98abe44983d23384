//! CLI configuration utilities

use anyhow::{Context, Result};
use bukload_http::ClientConfig;
use std::path::{Path, PathBuf};

/// Load client configuration and apply command-line overrides
pub fn load(
    file: Option<&Path>,
    base_url: Option<String>,
    state_dir: Option<PathBuf>,
) -> Result<ClientConfig> {
    let mut config = match file {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => ClientConfig::from_env().context("failed to load configuration")?,
    };

    if let Some(base_url) = base_url {
        config.base_url = base_url;
    }
    if let Some(state_dir) = state_dir {
        config.state_dir = state_dir;
    }

    config.validate()?;
    Ok(config)
}
