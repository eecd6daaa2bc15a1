//! CLI configuration utilities

use anyhow::{Context, Result};
use cms_http::ClientConfig;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default location of the client configuration file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cms").join("client.toml"))
}

/// Load the client configuration.
///
/// An explicit path must exist. Without one the default location is tried,
/// falling back to built-in defaults when nothing is there.
pub fn load_client_config(path: Option<&Path>) -> Result<ClientConfig> {
    if let Some(path) = path {
        info!("Loading configuration from: {}", path.display());
        return ClientConfig::load_from_file(path)
            .with_context(|| format!("failed to load {}", path.display()));
    }

    match default_config_path() {
        Some(path) if path.exists() => {
            info!("Loading configuration from: {}", path.display());
            ClientConfig::load_from_file(&path)
                .with_context(|| format!("failed to load {}", path.display()))
        }
        _ => Ok(ClientConfig::default()),
    }
}

/// Render a configuration as TOML
pub fn render_config(config: &ClientConfig) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}

/// Write the default configuration to `path`
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, render_config(&ClientConfig::default())?)?;
    Ok(())
}
