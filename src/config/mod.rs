pub mod model;
pub mod username;

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub use model::AppConfig;

/// Environment variable naming an alternate config file.
pub const CONFIG_ENV: &str = "LINECHAT_CONFIG";

/// Where the config lives: `$LINECHAT_CONFIG` if set and non-empty, else
/// `linechat/config.toml` under the platform config directory.
pub fn config_path() -> PathBuf {
    resolve_config_path(std::env::var_os(CONFIG_ENV))
}

fn resolve_config_path(override_path: Option<OsString>) -> PathBuf {
    match override_path {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("linechat")
            .join("config.toml"),
    }
}

/// Load the config from [`config_path`].
pub fn load_config() -> Result<AppConfig> {
    load_config_from(&config_path())
}

/// Load the config at `path`, falling back to defaults when the file is
/// missing.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

pub fn save_config(config: &AppConfig) -> Result<()> {
    save_config_to(&config_path(), config)
}

pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
    }
    let contents = toml::to_string_pretty(config).with_context(|| "Failed to serialize config")?;
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    Ok(())
}
