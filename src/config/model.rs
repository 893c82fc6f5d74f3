//! Configuration data model.
//!
//! All structs derive `Serialize`/`Deserialize` for TOML persistence.
//! Every field has a default so the client works without a config file.

use serde::{Deserialize, Serialize};

use super::username::generate_username;

/// Root application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl AppConfig {
    /// Fill in a random username when none is configured.
    ///
    /// Returns `true` if the config changed and is worth saving.
    pub fn ensure_username(&mut self) -> bool {
        if self.server.username.as_deref().is_some_and(|u| !u.is_empty()) {
            return false;
        }
        self.server.username = Some(generate_username());
        true
    }
}

/// Where to connect and how to identify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Hostname or IP address of the chat server.
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    /// Send `login` right after connecting.
    #[serde(default = "default_true")]
    pub auto_login: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            username: None,
            auto_login: true,
        }
    }
}

/// Diagnostic log settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

/// Terminal output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            timestamp_format: default_timestamp_format(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}
fn default_port() -> u16 {
    1300
}
fn default_true() -> bool {
    true
}
fn default_filter() -> String {
    "warn".to_string()
}
fn default_timestamp_format() -> String {
    "%H:%M".to_string()
}
