//! Configuration Management
//!
//! Persistent CLI settings, merged with flags and environment variables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_ENDPOINT: &str = "REDFISH_ENDPOINT";
pub const ENV_USERNAME: &str = "REDFISH_USERNAME";
pub const ENV_PASSWORD: &str = "REDFISH_PASSWORD";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the Redfish service
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    /// Skip TLS verification (self-signed BMC certificates)
    #[serde(default)]
    pub insecure: bool,
    /// Use HTTP basic auth instead of a session
    #[serde(default)]
    pub basic_auth: bool,
    /// Parallel member fetches
    #[serde(default)]
    pub fan_out: Option<usize>,
    /// Request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("redfish").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load from `path`; a missing or unreadable file yields the defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;

        Ok(())
    }

    /// Effective endpoint (CLI > environment > config file)
    pub fn effective_endpoint(&self, cli: Option<&str>) -> Option<String> {
        pick(cli, ENV_ENDPOINT, self.endpoint.as_deref())
    }

    /// Effective username (CLI > environment > config file)
    pub fn effective_username(&self, cli: Option<&str>) -> Option<String> {
        pick(cli, ENV_USERNAME, self.username.as_deref())
    }

    /// Passwords are never persisted: CLI > environment only.
    pub fn effective_password(&self, cli: Option<&str>) -> Option<String> {
        pick(cli, ENV_PASSWORD, None)
    }
}

fn pick(cli: Option<&str>, env: &str, file: Option<&str>) -> Option<String> {
    cli.map(str::to_string)
        .or_else(|| std::env::var(env).ok().filter(|v| !v.is_empty()))
        .or_else(|| file.map(str::to_string))
}
