//! Configuration management for the CLI

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use yarn_lib::{InitConfig, InstanceConfig, InstanceSettings};

/// CLI configuration, read from `~/.config/yarn-stats/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// ResourceManager address used when `--resourcemanager-uri` is absent
    pub resourcemanager_uri: Option<String>,
    /// Interactive user pattern used when `--user-pattern` is absent
    pub user_pattern: Option<String>,
    /// Request timeout in seconds
    pub timeout: Option<f64>,
    /// Tags added to every emitted metric
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)
            .context("Failed to read config file")?;

        serde_json::from_str(&content).context("Failed to parse config file")
    }

    /// Get the configuration file path
    fn config_path() -> Result<PathBuf> {
        let home = dirs_next::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("yarn-stats").join("config.json"))
    }

    /// Combine command-line overrides with the file and validate the result
    pub fn instance(
        self,
        resourcemanager_uri: Option<String>,
        user_pattern: Option<String>,
        timeout: Option<f64>,
    ) -> Result<InstanceConfig> {
        let settings = InstanceSettings {
            resourcemanager_uri: resourcemanager_uri.or(self.resourcemanager_uri),
            user_pattern: user_pattern.or(self.user_pattern),
            timeout: timeout.or(self.timeout),
            tags: self.tags,
        };
        InstanceConfig::resolve(&InitConfig::default(), &settings)
            .context("Invalid ResourceManager settings")
    }
}
