//! Check configuration
//!
//! The configuration document follows the agent check layout: a shared
//! `init_config` section and a list of `instances`, one per ResourceManager.
//!
//! ```yaml
//! init_config:
//!   default_timeout: 8
//! instances:
//!   - resourcemanager_uri: rm.example.com:8088
//!     user_pattern: "hue|zeppelin"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::{Host, Url};

use crate::classifier::UserPattern;
use crate::error::ConfigError;

/// Environment variable prefix for overrides, e.g. `YARN_STATS_INIT_CONFIG__DEFAULT_TIMEOUT`
pub const ENV_PREFIX: &str = "YARN_STATS";

fn default_timeout() -> f64 {
    8.0
}

/// Settings shared by every instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitConfig {
    /// Fetch timeout in seconds for instances that do not set one
    #[serde(default = "default_timeout")]
    pub default_timeout: f64,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            default_timeout: default_timeout(),
        }
    }
}

/// One instance entry as written in the configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstanceSettings {
    /// `host[:port]` of the ResourceManager, optionally with a scheme
    pub resourcemanager_uri: Option<String>,
    /// Regular expression for interactive users
    pub user_pattern: Option<String>,
    /// Fetch timeout in seconds
    pub timeout: Option<f64>,
    /// Extra tags added to every metric and event
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Whole configuration document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckConfig {
    #[serde(default)]
    pub init_config: Option<InitConfig>,
    #[serde(default)]
    pub instances: Vec<InstanceSettings>,
}

impl CheckConfig {
    /// Load from a YAML/JSON/TOML file with environment overrides
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Validate every instance against the shared settings
    pub fn resolve(&self) -> Result<Vec<InstanceConfig>, ConfigError> {
        if self.instances.is_empty() {
            return Err(ConfigError::NoInstances);
        }

        let init = self.init_config.clone().unwrap_or_default();
        self.instances
            .iter()
            .map(|settings| InstanceConfig::resolve(&init, settings))
            .collect()
    }
}

/// Address of a ResourceManager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceManagerEndpoint {
    uri: String,
    base_url: Url,
    host: String,
}

impl ResourceManagerEndpoint {
    /// Parse `host[:port]`, with or without an `http(s)://` scheme
    pub fn parse(uri: &str) -> Result<Self, ConfigError> {
        let trimmed = uri.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }

        let with_scheme = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("http://{}", trimmed)
        };

        let base_url = Url::parse(&with_scheme).map_err(|e| ConfigError::InvalidEndpoint {
            uri: uri.to_string(),
            reason: e.to_string(),
        })?;

        // IPv6 literals lose their brackets
        let host = match base_url.host() {
            Some(Host::Domain(domain)) if !domain.is_empty() => domain.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            _ => {
                return Err(ConfigError::InvalidEndpoint {
                    uri: uri.to_string(),
                    reason: "no host".to_string(),
                })
            }
        };

        Ok(Self {
            uri: trimmed.to_string(),
            base_url,
            host,
        })
    }

    /// Endpoint as configured
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Hostname without port, used as the host of every metric
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

/// Validated configuration of one check instance
#[derive(Debug, Clone)]
pub struct InstanceConfig {
    pub endpoint: ResourceManagerEndpoint,
    pub user_pattern: UserPattern,
    pub timeout: Duration,
    pub tags: Vec<String>,
}

impl InstanceConfig {
    /// Validate one instance; the endpoint is mandatory
    pub fn resolve(init: &InitConfig, settings: &InstanceSettings) -> Result<Self, ConfigError> {
        let uri = settings
            .resourcemanager_uri
            .as_deref()
            .ok_or(ConfigError::MissingEndpoint)?;
        let endpoint = ResourceManagerEndpoint::parse(uri)?;

        let user_pattern = UserPattern::from_option(settings.user_pattern.as_deref())?;

        let timeout_secs = settings.timeout.unwrap_or(init.default_timeout);
        if !timeout_secs.is_finite() || timeout_secs <= 0.0 {
            return Err(ConfigError::InvalidTimeout(timeout_secs));
        }

        Ok(Self {
            endpoint,
            user_pattern,
            timeout: Duration::from_secs_f64(timeout_secs),
            tags: settings.tags.clone(),
        })
    }

    /// Instance with default settings for an endpoint
    pub fn for_endpoint(uri: &str) -> Result<Self, ConfigError> {
        Self::resolve(
            &InitConfig::default(),
            &InstanceSettings {
                resourcemanager_uri: Some(uri.to_string()),
                ..Default::default()
            },
        )
    }
}
