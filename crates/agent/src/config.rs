//! Agent configuration

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{ensure, Result};
use serde::Deserialize;

/// Environment prefix of agent settings, e.g. `YARN_AGENT_INTERVAL_SECS`
pub const ENV_PREFIX: &str = "YARN_AGENT";

/// Shortest accepted interval; minute 0 then sees a single invocation
pub const MIN_INTERVAL_SECS: u64 = 60;

/// Agent configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Check configuration document with `init_config` and `instances`
    #[serde(default = "default_check_config")]
    pub check_config: PathBuf,

    /// Seconds between two invocations of every instance
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Upper bound on one invocation, in seconds
    #[serde(default = "default_run_timeout")]
    pub run_timeout_secs: u64,

    /// Check name attached to every log record
    #[serde(default = "default_check_name")]
    pub check_name: String,
}

fn default_check_config() -> PathBuf {
    PathBuf::from("/etc/yarn-stats/yarn.yaml")
}

fn default_interval() -> u64 {
    MIN_INTERVAL_SECS
}

fn default_run_timeout() -> u64 {
    60
}

fn default_check_name() -> String {
    "yarn".to_string()
}

impl AgentConfig {
    /// Load configuration from environment
    pub fn load() -> Result<Self> {
        Self::from_source(config::Environment::with_prefix(ENV_PREFIX))
    }

    fn from_source<S>(source: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = config::Config::builder().add_source(source).build()?;
        let agent: AgentConfig = config.try_deserialize()?;
        agent.validate()?;
        Ok(agent)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.interval_secs >= MIN_INTERVAL_SECS,
            "interval_secs must be at least {}, got {}",
            MIN_INTERVAL_SECS,
            self.interval_secs
        );
        ensure!(self.run_timeout_secs > 0, "run_timeout_secs must be positive");
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }
}
