//! deploy.toml schema.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{ENV_API_URL, ENV_ORGANIZATION, ENV_TOKEN};
use crate::environment::DEFAULT_PROTECTED_ENVIRONMENTS;
use crate::github::DEFAULT_API_URL;

pub const DEFAULT_HOST: &str = "github.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub github: GitHubSettings,
    pub deploy: DeploySettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubSettings {
    /// Host git remotes must point at to be recognised.
    pub host: String,
    pub api_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploySettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_org: Option<String>,
    /// Seconds to wait for the deployment to report a pending status.
    pub timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub protected_environments: Vec<String>,
}

impl Default for DeploySettings {
    fn default() -> Self {
        Self {
            default_org: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            protected_environments: DEFAULT_PROTECTED_ENVIRONMENTS
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }
}

impl DeployConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides using `lookup` to read variables. Empty values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(token) = lookup(ENV_TOKEN) {
            self.github.token = Some(token);
        }
        if let Some(org) = lookup(ENV_ORGANIZATION) {
            self.deploy.default_org = Some(org);
        }
        if let Some(url) = lookup(ENV_API_URL) {
            self.github.api_url = url;
        }
    }

    /// Reject settings the deploy flow cannot run with.
    ///
    /// Call again after applying flag overrides.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.deploy.timeout_secs == 0 {
            anyhow::bail!("deploy.timeout_secs must be greater than zero");
        }
        if self.deploy.poll_interval_ms == 0 {
            anyhow::bail!("deploy.poll_interval_ms must be greater than zero");
        }
        if self.github.host.trim().is_empty() {
            anyhow::bail!("github.host must not be empty");
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.deploy.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.deploy.poll_interval_ms)
    }
}
