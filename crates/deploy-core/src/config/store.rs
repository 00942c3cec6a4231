//! Config store for loading and saving deploy.toml.

use std::path::{Path, PathBuf};

use anyhow::Context;

use super::{DeployConfig, parser};

const CONFIG_FILE: &str = "deploy.toml";

#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    /// Store at the platform config directory, e.g. `~/.config/deploy/deploy.toml`.
    pub fn with_defaults() -> anyhow::Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("deploy");
        Ok(Self::from_dir(config_dir))
    }

    pub fn from_dir(config_dir: PathBuf) -> Self {
        Self {
            config_path: config_dir.join(CONFIG_FILE),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load the file, falling back to defaults when it does not exist.
    pub fn load(&self) -> anyhow::Result<DeployConfig> {
        if !self.config_path.exists() {
            return Ok(DeployConfig::new());
        }
        parser::parse_deploy_toml(&self.config_path)
    }

    pub fn save(&self, config: &DeployConfig) -> anyhow::Result<()> {
        let content = parser::to_toml(config).context("Failed to serialize config to TOML")?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        write_private(&self.config_path, content.as_bytes()).with_context(|| {
            format!(
                "Failed to write config file: {}",
                self.config_path.display()
            )
        })?;
        Ok(())
    }

    /// Persist a GitHub token, keeping the rest of the file intact.
    pub fn save_token(&self, token: &str) -> anyhow::Result<()> {
        let mut config = self.load()?;
        config.github.token = Some(token.to_string());
        self.save(&config)
    }
}

/// Write a file readable only by its owner; it may hold a token.
#[cfg(unix)]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // The mode above only applies to newly created files
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(content)
}

#[cfg(not(unix))]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, content)
}
