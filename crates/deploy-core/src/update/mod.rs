//! Self-update from GitHub releases.
//!
//! Releases publish one zip per platform named
//! `deploy_{version}_{os}_{arch}.zip` containing the `deploy` binary.

mod archive;

use std::path::{Path, PathBuf};

use anyhow::Context;
use semver::Version;

use crate::github::GitHubClient;
use crate::repo::RepoRef;

pub use archive::{replace_executable, unzip_executable};

/// Repository the tool's own releases are published to.
pub const RELEASE_OWNER: &str = "remind101";
pub const RELEASE_REPO: &str = "deploy";

/// Result of an update attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// No release has been published.
    NoRelease,
    /// The running binary is already the newest release.
    UpToDate(String),
    /// The binary at `path` was replaced with `version`.
    Updated { version: String, path: PathBuf },
}

/// The newest published release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestRelease {
    pub tag: String,
    pub version: String,
}

pub struct Updater {
    client: GitHubClient,
    http: reqwest::Client,
    release_repo: RepoRef,
    download_base: String,
    current_version: String,
}

impl Updater {
    /// Updater for the running binary, downloading from `https://{web_host}`.
    pub fn new(client: GitHubClient, web_host: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(format!("deploy/{}", crate::VERSION))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            http,
            release_repo: RepoRef::new(RELEASE_OWNER, RELEASE_REPO),
            download_base: format!("https://{}", web_host),
            current_version: crate::VERSION.to_string(),
        })
    }

    pub fn with_download_base(mut self, base: impl Into<String>) -> Self {
        self.download_base = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_current_version(mut self, version: impl Into<String>) -> Self {
        self.current_version = version.into();
        self
    }

    /// Newest release, if any. A leading `v` is dropped from the version.
    pub async fn latest_release(&self) -> anyhow::Result<Option<LatestRelease>> {
        let releases = self
            .client
            .list_releases(&self.release_repo)
            .await
            .with_context(|| format!("Error getting {} releases", self.release_repo))?;

        Ok(releases.into_iter().next().map(|release| LatestRelease {
            version: release
                .tag_name
                .strip_prefix('v')
                .unwrap_or(&release.tag_name)
                .to_string(),
            tag: release.tag_name,
        }))
    }

    /// Replace the running executable with the newest release.
    pub async fn update(&self) -> anyhow::Result<UpdateOutcome> {
        let exe = std::env::current_exe().context("Failed to locate the running executable")?;
        self.update_path(&exe).await
    }

    /// Replace the executable at `target` with the newest release.
    pub async fn update_path(&self, target: &Path) -> anyhow::Result<UpdateOutcome> {
        let Some(latest) = self.latest_release().await? else {
            return Ok(UpdateOutcome::NoRelease);
        };

        if !is_newer(&latest.version, &self.current_version) {
            return Ok(UpdateOutcome::UpToDate(latest.version));
        }

        tracing::info!(version = %latest.version, "updating deploy");
        let staging = tempfile::Builder::new()
            .prefix("deploy-update")
            .tempdir()
            .context("Failed to create temporary directory")?;

        let url = self.download_url(&latest);
        let archive = self.download(&url, staging.path()).await?;
        let exe = unzip_executable(&archive, staging.path())?;
        replace_executable(&exe, target)?;

        Ok(UpdateOutcome::Updated {
            version: latest.version,
            path: target.to_path_buf(),
        })
    }

    pub fn download_url(&self, release: &LatestRelease) -> String {
        format!(
            "{}/{}/releases/download/{}/deploy_{}_{}_{}.zip",
            self.download_base,
            self.release_repo,
            release.tag,
            release.version,
            platform_os(),
            platform_arch()
        )
    }

    async fn download(&self, url: &str, dir: &Path) -> anyhow::Result<PathBuf> {
        tracing::debug!(%url, "downloading release");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to download {}", url))?;

        if !response.status().is_success() {
            anyhow::bail!("Can't download {}: {}", url, response.status().as_u16());
        }

        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read download from {}", url))?;

        let file_name = url.rsplit('/').next().unwrap_or("deploy.zip");
        let path = dir.join(file_name);
        std::fs::write(&path, &bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

/// Whether `latest` should replace `current`.
///
/// Versions that are not semver are compared for equality only.
pub fn is_newer(latest: &str, current: &str) -> bool {
    match (Version::parse(latest), Version::parse(current)) {
        (Ok(latest), Ok(current)) => latest > current,
        _ => latest != current,
    }
}

/// Operating system name as used in release asset names.
pub fn platform_os() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

/// Architecture name as used in release asset names.
pub fn platform_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        other => other,
    }
}
