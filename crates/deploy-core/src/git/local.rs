//! Read-only access to the git repository enclosing a directory.

use std::path::Path;

use anyhow::Context;
use git2::Repository;

use crate::repo::Remote;

/// The git repository the command is run from.
pub struct LocalRepo {
    repo: Repository,
}

impl LocalRepo {
    /// Open the repository containing `path`, searching parent directories.
    pub fn discover(path: &Path) -> anyhow::Result<Self> {
        let repo = Repository::discover(path)
            .with_context(|| format!("Not a git repository: {}", path.display()))?;
        Ok(Self { repo })
    }

    /// Full ref name of the checked out branch, e.g. `refs/heads/main`.
    pub fn head(&self) -> anyhow::Result<String> {
        let head = self.repo.head().context("Failed to read HEAD")?;
        if !head.is_branch() {
            anyhow::bail!("HEAD is not on a branch");
        }
        head.name()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("HEAD ref name is not valid UTF-8"))
    }

    /// All remotes that have a URL configured.
    pub fn remotes(&self) -> anyhow::Result<Vec<Remote>> {
        let names = self.repo.remotes().context("Failed to list git remotes")?;
        let mut remotes = Vec::new();
        for name in names.iter().flatten() {
            let remote = self
                .repo
                .find_remote(name)
                .with_context(|| format!("Failed to read remote '{}'", name))?;
            if let Some(url) = remote.url() {
                remotes.push(Remote::new(name, url));
            }
        }
        Ok(remotes)
    }
}
