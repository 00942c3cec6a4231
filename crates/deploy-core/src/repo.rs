//! Resolution of the GitHub repository to deploy.

use std::fmt;

use url::Url;

use crate::error::DeployError;

/// The git remote that identifies the GitHub repository.
pub const ORIGIN: &str = "origin";

/// An `owner/name` pair identifying a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A named git remote and its fetch URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
    pub name: String,
    pub url: String,
}

impl Remote {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Split `owner/repo` into its components.
///
/// A bare repository name is accepted when `default_org` is non-empty, in
/// which case the organization becomes the owner.
pub fn split_repo(nwo: &str, default_org: Option<&str>) -> Result<RepoRef, DeployError> {
    let parts: Vec<&str> = nwo.split('/').collect();

    match parts.as_slice() {
        [name] => match default_org {
            Some(org) if !org.is_empty() && !name.is_empty() => Ok(RepoRef::new(org, *name)),
            _ => Err(DeployError::InvalidRepo(nwo.to_string())),
        },
        [owner, name] => Ok(RepoRef::new(*owner, *name)),
        _ => Err(DeployError::InvalidRepo(nwo.to_string())),
    }
}

/// Determine the `owner/repo` string to deploy.
///
/// An explicit argument wins; otherwise the `origin` remote is inspected.
pub fn repo_from_args(
    args: &[String],
    remotes: &[Remote],
    host: &str,
) -> Result<String, DeployError> {
    if let Some(first) = args.first() {
        return Ok(first.clone());
    }

    github_repo(remotes, host).ok_or(DeployError::NoGitHubRepo)
}

/// Derive `owner/repo` from the `origin` remote, if it points at `host`.
pub fn github_repo(remotes: &[Remote], host: &str) -> Option<String> {
    let origin = remotes.iter().find(|r| r.name == ORIGIN)?;
    let (remote_host, path) = parse_remote_url(&origin.url)?;

    if !remote_host.eq_ignore_ascii_case(host) {
        return None;
    }

    // "/remind101/acme-inc.git" => "remind101/acme-inc"
    let path = path.trim_start_matches('/').trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    if path.is_empty() {
        return None;
    }
    Some(path.to_string())
}

/// Split a remote URL into host and path.
///
/// Handles regular URLs (`https://`, `ssh://`, `git://`) as well as the
/// scp-like form `git@github.com:owner/repo.git`.
fn parse_remote_url(raw: &str) -> Option<(String, String)> {
    if raw.contains("://") {
        let url = Url::parse(raw).ok()?;
        let host = url.host_str()?.to_string();
        return Some((host, url.path().to_string()));
    }

    let (user_host, path) = raw.split_once(':')?;
    let host = user_host.rsplit('@').next()?;
    if host.is_empty() {
        return None;
    }
    Some((host.to_string(), path.to_string()))
}
