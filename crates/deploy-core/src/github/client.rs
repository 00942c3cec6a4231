//! HTTP client for the GitHub REST API.

use reqwest::header::ACCEPT;
use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::GitHubError;
use super::types::{Comparison, Deployment, DeploymentRequest, DeploymentStatus, Release};
use crate::repo::RepoRef;

/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";

/// Password half of the basic auth pair; GitHub only looks at the token.
const TOKEN_PASSWORD: &str = "x-oauth-basic";

/// Error body returned by GitHub for non-2xx responses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

/// Authenticated GitHub API client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: Url,
    token: Option<String>,
}

impl GitHubClient {
    /// Create a client for `api_url`, authenticating with `token` if given.
    pub fn new(api_url: &str, token: Option<String>) -> Result<Self, GitHubError> {
        let mut api_url = Url::parse(api_url)?;
        // Url::join replaces the last segment unless the base ends in '/'.
        if !api_url.path().ends_with('/') {
            let path = format!("{}/", api_url.path());
            api_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .user_agent(format!("deploy/{}", crate::VERSION))
            .build()?;

        Ok(Self {
            http,
            api_url,
            token,
        })
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// `POST /repos/{owner}/{repo}/deployments`
    pub async fn create_deployment(
        &self,
        repo: &RepoRef,
        request: &DeploymentRequest,
    ) -> Result<Deployment, GitHubError> {
        let url = self.endpoint(&format!("repos/{}/{}/deployments", repo.owner, repo.name))?;
        tracing::debug!(%url, reference = %request.reference, environment = %request.environment, "creating deployment");
        Self::send(self.request(Method::POST, url).json(request)).await
    }

    /// `GET /repos/{owner}/{repo}/deployments/{id}/statuses`
    pub async fn list_deployment_statuses(
        &self,
        repo: &RepoRef,
        deployment_id: u64,
    ) -> Result<Vec<DeploymentStatus>, GitHubError> {
        let url = self.endpoint(&format!(
            "repos/{}/{}/deployments/{}/statuses",
            repo.owner, repo.name, deployment_id
        ))?;
        Self::send(self.request(Method::GET, url)).await
    }

    /// `GET /repos/{owner}/{repo}/deployments?environment={env}`
    pub async fn list_deployments(
        &self,
        repo: &RepoRef,
        environment: &str,
    ) -> Result<Vec<Deployment>, GitHubError> {
        let mut url = self.endpoint(&format!("repos/{}/{}/deployments", repo.owner, repo.name))?;
        url.query_pairs_mut().append_pair("environment", environment);
        Self::send(self.request(Method::GET, url)).await
    }

    /// `GET /repos/{owner}/{repo}/compare/{base}...{head}`
    pub async fn compare_commits(
        &self,
        repo: &RepoRef,
        base: &str,
        head: &str,
    ) -> Result<Comparison, GitHubError> {
        let url = self.endpoint(&format!(
            "repos/{}/{}/compare/{}...{}",
            repo.owner, repo.name, base, head
        ))?;
        Self::send(self.request(Method::GET, url)).await
    }

    /// `GET /repos/{owner}/{repo}/releases`, newest first.
    pub async fn list_releases(&self, repo: &RepoRef) -> Result<Vec<Release>, GitHubError> {
        let url = self.endpoint(&format!("repos/{}/{}/releases", repo.owner, repo.name))?;
        Self::send(self.request(Method::GET, url)).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, GitHubError> {
        Ok(self.api_url.join(path)?)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self.http.request(method, url).header(ACCEPT, GITHUB_MEDIA_TYPE);
        match &self.token {
            Some(token) => request.basic_auth(token, Some(TOKEN_PASSWORD)),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, GitHubError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .map(|b| b.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());
            tracing::debug!(status = status.as_u16(), %message, "GitHub API error");
            return Err(GitHubError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}
