//! Creating a deployment and following it to completion.
//!
//! After the deployment is created two watchers poll its statuses: one for
//! the first `pending` status and one for the first terminal status. The
//! pending watcher races a single deadline; once it wins, the run waits for
//! the terminal watcher without a further timeout.

pub mod watch;

use std::io::Write;
use std::time::Duration;

use tracing::info;

use crate::config::DeployConfig;
use crate::config::schema::{DEFAULT_HOST, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_SECS};
use crate::environment::{DEFAULT_PROTECTED_ENVIRONMENTS, is_protected};
use crate::error::DeployError;
use crate::github::{Deployment, DeploymentRequest, GitHubClient};
use crate::repo::RepoRef;

pub use watch::{COMPLETED_STATES, PENDING_STATES, Watcher, first_status, wait_state};

/// Asks the user to confirm a deployment to a protected environment.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> anyhow::Result<bool>;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> anyhow::Result<bool>,
{
    fn confirm(&self, prompt: &str) -> anyhow::Result<bool> {
        self(prompt)
    }
}

/// What to deploy and how to follow it.
#[derive(Debug, Clone)]
pub struct DeployOptions {
    pub repo: RepoRef,
    pub reference: String,
    pub environment: String,
    /// Skip commit status checks.
    pub force: bool,
    /// Return as soon as the deployment is created.
    pub detached: bool,
    /// Deadline for the deployment to report a pending status.
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl DeployOptions {
    pub fn new(
        repo: RepoRef,
        reference: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            repo,
            reference: reference.into(),
            environment: environment.into(),
            force: false,
            detached: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_detached(mut self, detached: bool) -> Self {
        self.detached = detached;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Build the API request for these options.
    pub fn request(&self) -> DeploymentRequest {
        DeploymentRequest::new(&self.reference, &self.environment).with_force(self.force)
    }
}

/// Runs deployments against GitHub.
pub struct Deployer {
    client: GitHubClient,
    web_host: String,
    protected_environments: Vec<String>,
    confirm: Box<dyn Confirm>,
}

impl Deployer {
    pub fn new(client: GitHubClient, confirm: impl Confirm + 'static) -> Self {
        Self {
            client,
            web_host: DEFAULT_HOST.to_string(),
            protected_environments: DEFAULT_PROTECTED_ENVIRONMENTS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            confirm: Box::new(confirm),
        }
    }

    /// Build a deployer from loaded configuration.
    pub fn from_config(
        config: &DeployConfig,
        confirm: impl Confirm + 'static,
    ) -> anyhow::Result<Self> {
        let client = GitHubClient::new(&config.github.api_url, config.github.token.clone())?;
        Ok(Self::new(client, confirm)
            .with_web_host(&config.github.host)
            .with_protected_environments(config.deploy.protected_environments.clone()))
    }

    /// Host used for links to the GitHub web UI.
    pub fn with_web_host(mut self, host: impl Into<String>) -> Self {
        self.web_host = host.into();
        self
    }

    pub fn with_protected_environments(mut self, environments: Vec<String>) -> Self {
        self.protected_environments = environments;
        self
    }

    /// Create the deployment and, unless detached, wait for it to finish.
    ///
    /// Progress is written to `out`.
    pub async fn run<W: Write>(
        &self,
        options: &DeployOptions,
        out: &mut W,
    ) -> anyhow::Result<Deployment> {
        if !options.detached && options.timeout.is_zero() {
            return Err(DeployError::ZeroTimeout.into());
        }

        self.display_new_commits(options, out).await?;

        if is_protected(&options.environment, &self.protected_environments) {
            let prompt = format!(
                "Are you sure you want to deploy {} to {}?",
                options.reference, options.environment
            );
            if !self.confirm.confirm(&prompt)? {
                return Err(DeployError::Aborted.into());
            }
        }

        let request = options.request();
        writeln!(
            out,
            "Deploying {}@{} to {}...",
            options.repo, request.reference, request.environment
        )?;

        let deployment = self
            .client
            .create_deployment(&options.repo, &request)
            .await
            .map_err(DeployError::from)?;
        info!(id = deployment.id, repo = %options.repo, "created deployment");

        if options.detached {
            return Ok(deployment);
        }

        self.follow(options, &deployment, out).await?;
        Ok(deployment)
    }

    /// Wait for the deployment to start, then to finish.
    async fn follow<W: Write>(
        &self,
        options: &DeployOptions,
        deployment: &Deployment,
        out: &mut W,
    ) -> anyhow::Result<()> {
        let mut started = Watcher::spawn(
            self.client.clone(),
            options.repo.clone(),
            deployment.id,
            PENDING_STATES,
            options.poll_interval,
        );
        let mut completed = Watcher::spawn(
            self.client.clone(),
            options.repo.clone(),
            deployment.id,
            COMPLETED_STATES,
            options.poll_interval,
        );

        tokio::select! {
            _ = tokio::time::sleep(options.timeout) => {
                tracing::warn!(id = deployment.id, timeout = ?options.timeout, "deployment did not start");
                return Err(DeployError::Timeout.into());
            }
            status = started.status() => {
                let status = status?;
                info!(id = deployment.id, state = %status.state, "deployment started");
                writeln!(out, "{}", status.target_url.as_deref().unwrap_or(""))?;
            }
        }

        let status = completed.status().await?;
        info!(id = deployment.id, state = %status.state, "deployment finished");
        if status.is_failed() {
            return Err(DeployError::Failed.into());
        }

        Ok(())
    }

    /// Print the commits between the last deployment to the environment and
    /// the ref being deployed.
    async fn display_new_commits<W: Write>(
        &self,
        options: &DeployOptions,
        out: &mut W,
    ) -> anyhow::Result<()> {
        let deployments = self
            .client
            .list_deployments(&options.repo, &options.environment)
            .await
            .map_err(DeployError::from)?;

        let Some(sha) = deployments.first().and_then(|d| d.sha.clone()) else {
            return Ok(());
        };

        let comparison = self
            .client
            .compare_commits(&options.repo, &sha, &options.reference)
            .await
            .map_err(DeployError::from)?;
        if comparison.commits.is_empty() {
            return Ok(());
        }

        writeln!(out, "Deploying the following commits:\n")?;
        for commit in &comparison.commits {
            writeln!(out, "{:<20}\t{}", commit.author_name(), commit.summary())?;
        }
        writeln!(
            out,
            "\nSee entire diff here: https://{}/{}/compare/{}...{}\n",
            self.web_host, options.repo, sha, options.reference
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_build_request() {
        let options = DeployOptions::new(RepoRef::new("remind101", "acme-inc"), "develop", "staging");
        let request = options.request();
        assert_eq!(request.reference, "develop");
        assert_eq!(request.environment, "staging");
        assert_eq!(request.required_contexts, None);

        let forced = options.with_force(true).request();
        assert_eq!(forced.required_contexts, Some(Vec::new()));
    }

    #[test]
    fn closures_confirm() {
        let yes = |_: &str| -> anyhow::Result<bool> { Ok(true) };
        assert!(yes.confirm("deploy?").unwrap());
    }
}
