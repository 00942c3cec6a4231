//! Polling of deployment statuses.

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::github::{DeploymentStatus, GitHubClient};
use crate::repo::RepoRef;

/// States that mean the deployment has been picked up.
pub const PENDING_STATES: &[&str] = &["pending"];

/// States that mean the deployment is finished.
pub const COMPLETED_STATES: &[&str] = &["success", "error", "failure"];

/// First status, in API order, whose state is one of `states`.
pub fn first_status<'a>(
    states: &[&str],
    statuses: &'a [DeploymentStatus],
) -> Option<&'a DeploymentStatus> {
    statuses
        .iter()
        .find(|status| states.contains(&status.state.as_str()))
}

/// Poll the statuses of a deployment every `interval` until one matches.
///
/// Request failures are logged and polling continues.
pub async fn wait_state(
    client: GitHubClient,
    repo: RepoRef,
    deployment_id: u64,
    states: &'static [&'static str],
    interval: Duration,
) -> DeploymentStatus {
    loop {
        tokio::time::sleep(interval).await;

        let statuses = match client.list_deployment_statuses(&repo, deployment_id).await {
            Ok(statuses) => statuses,
            Err(err) => {
                tracing::warn!(deployment_id, error = %err, "failed to list deployment statuses");
                continue;
            }
        };

        tracing::debug!(deployment_id, ?states, count = statuses.len(), "polled statuses");
        if let Some(status) = first_status(states, &statuses) {
            return status.clone();
        }
    }
}

/// A background status poller, aborted when dropped.
#[derive(Debug)]
pub struct Watcher {
    handle: JoinHandle<DeploymentStatus>,
}

impl Watcher {
    pub fn spawn(
        client: GitHubClient,
        repo: RepoRef,
        deployment_id: u64,
        states: &'static [&'static str],
        interval: Duration,
    ) -> Self {
        let handle = tokio::spawn(wait_state(client, repo, deployment_id, states, interval));
        Self { handle }
    }

    /// Wait for the matching status.
    pub async fn status(&mut self) -> anyhow::Result<DeploymentStatus> {
        Ok((&mut self.handle).await?)
    }
}

impl Drop for Watcher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
