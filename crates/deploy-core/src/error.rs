//! Error types surfaced to the user.

use thiserror::Error;

use crate::github::GitHubError;

const STATUS_CHECKS_FAILED_PREFIX: &str = "Conflict: Commit status checks failed for";
const NO_REF_PREFIX: &str = "No ref found for";

/// Errors produced while resolving inputs and running a deployment.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("Invalid GitHub repo: {0}")]
    InvalidRepo(String),

    #[error("--{0} flag is required")]
    MissingFlag(&'static str),

    #[error("no GitHub repo found in .git/config")]
    NoGitHubRepo,

    #[error("Deployment aborted.")]
    Aborted,

    #[error(
        "Timed out waiting for build to start. Did you add a webhook to handle deployment events?"
    )]
    Timeout,

    #[error("Timeout must be greater than zero")]
    ZeroTimeout,

    #[error("Failed to deploy")]
    Failed,

    #[error(transparent)]
    GitHub(#[from] GitHubError),
}

/// Render an error the way it should be shown to the user.
///
/// GitHub API messages are passed through, with a couple of well known
/// conflicts rewritten into actionable hints.
pub fn user_message(err: &anyhow::Error) -> String {
    let api_message = err
        .downcast_ref::<GitHubError>()
        .or_else(|| match err.downcast_ref::<DeployError>() {
            Some(DeployError::GitHub(inner)) => Some(inner),
            _ => None,
        })
        .and_then(GitHubError::api_message);

    match api_message {
        Some(message) => rewrite_api_message(message),
        None => err.to_string(),
    }
}

fn rewrite_api_message(message: &str) -> String {
    if message.starts_with(STATUS_CHECKS_FAILED_PREFIX) {
        "Commit status checks failed. You can bypass commit status checks with the --force flag."
            .to_string()
    } else if message.starts_with(NO_REF_PREFIX) {
        format!("{message}. Did you push it to GitHub?")
    } else {
        message.to_string()
    }
}
