//! Wire types for the parts of the GitHub API the tool touches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Task name recorded on every deployment created by the tool.
pub const DEPLOY_TASK: &str = "deploy";

/// A GitHub deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub id: u64,
    pub sha: Option<String>,
    #[serde(rename = "ref")]
    pub reference: String,
    pub task: Option<String>,
    pub environment: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /repos/{owner}/{repo}/deployments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRequest {
    #[serde(rename = "ref")]
    pub reference: String,
    pub task: String,
    pub auto_merge: bool,
    pub environment: String,
    /// `None` lets GitHub verify every commit status context; an empty list
    /// skips the checks entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_contexts: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl DeploymentRequest {
    /// A deploy task for `reference` to `environment`, without auto-merge.
    pub fn new(reference: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            task: DEPLOY_TASK.to_string(),
            auto_merge: false,
            environment: environment.into(),
            required_contexts: None,
            payload: None,
            description: None,
        }
    }

    /// Bypass commit status checks.
    pub fn with_force(mut self, force: bool) -> Self {
        self.required_contexts = if force { Some(Vec::new()) } else { None };
        self
    }
}

/// One entry in a deployment's status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentStatus {
    pub id: Option<u64>,
    pub state: String,
    pub target_url: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl DeploymentStatus {
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            id: None,
            state: state.into(),
            target_url: None,
            description: None,
            created_at: None,
        }
    }

    pub fn with_target_url(mut self, url: impl Into<String>) -> Self {
        self.target_url = Some(url.into());
        self
    }

    /// Terminal states that mean the deployment did not go out.
    pub fn is_failed(&self) -> bool {
        self.state == "error" || self.state == "failure"
    }
}

/// Response of `GET /repos/{owner}/{repo}/compare/{base}...{head}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    #[serde(default)]
    pub commits: Vec<CompareCommit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareCommit {
    pub sha: String,
    pub commit: CommitDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitDetails {
    pub message: String,
    pub author: Option<CommitAuthor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAuthor {
    pub name: String,
}

impl CompareCommit {
    pub fn author_name(&self) -> &str {
        self.commit
            .author
            .as_ref()
            .map(|a| a.name.as_str())
            .unwrap_or("")
    }

    /// First line of the commit message.
    pub fn summary(&self) -> &str {
        self.commit.message.lines().next().unwrap_or("")
    }
}

/// A published release; only the tag is needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub tag_name: String,
}
