//! Minimal GitHub REST client for the deployments API.

mod client;
mod error;
mod types;

pub use client::{DEFAULT_API_URL, GitHubClient};
pub use error::GitHubError;
pub use types::{
    Comparison, CompareCommit, CommitAuthor, CommitDetails, Deployment, DeploymentRequest,
    DeploymentStatus, Release,
};
