//! GitHub client errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitHubError {
    /// GitHub answered with a non-success status.
    #[error("GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid GitHub API URL: {0}")]
    Url(#[from] url::ParseError),
}

impl GitHubError {
    /// The message GitHub returned, for API errors.
    pub fn api_message(&self) -> Option<&str> {
        match self {
            GitHubError::Api { message, .. } => Some(message),
            _ => None,
        }
    }
}
