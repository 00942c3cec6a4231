//! Configuration for the deploy command.
//!
//! Settings live in `deploy.toml` under the user config directory and can be
//! overridden by environment variables.

pub mod parser;
pub mod schema;
pub mod store;

pub use parser::{parse_deploy_toml, parse_deploy_toml_str, to_toml};
pub use schema::{DeployConfig, DeploySettings, GitHubSettings};
pub use store::ConfigStore;

/// Environment variable holding the GitHub token.
pub const ENV_TOKEN: &str = "GITHUB_TOKEN";
/// Environment variable holding the organization used for bare repo names.
pub const ENV_ORGANIZATION: &str = "GITHUB_ORGANIZATION";
/// Environment variable overriding the GitHub API endpoint.
pub const ENV_API_URL: &str = "GITHUB_API_URL";
