//! Environment name handling.

/// Short names accepted in place of the full environment name.
pub const ENVIRONMENT_ALIASES: [(&str, &str); 2] = [("prod", "production"), ("stage", "staging")];

/// Environments that require confirmation unless configured otherwise.
pub const DEFAULT_PROTECTED_ENVIRONMENTS: [&str; 1] = ["production"];

/// Expand an environment alias; unknown names pass through.
pub fn alias_environment(env: &str) -> String {
    ENVIRONMENT_ALIASES
        .iter()
        .find(|(alias, _)| *alias == env)
        .map(|(_, full)| full.to_string())
        .unwrap_or_else(|| env.to_string())
}

/// Whether deploying to `env` needs an explicit confirmation.
pub fn is_protected(env: &str, protected: &[String]) -> bool {
    protected.iter().any(|p| p == env)
}
