//! Git ref resolution.

/// Ref deployed when none is given and the current branch is unknown.
pub const DEFAULT_REF: &str = "master";

const HEADS_PREFIX: &str = "refs/heads/";

/// Pick the git ref to deploy.
///
/// An explicit, non-empty ref is returned as is. Otherwise `head` is asked
/// for the current branch; when that fails (not in a repository, detached
/// HEAD) [`DEFAULT_REF`] is used. `refs/heads/test-deploy` becomes
/// `test-deploy`.
pub fn resolve_ref<F>(explicit: Option<&str>, head: F) -> String
where
    F: FnOnce() -> anyhow::Result<String>,
{
    if let Some(reference) = explicit.filter(|r| !r.is_empty()) {
        return reference.to_string();
    }

    match head() {
        Ok(head) => head
            .strip_prefix(HEADS_PREFIX)
            .unwrap_or(&head)
            .to_string(),
        Err(err) => {
            tracing::debug!(error = %err, "could not read current branch, using {}", DEFAULT_REF);
            DEFAULT_REF.to_string()
        }
    }
}
