//! Deploy Core Library
//!
//! Resolves a GitHub repository and git ref from local context, creates a
//! GitHub deployment and watches its statuses until it finishes.

pub mod config;
pub mod deploy;
pub mod environment;
pub mod error;
pub mod git;
pub mod github;
pub mod refs;
pub mod repo;
pub mod update;

/// Version of the running binary, used for the User-Agent and self-update.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
