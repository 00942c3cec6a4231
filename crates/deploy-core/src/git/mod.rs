//! Local git repository inspection.
//!
//! Only reads state: the current branch and the configured remotes.

mod local;

pub use local::LocalRepo;
