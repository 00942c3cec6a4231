use std::path::Path;

use git2::{Repository, Signature};

/// Commit an empty tree on the current branch.
pub fn commit_empty(repo: &Repository, message: &str) -> git2::Oid {
    let mut index = repo.index().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = Signature::now("Test", "test@example.com").unwrap();

    match repo.head() {
        Ok(head) => {
            let parent = repo.find_commit(head.target().unwrap()).unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent])
                .unwrap()
        }
        Err(_) => repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &[])
            .unwrap(),
    }
}

/// Initialise a repository with one commit on `branch` and an origin remote.
pub fn init_repo(path: &Path, branch: &str, origin: Option<&str>) -> Repository {
    let repo = Repository::init(path).unwrap();
    repo.set_head(&format!("refs/heads/{}", branch)).unwrap();
    commit_empty(&repo, "initial");
    if let Some(url) = origin {
        repo.remote("origin", url).unwrap();
    }
    repo
}
