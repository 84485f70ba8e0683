//! Upstream repository fixture.
//!
//! [`UpstreamRepo`] plays the part of the remote a mirror clones from. It is
//! an ordinary (non-bare) repository in a temporary directory, so tests can
//! keep committing to it and then observe the mirror catching up. Everything
//! goes through `git2`; no `git` binary is required.

use std::fs;
use std::path::Path;

use git2::{IndexAddOption, Oid, Repository, Signature};
use tempfile::TempDir;

/// A repository that mirrors under test clone and pull from.
pub struct UpstreamRepo {
    temp_dir: TempDir,
    repo: Repository,
}

impl Default for UpstreamRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl UpstreamRepo {
    /// Initialise an empty upstream repository (no commits).
    ///
    /// # Panics
    /// Panics if the repository cannot be created.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("UpstreamRepo: failed to create temp dir");
        let repo = Repository::init(temp_dir.path()).unwrap_or_else(|e| {
            panic!(
                "UpstreamRepo: failed to init repository at {}: {e}",
                temp_dir.path().display()
            )
        });
        Self { temp_dir, repo }
    }

    /// Initialise an upstream repository with one commit containing `files`.
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let upstream = Self::new();
        upstream.commit(files, "Initial commit");
        upstream
    }

    /// Root of the upstream working tree.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Address to clone from.
    pub fn url(&self) -> String {
        self.path().to_string_lossy().into_owned()
    }

    /// Write `files` into the working tree and commit every change.
    ///
    /// # Panics
    /// Panics if any filesystem or git operation fails.
    pub fn commit(&self, files: &[(&str, &str)], message: &str) -> Oid {
        for (relative, content) in files {
            let path = self.path().join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&path, content)
                .unwrap_or_else(|e| panic!("UpstreamRepo: failed to write {relative}: {e}"));
        }
        self.commit_all(message)
    }

    /// Delete `files` from the working tree and commit the removal.
    pub fn remove(&self, files: &[&str], message: &str) -> Oid {
        for relative in files {
            fs::remove_file(self.path().join(relative))
                .unwrap_or_else(|e| panic!("UpstreamRepo: failed to remove {relative}: {e}"));
        }
        self.commit_all(message)
    }

    /// Commit id at HEAD.
    pub fn head(&self) -> Oid {
        self.repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .map(|c| c.id())
            .expect("UpstreamRepo: HEAD has no commit")
    }

    fn commit_all(&self, message: &str) -> Oid {
        let mut index = self.repo.index().unwrap();
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .unwrap();
        index.update_all(["*"].iter(), None).unwrap();
        index.write().unwrap();

        let tree_id = index.write_tree().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("Test User", "test@test.com").unwrap();
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<_> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap_or_else(|e| panic!("UpstreamRepo: commit '{message}' failed: {e}"))
    }
}
