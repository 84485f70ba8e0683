//! The on-disk mirror of the tracked remote

use std::path::{Path, PathBuf};

use git2::build::RepoBuilder;
use git2::{FetchOptions, Repository};
use git2consul_fs::LocalSnapshot;

use crate::credentials::{Credential, is_ssh_url};
use crate::helpers::{self, FastForward};
use crate::provider::{Advance, Ensured, Mirror, Revision};
use crate::{Error, Result, commits};

/// Remote whose branch the mirror follows.
pub const DEFAULT_REMOTE: &str = "origin";

/// A git working copy at a fixed path that follows a remote repository.
///
/// The repository is reopened for every operation, so the mirror holds no
/// libgit2 handles and can be shared across threads.
#[derive(Debug, Clone)]
pub struct GitMirror {
    url: String,
    path: PathBuf,
    credential: Option<Credential>,
    remote: String,
}

impl GitMirror {
    /// Create a mirror of `url` at `path`.
    pub fn new(url: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            path: path.into(),
            credential: None,
            remote: DEFAULT_REMOTE.to_string(),
        }
    }

    /// Authenticate with `credential` when talking to an SSH remote.
    ///
    /// The credential is ignored for other transports.
    pub fn with_credential(mut self, credential: Credential) -> Self {
        if !is_ssh_url(&self.url) {
            tracing::warn!(
                url = %self.url,
                "Private key configured for a non-SSH remote; it will not be used"
            );
        }
        self.credential = Some(credential);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn fetch_options(&self) -> FetchOptions<'_> {
        let mut options = FetchOptions::new();
        if let Some(credential) = self.credential.as_ref().filter(|_| is_ssh_url(&self.url)) {
            options.remote_callbacks(credential.remote_callbacks());
        }
        options
    }

    fn open(&self) -> Result<Repository> {
        Repository::open(&self.path).map_err(|source| Error::Open {
            path: self.path.clone(),
            source,
        })
    }

    fn clone_remote(&self) -> Result<Repository> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let mut builder = RepoBuilder::new();
        builder.fetch_options(self.fetch_options());
        builder
            .clone(&self.url, &self.path)
            .map_err(|source| Error::Clone {
                url: self.url.clone(),
                source,
            })
    }
}

impl Mirror for GitMirror {
    type Snapshot = LocalSnapshot;

    fn ensure(&self) -> Result<Ensured> {
        if let Ok(repo) = Repository::open(&self.path) {
            if repo.is_bare() {
                return Err(Error::NotARepository {
                    path: self.path.clone(),
                });
            }
            let head = helpers::head_revision(&repo)?;
            tracing::info!(
                path = %self.path.display(),
                revision = %head,
                "Repository already exists at HEAD"
            );
            return Ok(Ensured::Existing(head));
        }

        if !helpers::is_vacant(&self.path)? {
            return Err(Error::NotARepository {
                path: self.path.clone(),
            });
        }

        tracing::info!(url = %self.url, path = %self.path.display(), "Cloning repository");
        let repo = self.clone_remote()?;
        let head = helpers::head_revision(&repo)?;
        tracing::info!(revision = %head, "Repository cloned");
        Ok(Ensured::Cloned(head))
    }

    fn advance(&self) -> Result<Advance> {
        let repo = self.open()?;
        let before = helpers::head_revision(&repo)?;
        let branch = helpers::tracked_branch(&repo)?;

        tracing::debug!(remote = %self.remote, branch = %branch, "Pulling from remote");
        let fetched = helpers::fetch_branch(&repo, &self.remote, &branch, self.fetch_options())?;

        match helpers::fast_forward(&repo, &branch, fetched)? {
            FastForward::UpToDate => Ok(Advance::UpToDate(before)),
            FastForward::Applied => {
                let after = helpers::head_revision(&repo)?;
                let commits = commits::count_commits_between(&repo, before.oid(), fetched)?;
                let info = commits::describe_commit(&repo, fetched)?;
                tracing::info!(
                    from = %before,
                    to = %after,
                    commits,
                    author = %info.author,
                    committed_at = %info.timestamp,
                    "Fast-forwarded to {}: {}",
                    info.hash,
                    info.message
                );
                Ok(Advance::FastForwarded {
                    from: before,
                    to: after,
                    commits,
                })
            }
        }
    }

    fn head(&self) -> Result<Revision> {
        let repo = self.open()?;
        helpers::head_revision(&repo)
    }

    fn snapshot(&self) -> LocalSnapshot {
        LocalSnapshot::new(&self.path)
    }
}
