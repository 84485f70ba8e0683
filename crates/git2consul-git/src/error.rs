//! Error types for git2consul-git

use std::path::PathBuf;

use git2::{ErrorClass, ErrorCode};

/// Result type for git2consul-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while managing the local mirror
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Error cloning repository {url}: {source}")]
    Clone {
        url: String,
        #[source]
        source: git2::Error,
    },

    #[error("Error opening local git directory {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("Error fetching '{branch}' from remote '{remote}': {source}")]
    Fetch {
        remote: String,
        branch: String,
        #[source]
        source: git2::Error,
    },

    #[error("Remote '{name}' not found")]
    RemoteNotFound { name: String },

    #[error("Directory {path} exists but is not a git working copy")]
    NotARepository { path: PathBuf },

    #[error("HEAD is detached in {path}; a checked-out branch is required")]
    DetachedHead { path: PathBuf },

    #[error("Cannot fast-forward {branch} from {head} to {fetched}. Manual merge required.")]
    CannotFastForward {
        branch: String,
        head: String,
        fetched: String,
    },

    #[error("Can't parse given private key: {reason}")]
    InvalidPrivateKey { reason: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the failure came from the network and may clear up on retry.
    ///
    /// Authentication and certificate failures are permanent even though
    /// they surface through the transport.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Git(source) | Self::Clone { source, .. } | Self::Fetch { source, .. } => {
                is_transient_git(source)
            }
            Self::Io { source, .. } => matches!(
                source.kind(),
                std::io::ErrorKind::Interrupted | std::io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }
}

fn is_transient_git(error: &git2::Error) -> bool {
    if matches!(error.code(), ErrorCode::Auth | ErrorCode::Certificate) {
        return false;
    }
    matches!(
        error.class(),
        ErrorClass::Net | ErrorClass::Http | ErrorClass::Ssh | ErrorClass::Ssl
    )
}
