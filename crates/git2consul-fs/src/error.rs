//! Error types for git2consul-fs

use std::io::ErrorKind;
use std::path::PathBuf;

/// Result type for git2consul-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading a working-tree snapshot
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Can't read directory {path}: {source}")]
    ListDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Can't read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Entry not found in snapshot: {path}")]
    NotFound { path: String },
}

impl Error {
    pub fn list_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ListDir {
            path: path.into(),
            source,
        }
    }

    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Whether retrying the same read could plausibly succeed.
    ///
    /// Only interruptions and timeouts qualify; a missing or unreadable
    /// entry will fail the same way next time.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ListDir { source, .. } | Self::ReadFile { source, .. } => matches!(
                source.kind(),
                ErrorKind::Interrupted | ErrorKind::TimedOut | ErrorKind::WouldBlock
            ),
            Self::NotFound { .. } => false,
        }
    }
}
