//! Error types for git2consul-core

use std::path::PathBuf;

/// Result type for git2consul-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// How the sync controller should react to a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network blips, store contention: worth retrying with backoff
    Transient,
    /// Bad credentials, broken repository, rejected writes: stop and report
    Permanent,
}

/// Errors that can occur in git2consul-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A startup option is missing or out of range
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The configuration file could not be read or parsed
    #[error("Failed to load config file {path}: {message}")]
    ConfigFile { path: PathBuf, message: String },

    /// A blocking task panicked or was cancelled
    #[error("{operation} task failed: {message}")]
    Task { operation: String, message: String },

    /// A transient failure kept recurring until the retry budget ran out
    #[error("{operation} still failing after {attempts} attempts: {source}")]
    RetriesExhausted {
        operation: String,
        attempts: usize,
        #[source]
        source: Box<Error>,
    },

    // Transparent wrappers for underlying crate errors
    /// Traversal error from git2consul-fs
    #[error(transparent)]
    Fs(#[from] git2consul_fs::Error),

    /// Mirror error from git2consul-git
    #[error(transparent)]
    Git(#[from] git2consul_git::Error),

    /// Store error from git2consul-kv
    #[error(transparent)]
    Store(#[from] git2consul_kv::Error),
}

impl Error {
    /// Classify this error for the retry policy.
    pub fn kind(&self) -> ErrorKind {
        let transient = match self {
            Self::Fs(e) => e.is_transient(),
            Self::Git(e) => e.is_transient(),
            Self::Store(e) => e.is_transient(),
            Self::InvalidConfig { .. }
            | Self::ConfigFile { .. }
            | Self::Task { .. }
            | Self::RetriesExhausted { .. } => false,
        };
        if transient {
            ErrorKind::Transient
        } else {
            ErrorKind::Permanent
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
