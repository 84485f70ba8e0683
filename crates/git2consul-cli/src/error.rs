//! Error types for git2consul-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that end the process
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from git2consul-core
    #[error(transparent)]
    Core(#[from] git2consul_core::Error),

    /// Error building the mirror, e.g. a malformed private key
    #[error(transparent)]
    Git(#[from] git2consul_git::Error),

    /// Error building the Consul client
    #[error(transparent)]
    Store(#[from] git2consul_kv::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to listen on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to initialize logging: {message}")]
    Logging { message: String },

    #[error("Background task failed: {message}")]
    Task { message: String },
}
