//! Error types for git2consul-kv

/// Result type for git2consul-kv operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when writing to a store
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid store endpoint {endpoint}: {message}")]
    InvalidEndpoint { endpoint: String, message: String },

    #[error("Failed to reach Consul at {endpoint} while saving '{key}': {source}")]
    Transport {
        endpoint: String,
        key: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Consul rejected write of '{key}' (HTTP {status}): {body}")]
    Rejected {
        key: String,
        status: u16,
        body: String,
    },

    #[error("Consul did not apply write of '{key}'")]
    NotApplied { key: String },

    #[error("Write of '{key}' failed: {message}")]
    Injected {
        key: String,
        message: String,
        transient: bool,
    },
}

impl Error {
    /// Whether the write may succeed if attempted again.
    ///
    /// Connection problems, timeouts, throttling and server-side errors are
    /// transient; a request the store refuses outright is not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::InvalidEndpoint { .. } => false,
            Self::Transport { source, .. } => !source.is_builder(),
            Self::Rejected { status, .. } => *status >= 500 || *status == 429,
            Self::NotApplied { .. } => true,
            Self::Injected { transient, .. } => *transient,
        }
    }
}
