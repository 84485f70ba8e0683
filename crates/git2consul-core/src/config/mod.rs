//! Startup configuration
//!
//! [`SyncConfig`] is the validated, immutable configuration every other part
//! of the process reads. It is produced by resolving a stack of
//! [`ConfigLayer`]s (command line and environment over file over defaults).

mod duration;
mod layer;

pub use duration::{DurationError, parse_duration};
pub use layer::ConfigLayer;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};

use crate::{Error, Result};

pub use git2consul_git::credentials::DEFAULT_GIT_USER;

pub const DEFAULT_DIRECTORY: &str = "/tmp/git2consul/repository";
pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_CONSUL_HOST: &str = "localhost";
pub const DEFAULT_CONSUL_PORT: u16 = 8500;
pub const DEFAULT_ROUTER_HOST: &str = "localhost";
pub const DEFAULT_ROUTER_PORT: u16 = 8090;
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// A `host:port` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// SSH identity used for the remote.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialConfig {
    pub user: String,
    pub private_key: String,
}

impl fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialConfig")
            .field("user", &self.user)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Backoff applied to transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    /// `None` retries forever
    pub max_elapsed_time: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(60),
            max_elapsed_time: Some(Duration::from_secs(600)),
        }
    }
}

impl RetryPolicy {
    /// A fresh backoff schedule starting now.
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_interval)
            .with_max_interval(self.max_interval)
            .with_max_elapsed_time(self.max_elapsed_time)
            .build()
    }
}

/// Validated configuration for one sync process.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Remote repository address (URL or scp-like `user@host:path`)
    pub repository: String,

    /// Where the local mirror lives
    pub directory: PathBuf,

    /// SSH identity, present only when a private key was configured
    pub credential: Option<CredentialConfig>,

    pub polling_interval: Duration,

    /// Consul agent the keys are written to
    pub consul: Endpoint,

    /// Address the liveness endpoint listens on
    pub router: Endpoint,

    /// Upper bound on a single store write
    pub store_timeout: Duration,

    pub retry: RetryPolicy,

    /// Default log filter, used when `RUST_LOG` is unset
    pub log_level: String,
}

impl SyncConfig {
    /// Configuration for `repository` with every other option at its default.
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            directory: PathBuf::from(DEFAULT_DIRECTORY),
            credential: None,
            polling_interval: DEFAULT_POLLING_INTERVAL,
            consul: Endpoint::new(DEFAULT_CONSUL_HOST, DEFAULT_CONSUL_PORT),
            router: Endpoint::new(DEFAULT_ROUTER_HOST, DEFAULT_ROUTER_PORT),
            store_timeout: DEFAULT_STORE_TIMEOUT,
            retry: RetryPolicy::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }

    /// Check ranges and required values.
    pub fn validate(&self) -> Result<()> {
        if self.repository.trim().is_empty() {
            return Err(Error::invalid_config("repository must not be empty"));
        }
        if self.directory.as_os_str().is_empty() {
            return Err(Error::invalid_config("directory must not be empty"));
        }
        if self.polling_interval.is_zero() {
            return Err(Error::invalid_config("polling_interval must be positive"));
        }
        if self.store_timeout.is_zero() {
            return Err(Error::invalid_config("store_timeout must be positive"));
        }
        if self.consul.host.trim().is_empty() {
            return Err(Error::invalid_config("consul_host must not be empty"));
        }
        if self.consul.port == 0 {
            return Err(Error::invalid_config("consul_port must not be 0"));
        }
        if self.router.host.trim().is_empty() {
            return Err(Error::invalid_config("router_host must not be empty"));
        }
        if let Some(credential) = &self.credential {
            if credential.private_key.trim().is_empty() {
                return Err(Error::invalid_config("git_private_key must not be empty"));
            }
        }
        Ok(())
    }
}
