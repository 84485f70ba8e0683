//! Consul KV HTTP client.
//!
//! Writes go to `PUT /v1/kv/<key>` with the raw value as the request body.
//! Consul answers `true` when the write was applied.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::{Error, KvStore, Result};

/// Default timeout for a single write.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the KV endpoint of one Consul agent.
///
/// The underlying HTTP client keeps a connection pool, so one instance
/// should be reused for every write.
#[derive(Debug, Clone)]
pub struct ConsulStore {
    base: Url,
    http: reqwest::Client,
}

impl ConsulStore {
    /// Create a client for the agent at `host:port`.
    pub fn new(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        let endpoint = format!("http://{}:{}/", host, port);
        let base = Url::parse(&endpoint).map_err(|e| Error::InvalidEndpoint {
            endpoint: endpoint.clone(),
            message: e.to_string(),
        })?;
        Self::with_base_url(base, timeout)
    }

    /// Create a client for an agent reachable at `base` (e.g. `http://consul:8500/`).
    pub fn with_base_url(base: Url, timeout: Duration) -> Result<Self> {
        if base.cannot_be_a_base() {
            return Err(Error::InvalidEndpoint {
                endpoint: base.to_string(),
                message: "URL cannot be used as a base".into(),
            });
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::InvalidEndpoint {
                endpoint: base.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self { base, http })
    }

    /// The agent address this client writes to.
    pub fn endpoint(&self) -> &Url {
        &self.base
    }

    /// URL of the KV entry for `key`.
    ///
    /// Each `/`-separated part of the key becomes one percent-encoded path
    /// segment, so nested keys map onto Consul's folder structure.
    pub fn key_url(&self, key: &str) -> Result<Url> {
        let mut url = self.base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| Error::InvalidEndpoint {
                endpoint: self.base.to_string(),
                message: "URL cannot be used as a base".into(),
            })?;
            segments.pop_if_empty().extend(["v1", "kv"]).extend(key.split('/'));
        }
        Ok(url)
    }
}

#[async_trait]
impl KvStore for ConsulStore {
    async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let url = self.key_url(key)?;
        let transport = |source| Error::Transport {
            endpoint: self.base.to_string(),
            key: key.to_string(),
            source,
        };

        let response = self
            .http
            .put(url)
            .body(value.to_vec())
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        if !status.is_success() {
            return Err(Error::Rejected {
                key: key.to_string(),
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }
        if body.trim() == "false" {
            return Err(Error::NotApplied {
                key: key.to_string(),
            });
        }

        tracing::debug!(key = %key, bytes = value.len(), "Consul saved key");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ConsulStore {
        ConsulStore::new("localhost", 8500, DEFAULT_TIMEOUT).unwrap()
    }

    #[test]
    fn key_url_nests_segments() {
        let url = store().key_url("a/b/c.txt").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8500/v1/kv/a/b/c.txt");
    }

    #[test]
    fn key_url_encodes_reserved_characters() {
        let url = store().key_url("dir/with space?.txt").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8500/v1/kv/dir/with%20space%3F.txt");
    }

    #[test]
    fn invalid_host_is_rejected() {
        let err = ConsulStore::new("bad host", 8500, DEFAULT_TIMEOUT).unwrap_err();
        assert!(matches!(err, Error::InvalidEndpoint { .. }));
        assert!(!err.is_transient());
    }
}
