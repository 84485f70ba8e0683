//! Store trait

use async_trait::async_trait;

use crate::Result;

/// A key-value store the sync engine writes into.
///
/// Writes are plain overwrites. After a successful `put`, reading `key` returns `value`.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: &[u8]) -> Result<()>;
}

#[async_trait]
impl<T: KvStore + ?Sized> KvStore for std::sync::Arc<T> {
    async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).put(key, value).await
    }
}
