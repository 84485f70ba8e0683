//! Key-value store clients for git2consul
//!
//! [`KvStore`] is the single write operation the sync engine needs.
//! [`ConsulStore`] talks to the Consul KV HTTP API; [`MemoryStore`] keeps
//! everything in process for tests.

pub mod consul;
pub mod error;
pub mod memory;
pub mod store;

pub use consul::ConsulStore;
pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use store::KvStore;
