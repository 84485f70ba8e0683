//! Synchronization engine for git2consul
//!
//! Mirrors the tree of a git repository into a key-value store:
//!
//! - **key**: derives a store key from a root-relative file path
//! - **walk**: lazily enumerates the eligible files of a snapshot as key/value pairs
//! - **sync**: the controller that advances the mirror on a fixed interval and
//!   writes every pair to the store
//! - **config**: the immutable startup configuration and its layered loading
//!
//! # Architecture
//!
//! ```text
//!                 git2consul-cli
//!                       |
//!                git2consul-core
//!                       |
//!     +-----------------+-----------------+
//!     |                 |                 |
//! git2consul-fs   git2consul-git   git2consul-kv
//! ```

pub mod config;
pub mod error;
pub mod key;
pub mod sync;
pub mod walk;

pub use config::{ConfigLayer, CredentialConfig, Endpoint, RetryPolicy, SyncConfig};
pub use error::{Error, ErrorKind, Result};
pub use key::key_for_path;
pub use sync::{CycleReport, SyncController};
pub use walk::{FullWalk, KvPair, PairSource, TreeWalker};
