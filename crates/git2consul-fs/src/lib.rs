//! Working-tree snapshot abstraction for git2consul
//!
//! Provides rooted, slash-separated tree paths and a [`Snapshot`] trait that
//! the tree walker reads through, with a local-directory implementation for
//! the git mirror and an in-memory one for tests and tooling.

pub mod constants;
pub mod error;
pub mod path;
pub mod snapshot;

pub use constants::{HIDDEN_MARKER, SENTINEL_FILE, is_hidden};
pub use error::{Error, Result};
pub use path::TreePath;
pub use snapshot::{Entry, LocalSnapshot, MemorySnapshot, Snapshot};
