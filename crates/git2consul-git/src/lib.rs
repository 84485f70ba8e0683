//! Local git mirror management for git2consul
//!
//! Owns the on-disk working copy of the tracked remote: clones it once,
//! fast-forwards it on demand and exposes its tree as a snapshot.

pub mod commits;
pub mod credentials;
pub mod error;
pub mod helpers;
pub mod mirror;
pub mod provider;

pub use credentials::{Credential, PrivateKey, is_ssh_url};
pub use error::{Error, Result};
pub use mirror::GitMirror;
pub use provider::{Advance, Ensured, Mirror, Revision};
