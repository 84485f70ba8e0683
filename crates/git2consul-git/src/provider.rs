//! Mirror trait and the revision types it reports

use git2::Oid;
use git2consul_fs::Snapshot;

use crate::Result;

/// Identifier of the commit a working copy reflects.
///
/// A freshly cloned empty repository has no commit yet; that state is
/// represented explicitly instead of as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Revision(Option<Oid>);

impl Revision {
    /// Revision of a branch with no commits.
    pub fn unborn() -> Self {
        Self(None)
    }

    pub fn oid(&self) -> Option<Oid> {
        self.0
    }

    pub fn is_unborn(&self) -> bool {
        self.0.is_none()
    }
}

impl From<Oid> for Revision {
    fn from(oid: Oid) -> Self {
        Self(Some(oid))
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(oid) => write!(f, "{oid}"),
            None => write!(f, "(unborn)"),
        }
    }
}

/// Outcome of [`Mirror::ensure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ensured {
    /// The remote was cloned into an empty location
    Cloned(Revision),

    /// A working copy was already present and was reused as-is
    Existing(Revision),
}

impl Ensured {
    pub fn revision(&self) -> Revision {
        match self {
            Self::Cloned(rev) | Self::Existing(rev) => *rev,
        }
    }
}

/// Outcome of [`Mirror::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The remote had nothing new; the working tree is unchanged
    UpToDate(Revision),

    /// The branch moved forward and the working tree was checked out again
    FastForwarded {
        from: Revision,
        to: Revision,
        /// Number of commits between `from` and `to`
        commits: usize,
    },
}

impl Advance {
    /// Revision before the advance.
    pub fn before(&self) -> Revision {
        match self {
            Self::UpToDate(rev) => *rev,
            Self::FastForwarded { from, .. } => *from,
        }
    }

    /// Revision after the advance.
    pub fn after(&self) -> Revision {
        match self {
            Self::UpToDate(rev) => *rev,
            Self::FastForwarded { to, .. } => *to,
        }
    }

    pub fn changed(&self) -> bool {
        matches!(self, Self::FastForwarded { .. })
    }
}

/// A local working copy that tracks a remote repository.
///
/// Operations block on disk and network I/O; async callers should run them
/// on a blocking thread.
pub trait Mirror: Send + Sync {
    /// Snapshot type exposing the working tree
    type Snapshot: Snapshot + 'static;

    /// Make sure a working copy exists, cloning it if necessary.
    ///
    /// Calling this against an existing working copy is not an error and
    /// does not touch the filesystem.
    fn ensure(&self) -> Result<Ensured>;

    /// Fetch the tracked remote and fast-forward the current branch.
    fn advance(&self) -> Result<Advance>;

    /// Current HEAD revision of the working copy.
    fn head(&self) -> Result<Revision>;

    /// Read-only view of the working tree.
    fn snapshot(&self) -> Self::Snapshot;
}
