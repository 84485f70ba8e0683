//! Tree traversal producing key/value pairs.
//!
//! [`TreeWalker`] walks a [`Snapshot`] depth-first and yields one [`KvPair`]
//! per eligible file. It keeps an explicit stack of directory frames instead
//! of recursing, so deep trees cannot exhaust the call stack, and it reads
//! each file only when the caller asks for the next pair.
//!
//! An entry is eligible unless its name starts with `.` (this skips `.git`
//! and everything under hidden directories) or it is a file named
//! `README.md`. Directories named `README.md` are still descended into.

use std::vec;

use git2consul_fs::{Entry, SENTINEL_FILE, Snapshot, TreePath, is_hidden};

use crate::Result;
use crate::key::key_for_path;

/// One store write derived from one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvPair {
    pub key: String,
    pub value: Vec<u8>,
}

/// Decides which pairs a sync cycle writes.
///
/// The controller drives every cycle through this trait, so a source that
/// only yields changed files can replace the full walk without touching the
/// controller.
pub trait PairSource: Send + Sync {
    /// Pairs to write for `snapshot`, in write order.
    ///
    /// The first error ends the cycle; nothing after it is written.
    fn pairs<'a>(
        &'a self,
        snapshot: &'a dyn Snapshot,
    ) -> Box<dyn Iterator<Item = Result<KvPair>> + Send + 'a>;
}

/// Writes every eligible file on every cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullWalk;

impl PairSource for FullWalk {
    fn pairs<'a>(
        &'a self,
        snapshot: &'a dyn Snapshot,
    ) -> Box<dyn Iterator<Item = Result<KvPair>> + Send + 'a> {
        Box::new(TreeWalker::new(snapshot))
    }
}

/// Whether `entry` takes part in synchronization.
pub fn is_eligible(entry: &Entry) -> bool {
    if is_hidden(&entry.name) {
        return false;
    }
    entry.is_dir || entry.name != SENTINEL_FILE
}

struct Frame {
    dir: TreePath,
    entries: vec::IntoIter<Entry>,
}

/// Lazy depth-first iterator over the eligible files of a snapshot.
///
/// Keys are always derived from the path relative to the snapshot root,
/// even when the walk starts below it. After the first error the iterator
/// is exhausted.
pub struct TreeWalker<'a> {
    snapshot: &'a dyn Snapshot,
    pending_root: Option<TreePath>,
    stack: Vec<Frame>,
    failed: bool,
}

impl<'a> TreeWalker<'a> {
    /// Walk the whole snapshot.
    pub fn new(snapshot: &'a dyn Snapshot) -> Self {
        Self::starting_at(snapshot, TreePath::root())
    }

    /// Walk only the subtree under `dir`.
    pub fn starting_at(snapshot: &'a dyn Snapshot, dir: TreePath) -> Self {
        Self {
            snapshot,
            pending_root: Some(dir),
            stack: Vec::new(),
            failed: false,
        }
    }

    fn push_dir(&mut self, dir: TreePath) -> Result<()> {
        let entries = self.snapshot.list_entries(&dir)?;
        tracing::trace!(dir = %dir, entries = entries.len(), "Listed directory");
        self.stack.push(Frame {
            dir,
            entries: entries.into_iter(),
        });
        Ok(())
    }

    fn advance(&mut self) -> Option<Result<KvPair>> {
        if let Some(root) = self.pending_root.take() {
            if let Err(e) = self.push_dir(root) {
                return Some(Err(e));
            }
        }

        loop {
            let frame = self.stack.last_mut()?;
            let Some(entry) = frame.entries.next() else {
                self.stack.pop();
                continue;
            };
            if !is_eligible(&entry) {
                continue;
            }

            let path = frame.dir.join_native(&entry.native_name);
            if entry.is_dir {
                if let Err(e) = self.push_dir(path) {
                    return Some(Err(e));
                }
                continue;
            }

            let pair = self.snapshot.read_file(&path).map(|value| KvPair {
                key: key_for_path(path.as_str()),
                value,
            });
            return Some(pair.map_err(Into::into));
        }
    }
}

impl Iterator for TreeWalker<'_> {
    type Item = Result<KvPair>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.advance();
        if matches!(item, Some(Err(_))) {
            self.failed = true;
            self.stack.clear();
        }
        item
    }
}
