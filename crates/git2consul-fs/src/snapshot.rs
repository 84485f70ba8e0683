//! Read-only views over a working tree
//!
//! The walker only ever needs two things from a tree: the entries of a
//! directory and the bytes of a file. [`Snapshot`] captures exactly that, so
//! the same traversal runs over a git working copy on disk
//! ([`LocalSnapshot`]) or a fixture built in memory ([`MemorySnapshot`]).

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::{Error, Result, TreePath};

/// One directory entry as reported by a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Entry name without any path separators, lossily decoded as UTF-8
    pub name: String,

    /// The name exactly as the filesystem reported it
    pub native_name: OsString,

    /// Whether the entry is a directory
    pub is_dir: bool,
}

impl Entry {
    pub fn file(name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self::from_native(name.into(), false)
    }

    pub fn dir(name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self::from_native(name.into(), true)
    }

    /// An entry whose name may not be valid UTF-8.
    pub fn from_native(native_name: OsString, is_dir: bool) -> Self {
        Self {
            name: native_name.to_string_lossy().into_owned(),
            native_name,
            is_dir,
        }
    }
}

/// Trait for read-only access to a tree of files.
///
/// Implementations must be shareable across threads; the sync controller
/// reads them from an async task.
pub trait Snapshot: Send + Sync {
    /// List the entries directly inside `dir`.
    ///
    /// Sibling order is implementation-defined and callers must not rely on it.
    fn list_entries(&self, dir: &TreePath) -> Result<Vec<Entry>>;

    /// Read the full content of the file at `file`.
    fn read_file(&self, file: &TreePath) -> Result<Vec<u8>>;
}

/// Snapshot of a directory on the local filesystem.
///
/// Entries are typed without following symlinks, so a link is reported as a
/// file and reading it yields its target's content.
#[derive(Debug, Clone)]
pub struct LocalSnapshot {
    root: PathBuf,
}

impl LocalSnapshot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Snapshot for LocalSnapshot {
    fn list_entries(&self, dir: &TreePath) -> Result<Vec<Entry>> {
        let native = dir.to_native(&self.root);
        let read_dir = fs::read_dir(&native).map_err(|e| Error::list_dir(&native, e))?;

        let mut entries = Vec::new();
        for item in read_dir {
            let item = item.map_err(|e| Error::list_dir(&native, e))?;
            let file_type = item.file_type().map_err(|e| Error::list_dir(item.path(), e))?;
            entries.push(Entry::from_native(item.file_name(), file_type.is_dir()));
        }

        // read_dir order differs between filesystems; sort for reproducible runs
        entries.sort_by(|a, b| a.native_name.cmp(&b.native_name));
        tracing::trace!(dir = %dir, count = entries.len(), "Listed directory");
        Ok(entries)
    }

    fn read_file(&self, file: &TreePath) -> Result<Vec<u8>> {
        let native = file.to_native(&self.root);
        fs::read(&native).map_err(|e| Error::read_file(native, e))
    }
}

/// In-memory tree of files.
///
/// Directories are implied by the files beneath them; empty directories can
/// be added explicitly. Individual paths can be marked as failing to exercise
/// error handling in callers.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshot {
    files: BTreeMap<TreePath, Vec<u8>>,
    dirs: BTreeSet<TreePath>,
    failing: BTreeSet<TreePath>,
}

impl MemorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a file, creating its parent directories.
    pub fn with_file(mut self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.insert_file(path, content);
        self
    }

    /// Add an empty directory.
    pub fn with_dir(mut self, path: &str) -> Self {
        self.dirs.insert(TreePath::new(path));
        self
    }

    /// Make every read or listing of `path` fail with an I/O error.
    pub fn with_failure(mut self, path: &str) -> Self {
        self.failing.insert(TreePath::new(path));
        self
    }

    pub fn insert_file(&mut self, path: &str, content: impl Into<Vec<u8>>) {
        let path = TreePath::new(path);
        let mut parent = path.parent();
        while let Some(dir) = parent {
            parent = dir.parent();
            self.dirs.insert(dir);
        }
        self.files.insert(path, content.into());
    }

    pub fn remove_file(&mut self, path: &str) -> Option<Vec<u8>> {
        self.files.remove(&TreePath::new(path))
    }

    fn check_failure(&self, path: &TreePath) -> io::Result<()> {
        if self.failing.contains(path) {
            Err(io::Error::other(format!("injected failure at {path}")))
        } else {
            Ok(())
        }
    }
}

impl Snapshot for MemorySnapshot {
    fn list_entries(&self, dir: &TreePath) -> Result<Vec<Entry>> {
        self.check_failure(dir)
            .map_err(|e| Error::list_dir(dir.as_str(), e))?;
        if !dir.is_root() && !self.dirs.contains(dir) {
            return Err(Error::NotFound {
                path: dir.to_string(),
            });
        }

        let mut children: BTreeMap<String, bool> = BTreeMap::new();
        let child_dirs = self.dirs.iter().filter(|d| d.parent().as_ref() == Some(dir));
        for child in child_dirs {
            if let Some(name) = child.file_name() {
                children.insert(name.to_string(), true);
            }
        }
        let child_files = self.files.keys().filter(|f| f.parent().as_ref() == Some(dir));
        for child in child_files {
            if let Some(name) = child.file_name() {
                children.entry(name.to_string()).or_insert(false);
            }
        }

        Ok(children
            .into_iter()
            .map(|(name, is_dir)| Entry::from_native(name.into(), is_dir))
            .collect())
    }

    fn read_file(&self, file: &TreePath) -> Result<Vec<u8>> {
        self.check_failure(file)
            .map_err(|e| Error::read_file(file.as_str(), e))?;
        self.files.get(file).cloned().ok_or_else(|| Error::NotFound {
            path: file.to_string(),
        })
    }
}
