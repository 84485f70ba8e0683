//! Plain directory tree fixtures.

use std::fs;
use std::path::Path;

/// Write `files` (slash-separated relative path, content) under `root`,
/// creating parent directories as needed.
///
/// # Panics
/// Panics if any filesystem operation fails.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (relative, content) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("write_tree: failed to create {}: {e}", parent.display()));
        }
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("write_tree: failed to write {}: {e}", path.display()));
    }
}

/// The fixture tree used throughout the walker tests.
///
/// Only `a/b.txt` and `c.txt` are eligible for synchronization.
pub const MIXED_TREE: &[(&str, &str)] = &[
    ("README.md", "# readme"),
    (".git/config", "[core]"),
    ("a/b.txt", "v1"),
    ("a/.hidden/x", "skip"),
    ("c.txt", "v2"),
];
