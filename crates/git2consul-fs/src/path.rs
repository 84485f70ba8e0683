//! Rooted, slash-separated paths inside a working-tree snapshot

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// A path relative to the root of a snapshot.
///
/// Always starts with a single `/` (the snapshot root) and uses forward
/// slashes as separators regardless of platform. Alongside the string form
/// it keeps every component exactly as the filesystem reported it, so names
/// that are not valid UTF-8 still resolve to the right file on disk while
/// the string form carries a lossy rendering of them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreePath {
    /// Internal representation always starts with `/`
    inner: String,
    /// Components below the root, as found on disk
    native: Vec<OsString>,
}

impl TreePath {
    /// The snapshot root, `/`.
    pub fn root() -> Self {
        Self {
            inner: "/".to_string(),
            native: Vec::new(),
        }
    }

    /// Build a tree path from a slash-separated string.
    ///
    /// Backslashes are treated as separators, a missing leading `/` is added
    /// and empty segments are collapsed. Only this constructor rewrites
    /// backslashes; [`TreePath::join`] splits on `/` alone.
    pub fn new(path: &str) -> Self {
        let normalized = path.replace('\\', "/");
        normalized
            .split('/')
            .filter(|s| !s.is_empty())
            .fold(Self::root(), |path, segment| path.push(segment.into(), segment))
    }

    fn push(mut self, native: OsString, display: &str) -> Self {
        if !self.is_root() {
            self.inner.push('/');
        }
        self.inner.push_str(display);
        self.native.push(native);
        self
    }

    /// The internal string form, e.g. `/a/b/c.txt`.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    pub fn is_root(&self) -> bool {
        self.native.is_empty()
    }

    /// Append a name to this path.
    ///
    /// A `/` inside `name` separates components and empty components are
    /// skipped. Backslashes are kept as part of the name.
    pub fn join(&self, name: &str) -> Self {
        name.split('/')
            .filter(|s| !s.is_empty())
            .fold(self.clone(), |path, segment| path.push(segment.into(), segment))
    }

    /// Append one entry name exactly as the filesystem reported it.
    ///
    /// The string form gets a lossy rendering of `name`; resolving the path
    /// with [`TreePath::to_native`] uses the original bytes.
    pub fn join_native(&self, name: &OsStr) -> Self {
        match name.to_str() {
            Some(name) => self.join(name),
            None => self
                .clone()
                .push(name.to_os_string(), &name.to_string_lossy()),
        }
    }

    /// Get the parent directory, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let idx = self.inner.rfind('/')?;
        let mut native = self.native.clone();
        native.pop();
        Some(Self {
            inner: if idx == 0 {
                "/".to_string()
            } else {
                self.inner[..idx].to_string()
            },
            native,
        })
    }

    /// Last path component, `None` for the root.
    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() {
            None
        } else {
            self.inner.rsplit('/').next()
        }
    }

    /// Number of components below the root.
    pub fn depth(&self) -> usize {
        self.native.len()
    }

    /// Resolve this path under a native directory.
    pub fn to_native(&self, base: &Path) -> PathBuf {
        let mut native = base.to_path_buf();
        for segment in &self.native {
            native.push(segment);
        }
        native
    }
}

impl Default for TreePath {
    fn default() -> Self {
        Self::root()
    }
}

impl AsRef<str> for TreePath {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl std::fmt::Display for TreePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for TreePath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TreePath {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_from_root_has_single_separator() {
        let path = TreePath::root().join("a").join("b.txt");
        assert_eq!(path.as_str(), "/a/b.txt");
        assert_eq!(path.depth(), 2);
    }

    #[test]
    fn parent_walks_back_to_root() {
        let path = TreePath::new("/a/b");
        let parent = path.parent().unwrap();
        assert_eq!(parent.as_str(), "/a");
        assert_eq!(parent.parent().unwrap(), TreePath::root());
        assert!(TreePath::root().parent().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn join_native_keeps_original_bytes() {
        use std::os::unix::ffi::OsStrExt;

        let name = OsStr::from_bytes(b"caf\xe9.txt");
        let path = TreePath::root().join("dir").join_native(name);

        assert_eq!(path.as_str(), "/dir/caf\u{FFFD}.txt");
        assert_eq!(
            path.to_native(Path::new("/base")),
            Path::new("/base/dir").join(name)
        );
        assert_eq!(path.parent(), Some(TreePath::new("/dir")));
    }

    #[test]
    fn join_keeps_backslashes_in_names() {
        let path = TreePath::root().join("a\\b.txt");
        assert_eq!(path.as_str(), "/a\\b.txt");
        assert_eq!(path.depth(), 1);
        assert_ne!(path, TreePath::new("/a\\b.txt"));
    }
}
