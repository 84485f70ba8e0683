//! Mapping from tree paths to store keys.

/// Derive the store key for a root-relative path.
///
/// Strips exactly one leading separator: `/a/b/c.txt` becomes `a/b/c.txt`.
pub fn key_for_path(path: &str) -> String {
    path.strip_prefix('/').unwrap_or(path).to_string()
}
