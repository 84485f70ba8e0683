use git2consul_fs::TreePath;
use std::path::Path;

#[test]
fn test_root_is_single_slash() {
    let root = TreePath::root();
    assert_eq!(root.as_str(), "/");
    assert!(root.is_root());
    assert_eq!(root.file_name(), None);
}

#[test]
fn test_missing_leading_slash_is_added() {
    let path = TreePath::new("foo/bar");
    assert_eq!(path.as_str(), "/foo/bar");
}

#[test]
fn test_backslashes_become_separators() {
    let path = TreePath::new("foo\\bar\\baz");
    assert_eq!(path.as_str(), "/foo/bar/baz");
}

#[test]
fn test_empty_segments_collapse() {
    let path = TreePath::new("//foo///bar/");
    assert_eq!(path.as_str(), "/foo/bar");
}

#[test]
fn test_join_paths() {
    let base = TreePath::new("/foo/bar");
    let joined = base.join("baz.txt");
    assert_eq!(joined.as_str(), "/foo/bar/baz.txt");
    assert_eq!(joined.file_name(), Some("baz.txt"));
}

#[test]
fn test_join_empty_name_is_noop() {
    let base = TreePath::new("/foo");
    assert_eq!(base.join(""), base);
}

#[test]
fn test_to_native_resolves_under_base() {
    let path = TreePath::new("/config/app.yml");
    let native = path.to_native(Path::new("/tmp/mirror"));
    assert_eq!(native, Path::new("/tmp/mirror").join("config").join("app.yml"));
}

#[test]
fn test_root_to_native_is_base() {
    let native = TreePath::root().to_native(Path::new("/tmp/mirror"));
    assert_eq!(native, Path::new("/tmp/mirror"));
}
