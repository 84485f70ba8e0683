//! Commit metadata used when logging revision transitions.

use chrono::{DateTime, TimeZone, Utc};
use git2::{Oid, Repository};

use crate::Result;

/// Information about a single commit.
pub struct CommitInfo {
    /// Short commit hash (7 characters)
    pub hash: String,

    /// First line of the commit message
    pub message: String,

    /// Commit author name
    pub author: String,

    /// Commit timestamp
    pub timestamp: DateTime<Utc>,
}

/// Describe the commit `oid`.
pub fn describe_commit(repo: &Repository, oid: Oid) -> Result<CommitInfo> {
    let commit = repo.find_commit(oid)?;

    let timestamp: DateTime<Utc> = Utc
        .timestamp_opt(commit.time().seconds(), 0)
        .single()
        .unwrap_or_default();

    let message = commit
        .message()
        .unwrap_or("")
        .lines()
        .next()
        .unwrap_or("")
        .to_string();

    let author = commit.author();
    let author_name = author.name().unwrap_or("Unknown").to_string();

    Ok(CommitInfo {
        hash: format!("{:.7}", oid),
        message,
        author: author_name,
        timestamp,
    })
}

/// Count the commits reachable from `to` but not from `from`.
///
/// With no `from` (an unborn branch) every ancestor of `to` is counted.
pub fn count_commits_between(repo: &Repository, from: Option<Oid>, to: Oid) -> Result<usize> {
    let mut revwalk = repo.revwalk()?;
    revwalk.push(to)?;
    if let Some(from) = from {
        revwalk.hide(from)?;
    }

    let mut count = 0;
    for oid in revwalk {
        oid?;
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use tempfile::TempDir;

    fn commit(repo: &Repository, message: &str) -> Oid {
        let sig = Signature::now("Test User", "test@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let parents: Vec<_> = repo
            .head()
            .ok()
            .and_then(|h| h.peel_to_commit().ok())
            .into_iter()
            .collect();
        let parent_refs: Vec<_> = parents.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .unwrap()
    }

    #[test]
    fn test_describe_commit_uses_first_line() {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path()).unwrap();
        let oid = commit(&repo, "Update config\n\nLonger body");

        let info = describe_commit(&repo, oid).unwrap();
        assert_eq!(info.message, "Update config");
        assert_eq!(info.author, "Test User");
        assert_eq!(info.hash.len(), 7);
    }

    #[test]
    fn test_count_commits_between() {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path()).unwrap();
        let first = commit(&repo, "one");
        commit(&repo, "two");
        let third = commit(&repo, "three");

        assert_eq!(count_commits_between(&repo, Some(first), third).unwrap(), 2);
        assert_eq!(count_commits_between(&repo, None, third).unwrap(), 3);
        assert_eq!(count_commits_between(&repo, Some(third), third).unwrap(), 0);
    }
}
