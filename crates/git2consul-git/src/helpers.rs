//! Shared git2 helpers for the mirror
//!
//! These encapsulate the fetch and fast-forward steps of a pull so they can
//! be exercised independently of [`crate::GitMirror`].

use std::path::Path;

use git2::{ErrorCode, FetchOptions, Oid, Repository};

use crate::{Error, Result, Revision};

/// Outcome of [`fast_forward`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FastForward {
    /// HEAD already contains the fetched commit
    UpToDate,

    /// The branch now points at the fetched commit
    Applied,
}

/// Revision currently at HEAD, or [`Revision::unborn`] for an empty branch.
pub fn head_revision(repo: &Repository) -> Result<Revision> {
    match repo.head() {
        Ok(head) => Ok(head.peel_to_commit()?.id().into()),
        Err(e) if e.code() == ErrorCode::UnbornBranch => Ok(Revision::unborn()),
        Err(e) => Err(e.into()),
    }
}

/// Name of the branch HEAD points to.
///
/// Works on unborn branches too, since only the symbolic target is read.
pub fn tracked_branch(repo: &Repository) -> Result<String> {
    let head = repo.find_reference("HEAD")?;
    head.symbolic_target()
        .and_then(|target| target.strip_prefix("refs/heads/"))
        .map(str::to_string)
        .ok_or_else(|| Error::DetachedHead {
            path: repo.path().to_path_buf(),
        })
}

/// Fetch `branch` from `remote_name` and return the fetched commit.
pub fn fetch_branch(
    repo: &Repository,
    remote_name: &str,
    branch: &str,
    mut options: FetchOptions<'_>,
) -> Result<Oid> {
    let mut remote = repo
        .find_remote(remote_name)
        .map_err(|_| Error::RemoteNotFound {
            name: remote_name.to_string(),
        })?;

    let fetch_error = |source| Error::Fetch {
        remote: remote_name.to_string(),
        branch: branch.to_string(),
        source,
    };

    remote
        .fetch(&[branch], Some(&mut options), None)
        .map_err(fetch_error)?;

    let fetch_head = repo.find_reference("FETCH_HEAD").map_err(fetch_error)?;
    let fetch_commit = fetch_head.peel_to_commit().map_err(fetch_error)?;
    Ok(fetch_commit.id())
}

/// Fast-forward `branch` to `target` and check out the result.
///
/// An unborn branch is simply created at `target`. Diverged history is an
/// error; the mirror never creates merge commits.
pub fn fast_forward(repo: &Repository, branch: &str, target: Oid) -> Result<FastForward> {
    let annotated = repo.find_annotated_commit(target)?;
    let (analysis, _) = repo.merge_analysis(&[&annotated])?;

    if analysis.is_up_to_date() {
        return Ok(FastForward::UpToDate);
    }

    let refname = format!("refs/heads/{}", branch);
    let log_message = format!("pull: fast-forward to {}", target);

    if analysis.is_unborn() {
        repo.reference(&refname, target, true, &log_message)?;
        repo.set_head(&refname)?;
        checkout_head(repo)?;
        return Ok(FastForward::Applied);
    }

    if analysis.is_fast_forward() {
        let mut reference = repo.find_reference(&refname)?;
        reference.set_target(target, &log_message)?;
        checkout_head(repo)?;
        return Ok(FastForward::Applied);
    }

    Err(Error::CannotFastForward {
        branch: branch.to_string(),
        head: head_revision(repo)?.to_string(),
        fetched: target.to_string(),
    })
}

fn checkout_head(repo: &Repository) -> Result<()> {
    repo.checkout_head(Some(git2::build::CheckoutBuilder::default().force()))?;
    Ok(())
}

/// Returns true if `path` is missing or an empty directory.
pub fn is_vacant(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    if !path.is_dir() {
        return Ok(false);
    }
    let mut entries = std::fs::read_dir(path).map_err(|e| Error::io(path, e))?;
    Ok(entries.next().is_none())
}
