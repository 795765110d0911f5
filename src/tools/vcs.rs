//! Version control abstraction
//!
//! The fixed operation set the cache needs from git. Implementations must
//! report a missing ref as [`DepsnapError::RefNotFound`], an unreachable
//! remote as [`DepsnapError::RemoteUnavailable`] and a rejected push as
//! [`DepsnapError::PublishConflict`], so callers can branch on them.
//!
//! [`DepsnapError::RefNotFound`]: crate::error::DepsnapError::RefNotFound
//! [`DepsnapError::RemoteUnavailable`]: crate::error::DepsnapError::RemoteUnavailable
//! [`DepsnapError::PublishConflict`]: crate::error::DepsnapError::PublishConflict

use crate::error::DepsnapResult;
use async_trait::async_trait;
use std::path::Path;

/// A remote registered in a repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
    /// Remote name (e.g. "origin")
    pub name: String,
    /// Fetch URL
    pub url: String,
}

/// Abstract version control interface
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Clone `url` into `dest`, which must not exist
    async fn clone_repo(&self, url: &str, dest: &Path) -> DepsnapResult<()>;

    /// List the remotes registered in the repository at `dir`
    async fn list_remotes(&self, dir: &Path) -> DepsnapResult<Vec<Remote>>;

    /// Fetch branches and tags from `remote`, dropping local tags the remote lacks
    async fn fetch_tags(&self, dir: &Path, remote: &str) -> DepsnapResult<()>;

    /// Force-checkout `reference`, discarding local modifications
    async fn checkout(&self, dir: &Path, reference: &str) -> DepsnapResult<()>;

    /// Point HEAD at a branch that has no commits yet
    async fn checkout_unborn(&self, dir: &Path, branch: &str) -> DepsnapResult<()>;

    /// Reset the current branch to `reference`
    async fn reset(&self, dir: &Path, reference: &str, hard: bool) -> DepsnapResult<()>;

    /// Remove untracked files and directories, except paths matching `exclude`
    async fn clean(&self, dir: &Path, exclude: &[&str]) -> DepsnapResult<()>;

    /// Stage `paths`, including deletions
    async fn add(&self, dir: &Path, paths: &[&str]) -> DepsnapResult<()>;

    /// Commit the index with `message`
    async fn commit(&self, dir: &Path, message: &str) -> DepsnapResult<()>;

    /// Create a lightweight tag on HEAD
    async fn tag(&self, dir: &Path, name: &str) -> DepsnapResult<()>;

    /// Atomically push `refs` to `remote`, with all tags if `include_tags`
    async fn push(
        &self,
        dir: &Path,
        remote: &str,
        refs: &[&str],
        include_tags: bool,
    ) -> DepsnapResult<()>;

    /// Whether `reference` resolves in the repository at `dir`
    async fn has_ref(&self, dir: &Path, reference: &str) -> DepsnapResult<bool>;
}
