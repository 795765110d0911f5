//! Mirror location
//!
//! Guarantees a local clone of the cache repository exists at the mirror
//! path. A directory that is not a git repository, or whose remotes do
//! not include the configured URL, is foreign: it is deleted and cloned
//! fresh.

use crate::error::{DepsnapError, DepsnapResult};
use crate::tools::fs::remove_dir_if_exists;
use crate::tools::{Remote, VersionControl};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Remote name git assigns on clone
const CLONE_REMOTE: &str = "origin";

/// How the mirror was brought up to date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorState {
    /// No directory existed; cloned
    Cloned,
    /// Existing mirror linked to the repository; fetched
    Refreshed,
    /// Existing directory was foreign; deleted and cloned
    Recloned,
}

impl fmt::Display for MirrorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cloned => "cloned",
            Self::Refreshed => "refreshed",
            Self::Recloned => "recloned",
        };
        write!(f, "{}", name)
    }
}

/// A local working copy of the cache repository
#[derive(Debug, Clone)]
pub struct Mirror {
    /// Working directory of the clone
    pub path: PathBuf,
    /// Name of the remote pointing at the cache repository
    pub remote: String,
    /// How the mirror was obtained this run
    pub state: MirrorState,
}

/// Offline view of a mirror directory
#[derive(Debug, Clone)]
pub struct MirrorStatus {
    /// Whether the directory is a git repository
    pub is_repository: bool,
    /// Remotes registered in it
    pub remotes: Vec<Remote>,
    /// Whether the queried snapshot tag exists locally
    pub has_snapshot: bool,
}

/// Compare repository URLs, ignoring a trailing slash
pub(crate) fn same_url(a: &str, b: &str) -> bool {
    a.trim_end_matches('/') == b.trim_end_matches('/')
}

fn is_repository(path: &Path) -> bool {
    path.join(".git").exists()
}

/// Locates or establishes the local mirror
pub struct MirrorLocator<'a> {
    vcs: &'a dyn VersionControl,
}

impl<'a> MirrorLocator<'a> {
    pub fn new(vcs: &'a dyn VersionControl) -> Self {
        Self { vcs }
    }

    /// Ensure `path` holds a clone of `url` with up-to-date tags
    pub async fn locate(&self, path: &Path, url: &str) -> DepsnapResult<Mirror> {
        if !path.exists() {
            debug!("No mirror at {}, cloning", path.display());
            return self.clone_into(path, url, MirrorState::Cloned).await;
        }

        match self.linked_remote(path, url).await {
            Some(remote) => {
                debug!("Mirror linked to {} as {}, fetching", url, remote);
                self.vcs
                    .fetch_tags(path, &remote)
                    .await
                    .map_err(|e| with_url(e, url))?;

                Ok(Mirror {
                    path: path.to_path_buf(),
                    remote,
                    state: MirrorState::Refreshed,
                })
            }
            None => {
                info!(
                    "{} is not a mirror of {}, removing and cloning",
                    path.display(),
                    url
                );
                remove_dir_if_exists(path).await?;
                self.clone_into(path, url, MirrorState::Recloned).await
            }
        }
    }

    /// Inspect the mirror without touching the network
    pub async fn inspect(&self, path: &Path, tag_ref: &str) -> DepsnapResult<MirrorStatus> {
        if !is_repository(path) {
            return Ok(MirrorStatus {
                is_repository: false,
                remotes: Vec::new(),
                has_snapshot: false,
            });
        }

        Ok(MirrorStatus {
            is_repository: true,
            remotes: self.vcs.list_remotes(path).await?,
            has_snapshot: self.vcs.has_ref(path, tag_ref).await?,
        })
    }

    /// Name of the remote in `path` whose URL is `url`
    ///
    /// Any failure to read the remotes counts as "not linked".
    async fn linked_remote(&self, path: &Path, url: &str) -> Option<String> {
        if !is_repository(path) {
            return None;
        }

        match self.vcs.list_remotes(path).await {
            Ok(remotes) => remotes
                .into_iter()
                .find(|r| same_url(&r.url, url))
                .map(|r| r.name),
            Err(e) => {
                debug!("Could not list remotes in {}: {}", path.display(), e);
                None
            }
        }
    }

    async fn clone_into(
        &self,
        path: &Path,
        url: &str,
        state: MirrorState,
    ) -> DepsnapResult<Mirror> {
        self.vcs
            .clone_repo(url, path)
            .await
            .map_err(|e| with_url(e, url))?;

        Ok(Mirror {
            path: path.to_path_buf(),
            remote: CLONE_REMOTE.to_string(),
            state,
        })
    }
}

/// Report remote failures against the configured URL rather than a remote name
fn with_url(err: DepsnapError, url: &str) -> DepsnapError {
    match err {
        DepsnapError::RemoteUnavailable { reason, .. } => DepsnapError::RemoteUnavailable {
            url: url.to_string(),
            reason,
        },
        DepsnapError::Git { stderr, .. } => DepsnapError::RemoteUnavailable {
            url: url.to_string(),
            reason: stderr,
        },
        other => other,
    }
}
