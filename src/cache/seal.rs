//! Install and seal (slow path)
//!
//! Produces a fresh dependency tree in the mirror and publishes it as a
//! new snapshot: baseline checkout, empty working tree, install, then
//! commit + tag + atomic push.

use crate::cache::manifest::Manifest;
use crate::cache::mirror::Mirror;
use crate::error::{DepsnapError, DepsnapResult};
use crate::tools::fs::clear_dir_except;
use crate::tools::{PackageInstaller, VersionControl};
use std::path::Path;
use tracing::{debug, info, warn};

/// Directory inside the mirror that survives clearing
const GIT_DIR: &str = ".git";

/// Details of a sealed snapshot
#[derive(Debug, Clone)]
pub struct Sealed {
    /// Commit message recorded for the snapshot
    pub message: String,
}

/// Installs dependencies and publishes them as a snapshot
pub struct Sealer<'a> {
    vcs: &'a dyn VersionControl,
    installer: &'a dyn PackageInstaller,
    branch: &'a str,
}

impl<'a> Sealer<'a> {
    pub fn new(
        vcs: &'a dyn VersionControl,
        installer: &'a dyn PackageInstaller,
        branch: &'a str,
    ) -> Self {
        Self {
            vcs,
            installer,
            branch,
        }
    }

    /// Run the full install-and-publish sequence
    pub async fn seal(
        &self,
        project_dir: &Path,
        mirror: &Mirror,
        manifest: &Manifest,
    ) -> DepsnapResult<Sealed> {
        let fingerprint = manifest.fingerprint();

        self.checkout_baseline(mirror).await?;

        let removed = clear_dir_except(&mirror.path, &[GIT_DIR]).await?;
        debug!("Cleared {} entries from the mirror", removed);

        info!("Installing dependencies with {}", self.installer.name());
        self.installer.install(project_dir).await?;

        let message = self.commit_message(manifest).await;
        self.vcs.add(&mirror.path, &["."]).await?;
        self.vcs.commit(&mirror.path, &message).await?;
        self.vcs.tag(&mirror.path, fingerprint.as_str()).await?;

        self.vcs
            .push(&mirror.path, &mirror.remote, &[self.branch], true)
            .await
            .map_err(|e| match e {
                DepsnapError::PublishConflict { reason, .. } => DepsnapError::PublishConflict {
                    tag: fingerprint.to_string(),
                    reason,
                },
                other => other,
            })?;

        info!("Sealed snapshot {}", fingerprint);
        Ok(Sealed { message })
    }

    /// Start from the tip of the baseline branch
    ///
    /// An empty cache repository has no branch yet; HEAD is pointed at
    /// the unborn branch so the first snapshot becomes its root commit.
    async fn checkout_baseline(&self, mirror: &Mirror) -> DepsnapResult<()> {
        match self.vcs.checkout(&mirror.path, self.branch).await {
            Ok(()) => {
                let upstream = format!("refs/remotes/{}/{}", mirror.remote, self.branch);
                if self.vcs.has_ref(&mirror.path, &upstream).await? {
                    self.vcs.reset(&mirror.path, &upstream, true).await?;
                }
                Ok(())
            }
            Err(DepsnapError::RefNotFound { .. }) => {
                debug!("Branch {} does not exist yet", self.branch);
                self.vcs.checkout_unborn(&mirror.path, self.branch).await
            }
            Err(e) => Err(e),
        }
    }

    async fn commit_message(&self, manifest: &Manifest) -> String {
        let version = match self.installer.version().await {
            Ok(v) => v,
            Err(e) => {
                warn!("Could not determine {} version: {}", self.installer.name(), e);
                "unknown".to_string()
            }
        };

        format!(
            "sealing {} dependencies of version {}, using {} {}",
            manifest.file_name(),
            manifest.version_label(),
            self.installer.name(),
            version
        )
    }
}
