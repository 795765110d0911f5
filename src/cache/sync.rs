//! Sync orchestration
//!
//! ```text
//! Fingerprint -> LocateMirror -> ResolveSnapshot --hit--> Done
//!                                      |
//!                                     miss
//!                                      v
//!                                InstallAndSeal -----> Done
//! ```
//!
//! Every stage except snapshot resolution is fatal on failure. Errors are
//! tagged with the stage they came from so a failed run reports a single
//! line naming the stage and the cause.

use crate::cache::manifest::{Fingerprint, Manifest};
use crate::cache::mirror::{MirrorLocator, MirrorState};
use crate::cache::seal::Sealer;
use crate::cache::snapshot::{Resolution, SnapshotResolver};
use crate::config::Config;
use crate::error::{DepsnapError, DepsnapResult, Stage};
use crate::tools::{PackageInstaller, VersionControl};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Inputs of one sync run
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Project whose dependencies are managed
    pub project_dir: PathBuf,
    /// Cache repository URL
    pub repository: String,
    /// Baseline branch for new snapshots
    pub branch: String,
    /// Mirror directory name inside the project
    pub mirror_dir: String,
    /// Manifest file name inside the project
    pub manifest: String,
}

impl SyncOptions {
    /// Options from configuration, with the repository resolved by the caller
    pub fn from_config(config: &Config, project_dir: PathBuf, repository: String) -> Self {
        Self {
            project_dir,
            repository,
            branch: config.cache.branch.clone(),
            mirror_dir: config.cache.dir.clone(),
            manifest: config.cache.manifest.clone(),
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.project_dir.join(&self.manifest)
    }

    pub fn mirror_path(&self) -> PathBuf {
        self.project_dir.join(&self.mirror_dir)
    }
}

/// Which path produced the dependency tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPath {
    /// Existing snapshot checked out
    Fast,
    /// Installed and sealed a new snapshot
    Slow,
}

impl fmt::Display for SyncPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fast => write!(f, "restored from cache"),
            Self::Slow => write!(f, "installed and sealed"),
        }
    }
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub fingerprint: Fingerprint,
    pub version: String,
    pub mirror: PathBuf,
    pub mirror_state: MirrorState,
    pub path: SyncPath,
}

/// Progress callback, invoked with a short description of each step
pub type Progress<'a> = &'a (dyn Fn(&str) + Send + Sync);

/// Runs the sync state machine
pub struct Syncer<'a> {
    vcs: &'a dyn VersionControl,
    installer: &'a dyn PackageInstaller,
    options: SyncOptions,
    progress: Option<Progress<'a>>,
}

impl<'a> Syncer<'a> {
    pub fn new(
        vcs: &'a dyn VersionControl,
        installer: &'a dyn PackageInstaller,
        options: SyncOptions,
    ) -> Self {
        Self {
            vcs,
            installer,
            options,
            progress: None,
        }
    }

    /// Report step descriptions to `progress`
    pub fn with_progress(mut self, progress: Progress<'a>) -> Self {
        self.progress = Some(progress);
        self
    }

    fn step(&self, message: &str) {
        info!("{}", message);
        if let Some(progress) = self.progress {
            progress(message);
        }
    }

    /// Bring the mirror in line with the manifest
    pub async fn run(&self) -> DepsnapResult<SyncReport> {
        let project_dir: &Path = &self.options.project_dir;

        self.step("Fingerprinting manifest");
        let manifest = Manifest::load(&self.options.manifest_path())
            .await
            .map_err(|e| e.at(Stage::Fingerprint))?;
        let fingerprint = manifest.fingerprint().clone();

        self.step(&format!("Locating mirror of {}", self.options.repository));
        let mirror = MirrorLocator::new(self.vcs)
            .locate(&self.options.mirror_path(), &self.options.repository)
            .await
            .map_err(|e| e.at(Stage::LocateMirror))?;

        self.step(&format!("Resolving snapshot {}", fingerprint));
        let path = match SnapshotResolver::new(self.vcs)
            .resolve(&mirror, &fingerprint)
            .await
        {
            Resolution::Hit => SyncPath::Fast,
            Resolution::Miss { reason } => {
                warn!("No snapshot for {}: {}", fingerprint, reason);
                self.step(&format!("Installing and sealing {}", fingerprint));
                Sealer::new(self.vcs, self.installer, &self.options.branch)
                    .seal(project_dir, &mirror, &manifest)
                    .await
                    .map_err(|e| e.at(Stage::InstallAndSeal))?;
                SyncPath::Slow
            }
        };

        Ok(SyncReport {
            fingerprint,
            version: manifest.version_label().to_string(),
            mirror: mirror.path,
            mirror_state: mirror.state,
            path,
        })
    }
}

/// Resolve the repository URL from the command line or configuration
pub fn resolve_repository(flag: Option<String>, config: &Config) -> DepsnapResult<String> {
    flag.or_else(|| config.cache.repository.clone())
        .filter(|url| !url.trim().is_empty())
        .ok_or(DepsnapError::MissingRepository)
}
