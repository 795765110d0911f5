//! Snapshot resolution (fast path)
//!
//! Brings the mirror's working tree to the snapshot tagged with the
//! fingerprint. A missing tag is an expected outcome, not an error.

use crate::cache::manifest::Fingerprint;
use crate::cache::mirror::Mirror;
use crate::tools::VersionControl;
use tracing::{debug, info};

/// Outcome of trying the fast path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The mirror now holds the cached tree
    Hit,
    /// No usable snapshot; the tree must be installed and sealed
    Miss { reason: String },
}

impl Resolution {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit)
    }
}

/// Resolves snapshots by fingerprint
pub struct SnapshotResolver<'a> {
    vcs: &'a dyn VersionControl,
}

impl<'a> SnapshotResolver<'a> {
    pub fn new(vcs: &'a dyn VersionControl) -> Self {
        Self { vcs }
    }

    /// Check out the snapshot tagged `fingerprint` and clean untracked files
    ///
    /// Any failure along the way is reported as a miss.
    pub async fn resolve(&self, mirror: &Mirror, fingerprint: &Fingerprint) -> Resolution {
        let tag_ref = fingerprint.tag_ref();

        if let Err(e) = self.vcs.checkout(&mirror.path, &tag_ref).await {
            debug!("Snapshot {} unavailable: {}", fingerprint, e);
            return Resolution::Miss {
                reason: e.to_string(),
            };
        }

        if let Err(e) = self.vcs.clean(&mirror.path, &[]).await {
            debug!("Cleaning snapshot {} failed: {}", fingerprint, e);
            return Resolution::Miss {
                reason: e.to_string(),
            };
        }

        info!("Checked out snapshot {}", fingerprint);
        Resolution::Hit
    }
}
