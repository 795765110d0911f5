//! Manifest loading and fingerprinting
//!
//! The fingerprint is a SHA256 over the exact bytes of the manifest, so
//! any edit (including whitespace) produces a new snapshot key, and the
//! same file produces the same key on every machine.

use crate::error::{DepsnapError, DepsnapResult};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Number of digest bytes kept in a fingerprint (40 hex chars)
const FINGERPRINT_BYTES: usize = 20;

/// Label used in commit messages when the manifest has no version
pub const UNVERSIONED: &str = "unversioned";

/// Content hash of a manifest, used as the snapshot tag name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Hash raw manifest bytes
    pub fn of(content: &[u8]) -> Self {
        let digest = Sha256::digest(content);
        Self(hex::encode(&digest[..FINGERPRINT_BYTES]))
    }

    /// The token itself
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fully qualified tag ref for this fingerprint
    pub fn tag_ref(&self) -> String {
        format!("refs/tags/{}", self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Fingerprint {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The fields of package.json depsnap reads
#[derive(Debug, Default, Deserialize)]
struct ManifestFields {
    name: Option<String>,
    version: Option<String>,
}

/// A project's dependency manifest (package.json)
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    name: Option<String>,
    version: Option<String>,
    fingerprint: Fingerprint,
}

impl Manifest {
    /// Read and fingerprint the manifest at `path`
    pub async fn load(path: &Path) -> DepsnapResult<Self> {
        let content = fs::read(path)
            .await
            .map_err(|e| DepsnapError::ManifestRead {
                path: path.to_path_buf(),
                source: e,
            })?;

        let manifest = Self::from_bytes(path, &content);
        debug!(
            "Fingerprint of {} is {}",
            path.display(),
            manifest.fingerprint
        );
        Ok(manifest)
    }

    /// Build a manifest from content already in memory
    pub fn from_bytes(path: &Path, content: &[u8]) -> Self {
        let fields = match serde_json::from_slice::<ManifestFields>(content) {
            Ok(fields) => fields,
            Err(e) => {
                warn!("{} is not valid JSON ({}), version unknown", path.display(), e);
                ManifestFields::default()
            }
        };

        Self {
            path: path.to_path_buf(),
            name: fields.name,
            version: fields.version,
            fingerprint: Fingerprint::of(content),
        }
    }

    /// Content fingerprint
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Package name, if declared
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Declared version, or `"unversioned"`
    pub fn version_label(&self) -> &str {
        self.version.as_deref().unwrap_or(UNVERSIONED)
    }

    /// File name of the manifest, for messages
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Path the manifest was read from
    pub fn path(&self) -> &Path {
        &self.path
    }
}
