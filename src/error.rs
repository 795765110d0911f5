//! Error types for depsnap
//!
//! All modules use `DepsnapResult<T>` as their return type.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for depsnap operations
pub type DepsnapResult<T> = Result<T, DepsnapError>;

/// Orchestration stage an error surfaced from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Reading and hashing the manifest
    Fingerprint,
    /// Cloning or refreshing the local mirror
    LocateMirror,
    /// Full install followed by commit, tag and push
    InstallAndSeal,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fingerprint => "fingerprint",
            Self::LocateMirror => "locate mirror",
            Self::InstallAndSeal => "install and seal",
        };
        write!(f, "{}", name)
    }
}

/// All errors that can occur in depsnap
#[derive(Error, Debug)]
pub enum DepsnapError {
    // Manifest errors
    #[error("Failed to read manifest {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Remote errors
    #[error("Cache repository {url} is unavailable: {reason}")]
    RemoteUnavailable { url: String, reason: String },

    #[error("Publishing snapshot {tag} was rejected: {reason}")]
    PublishConflict { tag: String, reason: String },

    #[error("No cache repository configured")]
    MissingRepository,

    // Git errors
    #[error("Ref not found: {refname}")]
    RefNotFound { refname: String },

    #[error("Git command failed: {command}: {stderr}")]
    Git { command: String, stderr: String },

    // Installer errors
    #[error("Package installation with {tool} failed:\n{output}")]
    InstallFailed { tool: String, output: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // Orchestration
    #[error("{stage} failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<DepsnapError>,
    },

    #[error("{0}")]
    User(String),
}

impl DepsnapError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a git command error
    pub fn git(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::Git {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Attach the orchestration stage this error occurred in
    pub fn at(self, stage: Stage) -> Self {
        match self {
            already @ Self::Stage { .. } => already,
            other => Self::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// The error with any stage wrapper removed
    pub fn root(&self) -> &DepsnapError {
        match self {
            Self::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    /// Stage the error surfaced from, if known
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self.root() {
            Self::MissingRepository => {
                Some("Pass --repo <url> or set cache.repository in .depsnap.toml")
            }
            Self::PublishConflict { .. } => {
                Some(
                    "The cache repository changed while sealing; run depsnap sync again to \
                     restore the published snapshot or reseal on top of the new history",
                )
            }
            Self::RemoteUnavailable { .. } => {
                Some("Check the repository URL and your git credentials")
            }
            Self::ManifestRead { .. } => Some("Run depsnap from the project root or pass --project"),
            _ => None,
        }
    }
}
