//! Configuration schema for depsnap
//!
//! Global configuration is stored at `~/.config/depsnap/config.toml`,
//! project overrides in `.depsnap.toml` next to the manifest.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Cache repository settings
    pub cache: CacheConfig,

    /// Package installer settings
    pub install: InstallConfig,

    /// Git settings
    pub git: GitConfig,
}

/// General application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,
}

/// Cache repository settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// URL of the git repository holding sealed snapshots
    pub repository: Option<String>,

    /// Baseline branch new snapshots are committed on
    pub branch: String,

    /// Mirror directory, relative to the project
    pub dir: String,

    /// Manifest file name, relative to the project
    pub manifest: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            repository: None,
            branch: "master".to_string(),
            dir: "node_modules".to_string(),
            manifest: "package.json".to_string(),
        }
    }
}

/// Supported package installers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallTool {
    #[default]
    Npm,
    Yarn,
    Pnpm,
}

impl InstallTool {
    /// Executable name
    pub fn program(&self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Yarn => "yarn",
            Self::Pnpm => "pnpm",
        }
    }

    /// Arguments that install the project's dependencies
    pub fn install_args(&self) -> &'static [&'static str] {
        match self {
            Self::Npm => &["install", "--no-audit", "--no-fund"],
            Self::Yarn => &["install", "--non-interactive"],
            Self::Pnpm => &["install"],
        }
    }
}

impl fmt::Display for InstallTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program())
    }
}

/// Package installer settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Which installer to run
    pub tool: InstallTool,

    /// Override the installer executable
    pub program: Option<String>,

    /// Override the installer arguments
    pub args: Option<Vec<String>>,
}

/// Git settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Git executable
    pub program: String,

    /// Committer name for sealed snapshots
    pub user_name: Option<String>,

    /// Committer email for sealed snapshots
    pub user_email: Option<String>,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
            user_name: None,
            user_email: None,
        }
    }
}
