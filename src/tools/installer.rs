//! Package installer abstraction
//!
//! Dependency resolution is delegated entirely to the installer: depsnap
//! only needs to know whether a run succeeded and which version of the
//! tool produced the tree.

use crate::error::{DepsnapError, DepsnapResult};
use crate::tools::{error_tail, stream_child_output};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Abstract package installer interface
#[async_trait]
pub trait PackageInstaller: Send + Sync {
    /// Install the dependencies declared by the manifest in `project_dir`
    async fn install(&self, project_dir: &Path) -> DepsnapResult<()>;

    /// Version string of the installer, recorded in snapshot commits
    async fn version(&self) -> DepsnapResult<String>;

    /// Human-readable installer name
    fn name(&self) -> &str;
}

/// Installer that runs an external command (`npm install`, `yarn install`, ...)
pub struct CommandInstaller {
    program: String,
    args: Vec<String>,
}

impl CommandInstaller {
    /// Create an installer running `program args...` in the project directory
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// The full command line, for display
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl PackageInstaller for CommandInstaller {
    async fn install(&self, project_dir: &Path) -> DepsnapResult<()> {
        info!("Running {} in {}", self.command_line(), project_dir.display());

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(project_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| DepsnapError::command_failed(self.command_line(), e))?;

        let output = stream_child_output(&mut child, &|line: &str| debug!("{}", line)).await;

        let status = child
            .wait()
            .await
            .map_err(|e| DepsnapError::command_failed(self.command_line(), e))?;

        if status.success() {
            Ok(())
        } else {
            Err(DepsnapError::InstallFailed {
                tool: self.command_line(),
                output: error_tail(&output),
            })
        }
    }

    async fn version(&self) -> DepsnapResult<String> {
        let output = Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| DepsnapError::command_failed(format!("{} --version", self.program), e))?;

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !output.status.success() || version.is_empty() {
            return Ok("unknown".to_string());
        }
        Ok(version)
    }

    fn name(&self) -> &str {
        &self.program
    }
}
