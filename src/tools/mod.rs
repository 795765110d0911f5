//! External collaborators
//!
//! Everything depsnap does outside its own memory goes through here:
//! - `git` for the mirror, behind [`VersionControl`]
//! - npm/yarn/pnpm for installation, behind [`PackageInstaller`]
//! - recursive deletion of the mirror's working tree
//!
//! Every operation takes the directory it acts on. The process working
//! directory is never changed.

mod factory;
pub mod fs;
mod git;
mod installer;
mod vcs;

pub use factory::{create_installer, create_vcs};
pub use git::GitCli;
pub use installer::{CommandInstaller, PackageInstaller};
pub use vcs::{Remote, VersionControl};

use tokio::io::{AsyncBufReadExt, BufReader};

/// Max number of output lines to include in install error messages.
const ERROR_TAIL_LINES: usize = 50;

/// Extract the useful tail of command output for error diagnostics.
pub(crate) fn error_tail(lines: &[String]) -> String {
    let start = lines.len().saturating_sub(ERROR_TAIL_LINES);
    lines[start..].join("\n")
}

/// Stream stdout+stderr from a child process, calling `on_output` for each line.
///
/// Returns all collected output lines for error reporting.
pub(crate) async fn stream_child_output(
    child: &mut tokio::process::Child,
    on_output: &(dyn Fn(&str) + Send + Sync),
) -> Vec<String> {
    let mut all_output = Vec::new();
    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        return all_output;
    };

    let mut stderr_reader = BufReader::new(stderr).lines();
    let mut stdout_reader = BufReader::new(stdout).lines();

    let mut stderr_done = false;
    let mut stdout_done = false;

    while !stderr_done || !stdout_done {
        tokio::select! {
            line = stderr_reader.next_line(), if !stderr_done => {
                match line {
                    Ok(Some(line)) => {
                        on_output(&line);
                        all_output.push(line);
                    }
                    _ => stderr_done = true,
                }
            }
            line = stdout_reader.next_line(), if !stdout_done => {
                match line {
                    Ok(Some(line)) => {
                        on_output(&line);
                        all_output.push(line);
                    }
                    _ => stdout_done = true,
                }
            }
        }
    }

    all_output
}
