//! Git command-line backend
//!
//! Implements [`VersionControl`] by running the `git` executable with
//! `current_dir` set to the repository, and classifies failures from stderr.

use crate::error::{DepsnapError, DepsnapResult};
use crate::tools::vcs::{Remote, VersionControl};
use async_trait::async_trait;
use std::path::Path;
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::{debug, info};

/// stderr fragments git prints when a ref or pathspec does not resolve
const MISSING_REF_MARKERS: &[&str] = &[
    "did not match any file(s) known to git",
    "unknown revision",
    "not a valid object name",
    "invalid reference",
    "ambiguous argument",
];

/// stderr fragments git prints when the remote refuses a push
const REJECTED_PUSH_MARKERS: &[&str] = &[
    "[rejected]",
    "already exists",
    "non-fast-forward",
    "fetch first",
    "atomic push failed",
    "failed to update ref",
];

/// Version control via the git CLI
pub struct GitCli {
    program: String,
    identity: Vec<String>,
}

impl GitCli {
    /// Create a backend running `program`
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            identity: Vec::new(),
        }
    }

    /// Commit as the given user instead of git's configured identity
    pub fn with_identity(mut self, name: Option<&str>, email: Option<&str>) -> Self {
        if let Some(name) = name {
            self.identity.push("-c".to_string());
            self.identity.push(format!("user.name={}", name));
        }
        if let Some(email) = email {
            self.identity.push("-c".to_string());
            self.identity.push(format!("user.email={}", email));
        }
        self
    }

    fn describe(&self, args: &[&str]) -> String {
        format!("{} {}", self.program, args.join(" "))
    }

    /// Execute a git command in `dir` and return the output
    async fn exec(&self, dir: &Path, args: &[&str]) -> DepsnapResult<Output> {
        debug!("Executing in {}: {}", dir.display(), self.describe(args));

        Command::new(&self.program)
            .args(args)
            .current_dir(dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| DepsnapError::command_failed(self.describe(args), e))
    }

    /// Execute a git command, turning a non-zero exit into an error
    async fn run(&self, dir: &Path, args: &[&str]) -> DepsnapResult<String> {
        let output = self.exec(dir, args).await?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Err(DepsnapError::git(self.describe(args), stderr))
        }
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git")
    }
}

fn is_missing_ref(stderr: &str) -> bool {
    MISSING_REF_MARKERS.iter().any(|m| stderr.contains(m))
}

fn is_rejected_push(stderr: &str) -> bool {
    REJECTED_PUSH_MARKERS.iter().any(|m| stderr.contains(m))
}

/// Parse `git remote -v` output, keeping fetch URLs only
fn parse_remotes(output: &str) -> Vec<Remote> {
    output
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let name = parts.next()?;
            let url = parts.next()?;
            match parts.next() {
                Some("(fetch)") | None => Some(Remote {
                    name: name.to_string(),
                    url: url.to_string(),
                }),
                _ => None,
            }
        })
        .collect()
}

/// Map a failed git command on `reference` to RefNotFound where applicable
fn classify_ref_error(err: DepsnapError, reference: &str) -> DepsnapError {
    match err {
        DepsnapError::Git { ref stderr, .. } if is_missing_ref(stderr) => {
            DepsnapError::RefNotFound {
                refname: reference.to_string(),
            }
        }
        other => other,
    }
}

#[async_trait]
impl VersionControl for GitCli {
    async fn clone_repo(&self, url: &str, dest: &Path) -> DepsnapResult<()> {
        info!("Cloning {} into {}", url, dest.display());

        let parent = match dest.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let dest_str = dest.to_string_lossy().into_owned();

        self.run(parent, &["clone", "--quiet", url, &dest_str])
            .await
            .map(|_| ())
            .map_err(|e| match e {
                DepsnapError::Git { stderr, .. } => DepsnapError::RemoteUnavailable {
                    url: url.to_string(),
                    reason: stderr,
                },
                other => other,
            })
    }

    async fn list_remotes(&self, dir: &Path) -> DepsnapResult<Vec<Remote>> {
        let output = self.run(dir, &["remote", "-v"]).await?;
        Ok(parse_remotes(&output))
    }

    async fn fetch_tags(&self, dir: &Path, remote: &str) -> DepsnapResult<()> {
        debug!("Fetching tags from {}", remote);

        self.run(
            dir,
            &["fetch", "--quiet", "--force", "--tags", "--prune", "--prune-tags", remote],
        )
        .await
        .map(|_| ())
        .map_err(|e| match e {
            DepsnapError::Git { stderr, .. } => DepsnapError::RemoteUnavailable {
                url: remote.to_string(),
                reason: stderr,
            },
            other => other,
        })
    }

    async fn checkout(&self, dir: &Path, reference: &str) -> DepsnapResult<()> {
        self.run(dir, &["checkout", "--quiet", "--force", reference])
            .await
            .map(|_| ())
            .map_err(|e| classify_ref_error(e, reference))
    }

    async fn checkout_unborn(&self, dir: &Path, branch: &str) -> DepsnapResult<()> {
        let head = format!("refs/heads/{}", branch);
        self.run(dir, &["symbolic-ref", "HEAD", &head]).await?;
        Ok(())
    }

    async fn reset(&self, dir: &Path, reference: &str, hard: bool) -> DepsnapResult<()> {
        let mode = if hard { "--hard" } else { "--mixed" };
        self.run(dir, &["reset", "--quiet", mode, reference])
            .await
            .map(|_| ())
            .map_err(|e| classify_ref_error(e, reference))
    }

    async fn clean(&self, dir: &Path, exclude: &[&str]) -> DepsnapResult<()> {
        // -x: ignored files from an earlier snapshot must go too
        let mut args = vec!["clean", "-d", "-x", "--force", "--quiet"];
        for pattern in exclude {
            args.push("-e");
            args.push(pattern);
        }
        self.run(dir, &args).await?;
        Ok(())
    }

    async fn add(&self, dir: &Path, paths: &[&str]) -> DepsnapResult<()> {
        // Installed packages ship their own .gitignore files; seal everything
        let mut args = vec!["add", "--all", "--force", "--"];
        args.extend_from_slice(paths);
        self.run(dir, &args).await?;
        Ok(())
    }

    async fn commit(&self, dir: &Path, message: &str) -> DepsnapResult<()> {
        let mut args: Vec<&str> = self.identity.iter().map(String::as_str).collect();
        args.extend_from_slice(&["commit", "--quiet", "--allow-empty", "--no-verify", "-m", message]);
        self.run(dir, &args).await?;
        Ok(())
    }

    async fn tag(&self, dir: &Path, name: &str) -> DepsnapResult<()> {
        self.run(dir, &["tag", name]).await?;
        Ok(())
    }

    async fn push(
        &self,
        dir: &Path,
        remote: &str,
        refs: &[&str],
        include_tags: bool,
    ) -> DepsnapResult<()> {
        info!("Pushing {} to {}", refs.join(", "), remote);

        let mut args = vec!["push", "--quiet", "--atomic"];
        if include_tags {
            args.push("--tags");
        }
        args.push(remote);
        args.extend_from_slice(refs);

        self.run(dir, &args).await.map(|_| ()).map_err(|e| match e {
            DepsnapError::Git { stderr, .. } if is_rejected_push(&stderr) => {
                DepsnapError::PublishConflict {
                    tag: refs.join(" "),
                    reason: stderr,
                }
            }
            DepsnapError::Git { stderr, .. } => DepsnapError::RemoteUnavailable {
                url: remote.to_string(),
                reason: stderr,
            },
            other => other,
        })
    }

    async fn has_ref(&self, dir: &Path, reference: &str) -> DepsnapResult<bool> {
        let spec = format!("{}^{{commit}}", reference);
        let output = self
            .exec(dir, &["rev-parse", "--verify", "--quiet", &spec])
            .await?;
        Ok(output.status.success())
    }
}
