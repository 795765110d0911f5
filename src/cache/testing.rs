//! Recording fakes for the version control and installer seams
//!
//! `FakeRemote` is the shared cache repository; each `FakeVcs` is one
//! machine's view of it. Both fakes write to the same call log so tests
//! can assert ordering across git and the installer.

use crate::error::{DepsnapError, DepsnapResult};
use crate::tools::{PackageInstaller, Remote, VersionControl};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Barrier;

pub type CallLog = Arc<Mutex<Vec<String>>>;

#[derive(Debug, Default)]
struct RemoteState {
    tags: BTreeSet<String>,
    has_branch: bool,
    unreachable: bool,
    pushes: usize,
}

/// In-memory stand-in for the shared cache repository
#[derive(Debug, Clone)]
pub struct FakeRemote {
    url: String,
    state: Arc<Mutex<RemoteState>>,
}

impl FakeRemote {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            state: Arc::default(),
        }
    }

    /// Pretend a snapshot for `tag` was sealed earlier
    pub fn with_tag(self, tag: &str) -> Self {
        self.add_tag(tag);
        self
    }

    /// Publish `tag` as another machine would
    pub fn add_tag(&self, tag: &str) {
        let mut state = self.state.lock().unwrap();
        state.tags.insert(tag.to_string());
        state.has_branch = true;
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.lock().unwrap().unreachable = unreachable;
    }

    pub fn tags(&self) -> BTreeSet<String> {
        self.state.lock().unwrap().tags.clone()
    }

    pub fn pushes(&self) -> usize {
        self.state.lock().unwrap().pushes
    }

    fn unavailable(&self) -> DepsnapError {
        DepsnapError::RemoteUnavailable {
            url: self.url.clone(),
            reason: "Could not resolve host".to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct LocalState {
    remotes: Vec<Remote>,
    tags: BTreeSet<String>,
    /// Tags known to exist remotely as of the last clone/fetch/push
    fetched: BTreeSet<String>,
    branches: BTreeSet<String>,
    remote_branch: bool,
}

/// One machine's git, backed by a [`FakeRemote`]
pub struct FakeVcs {
    remote: FakeRemote,
    log: CallLog,
    state: Mutex<LocalState>,
}

impl FakeVcs {
    pub fn new(remote: FakeRemote) -> Self {
        Self {
            remote,
            log: CallLog::default(),
            state: Mutex::default(),
        }
    }

    /// An installer writing to this machine's call log
    pub fn installer(&self) -> FakeInstaller {
        FakeInstaller::new(self.log.clone())
    }

    /// Every call so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    /// Position of the first call starting with `prefix`
    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.calls().iter().position(|c| c.starts_with(prefix))
    }

    /// Create an existing mirror directory with one remote
    pub fn seed_mirror(&self, path: &Path, remote: &str, url: &str) {
        std::fs::create_dir_all(path.join(".git")).unwrap();
        self.state.lock().unwrap().remotes = vec![Remote {
            name: remote.to_string(),
            url: url.to_string(),
        }];
    }

    pub fn add_local_tag(&self, tag: &str) {
        self.state.lock().unwrap().tags.insert(tag.to_string());
    }

    fn record(&self, call: String) {
        self.log.lock().unwrap().push(call);
    }

    fn sync_from_remote(&self) {
        let remote = self.remote.state.lock().unwrap();
        let mut state = self.state.lock().unwrap();
        state.tags = remote.tags.clone();
        state.fetched = remote.tags.clone();
        state.remote_branch = remote.has_branch;
    }

    fn is_unreachable(&self) -> bool {
        self.remote.state.lock().unwrap().unreachable
    }
}

#[async_trait]
impl VersionControl for FakeVcs {
    async fn clone_repo(&self, url: &str, dest: &Path) -> DepsnapResult<()> {
        self.record(format!("clone {}", url));
        if self.is_unreachable() {
            return Err(self.remote.unavailable());
        }

        std::fs::create_dir_all(dest.join(".git"))
            .map_err(|e| DepsnapError::io("creating fake clone", e))?;
        self.state.lock().unwrap().remotes = vec![Remote {
            name: "origin".to_string(),
            url: url.to_string(),
        }];
        self.sync_from_remote();
        Ok(())
    }

    async fn list_remotes(&self, _dir: &Path) -> DepsnapResult<Vec<Remote>> {
        self.record("remote -v".to_string());
        Ok(self.state.lock().unwrap().remotes.clone())
    }

    async fn fetch_tags(&self, _dir: &Path, remote: &str) -> DepsnapResult<()> {
        self.record(format!("fetch {}", remote));
        if self.is_unreachable() {
            return Err(DepsnapError::RemoteUnavailable {
                url: remote.to_string(),
                reason: "Could not resolve host".to_string(),
            });
        }
        self.sync_from_remote();
        Ok(())
    }

    async fn checkout(&self, _dir: &Path, reference: &str) -> DepsnapResult<()> {
        self.record(format!("checkout {}", reference));
        let mut state = self.state.lock().unwrap();

        let found = match reference.strip_prefix("refs/tags/") {
            Some(tag) => state.tags.contains(tag),
            None => state.branches.contains(reference) || state.remote_branch,
        };
        if !found {
            return Err(DepsnapError::RefNotFound {
                refname: reference.to_string(),
            });
        }
        if !reference.starts_with("refs/") {
            state.branches.insert(reference.to_string());
        }
        Ok(())
    }

    async fn checkout_unborn(&self, _dir: &Path, branch: &str) -> DepsnapResult<()> {
        self.record(format!("checkout-unborn {}", branch));
        Ok(())
    }

    async fn reset(&self, _dir: &Path, reference: &str, _hard: bool) -> DepsnapResult<()> {
        self.record(format!("reset {}", reference));
        Ok(())
    }

    async fn clean(&self, _dir: &Path, _exclude: &[&str]) -> DepsnapResult<()> {
        self.record("clean".to_string());
        Ok(())
    }

    async fn add(&self, _dir: &Path, _paths: &[&str]) -> DepsnapResult<()> {
        self.record("add".to_string());
        Ok(())
    }

    async fn commit(&self, _dir: &Path, message: &str) -> DepsnapResult<()> {
        self.record(format!("commit {}", message));
        Ok(())
    }

    async fn tag(&self, _dir: &Path, name: &str) -> DepsnapResult<()> {
        self.record(format!("tag {}", name));
        let mut state = self.state.lock().unwrap();
        if !state.tags.insert(name.to_string()) {
            return Err(DepsnapError::git(
                format!("git tag {}", name),
                format!("fatal: tag '{}' already exists", name),
            ));
        }
        Ok(())
    }

    async fn push(
        &self,
        _dir: &Path,
        remote: &str,
        refs: &[&str],
        _include_tags: bool,
    ) -> DepsnapResult<()> {
        self.record(format!("push {} {}", remote, refs.join(" ")));
        if self.is_unreachable() {
            return Err(self.remote.unavailable());
        }

        let mut shared = self.remote.state.lock().unwrap();
        let mut state = self.state.lock().unwrap();
        let new_tags: Vec<String> = state.tags.difference(&state.fetched).cloned().collect();

        // Atomic: one rejected ref rejects the whole push
        if let Some(taken) = new_tags.iter().find(|t| shared.tags.contains(*t)) {
            return Err(DepsnapError::PublishConflict {
                tag: taken.clone(),
                reason: format!(" ! [rejected] {} -> {} (already exists)", taken, taken),
            });
        }

        shared.tags.extend(new_tags.iter().cloned());
        shared.has_branch = true;
        shared.pushes += 1;
        state.fetched.extend(new_tags);
        state.remote_branch = true;
        Ok(())
    }

    async fn has_ref(&self, _dir: &Path, reference: &str) -> DepsnapResult<bool> {
        self.record(format!("has-ref {}", reference));
        let state = self.state.lock().unwrap();
        Ok(match reference.strip_prefix("refs/tags/") {
            Some(tag) => state.tags.contains(tag),
            None => state.remote_branch,
        })
    }
}

/// Installer that writes a one-package tree and records itself
pub struct FakeInstaller {
    log: CallLog,
    installs: AtomicUsize,
    fail: bool,
    barrier: Option<Arc<Barrier>>,
    seen_tree: Mutex<Option<Vec<String>>>,
}

impl FakeInstaller {
    fn new(log: CallLog) -> Self {
        Self {
            log,
            installs: AtomicUsize::new(0),
            fail: false,
            barrier: None,
            seen_tree: Mutex::new(None),
        }
    }

    /// Fail every install
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Wait on `barrier` before installing, to line up concurrent runs
    pub fn with_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.barrier = Some(barrier);
        self
    }

    pub fn installs(&self) -> usize {
        self.installs.load(Ordering::SeqCst)
    }

    /// Entries of node_modules when the last install started
    pub fn seen_tree(&self) -> Option<Vec<String>> {
        self.seen_tree.lock().unwrap().clone()
    }
}

fn list_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

#[async_trait]
impl PackageInstaller for FakeInstaller {
    async fn install(&self, project_dir: &Path) -> DepsnapResult<()> {
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }

        let modules: PathBuf = project_dir.join("node_modules");
        *self.seen_tree.lock().unwrap() = Some(list_names(&modules));
        self.log.lock().unwrap().push("install".to_string());
        self.installs.fetch_add(1, Ordering::SeqCst);

        if self.fail {
            return Err(DepsnapError::InstallFailed {
                tool: "fake-npm install".to_string(),
                output: "npm ERR! ERESOLVE unable to resolve dependency tree".to_string(),
            });
        }

        let package = modules.join("left-pad");
        std::fs::create_dir_all(&package).map_err(|e| DepsnapError::io("fake install", e))?;
        std::fs::write(package.join("index.js"), "module.exports = pad;")
            .map_err(|e| DepsnapError::io("fake install", e))?;
        Ok(())
    }

    async fn version(&self) -> DepsnapResult<String> {
        Ok("10.2.0".to_string())
    }

    fn name(&self) -> &str {
        "fake-npm"
    }
}
