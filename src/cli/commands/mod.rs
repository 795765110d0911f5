//! CLI command implementations

pub mod config;
pub mod fingerprint;
pub mod status;
pub mod sync;

pub use config::execute as config;
pub use fingerprint::execute as fingerprint;
pub use status::execute as status;
pub use sync::execute as sync;

use crate::error::{DepsnapError, DepsnapResult};
use std::env;
use std::path::PathBuf;

/// The project directory: the given path made absolute, or the current directory
pub(crate) fn resolve_project_dir(project: Option<PathBuf>) -> DepsnapResult<PathBuf> {
    match project {
        Some(path) => path.canonicalize().map_err(|e| {
            DepsnapError::io(format!("resolving project path {}", path.display()), e)
        }),
        None => env::current_dir().map_err(|e| DepsnapError::io("getting current directory", e)),
    }
}
