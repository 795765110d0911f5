//! Filesystem helpers for the mirror's working tree

use crate::error::{DepsnapError, DepsnapResult};
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Delete everything directly under `dir` except entries named in `keep`
///
/// `dir` itself is left in place. Returns the number of entries removed.
pub async fn clear_dir_except(dir: &Path, keep: &[&str]) -> DepsnapResult<usize> {
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| DepsnapError::io(format!("listing {}", dir.display()), e))?;

    let mut removed = 0;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| DepsnapError::io(format!("listing {}", dir.display()), e))?
    {
        let name = entry.file_name();
        if keep.iter().any(|k| name.as_os_str() == *k) {
            continue;
        }

        let path = entry.path();
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| DepsnapError::io(format!("inspecting {}", path.display()), e))?;

        let result = if file_type.is_dir() {
            fs::remove_dir_all(&path).await
        } else {
            fs::remove_file(&path).await
        };
        result.map_err(|e| DepsnapError::io(format!("removing {}", path.display()), e))?;
        removed += 1;
    }

    debug!("Removed {} entries from {}", removed, dir.display());
    Ok(removed)
}

/// Remove `dir` and everything in it; a missing directory is not an error
pub async fn remove_dir_if_exists(dir: &Path) -> DepsnapResult<()> {
    match fs::remove_dir_all(dir).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DepsnapError::io(format!("removing {}", dir.display()), e)),
    }
}
