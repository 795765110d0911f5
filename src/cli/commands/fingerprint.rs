//! Fingerprint command - print the snapshot key for a project

use crate::cache::Manifest;
use crate::cli::args::ProjectArgs;
use crate::cli::commands::resolve_project_dir;
use crate::config::Config;
use crate::error::DepsnapResult;
use tracing::info;

/// Execute the fingerprint command
pub async fn execute(args: ProjectArgs, config: &Config) -> DepsnapResult<()> {
    let project_dir = resolve_project_dir(args.project)?;
    let manifest = Manifest::load(&project_dir.join(&config.cache.manifest)).await?;

    info!(
        "{} ({} version {})",
        manifest.path().display(),
        manifest.name().unwrap_or("unnamed"),
        manifest.version_label()
    );
    println!("{}", manifest.fingerprint());
    Ok(())
}
