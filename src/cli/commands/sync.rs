//! Sync command - restore or build node_modules from the cache repository

use crate::cache::{resolve_repository, SyncOptions, SyncPath, Syncer};
use crate::cli::args::SyncArgs;
use crate::cli::commands::resolve_project_dir;
use crate::config::Config;
use crate::error::DepsnapResult;
use crate::tools::{create_installer, create_vcs};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

/// Execute the sync command
pub async fn execute(args: SyncArgs, config: &Config) -> DepsnapResult<()> {
    let project_dir = resolve_project_dir(args.project)?;
    let repository = resolve_repository(args.repo, config)?;
    debug!("Project directory: {}", project_dir.display());

    let vcs = create_vcs(config);
    let installer = create_installer(config);
    let options = SyncOptions::from_config(config, project_dir, repository.clone());

    let pb = create_progress_bar("Starting...");
    let on_step = |step: &str| pb.set_message(step.to_string());

    let result = Syncer::new(&*vcs, &*installer, options)
        .with_progress(&on_step)
        .run()
        .await;
    pb.finish_and_clear();
    let report = result?;

    let marker = match report.path {
        SyncPath::Fast => style("✓").green(),
        SyncPath::Slow => style("✓").cyan(),
    };
    println!(
        "{} {} {} (version {}, snapshot {})",
        marker,
        report.mirror.display(),
        report.path,
        report.version,
        style(&report.fingerprint).dim()
    );
    debug!("Mirror {} from {}", report.mirror_state, repository);

    Ok(())
}

fn create_progress_bar(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
