//! Status command - inspect the local mirror without touching the network

use crate::cache::mirror::same_url;
use crate::cache::{Manifest, MirrorLocator};
use crate::cli::args::ProjectArgs;
use crate::cli::commands::resolve_project_dir;
use crate::config::Config;
use crate::error::DepsnapResult;
use crate::tools::{create_vcs, Remote};
use console::{style, Emoji};

static CHECK: Emoji<'_, '_> = Emoji("✓ ", "[OK] ");
static CROSS: Emoji<'_, '_> = Emoji("✗ ", "[MISSING] ");
static WARN: Emoji<'_, '_> = Emoji("⚠ ", "[WARN] ");

/// Execute the status command
pub async fn execute(args: ProjectArgs, config: &Config) -> DepsnapResult<()> {
    let project_dir = resolve_project_dir(args.project)?;
    let manifest = Manifest::load(&project_dir.join(&config.cache.manifest)).await?;
    let mirror_path = project_dir.join(&config.cache.dir);
    let fingerprint = manifest.fingerprint();

    println!("{}", style("depsnap status").bold().cyan());
    println!();
    println!("{}", style("Manifest:").bold());
    println!("  Path:        {}", manifest.path().display());
    println!("  Version:     {}", manifest.version_label());
    println!("  Fingerprint: {}", fingerprint);

    let vcs = create_vcs(config);
    let status = MirrorLocator::new(&*vcs)
        .inspect(&mirror_path, &fingerprint.tag_ref())
        .await?;

    println!();
    println!("{}", style("Mirror:").bold());
    if !status.is_repository {
        println!(
            "  {}{} is not a mirror yet; depsnap sync will clone it",
            CROSS,
            mirror_path.display()
        );
        return Ok(());
    }
    println!("  {}{}", CHECK, mirror_path.display());

    for remote in &status.remotes {
        println!("  Remote:      {} {}", remote.name, remote.url);
    }

    if let Some(ref url) = config.cache.repository {
        if !is_linked(&status.remotes, url) {
            println!(
                "  {}Not linked to {}; it will be re-cloned on sync",
                WARN,
                style(url).yellow()
            );
        }
    }

    if status.has_snapshot {
        println!("  {}Snapshot {} present locally", CHECK, fingerprint);
    } else {
        println!(
            "  {}Snapshot {} not present locally",
            CROSS,
            style(fingerprint).yellow()
        );
    }

    Ok(())
}

/// Whether sync would refresh this mirror rather than re-clone it
fn is_linked(remotes: &[Remote], url: &str) -> bool {
    remotes.iter().any(|r| same_url(&r.url, url))
}
