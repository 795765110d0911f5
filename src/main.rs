//! depsnap - node_modules snapshots in git
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use depsnap::cli::{Cli, Commands};
use depsnap::config::ConfigManager;
use depsnap::error::{DepsnapError, DepsnapResult};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> DepsnapResult<()> {
    let cli = Cli::parse();

    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };

    // Local config lives next to the manifest, so look in the project
    let local_config_path = if cli.no_local {
        None
    } else {
        let project = match cli.project() {
            Some(path) => path.clone(),
            None => std::env::current_dir()
                .map_err(|e| DepsnapError::io("getting current directory", e))?,
        };
        ConfigManager::find_local_config(&project)
    };

    let config = config_manager
        .load_merged(local_config_path.as_deref())
        .await?;

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let verbosity = cli.verbose.max(u8::from(config.general.verbose));
    let filter = match verbosity {
        0 => EnvFilter::new("depsnap=warn"),
        1 => EnvFilter::new("depsnap=info"),
        _ => EnvFilter::new("depsnap=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    if let Some(ref path) = local_config_path {
        debug!("Loaded local config: {}", path.display());
    }

    // Dispatch to command
    match cli.command {
        Commands::Sync(args) => depsnap::cli::commands::sync(args, &config).await,
        Commands::Fingerprint(args) => depsnap::cli::commands::fingerprint(args, &config).await,
        Commands::Status(args) => depsnap::cli::commands::status(args, &config).await,
        Commands::Config(args) => {
            depsnap::cli::commands::config(args, &config, &config_manager).await
        }
    }
}
