//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// depsnap - cached node_modules from a git repository
///
/// Checks out the dependency tree sealed for the current package.json,
/// or installs it and seals a new snapshot when none exists.
#[derive(Parser, Debug)]
#[command(name = "depsnap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "DEPSNAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip project-local .depsnap.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,
}

impl Cli {
    /// Project directory named by the subcommand, if any
    pub fn project(&self) -> Option<&PathBuf> {
        match &self.command {
            Commands::Sync(args) => args.project.as_ref(),
            Commands::Fingerprint(args) | Commands::Status(args) => args.project.as_ref(),
            Commands::Config(_) => None,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check out or build the dependency tree for the current manifest
    Sync(SyncArgs),

    /// Print the manifest fingerprint used as the snapshot tag
    Fingerprint(ProjectArgs),

    /// Show the local mirror and whether it holds the current snapshot
    Status(ProjectArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the sync command
#[derive(Parser, Debug)]
pub struct SyncArgs {
    /// Git URL of the repository holding node_modules snapshots
    #[arg(short, long, env = "DEPSNAP_REPO")]
    pub repo: Option<String>,

    /// Project directory containing package.json (defaults to current directory)
    #[arg(short, long)]
    pub project: Option<PathBuf>,
}

/// Arguments for commands that only need a project
#[derive(Parser, Debug)]
pub struct ProjectArgs {
    /// Project directory containing package.json (defaults to current directory)
    #[arg(short, long)]
    pub project: Option<PathBuf>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show effective configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}
