//! Builds the configured external tools

use crate::config::Config;
use crate::tools::git::GitCli;
use crate::tools::installer::{CommandInstaller, PackageInstaller};
use crate::tools::vcs::VersionControl;

/// Create the version control backend described by `config.git`
pub fn create_vcs(config: &Config) -> Box<dyn VersionControl> {
    let git = &config.git;
    Box::new(
        GitCli::new(git.program.clone())
            .with_identity(git.user_name.as_deref(), git.user_email.as_deref()),
    )
}

/// Create the package installer described by `config.install`
///
/// `program` and `args` override the defaults of the selected tool
/// independently of each other.
pub fn create_installer(config: &Config) -> Box<dyn PackageInstaller> {
    let install = &config.install;
    let program = install
        .program
        .clone()
        .unwrap_or_else(|| install.tool.program().to_string());
    let args = install.args.clone().unwrap_or_else(|| {
        install
            .tool
            .install_args()
            .iter()
            .map(|a| a.to_string())
            .collect()
    });

    Box::new(CommandInstaller::new(program, args))
}
