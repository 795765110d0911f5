//! Configuration management for depsnap

pub mod schema;

pub use schema::{Config, InstallTool};

use crate::error::{DepsnapError, DepsnapResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Name of the project-local configuration file
pub const LOCAL_CONFIG_FILE: &str = ".depsnap.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("depsnap")
            .join("config.toml")
    }

    /// Find the project-local config file, if the project has one
    pub fn find_local_config(project_dir: &Path) -> Option<PathBuf> {
        let candidate = project_dir.join(LOCAL_CONFIG_FILE);
        candidate.is_file().then_some(candidate)
    }

    /// Load configuration, creating default if not exists
    pub async fn load(&self) -> DepsnapResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> DepsnapResult<Config> {
        let value = Self::read_table(path).await?;
        Self::decode(path, value)
    }

    /// Load the global config with a project-local file layered on top
    ///
    /// Tables are merged key by key, so a local file only needs the
    /// values it overrides.
    pub async fn load_merged(&self, local: Option<&Path>) -> DepsnapResult<Config> {
        let Some(local) = local else {
            return self.load().await;
        };

        let mut merged = if self.config_path.exists() {
            Self::read_table(&self.config_path).await?
        } else {
            toml::Value::Table(toml::Table::new())
        };

        let overlay = Self::read_table(local).await?;
        merge_values(&mut merged, overlay);
        debug!("Merged local config from {}", local.display());

        Self::decode(local, merged)
    }

    async fn read_table(path: &Path) -> DepsnapResult<toml::Value> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| DepsnapError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| DepsnapError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    fn decode(path: &Path, value: toml::Value) -> DepsnapResult<Config> {
        value.try_into().map_err(|e: toml::de::Error| DepsnapError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> DepsnapResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            DepsnapError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> DepsnapResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DepsnapError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Deep-merge `overlay` into `base`; non-table values in `overlay` win
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
