//! Configuration management for the layer filter

pub mod schema;

pub use schema::{Config, FilterConfig, ParentConfig};

use crate::error::{LayerFilterError, LayerFilterResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Project-local config file name
pub const LOCAL_CONFIG_NAME: &str = ".layer-filter.toml";

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
            .join("layer-filter")
            .join("config.toml")
    }

    /// Walk up from `start` looking for a project-local config
    pub fn find_local_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(LOCAL_CONFIG_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Load configuration, using defaults if the file does not exist
    pub async fn load(&self) -> LayerFilterResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> LayerFilterResult<Config> {
        let value = read_config_value(path).await?;
        into_config(value, path)
    }

    /// Load the global config with a project-local config layered on top.
    ///
    /// Tables merge key by key; arrays (such as the filter list) are
    /// replaced wholesale by the local file. Relative paths are resolved
    /// against the file that set them before merging.
    pub async fn load_merged(&self, local: Option<&Path>) -> LayerFilterResult<Config> {
        let Some(local) = local else {
            return self.load().await;
        };

        let mut merged = if self.config_path.exists() {
            read_config_value(&self.config_path).await?
        } else {
            toml::Value::Table(toml::map::Map::new())
        };
        merge_toml(&mut merged, read_config_value(local).await?);

        into_config(merged, local)
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> LayerFilterResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            LayerFilterError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> LayerFilterResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| LayerFilterError::ConfigDirCreate {
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

async fn read_toml(path: &Path) -> LayerFilterResult<toml::Value> {
    let content = fs::read_to_string(path).await.map_err(|e| {
        LayerFilterError::io(format!("reading config from {}", path.display()), e)
    })?;

    content
        .parse()
        .map_err(|e: toml::de::Error| LayerFilterError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Read a config file, resolving its relative paths against its directory
async fn read_config_value(path: &Path) -> LayerFilterResult<toml::Value> {
    let mut value = read_toml(path).await?;
    if let Some(dir) = path.parent() {
        rebase_dependencies(&mut value, dir);
    }
    Ok(value)
}

/// Make a relative `parent.dependencies` path relative to `dir`
fn rebase_dependencies(value: &mut toml::Value, dir: &Path) {
    let Some(deps) = value
        .get_mut("parent")
        .and_then(|parent| parent.get_mut("dependencies"))
    else {
        return;
    };

    if let toml::Value::String(listing) = deps {
        if Path::new(listing.as_str()).is_relative() {
            *listing = dir.join(listing.as_str()).to_string_lossy().into_owned();
        }
    }
}

fn into_config(value: toml::Value, path: &Path) -> LayerFilterResult<Config> {
    value.try_into::<Config>().map_err(|e: toml::de::Error| LayerFilterError::ConfigInvalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Recursively merge `overlay` into `base`
fn merge_toml(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
