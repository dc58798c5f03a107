//! Configuration schema for the layer filter
//!
//! Configuration is stored at `~/.config/layer-filter/config.toml`, with an
//! optional project-local `.layer-filter.toml` layered on top.

use crate::filter::FilterRule;
use crate::parent::ParentModule;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Filter rules; absent means the extension is not configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterConfig>,

    /// Parent module used for parent dependency layers
    pub parent: ParentConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Filter configuration handed to the extension
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Rules in evaluation order
    pub filters: Vec<FilterRule>,

    /// Split parent module dependencies into `-parent` layers
    pub create_parent_dependency_layers: bool,
}

/// Parent module settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParentConfig {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,

    /// Dependency listing for the file-backed resolver
    pub dependencies: Option<PathBuf>,
}

impl ParentConfig {
    /// Parent coordinates, if all three are set
    pub fn module(&self) -> Option<ParentModule> {
        Some(ParentModule {
            group_id: self.group_id.clone()?,
            artifact_id: self.artifact_id.clone()?,
            version: self.version.clone()?,
        })
    }
}
