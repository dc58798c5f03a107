//! File-backed dependency resolver
//!
//! Stands in for the build tool's resolver when the filter runs from the
//! command line. The listing is a TOML file of already resolved parent
//! dependencies:
//!
//! ```toml
//! parent = "com.example:parent:1.0"
//!
//! [[dependency]]
//! group_id = "com.google.guava"
//! artifact_id = "guava"
//! version = "31.0-jre"
//! scope = "compile"
//! ```

use crate::error::{BoxError, LayerFilterError, LayerFilterResult};
use crate::parent::{Dependency, DependencyResolver, ResolutionRequest};
use serde::Deserialize;
use std::path::Path;

/// Resolver answering from a fixed dependency listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaticResolver {
    /// Parent coordinates the listing was produced for, if recorded
    #[serde(default)]
    pub parent: Option<String>,

    #[serde(default, rename = "dependency")]
    pub dependencies: Vec<Dependency>,
}

impl StaticResolver {
    pub fn new(dependencies: Vec<Dependency>) -> Self {
        Self {
            parent: None,
            dependencies,
        }
    }

    /// Load a listing from a TOML file on disk
    pub async fn from_file(path: &Path) -> LayerFilterResult<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            LayerFilterError::io(format!("reading dependency listing {}", path.display()), e)
        })?;
        toml::from_str(&content).map_err(|e| LayerFilterError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Parse a listing from a TOML string
    pub fn parse(content: &str) -> LayerFilterResult<Self> {
        Ok(toml::from_str(content)?)
    }
}

impl DependencyResolver for StaticResolver {
    fn resolve(&self, request: &ResolutionRequest<'_>) -> Result<Vec<Dependency>, BoxError> {
        let wanted = request.parent.to_string();
        if let Some(ref listed) = self.parent {
            if *listed != wanted {
                return Err(format!("dependency listing is for {}, not {}", listed, wanted).into());
            }
        }

        Ok(self
            .dependencies
            .iter()
            .filter(|d| !request.excludes(&d.scope))
            .cloned()
            .collect())
    }
}
