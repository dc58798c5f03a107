//! Container build plan model
//!
//! A build plan is an ordered list of layers, each an ordered list of
//! file entries. Everything that is not a layer (base image, entrypoint,
//! labels, fields this crate does not know about) passes through the
//! filter untouched.

use crate::error::{LayerFilterError, LayerFilterResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A container build plan as handed over by the host build tool
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildPlan {
    /// Base image reference
    #[serde(default)]
    pub base_image: String,

    /// Container entrypoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<Vec<String>>,

    /// Container command
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmd: Option<Vec<String>>,

    /// Environment variables
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,

    /// Image labels
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    /// Any other host-defined fields, carried through verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,

    /// Filesystem layers in image order
    #[serde(default)]
    pub layers: Vec<Layer>,
}

/// A named, ordered group of file entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    /// Layer name; empty for anonymous layers
    #[serde(default)]
    pub name: String,

    /// File entries in extraction order
    #[serde(default)]
    pub entries: Vec<FileEntry>,
}

/// A single file destined for a layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// File on the build machine
    pub source_file: PathBuf,

    /// Absolute path inside the container filesystem
    pub extraction_path: String,

    /// Opaque metadata, never inspected by the filter
    #[serde(flatten)]
    pub metadata: FileMetadata,
}

/// Permissions, ownership and timestamps of a file entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ownership: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modification_time: Option<String>,
}

impl BuildPlan {
    /// Parse a build plan from a JSON file on disk
    pub async fn from_file(path: &Path) -> LayerFilterResult<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            LayerFilterError::io(format!("reading build plan {}", path.display()), e)
        })?;
        Self::parse(&content).map_err(|e| match e {
            LayerFilterError::Json(e) => LayerFilterError::PlanInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
            other => other,
        })
    }

    /// Parse a build plan from a JSON string
    pub fn parse(content: &str) -> LayerFilterResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_pretty(&self) -> LayerFilterResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// A copy of this plan with its layers replaced
    pub fn with_layers(&self, layers: Vec<Layer>) -> Self {
        Self {
            base_image: self.base_image.clone(),
            entrypoint: self.entrypoint.clone(),
            cmd: self.cmd.clone(),
            environment: self.environment.clone(),
            labels: self.labels.clone(),
            extra: self.extra.clone(),
            layers,
        }
    }

    /// Names of all layers, in plan order
    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.name.as_str()).collect()
    }

    /// Total number of file entries across all layers
    pub fn entry_count(&self) -> usize {
        self.layers.iter().map(|l| l.entries.len()).sum()
    }
}

impl Layer {
    /// Create an empty layer
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Create a layer with the given entries
    pub fn with_entries(name: impl Into<String>, entries: Vec<FileEntry>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }

    pub fn push(&mut self, entry: FileEntry) {
        self.entries.push(entry);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FileEntry {
    /// Create an entry with empty metadata
    pub fn new(source_file: impl Into<PathBuf>, extraction_path: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            extraction_path: extraction_path.into(),
            metadata: FileMetadata::default(),
        }
    }
}
