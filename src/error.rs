//! Error types for the layer filter
//!
//! All modules use `LayerFilterResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for layer filter operations
pub type LayerFilterResult<T> = Result<T, LayerFilterError>;

/// Boxed error returned by host-supplied collaborators
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// All errors that can occur while filtering a build plan
#[derive(Error, Debug)]
pub enum LayerFilterError {
    // Filter configuration errors
    #[error(
        "moving files into built-in layer '{layer}' is not supported; specify a new layer name in 'to_layer'"
    )]
    BuiltInLayerTarget { layer: String },

    #[error("glob pattern not given in filter configuration")]
    EmptyGlob,

    #[error("Invalid glob pattern '{glob}': {reason}")]
    InvalidGlob { glob: String, reason: String },

    // Parent dependency errors
    #[error("Tried to get parent dependencies, but project has no parent")]
    NoParent,

    #[error("Tried to get parent dependencies, but no dependency resolver is available")]
    ResolverUnavailable,

    #[error("Error when getting parent dependencies of {parent}: {source}")]
    DependencyResolution {
        parent: String,
        #[source]
        source: BoxError,
    },

    #[error("Parent dependencies {first} and {second} both expect path {path}")]
    ParentDependencyConflict {
        path: String,
        first: String,
        second: String,
    },

    // Host input errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Invalid build plan at {path}: {reason}")]
    PlanInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("{0}")]
    User(String),
}

impl LayerFilterError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Wrap a resolver failure for the given parent module
    pub fn resolution(parent: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::DependencyResolution {
            parent: parent.into(),
            source: source.into(),
        }
    }

    /// Whether this error comes from a bad filter rule
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::BuiltInLayerTarget { .. } | Self::EmptyGlob | Self::InvalidGlob { .. }
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::BuiltInLayerTarget { .. } => {
                Some("Pick a layer name that does not exist in the build plan")
            }
            Self::EmptyGlob => Some("Every [[filter.filters]] entry needs a non-empty glob"),
            Self::NoParent => Some(
                "Set [parent] coordinates or disable filter.create_parent_dependency_layers",
            ),
            Self::ResolverUnavailable => Some("Set parent.dependencies to a dependency listing"),
            _ => None,
        }
    }
}
