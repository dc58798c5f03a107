//! Parent dependency layers
//!
//! Splits each layer of an already filtered plan into a `<name>-parent`
//! layer holding the dependencies inherited from the project's parent
//! module, followed by the layer itself with everything else.
//!
//! Parent dependencies are located by their conventional extraction path
//! `/app/libs/<artifactId>-<baseVersion>.jar`. Anything not at exactly that
//! path (classifiers, other packaging) stays in the plain layer.

pub mod resolver;

pub use resolver::StaticResolver;

use crate::error::{BoxError, LayerFilterError, LayerFilterResult};
use crate::plan::{BuildPlan, Layer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, info};

/// Directory the host packages runtime dependencies into
pub const LIBS_PREFIX: &str = "/app/libs";

/// Suffix appended to the name of a split-off parent layer
pub const PARENT_LAYER_SUFFIX: &str = "-parent";

/// Scopes never included when resolving parent dependencies
pub const EXCLUDED_SCOPES: &[&str] = &["test"];

/// A resolved dependency artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

/// A dependency of the parent module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    #[serde(flatten)]
    pub artifact: Artifact,

    #[serde(default = "default_scope")]
    pub scope: String,
}

fn default_scope() -> String {
    "compile".to_string()
}

/// Coordinates of the project's parent module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentModule {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

/// What the host is asked to resolve
#[derive(Debug, Clone)]
pub struct ResolutionRequest<'a> {
    pub parent: &'a ParentModule,
    pub excluded_scopes: Vec<String>,
}

/// Host-supplied dependency resolution.
///
/// Implementations may block; the filter calls them once per run.
pub trait DependencyResolver {
    /// Resolve the transitive dependencies of the requested parent module
    fn resolve(&self, request: &ResolutionRequest<'_>) -> Result<Vec<Dependency>, BoxError>;
}

impl Artifact {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
        }
    }

    /// Version with snapshot timestamps folded back to `-SNAPSHOT`.
    ///
    /// `1.0-20200101.123456-7` becomes `1.0-SNAPSHOT`; other versions are
    /// returned as is.
    pub fn base_version(&self) -> String {
        snapshot_base(&self.version).unwrap_or_else(|| self.version.clone())
    }

    /// Where the host places this artifact inside the image
    pub fn expected_path(&self) -> String {
        format!(
            "{}/{}-{}.jar",
            LIBS_PREFIX,
            self.artifact_id,
            self.base_version()
        )
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

impl fmt::Display for ParentModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

impl<'a> ResolutionRequest<'a> {
    /// Request for `parent` with test-scoped dependencies excluded
    pub fn new(parent: &'a ParentModule) -> Self {
        Self {
            parent,
            excluded_scopes: EXCLUDED_SCOPES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn excludes(&self, scope: &str) -> bool {
        self.excluded_scopes.iter().any(|s| s == scope)
    }
}

/// Strip the `yyyyMMdd.HHmmss-N` suffix of a timestamped snapshot
fn snapshot_base(version: &str) -> Option<String> {
    let (rest, build) = version.rsplit_once('-')?;
    if build.is_empty() || !build.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let split = rest.len().checked_sub(15)?;
    let stamp = rest.get(split..)?.as_bytes();
    let prefix = &rest[..split];

    let is_stamp = stamp[..8].iter().all(u8::is_ascii_digit)
        && stamp[8] == b'.'
        && stamp[9..].iter().all(u8::is_ascii_digit);
    if !is_stamp || !(prefix.is_empty() || prefix.ends_with('-')) {
        return None;
    }

    Some(format!("{}SNAPSHOT", prefix))
}

/// Parent dependencies keyed by their expected extraction path
#[derive(Debug, Clone, Default)]
pub struct ParentDependencyIndex {
    by_path: BTreeMap<String, Artifact>,
}

impl ParentDependencyIndex {
    /// Index artifacts by expected path. Two artifacts expecting the same
    /// path are an error.
    pub fn from_artifacts(
        artifacts: impl IntoIterator<Item = Artifact>,
    ) -> LayerFilterResult<Self> {
        let mut by_path: BTreeMap<String, Artifact> = BTreeMap::new();

        for artifact in artifacts {
            let path = artifact.expected_path();
            if let Some(existing) = by_path.get(&path) {
                return Err(LayerFilterError::ParentDependencyConflict {
                    path,
                    first: existing.to_string(),
                    second: artifact.to_string(),
                });
            }
            by_path.insert(path, artifact);
        }

        Ok(Self { by_path })
    }

    pub fn contains(&self, path: &str) -> bool {
        self.by_path.contains_key(path)
    }

    pub fn get(&self, path: &str) -> Option<&Artifact> {
        self.by_path.get(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.by_path.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }
}

/// Split every layer into `<name>-parent` and `<name>`.
///
/// Returns the new plan and the expected paths that were never found, in
/// sorted order. Missing parent dependencies are not an error.
pub fn split_parent_deps(
    plan: &BuildPlan,
    index: &ParentDependencyIndex,
) -> (BuildPlan, Vec<String>) {
    let mut not_found: BTreeSet<&str> = index.paths().collect();
    let mut layers = Vec::with_capacity(plan.layers.len() * 2);

    for original in &plan.layers {
        let parent_name = format!("{}{}", original.name, PARENT_LAYER_SUFFIX);
        let mut parent_layer = Layer::new(parent_name);
        let mut plain_layer = Layer::new(original.name.clone());

        for entry in &original.entries {
            let path = entry.extraction_path.as_str();
            if index.contains(path) {
                debug!("Moving {} to {}.", path, parent_layer.name);
                not_found.remove(path);
                parent_layer.push(entry.clone());
            } else {
                debug!("Keep {} in {}.", path, original.name);
                plain_layer.push(entry.clone());
            }
        }

        layers.extend([parent_layer, plain_layer].into_iter().filter(|l| !l.is_empty()));
    }

    let missing: Vec<String> = not_found.into_iter().map(str::to_string).collect();
    for path in &missing {
        info!("Dependency from parent not found: {}", path);
    }

    (plan.with_layers(layers), missing)
}

/// Resolve the parent module's dependencies through the host resolver
pub fn parent_dependencies(
    parent: Option<&ParentModule>,
    resolver: Option<&dyn DependencyResolver>,
) -> LayerFilterResult<Vec<Dependency>> {
    let parent = parent.ok_or(LayerFilterError::NoParent)?;
    let resolver = resolver.ok_or(LayerFilterError::ResolverUnavailable)?;

    let request = ResolutionRequest::new(parent);
    let dependencies = resolver
        .resolve(&request)
        .map_err(|e| LayerFilterError::resolution(parent.to_string(), e))?;

    debug!(
        "Resolved {} dependencies of parent {}",
        dependencies.len(),
        parent
    );
    Ok(dependencies)
}

/// Resolve parent dependencies and move them into `-parent` layers
pub fn move_parent_deps(
    plan: &BuildPlan,
    parent: Option<&ParentModule>,
    resolver: Option<&dyn DependencyResolver>,
) -> LayerFilterResult<BuildPlan> {
    info!("Moving parent dependencies to new layers.");

    let dependencies = parent_dependencies(parent, resolver)?;
    let index =
        ParentDependencyIndex::from_artifacts(dependencies.into_iter().map(|d| d.artifact))?;

    let (split, _missing) = split_parent_deps(plan, &index);
    Ok(split)
}
