//! Filter rule compilation
//!
//! Turns the configured (glob, target layer) pairs into matchers and
//! pre-creates one empty layer per distinct target name. The compiled set
//! lives for a single run.

use crate::error::{LayerFilterError, LayerFilterResult};
use crate::filter::glob::GlobMatcher;
use crate::plan::{BuildPlan, FileEntry, Layer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// A configured filter: files matching `glob` go to `to_layer`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRule {
    /// Path glob, anchored to the full extraction path
    pub glob: String,

    /// Target layer name; empty deletes matching files
    #[serde(default)]
    pub to_layer: String,
}

impl FilterRule {
    pub fn new(glob: impl Into<String>, to_layer: impl Into<String>) -> Self {
        Self {
            glob: glob.into(),
            to_layer: to_layer.into(),
        }
    }

    /// Whether matching files are deleted rather than moved
    pub fn is_delete(&self) -> bool {
        self.to_layer.is_empty()
    }
}

/// A rule with its glob compiled
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub matcher: GlobMatcher,
    /// Empty target marks deletion
    pub target: String,
}

/// Compiled rules in configuration order, plus their target layers
#[derive(Debug, Clone, Default)]
pub struct CompiledRuleSet {
    pub rules: Vec<CompiledRule>,
    pub targets: TargetLayers,
}

/// Accumulating target layers, in the order their names were first seen
#[derive(Debug, Clone, Default)]
pub struct TargetLayers {
    layers: Vec<Layer>,
}

impl TargetLayers {
    /// Register a target name; repeated names share one layer
    fn register(&mut self, name: &str) {
        if !self.contains(name) {
            self.layers.push(Layer::new(name));
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.layers.iter().any(|l| l.name == name)
    }

    /// Names of all registered targets
    pub fn names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.name.as_str()).collect()
    }

    /// Append an entry to a registered target. Returns false when the
    /// target was never registered.
    pub fn push(&mut self, name: &str, entry: FileEntry) -> bool {
        match self.layers.iter_mut().find(|l| l.name == name) {
            Some(layer) => {
                layer.push(entry);
                true
            }
            None => false,
        }
    }

    /// Consume the registry, dropping targets that received no entries
    pub fn into_non_empty(self) -> impl Iterator<Item = Layer> {
        self.layers.into_iter().filter(|l| !l.is_empty())
    }
}

/// Compile filter rules against the names of the original layers.
///
/// Fails if a rule targets an existing layer or has an empty glob.
pub fn compile(
    rules: &[FilterRule],
    existing_layer_names: &HashSet<&str>,
) -> LayerFilterResult<CompiledRuleSet> {
    let mut compiled = CompiledRuleSet::default();

    for rule in rules {
        if !rule.is_delete() && existing_layer_names.contains(rule.to_layer.as_str()) {
            return Err(LayerFilterError::BuiltInLayerTarget {
                layer: rule.to_layer.clone(),
            });
        }

        let matcher = GlobMatcher::new(&rule.glob)?;
        debug!(
            "Compiled filter {} -> {}",
            rule.glob,
            if rule.is_delete() { "<delete>" } else { rule.to_layer.as_str() }
        );

        if !rule.is_delete() {
            compiled.targets.register(&rule.to_layer);
        }
        compiled.rules.push(CompiledRule {
            matcher,
            target: rule.to_layer.clone(),
        });
    }

    Ok(compiled)
}

/// Compile filter rules against the layers of `plan`
pub fn compile_for_plan(
    rules: &[FilterRule],
    plan: &BuildPlan,
) -> LayerFilterResult<CompiledRuleSet> {
    let existing: HashSet<&str> = plan.layer_names().into_iter().collect();
    compile(rules, &existing)
}
