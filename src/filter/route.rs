//! Entry routing
//!
//! Every entry is tested against every rule in configuration order and the
//! last matching rule decides where it ends up. Kept entries stay in a
//! rebuilt copy of their original layer; moved entries are appended to the
//! target layers, which follow the original layers in the output.

use crate::filter::rules::{CompiledRule, CompiledRuleSet};
use crate::plan::{BuildPlan, Layer};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Where a single entry ends up
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "layer", rename_all = "snake_case")]
pub enum RoutingDecision {
    /// Stay in the original layer
    Keep,
    /// Move to the named layer
    MoveTo(String),
    /// Drop from the plan
    Delete,
}

impl fmt::Display for RoutingDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keep => write!(f, "keep"),
            Self::MoveTo(layer) => write!(f, "move to {}", layer),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Routing decision for one entry, as reported by [`explain`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryDecision {
    pub layer: String,
    pub extraction_path: String,
    pub decision: RoutingDecision,
}

/// Decide where an entry at `path` in `original_layer` belongs.
///
/// No short-circuit: a later match overrides an earlier one.
pub fn decide(path: &str, original_layer: &str, rules: &[CompiledRule]) -> RoutingDecision {
    let mut final_layer = Some(original_layer);

    for rule in rules {
        if rule.matcher.matches(path) {
            final_layer = if rule.target.is_empty() {
                None
            } else {
                Some(rule.target.as_str())
            };
        }
    }

    match final_layer {
        None => RoutingDecision::Delete,
        Some(name) if name == original_layer => RoutingDecision::Keep,
        Some(name) => RoutingDecision::MoveTo(name.to_string()),
    }
}

/// Apply compiled rules to a build plan, producing a new plan.
///
/// Layers that end up empty are dropped. Target layers are appended after
/// the original layers in the order their names were first configured.
pub fn route(plan: &BuildPlan, rule_set: CompiledRuleSet) -> BuildPlan {
    let CompiledRuleSet { rules, mut targets } = rule_set;
    let mut layers = Vec::with_capacity(plan.layers.len() + targets.names().len());

    for layer in &plan.layers {
        let mut kept = Layer::new(layer.name.clone());

        for entry in &layer.entries {
            let path = entry.extraction_path.as_str();
            match decide(path, &layer.name, &rules) {
                RoutingDecision::Keep => {
                    debug!("Keeping {} in '{}'", path, layer.name);
                    kept.push(entry.clone());
                }
                RoutingDecision::MoveTo(target) => {
                    debug!("Moving {} from '{}' to '{}'", path, layer.name, target);
                    let registered = targets.push(&target, entry.clone());
                    debug_assert!(registered, "target layer '{}' not registered", target);
                }
                RoutingDecision::Delete => debug!("Deleting {} from '{}'", path, layer.name),
            }
        }

        if !kept.is_empty() {
            layers.push(kept);
        }
    }

    layers.extend(targets.into_non_empty());
    plan.with_layers(layers)
}

/// Report the routing decision of every entry without building a plan
pub fn explain(plan: &BuildPlan, rule_set: &CompiledRuleSet) -> Vec<EntryDecision> {
    plan.layers
        .iter()
        .flat_map(|layer| {
            layer.entries.iter().map(move |entry| EntryDecision {
                layer: layer.name.clone(),
                extraction_path: entry.extraction_path.clone(),
                decision: decide(&entry.extraction_path, &layer.name, &rule_set.rules),
            })
        })
        .collect()
}
