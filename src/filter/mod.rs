//! Glob-based layer filtering
//!
//! Rules are compiled once per run ([`compile`]) and then applied to every
//! entry of the build plan ([`route`]). Nothing is retained between runs.

pub mod glob;
pub mod route;
pub mod rules;

pub use self::glob::GlobMatcher;
pub use route::{decide, explain, route, EntryDecision, RoutingDecision};
pub use rules::{
    compile, compile_for_plan, CompiledRule, CompiledRuleSet, FilterRule, TargetLayers,
};
