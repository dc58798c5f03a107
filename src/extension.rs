//! Layer filter extension entry point
//!
//! One call transforms one build plan: compile the rules, route every
//! entry, then optionally split out parent dependencies. All intermediate
//! state is local to the call, so the same extension value can serve any
//! number of builds.

use crate::config::FilterConfig;
use crate::error::LayerFilterResult;
use crate::filter::{compile_for_plan, route};
use crate::parent::{move_parent_deps, DependencyResolver, ParentModule};
use crate::plan::BuildPlan;
use tracing::{info, warn};

/// What the host knows about the project being built
#[derive(Default)]
pub struct ProjectContext<'a> {
    /// Parent module, if the project has one
    pub parent: Option<ParentModule>,

    /// Host dependency resolver, if available
    pub resolver: Option<&'a dyn DependencyResolver>,
}

/// The layer filter extension
#[derive(Debug, Clone, Copy, Default)]
pub struct LayerFilterExtension;

impl LayerFilterExtension {
    pub fn new() -> Self {
        Self
    }

    /// Transform `plan` according to `config`.
    ///
    /// Without configuration the plan is returned unchanged. On error no
    /// partial result is produced and `plan` is left as it was.
    pub fn extend_build_plan(
        &self,
        plan: &BuildPlan,
        config: Option<&FilterConfig>,
        project: &ProjectContext<'_>,
    ) -> LayerFilterResult<BuildPlan> {
        info!("Running layer filter extension");

        let Some(config) = config else {
            warn!("Nothing configured for layer filter extension");
            return Ok(plan.clone());
        };

        let rule_set = compile_for_plan(&config.filters, plan)?;
        let filtered = route(plan, rule_set);

        if config.create_parent_dependency_layers {
            move_parent_deps(&filtered, project.parent.as_ref(), project.resolver)
        } else {
            Ok(filtered)
        }
    }
}
