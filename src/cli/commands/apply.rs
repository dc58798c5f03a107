//! Apply command - filter a build plan

use crate::cli::args::ApplyArgs;
use crate::config::Config;
use crate::error::{LayerFilterError, LayerFilterResult};
use crate::extension::{LayerFilterExtension, ProjectContext};
use crate::parent::{DependencyResolver, StaticResolver};
use crate::plan::BuildPlan;
use crate::ui::Console;
use tokio::fs;
use tracing::debug;

/// Execute the apply command
pub async fn execute(args: ApplyArgs, config: &Config) -> LayerFilterResult<()> {
    let plan = BuildPlan::from_file(&args.plan).await?;
    debug!(
        "Loaded build plan with {} layers, {} entries",
        plan.layers.len(),
        plan.entry_count()
    );

    let resolver = load_resolver(config).await?;
    let project = ProjectContext {
        parent: config.parent.module(),
        resolver: resolver.as_ref().map(|r| r as &dyn DependencyResolver),
    };

    let filtered =
        LayerFilterExtension::new().extend_build_plan(&plan, config.filter.as_ref(), &project)?;
    let json = filtered.to_json_pretty()?;

    match args.output {
        Some(path) => {
            fs::write(&path, format!("{}\n", json)).await.map_err(|e| {
                LayerFilterError::io(format!("writing build plan to {}", path.display()), e)
            })?;

            let console = Console::detect();
            console.done(
                &format!(
                    "Filtered {} layers into {}",
                    plan.layers.len(),
                    filtered.layers.len()
                ),
                &path.display().to_string(),
            );
            for layer in &filtered.layers {
                console.layer_count(&layer.name, layer.entries.len());
            }
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Load the dependency listing named in the config, if parent layers
/// are requested
async fn load_resolver(config: &Config) -> LayerFilterResult<Option<StaticResolver>> {
    let splitting = config
        .filter
        .as_ref()
        .is_some_and(|f| f.create_parent_dependency_layers);
    if !splitting {
        return Ok(None);
    }

    match config.parent.dependencies {
        Some(ref path) => {
            let resolver = StaticResolver::from_file(path).await?;
            debug!(
                "Loaded {} parent dependencies from {}",
                resolver.dependencies.len(),
                path.display()
            );
            Ok(Some(resolver))
        }
        None => Ok(None),
    }
}
