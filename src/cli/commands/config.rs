//! Config command - show or initialize configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager, FilterConfig};
use crate::error::LayerFilterResult;
use crate::filter::FilterRule;
use crate::ui::Console;

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    config: &Config,
    manager: &ConfigManager,
) -> LayerFilterResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => show_path(manager),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
    }

    Ok(())
}

fn show_config(config: &Config) -> LayerFilterResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

fn show_path(manager: &ConfigManager) {
    println!("{}", manager.path().display());
}

async fn init_config(manager: &ConfigManager, force: bool) -> LayerFilterResult<()> {
    let console = Console::detect();
    let path = manager.path();

    if path.exists() && !force {
        console.warn(
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&starter_config()).await?;

    console.done("Configuration initialized", &path.display().to_string());

    Ok(())
}

/// A config with one example rule of each kind
fn starter_config() -> Config {
    Config {
        filter: Some(FilterConfig {
            filters: vec![
                FilterRule::new("/app/resources/**.md", "docs"),
                FilterRule::new("/app/resources/**.bak", ""),
            ],
            create_parent_dependency_layers: false,
        }),
        ..Default::default()
    }
}
