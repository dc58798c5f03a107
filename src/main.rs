//! layer-filter - Container build plan layer filter
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use layer_filter::cli::{Cli, Commands};
use layer_filter::config::{Config, ConfigManager};
use layer_filter::error::{LayerFilterError, LayerFilterResult};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> LayerFilterResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };

    // Find local config unless --no-local is set
    let local_config_path = if cli.no_local {
        None
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| LayerFilterError::io("getting current directory", e))?;
        ConfigManager::find_local_config(&cwd)
    };

    let config = config_manager
        .load_merged(local_config_path.as_deref())
        .await?;

    init_logging(cli.verbose, &config);
    if let Some(ref path) = local_config_path {
        debug!("Using local config: {}", path.display());
    }

    match cli.command {
        Commands::Apply(args) => layer_filter::cli::commands::apply(args, &config).await,
        Commands::Explain(args) => layer_filter::cli::commands::explain(args, &config).await,
        Commands::Config(args) => {
            layer_filter::cli::commands::config(args, &config, &config_manager).await
        }
    }
}

/// Logging goes to stderr so stdout stays clean for plan output.
/// 0 = warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 => EnvFilter::new("layer_filter=warn"),
        1 => EnvFilter::new("layer_filter=info"),
        _ => EnvFilter::new("layer_filter=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
