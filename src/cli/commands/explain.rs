//! Explain command - show the routing decision for every file

use crate::cli::args::{ExplainArgs, OutputFormat};
use crate::config::Config;
use crate::error::LayerFilterResult;
use crate::filter::{compile_for_plan, explain, EntryDecision, RoutingDecision};
use crate::plan::BuildPlan;
use crate::ui::Console;
use console::style;

/// Execute the explain command
pub async fn execute(args: ExplainArgs, config: &Config) -> LayerFilterResult<()> {
    let plan = BuildPlan::from_file(&args.plan).await?;
    let rules = config
        .filter
        .as_ref()
        .map(|f| f.filters.as_slice())
        .unwrap_or_default();

    let rule_set = compile_for_plan(rules, &plan)?;
    let decisions = explain(&plan, &rule_set);

    match args.format {
        OutputFormat::Table => print_table(&decisions, rules.is_empty()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&decisions)?),
    }

    Ok(())
}

fn print_table(decisions: &[EntryDecision], unconfigured: bool) {
    let console = Console::detect();

    if unconfigured {
        console.warn("No filters configured", "Every file stays in place");
    }
    if decisions.is_empty() {
        console.info("Build plan has no files");
        return;
    }

    println!(
        "{:<20} {:<50} {}",
        style("LAYER").bold(),
        style("PATH").bold(),
        style("DECISION").bold()
    );
    println!("{}", "-".repeat(86));

    for d in decisions {
        let decision = match d.decision {
            RoutingDecision::Keep => style(d.decision.to_string()).dim(),
            RoutingDecision::MoveTo(_) => style(d.decision.to_string()).cyan(),
            RoutingDecision::Delete => style(d.decision.to_string()).red(),
        };
        println!("{:<20} {:<50} {}", d.layer, d.extraction_path, decision);
    }
}
