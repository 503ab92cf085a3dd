//! List command handler

use crate::commands::ListArgs;
use crate::error::CliResult;
use crate::handlers::config::load_suite_config;
use socialprobe::scenario::plan;
use socialprobe::suites::all_scenarios;
use socialprobe::{RunFilter, Scenario, SuiteConfig};

/// One line per planned run, as `[project] › describe › title  @tags`
pub fn list_lines(
    config: &SuiteConfig,
    scenarios: &[Scenario],
    filter: &RunFilter,
) -> CliResult<Vec<String>> {
    let planned = plan(config, scenarios, filter)?;
    Ok(planned
        .iter()
        .map(|run| {
            let meta = &run.scenario.meta;
            let mut line = format!("[{}] › {}", run.project.name, meta.full_title());
            if !meta.tags.is_empty() {
                line.push_str("  ");
                line.push_str(&meta.tags.join(" "));
            }
            if meta.requires_credentials {
                line.push_str("  (needs credentials)");
            }
            line
        })
        .collect())
}

/// Execute the list command
pub fn execute_list(args: &ListArgs) -> CliResult<()> {
    let config = load_suite_config(&args.source)?;
    let filter = RunFilter::new(args.project.clone(), args.grep.as_deref())?;
    let lines = list_lines(&config, &all_scenarios(), &filter)?;
    for line in &lines {
        println!("{line}");
    }
    println!("Total: {} scenario run(s)", lines.len());
    Ok(())
}
