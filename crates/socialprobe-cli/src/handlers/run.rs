//! Run command handler

use crate::commands::RunArgs;
use crate::error::{CliError, CliResult};
use crate::handlers::config::load_suite_config;
use crate::handlers::setup::{report_setup, with_output_override};
use crate::output::ProgressReporter;
use socialprobe::suites::all_scenarios;
use socialprobe::{
    global_setup, BrowserConfig, ChromiumPageFactory, Reporter, RunFilter, ScenarioRunner,
    SuiteConfig,
};
use std::sync::Arc;

/// Apply `--output` and `--headed` to a loaded configuration
#[must_use]
pub fn apply_overrides(config: SuiteConfig, args: &RunArgs) -> SuiteConfig {
    let config = with_output_override(config, args.output.as_deref());
    if args.headed {
        config.with_headless(false)
    } else {
        config
    }
}

/// Launch settings for the run
///
/// Taken from the selected project, or the first configured one, then
/// adjusted by `--no-sandbox` and `--chromium`.
pub fn browser_config(config: &SuiteConfig, args: &RunArgs) -> CliResult<BrowserConfig> {
    let name = args
        .project
        .clone()
        .or_else(|| config.projects.first().map(|p| p.name.clone()))
        .ok_or_else(|| CliError::config("no projects configured"))?;
    let project = config.resolve_project(&name)?;
    let mut browser = BrowserConfig::for_project(&project);
    if args.no_sandbox {
        browser = browser.with_no_sandbox();
    }
    if let Some(path) = &args.chromium {
        browser = browser.with_chromium_path(path.display().to_string());
    }
    Ok(browser)
}

/// Fail the command when any scenario failed
pub fn outcome(reporter: &Reporter) -> CliResult<()> {
    let failed = reporter.failed_count();
    if failed > 0 {
        return Err(CliError::TestsFailed {
            failed,
            total: reporter.total_count(),
        });
    }
    Ok(())
}

/// Execute the run command
pub async fn execute_run(mut output: ProgressReporter, args: &RunArgs) -> CliResult<()> {
    let config = apply_overrides(load_suite_config(&args.source)?, args);
    let filter = RunFilter::new(args.project.clone(), args.grep.as_deref())?;
    let browser = browser_config(&config, args)?;

    let setup = global_setup(&config)?;
    report_setup(&output, &setup);

    let scenarios = all_scenarios();
    let factory = Arc::new(ChromiumPageFactory::new(browser));
    let runner = ScenarioRunner::new(factory.clone(), config.clone()).with_credentials(setup.credentials);
    let total = runner.plan(&scenarios, &filter)?.len();
    tracing::info!(total, output = %config.output_dir.display(), "starting run");

    output.header("Running scenarios");
    output.start_progress(total as u64, "scenarios");
    let result = runner
        .run_all_with(&scenarios, &filter, |entry| output.scenario_finished(entry))
        .await;
    output.finish();
    drop(runner);
    if let Err(e) = factory.shutdown().await {
        tracing::warn!(error = %e, "browser did not shut down cleanly");
    }
    let reporter = result?;

    let written = reporter.write_reports(&config.reporters, &config.output_dir, &mut std::io::stdout().lock())?;
    for path in &written {
        output.info(&format!("Wrote {}", path.display()));
    }
    output.summary(&reporter);
    outcome(&reporter)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::commands::ConfigSource;
    use socialprobe::{ScenarioMeta, TestResultEntry, TestStatus, TRACK_A, TRACK_B};
    use std::path::PathBuf;

    fn args() -> RunArgs {
        RunArgs {
            source: ConfigSource::default(),
            project: None,
            grep: None,
            output: None,
            headed: false,
            no_sandbox: false,
            chromium: None,
        }
    }

    mod override_tests {
        use super::*;

        #[test]
        fn test_headed_and_output() {
            let args = RunArgs {
                headed: true,
                output: Some(PathBuf::from("out")),
                ..args()
            };
            let config = apply_overrides(SuiteConfig::for_environment(true), &args);
            assert!(!config.use_options.headless);
            assert_eq!(config.output_dir, PathBuf::from("out"));
            assert!(config.projects.iter().all(|p| p.use_options.headless.is_none()));
        }

        #[test]
        fn test_no_overrides_keeps_config() {
            let config = apply_overrides(SuiteConfig::for_environment(true), &args());
            assert!(config.use_options.headless);
        }
    }

    mod browser_config_tests {
        use super::*;

        #[test]
        fn test_uses_selected_project() {
            let args = RunArgs {
                project: Some(TRACK_B.to_string()),
                no_sandbox: true,
                chromium: Some(PathBuf::from("/usr/bin/chromium")),
                ..args()
            };
            let browser = browser_config(&SuiteConfig::for_environment(true), &args).unwrap();
            assert!(browser.headless);
            assert!(!browser.sandbox);
            assert_eq!(browser.chromium_path.as_deref(), Some("/usr/bin/chromium"));
        }

        #[test]
        fn test_defaults_to_first_project() {
            let config = SuiteConfig::for_environment(false);
            assert_eq!(config.projects[0].name, TRACK_A);
            let browser = browser_config(&config, &args()).unwrap();
            assert!(browser.sandbox);
            assert!(!browser.headless);
        }

        #[test]
        fn test_unknown_project() {
            let args = RunArgs {
                project: Some("missing".to_string()),
                ..args()
            };
            assert!(browser_config(&SuiteConfig::default(), &args).is_err());
        }

        #[test]
        fn test_no_projects() {
            let mut config = SuiteConfig::default();
            config.projects.clear();
            let err = browser_config(&config, &args()).unwrap_err();
            assert!(matches!(err, CliError::Config { .. }));
        }
    }

    mod outcome_tests {
        use super::*;

        #[test]
        fn test_failures_become_error() {
            let meta = ScenarioMeta::new("Suite", "t", "src/suites/mock_a.rs");
            let mut reporter = Reporter::new();
            reporter.record(TestResultEntry::new(&meta, TRACK_B, TestStatus::Passed));
            assert!(outcome(&reporter).is_ok());
            reporter.record(TestResultEntry::new(&meta, TRACK_B, TestStatus::Failed));
            let err = outcome(&reporter).unwrap_err();
            assert_eq!(err.to_string(), "1 of 2 scenario(s) failed");
        }

        #[test]
        fn test_flaky_does_not_fail() {
            let meta = ScenarioMeta::new("Suite", "t", "src/suites/mock_a.rs");
            let mut reporter = Reporter::new();
            reporter.record(TestResultEntry::new(&meta, TRACK_B, TestStatus::Flaky));
            assert!(outcome(&reporter).is_ok());
        }
    }
}
