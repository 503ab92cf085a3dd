//! Setup command handler

use crate::commands::SetupArgs;
use crate::error::CliResult;
use crate::handlers::config::load_suite_config;
use crate::output::ProgressReporter;
use socialprobe::{global_setup, CredentialStatus, SetupReport, SuiteConfig};

/// Report setup results to the user
pub fn report_setup(output: &ProgressReporter, report: &SetupReport) {
    let dir = report.output_dir.display();
    if report.created_output_dir {
        output.success(&format!("Created output directory {dir}"));
    } else {
        output.info(&format!("Output directory {dir} already exists"));
    }
    match &report.credentials {
        CredentialStatus::Present => output.success("Live-site credentials found"),
        CredentialStatus::Missing { variables } => output.warning(&format!(
            "Missing {}; live-site scenarios that log in will be skipped",
            variables.join(", ")
        )),
    }
}

/// Apply `--output` to a loaded configuration
#[must_use]
pub fn with_output_override(config: SuiteConfig, output: Option<&std::path::Path>) -> SuiteConfig {
    match output {
        Some(dir) => config.with_output_dir(dir),
        None => config,
    }
}

/// Execute the setup command
pub fn execute_setup(output: &ProgressReporter, args: &SetupArgs) -> CliResult<SetupReport> {
    let config = with_output_override(load_suite_config(&args.source)?, args.output.as_deref());
    let report = global_setup(&config)?;
    report_setup(output, &report);
    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::commands::ConfigSource;

    #[test]
    fn test_output_override_moves_reporters() {
        let config = with_output_override(SuiteConfig::default(), Some(std::path::Path::new("out")));
        assert_eq!(config.output_dir, std::path::PathBuf::from("out"));
        let untouched = with_output_override(SuiteConfig::default(), None);
        assert_eq!(untouched.output_dir, std::path::PathBuf::from("test-results"));
    }

    #[test]
    fn test_execute_setup_creates_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("results");
        let args = SetupArgs {
            source: ConfigSource::default(),
            output: Some(dir.clone()),
        };
        let report = execute_setup(&ProgressReporter::new(false, true), &args).unwrap();
        assert!(report.created_output_dir);
        assert!(dir.is_dir());
    }

    #[test]
    fn test_report_missing_credentials() {
        let report = SetupReport {
            output_dir: "x".into(),
            created_output_dir: false,
            credentials: CredentialStatus::Missing {
                variables: vec!["INSTAGRAM_PASSWORD".to_string()],
            },
        };
        report_setup(&ProgressReporter::new(false, false), &report);
    }
}
