//! Terminal output and progress reporting

use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use socialprobe::{Reporter, TestResultEntry, TestStatus};

/// Progress reporter for scenario execution
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar over `total` scenarios
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Print one finished scenario above the bar and advance it
    pub fn scenario_finished(&self, entry: &TestResultEntry) {
        let line = self.status_line(entry);
        match &self.progress_bar {
            Some(pb) => {
                pb.println(line);
                pb.inc(1);
            }
            None if entry.status.is_failed() || !self.quiet => {
                let _ = self.term.write_line(&line);
            }
            None => {}
        }
    }

    /// `✓ [project] title (1.23s)` plus retries and the first error line
    #[must_use]
    pub fn status_line(&self, entry: &TestResultEntry) -> String {
        let symbol = entry.status.symbol();
        let symbol = if self.use_color {
            match entry.status {
                TestStatus::Passed => style(symbol).green().bold().to_string(),
                TestStatus::Failed => style(symbol).red().bold().to_string(),
                TestStatus::Skipped | TestStatus::Flaky => style(symbol).yellow().bold().to_string(),
            }
        } else {
            symbol.to_string()
        };
        let mut line = format!(
            "{symbol} [{}] {} ({:.2}s)",
            entry.project,
            entry.title,
            entry.duration().as_secs_f64()
        );
        if entry.retries > 0 {
            line.push_str(&format!(" [retries: {}]", entry.retries));
        }
        if let (TestStatus::Failed, Some(error)) = (entry.status, &entry.error) {
            line.push_str(&format!("\n    {}", error.lines().next().unwrap_or_default()));
        }
        line
    }

    /// Finish progress bar
    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("⚠").yellow().bold().to_string()
        } else {
            "WARN".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };

        let _ = self.term.write_line("");
        let _ = self.term.write_line(&styled);
    }

    /// Print the run summary
    pub fn summary(&self, reporter: &Reporter) {
        let failed = reporter.failed_count();
        if self.quiet && failed == 0 {
            return;
        }

        let _ = self.term.write_line("");
        let line = summary_line(reporter);

        if self.use_color {
            let status = if failed > 0 {
                Style::new().red().bold().apply_to("FAILED")
            } else {
                Style::new().green().bold().apply_to("PASSED")
            };
            let _ = self.term.write_line(&format!("{status} {line}"));
        } else {
            let status = if failed > 0 { "FAILED" } else { "PASSED" };
            let _ = self.term.write_line(&format!("{status} {line}"));
        }
    }
}

/// `4 scenarios in 1.20s (3 passed, 1 failed, 0 flaky, 0 skipped)`
#[must_use]
pub fn summary_line(reporter: &Reporter) -> String {
    format!(
        "{} scenarios in {:.2}s ({} passed, {} failed, {} flaky, {} skipped)",
        reporter.total_count(),
        reporter.total_duration().as_secs_f64(),
        reporter.passed_count(),
        reporter.failed_count(),
        reporter.flaky_count(),
        reporter.skipped_count()
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use socialprobe::ScenarioMeta;

    fn entry(status: TestStatus) -> TestResultEntry {
        let meta = ScenarioMeta::new("Suite", "does a thing", "src/suites/mock_x.rs");
        TestResultEntry {
            duration_ms: 1_500,
            error: Some("Timed out after 50ms waiting for #x\nmore".to_string()),
            ..TestResultEntry::new(&meta, "track-b-mock", status)
        }
    }

    mod progress_reporter_tests {
        use super::*;

        #[test]
        fn test_new_reporter() {
            let reporter = ProgressReporter::new(true, false);
            assert!(reporter.use_color);
            assert!(!reporter.quiet);
        }

        #[test]
        fn test_status_line_passed() {
            let reporter = ProgressReporter::new(false, false);
            let line = reporter.status_line(&entry(TestStatus::Passed));
            assert!(line.contains("[track-b-mock] Suite › does a thing (1.50s)"));
            assert!(!line.contains("Timed out"));
        }

        #[test]
        fn test_status_line_failed_shows_first_error_line() {
            let reporter = ProgressReporter::new(false, false);
            let line = reporter.status_line(&TestResultEntry {
                retries: 2,
                ..entry(TestStatus::Failed)
            });
            assert!(line.contains("[retries: 2]"));
            assert!(line.contains("Timed out after 50ms waiting for #x"));
            assert!(!line.contains("more"));
        }

        #[test]
        fn test_progress_bar() {
            let mut reporter = ProgressReporter::new(false, false);
            reporter.start_progress(2, "Running scenarios");
            reporter.scenario_finished(&entry(TestStatus::Passed));
            reporter.scenario_finished(&entry(TestStatus::Failed));
            reporter.finish();
        }

        #[test]
        fn test_quiet_mode_suppresses_output() {
            let mut reporter = ProgressReporter::new(false, true);
            reporter.start_progress(10, "Running scenarios");
            reporter.success("hidden");
            reporter.warning("hidden");
            reporter.info("hidden");
            reporter.header("hidden");
            reporter.failure("shown");
            reporter.scenario_finished(&entry(TestStatus::Passed));
        }
    }

    mod summary_tests {
        use super::*;

        #[test]
        fn test_summary_line_counts() {
            let mut reporter = Reporter::new();
            reporter.record(entry(TestStatus::Passed));
            reporter.record(entry(TestStatus::Flaky));
            reporter.record(entry(TestStatus::Failed));
            let line = summary_line(&reporter);
            assert!(line.starts_with("3 scenarios in"));
            assert!(line.contains("1 passed, 1 failed, 1 flaky, 0 skipped"));
            ProgressReporter::new(false, false).summary(&reporter);
        }
    }
}
