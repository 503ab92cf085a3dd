//! Result collection and report rendering.
//!
//! The [`Reporter`] collects one [`TestResultEntry`] per scenario and project
//! and renders them in the configured formats:
//!
//! | Format | Destination |
//! |--------|-------------|
//! | HTML   | `<output>/html-report/index.html` |
//! | JUnit  | configured file, `junit.xml` by default |
//! | JSON   | configured file, `results.json` by default |
//! | list   | one line per result on the given writer |
//! | GitHub | `::error` / `::warning` workflow commands on the given writer |

use crate::config::ReporterKind;
use crate::result::ProbeResult;
use crate::scenario::{Annotation, ScenarioMeta, StepRecord};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Test result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    /// Passed on the first attempt
    Passed,
    /// Failed on every attempt
    Failed,
    /// Not run
    Skipped,
    /// Failed at first, passed on a retry
    Flaky,
}

impl TestStatus {
    /// Check if test passed, counting flaky passes
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed | Self::Flaky)
    }

    /// Check if test failed
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// One-character status marker for terminal output
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Passed => "✓",
            Self::Failed => "✘",
            Self::Skipped => "-",
            Self::Flaky => "±",
        }
    }

    const fn css_class(self) -> &'static str {
        match self {
            Self::Passed => "pass",
            Self::Failed => "fail",
            Self::Skipped => "skip",
            Self::Flaky => "flaky",
        }
    }
}

/// A file produced while running a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Kind, e.g. `screenshot`
    pub name: String,
    /// Location on disk
    pub path: PathBuf,
    /// MIME type
    pub content_type: String,
}

impl Attachment {
    /// Create an attachment
    #[must_use]
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, content_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            content_type: content_type.into(),
        }
    }
}

/// Outcome of one scenario under one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResultEntry {
    /// `describe › title`
    pub title: String,
    /// Project name
    pub project: String,
    /// Source file
    pub source: String,
    /// Tags
    pub tags: Vec<String>,
    /// Annotations
    pub annotations: Vec<Annotation>,
    /// Status
    pub status: TestStatus,
    /// Wall time over all attempts
    pub duration_ms: u64,
    /// Retries used
    pub retries: u32,
    /// Last error, or the skip reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Steps of the last attempt
    pub steps: Vec<StepRecord>,
    /// Screenshots and traces of all attempts
    pub attachments: Vec<Attachment>,
}

impl TestResultEntry {
    /// An entry with no timing, steps or attachments yet
    #[must_use]
    pub fn new(meta: &ScenarioMeta, project: &str, status: TestStatus) -> Self {
        Self {
            title: meta.full_title(),
            project: project.to_string(),
            source: meta.source.clone(),
            tags: meta.tags.clone(),
            annotations: meta.annotations.clone(),
            status,
            duration_ms: 0,
            retries: 0,
            error: None,
            steps: Vec::new(),
            attachments: Vec::new(),
        }
    }

    /// A skipped entry with a reason
    #[must_use]
    pub fn skipped(meta: &ScenarioMeta, project: &str, reason: impl Into<String>) -> Self {
        Self {
            error: Some(reason.into()),
            ..Self::new(meta, project, TestStatus::Skipped)
        }
    }

    /// Wall time
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    suite: &'a str,
    stats: JsonStats,
    results: &'a [TestResultEntry],
}

#[derive(Debug, Serialize)]
struct JsonStats {
    total: usize,
    passed: usize,
    failed: usize,
    skipped: usize,
    flaky: usize,
    duration_ms: u64,
}

/// Collects results of a run
///
/// # Example
///
/// ```ignore
/// let mut reporter = Reporter::new().with_name("socialprobe");
/// reporter.start();
/// reporter.record(entry);
/// println!("{}", reporter.summary());
/// ```
#[derive(Debug, Default)]
pub struct Reporter {
    results: Vec<TestResultEntry>,
    suite_name: String,
    start_time: Option<SystemTime>,
}

impl Reporter {
    /// Create new reporter
    #[must_use]
    pub fn new() -> Self {
        Self {
            suite_name: "Test Suite".to_string(),
            ..Default::default()
        }
    }

    /// Set suite name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.suite_name = name.into();
        self
    }

    /// Suite name
    #[must_use]
    pub fn suite_name(&self) -> &str {
        &self.suite_name
    }

    /// Start the test suite
    pub fn start(&mut self) {
        self.start_time = Some(SystemTime::now());
    }

    /// Record a test result
    pub fn record(&mut self, result: TestResultEntry) {
        self.results.push(result);
    }

    fn count(&self, status: TestStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    /// Get number of passed tests, flaky ones included
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.status.is_passed()).count()
    }

    /// Get number of failed tests
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(TestStatus::Failed)
    }

    /// Get number of skipped tests
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(TestStatus::Skipped)
    }

    /// Get number of flaky tests
    #[must_use]
    pub fn flaky_count(&self) -> usize {
        self.count(TestStatus::Flaky)
    }

    /// Get total test count
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.results.len()
    }

    /// Get pass rate (0.0 to 1.0) over tests that ran
    #[must_use]
    pub fn pass_rate(&self) -> f64 {
        let ran = self.total_count() - self.skipped_count();
        if ran == 0 {
            return 1.0;
        }
        self.passed_count() as f64 / ran as f64
    }

    /// Check if no test failed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }

    /// Get total duration
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.results.iter().map(TestResultEntry::duration).sum()
    }

    /// Get test results
    #[must_use]
    pub fn results(&self) -> &[TestResultEntry] {
        &self.results
    }

    /// Get failing tests
    #[must_use]
    pub fn failures(&self) -> Vec<&TestResultEntry> {
        self.results
            .iter()
            .filter(|r| r.status.is_failed())
            .collect()
    }

    /// Generate summary string
    #[must_use]
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{}: {}/{} passed ({:.1}%)",
            self.suite_name,
            self.passed_count(),
            self.total_count(),
            self.pass_rate() * 100.0
        );
        if self.flaky_count() > 0 {
            let _ = write!(summary, ", {} flaky", self.flaky_count());
        }
        if self.skipped_count() > 0 {
            let _ = write!(summary, ", {} skipped", self.skipped_count());
        }
        summary
    }

    // =========================================================================
    // HTML
    // =========================================================================

    /// Write `index.html` under `<output_dir>/html-report/`
    pub fn generate_html(&self, output_dir: &Path) -> ProbeResult<PathBuf> {
        let dir = output_dir.join("html-report");
        fs::create_dir_all(&dir)?;
        let path = dir.join("index.html");
        fs::write(&path, self.render_html())?;
        Ok(path)
    }

    /// Render HTML report content
    #[must_use]
    pub fn render_html(&self) -> String {
        let mut html = String::new();

        html.push_str(r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>socialprobe report</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 20px; }
        .summary { background: #f5f5f5; padding: 20px; border-radius: 8px; margin-bottom: 20px; }
        .progress-bar { background: #ddd; height: 20px; border-radius: 10px; overflow: hidden; }
        .passed { background: #4caf50; height: 100%; }
        .test { padding: 10px; margin: 5px 0; border-radius: 4px; }
        .test.pass { background: #e8f5e9; border-left: 4px solid #4caf50; }
        .test.fail { background: #ffebee; border-left: 4px solid #f44336; }
        .test.skip { background: #fff3e0; border-left: 4px solid #ff9800; }
        .test.flaky { background: #fffde7; border-left: 4px solid #fbc02d; }
        .tag { font-size: 0.8em; background: #e0e0e0; border-radius: 3px; padding: 1px 4px; margin-right: 4px; }
        .error { color: #d32f2f; font-family: monospace; white-space: pre-wrap; }
        .steps { margin: 6px 0 0 16px; font-size: 0.9em; }
    </style>
</head>
<body>
"#);

        let _ = write!(
            html,
            r#"<div class="summary">
    <h1>{}</h1>
    <h2>Results: {}/{} passed ({:.1}%)</h2>
    <div class="progress-bar">
        <div class="passed" style="width: {:.1}%"></div>
    </div>
    <p>Failed: {} | Flaky: {} | Skipped: {} | Duration: {:.2}s</p>
</div>
"#,
            escape_xml(&self.suite_name),
            self.passed_count(),
            self.total_count(),
            self.pass_rate() * 100.0,
            self.pass_rate() * 100.0,
            self.failed_count(),
            self.flaky_count(),
            self.skipped_count(),
            self.total_duration().as_secs_f64()
        );

        html.push_str("<h2>Test Results</h2>\n");
        for result in &self.results {
            let _ = write!(
                html,
                r#"<div class="test {}">
    <strong>[{}] {}</strong> - {:?} ({:.2}ms)
"#,
                result.status.css_class(),
                escape_xml(&result.project),
                escape_xml(&result.title),
                result.status,
                result.duration().as_secs_f64() * 1000.0
            );

            if !result.tags.is_empty() {
                html.push_str("    <div>");
                for tag in &result.tags {
                    let _ = write!(html, r#"<span class="tag">{}</span>"#, escape_xml(tag));
                }
                html.push_str("</div>\n");
            }
            for annotation in &result.annotations {
                let _ = writeln!(
                    html,
                    "    <div><em>{}</em>: {}</div>",
                    annotation.kind,
                    escape_xml(&annotation.description)
                );
            }
            if !result.steps.is_empty() {
                html.push_str("    <ol class=\"steps\">\n");
                for step in &result.steps {
                    let mark = if step.error.is_some() { "✘" } else { "✓" };
                    let _ = writeln!(
                        html,
                        "        <li>{mark} {} ({}ms)</li>",
                        escape_xml(&step.title),
                        step.duration_ms
                    );
                }
                html.push_str("    </ol>\n");
            }
            if let Some(error) = &result.error {
                let _ = writeln!(html, r#"    <div class="error">{}</div>"#, escape_xml(error));
            }
            for attachment in &result.attachments {
                let _ = writeln!(
                    html,
                    r#"    <div><a href="{}">{}</a></div>"#,
                    escape_xml(&attachment.path.to_string_lossy()),
                    escape_xml(&attachment.name)
                );
            }

            html.push_str("</div>\n");
        }

        html.push_str(
            r#"
<footer>
    <p>Generated by socialprobe</p>
</footer>
</body>
</html>
"#,
        );

        html
    }

    // =========================================================================
    // JUNIT
    // =========================================================================

    /// Generate JUnit XML for CI integration
    pub fn generate_junit(&self, output_path: &Path) -> ProbeResult<()> {
        write_creating_parent(output_path, &self.render_junit())
    }

    /// Render JUnit XML content
    #[must_use]
    pub fn render_junit(&self) -> String {
        let mut xml = String::new();

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        let _ = writeln!(
            xml,
            r#"<testsuite name="{}" tests="{}" failures="{}" skipped="{}" time="{:.3}">"#,
            escape_xml(&self.suite_name),
            self.total_count(),
            self.failed_count(),
            self.skipped_count(),
            self.total_duration().as_secs_f64()
        );

        for result in &self.results {
            let _ = writeln!(
                xml,
                r#"  <testcase name="{}" classname="{}" time="{:.3}">"#,
                escape_xml(&result.title),
                escape_xml(&result.project),
                result.duration().as_secs_f64()
            );

            match (result.status, &result.error) {
                (TestStatus::Failed, Some(error)) => {
                    let _ = writeln!(
                        xml,
                        r#"    <failure message="{}">{}</failure>"#,
                        escape_xml(first_line(error)),
                        escape_xml(error)
                    );
                }
                (TestStatus::Skipped, reason) => {
                    let _ = writeln!(
                        xml,
                        r#"    <skipped message="{}"/>"#,
                        escape_xml(reason.as_deref().unwrap_or_default())
                    );
                }
                _ => {}
            }

            xml.push_str("  </testcase>\n");
        }

        xml.push_str("</testsuite>\n");
        xml
    }

    // =========================================================================
    // JSON
    // =========================================================================

    /// Write the JSON report
    pub fn generate_json(&self, output_path: &Path) -> ProbeResult<()> {
        write_creating_parent(output_path, &self.render_json()?)
    }

    /// Render the JSON report
    pub fn render_json(&self) -> ProbeResult<String> {
        let report = JsonReport {
            suite: &self.suite_name,
            stats: JsonStats {
                total: self.total_count(),
                passed: self.passed_count(),
                failed: self.failed_count(),
                skipped: self.skipped_count(),
                flaky: self.flaky_count(),
                duration_ms: self.total_duration().as_millis() as u64,
            },
            results: &self.results,
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }

    // =========================================================================
    // TERMINAL
    // =========================================================================

    /// One list line for a result
    #[must_use]
    pub fn render_list_line(index: usize, result: &TestResultEntry) -> String {
        let mut line = format!(
            "  {} {:>3} [{}] › {} ({}ms)",
            result.status.symbol(),
            index + 1,
            result.project,
            result.title,
            result.duration_ms
        );
        if result.retries > 0 {
            let _ = write!(line, " (retries: {})", result.retries);
        }
        line
    }

    /// All list lines plus the summary
    #[must_use]
    pub fn render_list(&self) -> String {
        let mut out = String::new();
        for (i, result) in self.results.iter().enumerate() {
            out.push_str(&Self::render_list_line(i, result));
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.summary());
        out.push('\n');
        out
    }

    /// GitHub Actions workflow commands for failures and flaky passes
    #[must_use]
    pub fn render_github(&self) -> String {
        let mut out = String::new();
        for result in &self.results {
            let title = format!("[{}] › {}", result.project, result.title);
            match result.status {
                TestStatus::Failed => {
                    let _ = writeln!(
                        out,
                        "::error file={},title={}::{}",
                        escape_workflow_property(&result.source),
                        escape_workflow_property(&title),
                        escape_workflow_data(result.error.as_deref().unwrap_or("failed"))
                    );
                }
                TestStatus::Flaky => {
                    let _ = writeln!(
                        out,
                        "::warning file={},title={}::{}",
                        escape_workflow_property(&result.source),
                        escape_workflow_property(&title),
                        escape_workflow_data(&format!("passed after {} retries", result.retries))
                    );
                }
                TestStatus::Passed | TestStatus::Skipped => {}
            }
        }
        let _ = writeln!(out, "::notice title=socialprobe::{}", escape_workflow_data(&self.summary()));
        out
    }

    /// Emit every configured format
    ///
    /// File formats are written to disk; list and GitHub output goes to
    /// `terminal`. Returns the files written.
    pub fn write_reports<W: Write>(
        &self,
        reporters: &[ReporterKind],
        output_dir: &Path,
        terminal: &mut W,
    ) -> ProbeResult<Vec<PathBuf>> {
        let mut written = Vec::new();
        for reporter in reporters {
            match reporter {
                ReporterKind::Html => written.push(self.generate_html(output_dir)?),
                ReporterKind::Junit { output_file } => {
                    self.generate_junit(output_file)?;
                    written.push(output_file.clone());
                }
                ReporterKind::Json { output_file } => {
                    self.generate_json(output_file)?;
                    written.push(output_file.clone());
                }
                ReporterKind::List => terminal.write_all(self.render_list().as_bytes())?,
                ReporterKind::Github => terminal.write_all(self.render_github().as_bytes())?,
            }
        }
        tracing::debug!(files = written.len(), "reports written");
        Ok(written)
    }
}

fn write_creating_parent(path: &Path, content: &str) -> ProbeResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or_default()
}

/// Escape XML special characters
///
/// Control characters other than tab, newline and carriage return are not
/// allowed in XML 1.0 even as character references, so they become U+FFFD.
fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if c < '\u{20}' => out.push('\u{FFFD}'),
            c => out.push(c),
        }
    }
    out
}

fn escape_workflow_data(s: &str) -> String {
    s.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

fn escape_workflow_property(s: &str) -> String {
    escape_workflow_data(s).replace(':', "%3A").replace(',', "%2C")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::scenario::AnnotationKind;

    fn meta(title: &str) -> ScenarioMeta {
        ScenarioMeta::new("Mock Social App - Track B", title, "src/suites/mock_social_app.rs")
            .with_tags(&["@mock", "@demo"])
            .with_annotation(AnnotationKind::Severity, "critical")
    }

    fn entry(title: &str, status: TestStatus, ms: u64) -> TestResultEntry {
        TestResultEntry {
            duration_ms: ms,
            ..TestResultEntry::new(&meta(title), "track-b-mock", status)
        }
    }

    fn failed(title: &str, error: &str) -> TestResultEntry {
        TestResultEntry {
            error: Some(error.to_string()),
            ..entry(title, TestStatus::Failed, 10)
        }
    }

    fn mixed() -> Reporter {
        let mut reporter = Reporter::new().with_name("socialprobe");
        reporter.record(entry("t1", TestStatus::Passed, 100));
        reporter.record(failed("t2", "Assertion failed: <h1> missing\nmore"));
        reporter.record(TestResultEntry {
            retries: 1,
            ..entry("t3", TestStatus::Flaky, 200)
        });
        reporter.record(TestResultEntry::skipped(&meta("t4"), "track-a-instagram", "no creds"));
        reporter
    }

    mod test_status_tests {
        use super::*;

        #[test]
        fn test_status_is_passed() {
            assert!(TestStatus::Passed.is_passed());
            assert!(TestStatus::Flaky.is_passed());
            assert!(!TestStatus::Failed.is_passed());
            assert!(!TestStatus::Skipped.is_passed());
        }

        #[test]
        fn test_status_is_failed() {
            assert!(!TestStatus::Passed.is_failed());
            assert!(TestStatus::Failed.is_failed());
            assert!(!TestStatus::Flaky.is_failed());
        }
    }

    mod reporter_tests {
        use super::*;

        #[test]
        fn test_new_reporter() {
            let reporter = Reporter::new();
            assert_eq!(reporter.total_count(), 0);
            assert!(reporter.all_passed());
            assert!((reporter.pass_rate() - 1.0).abs() < f64::EPSILON);
        }

        #[test]
        fn test_counts() {
            let reporter = mixed();
            assert_eq!(reporter.total_count(), 4);
            assert_eq!(reporter.passed_count(), 2);
            assert_eq!(reporter.failed_count(), 1);
            assert_eq!(reporter.flaky_count(), 1);
            assert_eq!(reporter.skipped_count(), 1);
            assert!(!reporter.all_passed());
            assert_eq!(reporter.total_duration(), Duration::from_millis(310));
            assert_eq!(reporter.failures()[0].title, "Mock Social App - Track B › t2");
        }

        #[test]
        fn test_summary() {
            let summary = mixed().summary();
            assert!(summary.contains("socialprobe"));
            assert!(summary.contains("2/4"));
            assert!(summary.contains("66.7%"));
            assert!(summary.contains("1 flaky"));
            assert!(summary.contains("1 skipped"));
        }
    }

    mod render_tests {
        use super::*;

        #[test]
        fn test_render_html() {
            let html = mixed().render_html();
            assert!(html.contains("Mock Social App - Track B › t1"));
            assert!(html.contains("&lt;h1&gt; missing"));
            assert!(html.contains(r#"class="test flaky""#));
            assert!(html.contains(r#"<span class="tag">@mock</span>"#));
            assert!(html.contains("<em>severity</em>: critical"));
        }

        #[test]
        fn test_render_junit() {
            let xml = mixed().render_junit();
            assert!(xml.contains(r#"tests="4" failures="1" skipped="1""#));
            assert!(xml.contains(r#"<failure message="Assertion failed: &lt;h1&gt; missing">"#));
            assert!(xml.contains(r#"<skipped message="no creds"/>"#));
            assert!(xml.contains(r#"classname="track-b-mock""#));
        }

        #[test]
        fn test_render_json() {
            let json: serde_json::Value = serde_json::from_str(&mixed().render_json().unwrap()).unwrap();
            assert_eq!(json["stats"]["total"], 4);
            assert_eq!(json["stats"]["flaky"], 1);
            assert_eq!(json["results"][1]["status"], "failed");
            assert_eq!(json["results"][0]["annotations"][0]["type"], "severity");
        }

        #[test]
        fn test_render_list() {
            let list = mixed().render_list();
            assert!(list.contains("  ✓   1 [track-b-mock] › Mock Social App - Track B › t1 (100ms)"));
            assert!(list.contains("(retries: 1)"));
            assert!(list.trim_end().ends_with("1 skipped"));
        }

        #[test]
        fn test_render_github() {
            let gh = mixed().render_github();
            let lines: Vec<&str> = gh.lines().collect();
            assert_eq!(lines.len(), 3);
            assert!(lines[0].starts_with("::error file=src/suites/mock_social_app.rs,title=[track-b-mock] › "));
            assert!(lines[0].ends_with("::Assertion failed: <h1> missing%0Amore"));
            assert!(lines[1].starts_with("::warning "));
            assert!(lines[2].starts_with("::notice title=socialprobe::"));
        }

        #[test]
        fn test_write_reports() {
            let tmp = tempfile::tempdir().unwrap();
            let kinds = vec![
                ReporterKind::Html,
                ReporterKind::Junit {
                    output_file: tmp.path().join("nested/junit.xml"),
                },
                ReporterKind::Json {
                    output_file: tmp.path().join("results.json"),
                },
                ReporterKind::List,
            ];
            let mut terminal = Vec::new();
            let written = mixed().write_reports(&kinds, tmp.path(), &mut terminal).unwrap();
            assert_eq!(written.len(), 3);
            assert!(tmp.path().join("html-report/index.html").is_file());
            assert!(tmp.path().join("nested/junit.xml").is_file());
            assert!(String::from_utf8(terminal).unwrap().contains("[track-b-mock]"));
        }
    }

    mod escape_tests {
        use super::*;

        #[test]
        fn test_escape_special_chars() {
            assert_eq!(escape_xml("a & b"), "a &amp; b");
            assert_eq!(escape_xml("<tag>"), "&lt;tag&gt;");
            assert_eq!(escape_xml("\"quoted\""), "&quot;quoted&quot;");
            assert_eq!(escape_xml("it's"), "it&apos;s");
        }

        #[test]
        fn test_escape_replaces_control_chars() {
            assert_eq!(escape_xml("\x1b[31mred\x1b[0m"), "\u{FFFD}[31mred\u{FFFD}[0m");
            assert_eq!(escape_xml("a\u{0}b\u{8}c"), "a\u{FFFD}b\u{FFFD}c");
            assert_eq!(escape_xml("line\n\tnext\r"), "line\n\tnext\r");
        }

        #[test]
        fn test_junit_drops_ansi_escapes() {
            let mut reporter = Reporter::new();
            reporter.record(failed("colored", "\x1b[31mExpected visible\x1b[0m"));
            let xml = reporter.render_junit();
            assert!(!xml.chars().any(|c| c < '\u{20}' && !matches!(c, '\t' | '\n' | '\r')));
            assert!(xml.contains("[31mExpected visible"));
        }

        #[test]
        fn test_workflow_escapes() {
            assert_eq!(escape_workflow_data("50%\nx"), "50%25%0Ax");
            assert_eq!(escape_workflow_property("a:b,c"), "a%3Ab%2Cc");
        }
    }
}
