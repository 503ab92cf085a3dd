//! Scenarios and the runner that drives them.
//!
//! A scenario is descriptive metadata plus an async function over a
//! [`ScenarioContext`]. The runner gives every attempt a fresh page from a
//! [`PageFactory`], installs the mock app routes for mock projects, bounds
//! the attempt by the scenario timeout and retries failed attempts up to the
//! project's retry count. Scenarios run one after another.

use crate::config::{ResolvedProject, SuiteConfig};
use crate::mock_app::{social_app_routes, DEFAULT_MOCK_ORIGIN};
use crate::network::{InterceptedRequest, MockRoutes};
use crate::page::Page;
use crate::reporter::{Attachment, Reporter, TestResultEntry, TestStatus};
use crate::result::{ProbeError, ProbeResult};
use crate::setup::CredentialStatus;
use async_trait::async_trait;
use futures::future::BoxFuture;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::Instrument;

// =============================================================================
// METADATA
// =============================================================================

/// Kind of a scenario annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    /// Feature under test
    Feature,
    /// Severity of a failure
    Severity,
    /// User story
    Story,
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Feature => "feature",
            Self::Severity => "severity",
            Self::Story => "story",
        })
    }
}

/// Descriptive annotation for reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Kind
    #[serde(rename = "type")]
    pub kind: AnnotationKind,
    /// Free text
    pub description: String,
}

/// Everything a report knows about a scenario besides its outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioMeta {
    /// Enclosing group
    pub describe: String,
    /// Scenario title
    pub title: String,
    /// Source file, matched against project `test_match` globs
    pub source: String,
    /// Tags, with their leading `@`
    pub tags: Vec<String>,
    /// Annotations
    pub annotations: Vec<Annotation>,
    /// Focused; when any scenario is focused only focused ones run
    #[serde(default)]
    pub only: bool,
    /// Skipped when live-site credentials are missing
    #[serde(default)]
    pub requires_credentials: bool,
}

impl ScenarioMeta {
    /// Create metadata for a scenario in `describe`
    #[must_use]
    pub fn new(describe: impl Into<String>, title: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            describe: describe.into(),
            title: title.into(),
            source: source.into(),
            tags: Vec::new(),
            annotations: Vec::new(),
            only: false,
            requires_credentials: false,
        }
    }

    /// Add tags
    #[must_use]
    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags.extend(tags.iter().map(|t| (*t).to_string()));
        self
    }

    /// Add an annotation
    #[must_use]
    pub fn with_annotation(mut self, kind: AnnotationKind, description: impl Into<String>) -> Self {
        self.annotations.push(Annotation {
            kind,
            description: description.into(),
        });
        self
    }

    /// Mark as focused
    #[must_use]
    pub const fn only(mut self) -> Self {
        self.only = true;
        self
    }

    /// Skip unless live-site credentials are set
    #[must_use]
    pub const fn requires_credentials(mut self) -> Self {
        self.requires_credentials = true;
        self
    }

    /// `describe › title`
    #[must_use]
    pub fn full_title(&self) -> String {
        format!("{} › {}", self.describe, self.title)
    }

    /// First annotation of a kind
    #[must_use]
    pub fn annotation(&self, kind: AnnotationKind) -> Option<&str> {
        self.annotations
            .iter()
            .find(|a| a.kind == kind)
            .map(|a| a.description.as_str())
    }

    /// Whether the scenario carries `tag`
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Whether `grep` matches the title or a tag
    #[must_use]
    pub fn matches(&self, grep: &Regex) -> bool {
        grep.is_match(&format!("{} {}", self.full_title(), self.tags.join(" ")))
    }
}

// =============================================================================
// STEPS
// =============================================================================

/// Outcome of one named step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Step title
    pub title: String,
    /// Wall time
    pub duration_ms: u64,
    /// Error, if the step failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Collects step records during one attempt
#[derive(Debug, Default)]
pub struct StepLog {
    steps: Mutex<Vec<StepRecord>>,
}

impl StepLog {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `body` as a named step
    pub async fn step<T, F>(&self, title: &str, body: F) -> ProbeResult<T>
    where
        F: Future<Output = ProbeResult<T>>,
    {
        let start = Instant::now();
        let result = body.instrument(tracing::info_span!("step", title)).await;
        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => tracing::info!(title, duration_ms, "step passed"),
            Err(err) => tracing::info!(title, duration_ms, %err, "step failed"),
        }
        let record = StepRecord {
            title: title.to_string(),
            duration_ms,
            error: result.as_ref().err().map(ToString::to_string),
        };
        self.steps
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(record);
        result
    }

    /// Records so far
    #[must_use]
    pub fn records(&self) -> Vec<StepRecord> {
        self.steps
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

// =============================================================================
// SCENARIOS
// =============================================================================

/// What a scenario attempt can reach
#[derive(Debug)]
pub struct ScenarioContext {
    /// Fresh page for this attempt
    pub page: Page,
    /// Step log
    pub steps: StepLog,
    /// Project the attempt runs under
    pub project: ResolvedProject,
    /// Mock routes installed on the page, for mock projects
    pub routes: Option<MockRoutes>,
    /// Zero-based attempt number
    pub attempt: u32,
}

impl ScenarioContext {
    /// Origin of the mock app
    #[must_use]
    pub fn mock_origin(&self) -> &str {
        self.project.mock_origin.as_deref().unwrap_or(DEFAULT_MOCK_ORIGIN)
    }

    /// Run a named step
    pub async fn step<T, F>(&self, title: &str, body: F) -> ProbeResult<T>
    where
        F: Future<Output = ProbeResult<T>>,
    {
        self.steps.step(title, body).await
    }
}

/// Body of a scenario
pub type ScenarioFn = for<'a> fn(&'a ScenarioContext) -> BoxFuture<'a, ProbeResult<()>>;

/// A runnable scenario
#[derive(Clone)]
pub struct Scenario {
    /// Metadata
    pub meta: ScenarioMeta,
    /// Body
    pub run: ScenarioFn,
}

impl Scenario {
    /// Pair metadata with a body
    #[must_use]
    pub fn new(meta: ScenarioMeta, run: ScenarioFn) -> Self {
        Self { meta, run }
    }
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario").field("meta", &self.meta).finish_non_exhaustive()
    }
}

/// Creates an isolated page for every attempt
#[async_trait]
pub trait PageFactory: Send + Sync {
    /// Open a page configured for `project`
    async fn new_page(&self, project: &ResolvedProject) -> ProbeResult<Page>;
}

#[async_trait]
impl<F> PageFactory for F
where
    F: Fn(&ResolvedProject) -> ProbeResult<Page> + Send + Sync,
{
    async fn new_page(&self, project: &ResolvedProject) -> ProbeResult<Page> {
        self(project)
    }
}

// =============================================================================
// RUNNER
// =============================================================================

/// Which scenarios and projects to run
#[derive(Debug, Clone, Default)]
pub struct RunFilter {
    /// Only this project
    pub project: Option<String>,
    /// Only scenarios whose title or tags match
    pub grep: Option<Regex>,
}

impl RunFilter {
    /// Build a filter, compiling `grep`
    pub fn new(project: Option<String>, grep: Option<&str>) -> ProbeResult<Self> {
        let grep = grep
            .map(Regex::new)
            .transpose()
            .map_err(|e| ProbeError::ConfigError {
                message: format!("invalid --grep pattern: {e}"),
            })?;
        Ok(Self { project, grep })
    }
}

/// A scenario scheduled under a project
#[derive(Debug, Clone)]
pub struct PlannedRun<'s> {
    /// Project
    pub project: ResolvedProject,
    /// Scenario
    pub scenario: &'s Scenario,
}

/// Step trace written next to a failed attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptTrace {
    /// Full title
    pub title: String,
    /// Project name
    pub project: String,
    /// Zero-based attempt
    pub attempt: u32,
    /// Error, if the attempt failed
    pub error: Option<String>,
    /// Steps
    pub steps: Vec<StepRecord>,
    /// Requests seen by the mock routes
    pub requests: Vec<InterceptedRequest>,
}

/// Runs scenarios against pages from a factory
pub struct ScenarioRunner {
    factory: Arc<dyn PageFactory>,
    config: SuiteConfig,
    credentials: CredentialStatus,
}

impl fmt::Debug for ScenarioRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioRunner")
            .field("config", &self.config)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl ScenarioRunner {
    /// Create a runner
    #[must_use]
    pub fn new(factory: Arc<dyn PageFactory>, config: SuiteConfig) -> Self {
        Self {
            factory,
            config,
            credentials: CredentialStatus::Present,
        }
    }

    /// Record the credential status found by global setup
    #[must_use]
    pub fn with_credentials(mut self, credentials: CredentialStatus) -> Self {
        self.credentials = credentials;
        self
    }

    /// Configuration
    #[must_use]
    pub const fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Pair scenarios with the projects that run them
    ///
    /// Fails when a focused scenario is present and the configuration
    /// forbids focusing.
    pub fn plan<'s>(&self, scenarios: &'s [Scenario], filter: &RunFilter) -> ProbeResult<Vec<PlannedRun<'s>>> {
        plan(&self.config, scenarios, filter)
    }

    /// Run every planned scenario serially
    pub async fn run_all(&self, scenarios: &[Scenario], filter: &RunFilter) -> ProbeResult<Reporter> {
        self.run_all_with(scenarios, filter, |_| {}).await
    }

    /// [`Self::run_all`], calling `on_result` after each scenario
    pub async fn run_all_with<C>(
        &self,
        scenarios: &[Scenario],
        filter: &RunFilter,
        mut on_result: C,
    ) -> ProbeResult<Reporter>
    where
        C: FnMut(&TestResultEntry),
    {
        let planned = self.plan(scenarios, filter)?;
        let mut reporter = Reporter::new().with_name("socialprobe");
        reporter.start();
        for run in &planned {
            let entry = self.run_scenario(run.scenario, &run.project).await;
            on_result(&entry);
            reporter.record(entry);
        }
        Ok(reporter)
    }

    /// Run one scenario under one project, with retries
    pub async fn run_scenario(&self, scenario: &Scenario, project: &ResolvedProject) -> TestResultEntry {
        let meta = &scenario.meta;
        let span = tracing::info_span!("scenario", title = %meta.title, project = %project.name);
        async {
            if meta.requires_credentials && !self.credentials.is_present() {
                tracing::warn!("skipping: live-site credentials are missing");
                return TestResultEntry::skipped(meta, &project.name, "live-site credentials are missing");
            }

            let started = Instant::now();
            let mut steps = Vec::new();
            let mut attachments = Vec::new();
            let mut last_error = None;
            let mut attempts = 0;
            for attempt in 0..=project.retries {
                attempts = attempt;
                if attempt > 0 {
                    tracing::info!(attempt, "retrying");
                }
                let outcome = self.run_attempt(scenario, project, attempt).await;
                steps = outcome.steps;
                attachments.extend(outcome.attachments);
                match outcome.error {
                    None => {
                        last_error = None;
                        break;
                    }
                    Some(err) => {
                        tracing::warn!(attempt, error = %err, "attempt failed");
                        last_error = Some(err);
                    }
                }
            }

            let status = match (&last_error, attempts) {
                (Some(_), _) => TestStatus::Failed,
                (None, 0) => TestStatus::Passed,
                (None, _) => TestStatus::Flaky,
            };
            tracing::info!(?status, "scenario finished");
            TestResultEntry {
                retries: attempts,
                duration_ms: started.elapsed().as_millis() as u64,
                error: last_error,
                steps,
                attachments,
                ..TestResultEntry::new(meta, &project.name, status)
            }
        }
        .instrument(span)
        .await
    }

    async fn run_attempt(&self, scenario: &Scenario, project: &ResolvedProject, attempt: u32) -> AttemptOutcome {
        let page = match self.factory.new_page(project).await {
            Ok(page) => page,
            Err(err) => {
                return AttemptOutcome {
                    error: Some(err.to_string()),
                    steps: Vec::new(),
                    attachments: Vec::new(),
                }
            }
        };

        let routes = if project.is_mock() {
            let routes = social_app_routes(project.mock_origin.as_deref().unwrap_or(DEFAULT_MOCK_ORIGIN));
            if let Err(err) = page.route(routes.clone()).await {
                if let Err(close_err) = page.close().await {
                    tracing::debug!(err = %close_err, "page close failed");
                }
                return AttemptOutcome {
                    error: Some(err.to_string()),
                    steps: Vec::new(),
                    attachments: Vec::new(),
                };
            }
            Some(routes)
        } else {
            None
        };

        let ctx = ScenarioContext {
            page,
            steps: StepLog::new(),
            project: project.clone(),
            routes,
            attempt,
        };
        let timeout = Duration::from_millis(project.timeout_ms);
        let result = match tokio::time::timeout(timeout, (scenario.run)(&ctx)).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout {
                ms: project.timeout_ms,
                what: format!("scenario '{}'", scenario.meta.title),
            }),
        };
        let error = result.err().map(|e| e.to_string());
        let failed = error.is_some();
        let steps = ctx.steps.records();

        let mut attachments = Vec::new();
        let dir = artifact_dir(&self.config.output_dir, &scenario.meta, &project.name, attempt);
        if project.screenshot.capture(failed) {
            match self.capture_screenshot(&ctx.page, &dir).await {
                Ok(path) => attachments.push(Attachment::new("screenshot", path, "image/png")),
                Err(err) => tracing::warn!(%err, "could not capture screenshot"),
            }
        }
        if project.trace.keep(failed, attempt) {
            let trace = AttemptTrace {
                title: scenario.meta.full_title(),
                project: project.name.clone(),
                attempt,
                error: error.clone(),
                steps: steps.clone(),
                requests: ctx.routes.as_ref().map(MockRoutes::captured_requests).unwrap_or_default(),
            };
            match write_trace(&dir, &trace) {
                Ok(path) => attachments.push(Attachment::new("trace", path, "application/json")),
                Err(err) => tracing::warn!(%err, "could not write trace"),
            }
        }
        if let Err(err) = ctx.page.close().await {
            tracing::debug!(%err, "page close failed");
        }

        AttemptOutcome {
            error,
            steps,
            attachments,
        }
    }

    async fn capture_screenshot(&self, page: &Page, dir: &Path) -> ProbeResult<PathBuf> {
        let png = page.screenshot().await?;
        std::fs::create_dir_all(dir)?;
        let path = dir.join("screenshot.png");
        std::fs::write(&path, png)?;
        Ok(path)
    }
}

struct AttemptOutcome {
    error: Option<String>,
    steps: Vec<StepRecord>,
    attachments: Vec<Attachment>,
}

fn write_trace(dir: &Path, trace: &AttemptTrace) -> ProbeResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join("trace.json");
    std::fs::write(&path, serde_json::to_string_pretty(trace)?)?;
    Ok(path)
}

/// Pair scenarios with the projects that run them
pub fn plan<'s>(
    config: &SuiteConfig,
    scenarios: &'s [Scenario],
    filter: &RunFilter,
) -> ProbeResult<Vec<PlannedRun<'s>>> {
    let focused = scenarios.iter().any(|s| s.meta.only);
    if focused && config.forbid_only {
        return Err(ProbeError::ConfigError {
            message: "focused scenario found while forbid_only is set".to_string(),
        });
    }
    if let Some(name) = &filter.project {
        if config.project(name).is_none() {
            return Err(ProbeError::ConfigError {
                message: format!("unknown project '{name}'"),
            });
        }
    }

    let mut planned = Vec::new();
    for project in &config.projects {
        if filter.project.as_ref().is_some_and(|name| *name != project.name) {
            continue;
        }
        let resolved = config.resolve_project(&project.name)?;
        for scenario in scenarios {
            let meta = &scenario.meta;
            if !project.matches_source(&meta.source)
                || (focused && !meta.only)
                || filter.grep.as_ref().is_some_and(|g| !meta.matches(g))
            {
                continue;
            }
            planned.push(PlannedRun {
                project: resolved.clone(),
                scenario,
            });
        }
    }
    Ok(planned)
}

/// Directory holding one attempt's artifacts
///
/// `<output>/<describe-title>-<project>[-retryN]`, lowercased, with every run
/// of non-alphanumerics collapsed to one `-`.
#[must_use]
pub fn artifact_dir(output: &Path, meta: &ScenarioMeta, project: &str, attempt: u32) -> PathBuf {
    let mut name = slug(&format!("{} {} {project}", meta.describe, meta.title));
    if attempt > 0 {
        name.push_str(&format!("-retry{attempt}"));
    }
    output.join(name)
}

fn slug(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}
