//! Suite configuration.
//!
//! Built-in defaults mirror the runner setup for the two tracks: serial
//! execution with one worker, generous timeouts for the slow live site, and
//! retries that depend on whether the suite runs on CI. A YAML file can
//! replace the defaults wholesale.

use crate::driver::DeviceDescriptor;
use crate::mock_app::DEFAULT_MOCK_ORIGIN;
use crate::network::glob_matches;
use crate::page::Timeouts;
use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Live site base URL
pub const LIVE_BASE_URL: &str = "https://www.instagram.com";

/// Name of the live-site project
pub const TRACK_A: &str = "track-a-instagram";

/// Name of the mock-app project
pub const TRACK_B: &str = "track-b-mock";

/// Accept-Language sent by every project
pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// User agent pinned for the live site
pub const LIVE_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Whether the `CI` environment variable is set
#[must_use]
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok_and(|v| !v.is_empty())
}

// =============================================================================
// ARTIFACT MODES
// =============================================================================

/// When to keep a step trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraceMode {
    /// Never
    Off,
    /// Always
    On,
    /// Only when the scenario ultimately failed
    #[default]
    RetainOnFailure,
    /// Only for the first retry
    OnFirstRetry,
}

impl TraceMode {
    /// Whether an attempt's trace is kept
    #[must_use]
    pub const fn keep(self, failed: bool, attempt: u32) -> bool {
        match self {
            Self::Off => false,
            Self::On => true,
            Self::RetainOnFailure => failed,
            Self::OnFirstRetry => attempt == 1,
        }
    }
}

/// When to capture a screenshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScreenshotMode {
    /// Never
    Off,
    /// After every attempt
    On,
    /// After failed attempts
    #[default]
    OnlyOnFailure,
}

impl ScreenshotMode {
    /// Whether an attempt gets a screenshot
    #[must_use]
    pub const fn capture(self, failed: bool) -> bool {
        match self {
            Self::Off => false,
            Self::On => true,
            Self::OnlyOnFailure => failed,
        }
    }
}

/// Video setting, carried for configuration compatibility only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VideoMode {
    /// Never
    Off,
    /// Always
    On,
    /// Keep for failures
    #[default]
    RetainOnFailure,
}

/// An output format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReporterKind {
    /// HTML report under `<output>/html-report/`
    Html,
    /// JUnit XML
    Junit {
        /// Destination file
        output_file: PathBuf,
    },
    /// JSON results
    Json {
        /// Destination file
        output_file: PathBuf,
    },
    /// One line per test on stdout
    List,
    /// GitHub Actions annotations on stdout
    Github,
}

// =============================================================================
// BROWSER OPTIONS
// =============================================================================

/// Viewport size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Browser options shared by all projects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UseOptions {
    /// Base for relative navigations
    pub base_url: Option<String>,
    /// Trace retention
    pub trace: TraceMode,
    /// Screenshot capture
    pub screenshot: ScreenshotMode,
    /// Video setting
    pub video: VideoMode,
    /// Run without a window
    pub headless: bool,
    /// Viewport
    pub viewport: Viewport,
    /// Auto-wait budget for actions
    pub action_timeout_ms: u64,
    /// Navigation budget
    pub navigation_timeout_ms: u64,
    /// Accept invalid certificates
    pub ignore_https_errors: bool,
    /// Headers added to every request
    pub extra_http_headers: BTreeMap<String, String>,
}

impl Default for UseOptions {
    fn default() -> Self {
        Self {
            base_url: Some(LIVE_BASE_URL.to_string()),
            trace: TraceMode::RetainOnFailure,
            screenshot: ScreenshotMode::OnlyOnFailure,
            video: VideoMode::RetainOnFailure,
            headless: true,
            viewport: Viewport::default(),
            action_timeout_ms: 30_000,
            navigation_timeout_ms: 60_000,
            ignore_https_errors: true,
            extra_http_headers: accept_language(),
        }
    }
}

fn accept_language() -> BTreeMap<String, String> {
    BTreeMap::from([("Accept-Language".to_string(), ACCEPT_LANGUAGE.to_string())])
}

/// Per-project overrides of [`UseOptions`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectUse {
    /// Device profile name, e.g. `Desktop Chrome`
    pub device: Option<String>,
    /// Base URL; `None` keeps the global one
    pub base_url: Option<String>,
    /// Replaces the global header set
    pub extra_http_headers: Option<BTreeMap<String, String>>,
    /// Headless override
    pub headless: Option<bool>,
}

/// What a project targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectKind {
    /// A real site over the network
    #[default]
    Live,
    /// The mock social app, served through interception routes
    Mock,
}

/// One project of the suite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name
    pub name: String,
    /// Glob selecting scenario sources
    pub test_match: String,
    /// Live or mock
    #[serde(default)]
    pub kind: ProjectKind,
    /// Browser option overrides
    #[serde(default, rename = "use")]
    pub use_options: ProjectUse,
    /// Retry override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    /// Origin of the mock app for mock projects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mock_origin: Option<String>,
}

impl ProjectConfig {
    /// Whether this project runs scenarios from `source`
    #[must_use]
    pub fn matches_source(&self, source: &str) -> bool {
        glob_matches(&self.test_match, source)
    }
}

/// A project with the global options folded in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedProject {
    /// Project name
    pub name: String,
    /// Live or mock
    pub kind: ProjectKind,
    /// Source glob
    pub test_match: String,
    /// Base URL
    pub base_url: Option<String>,
    /// Headless
    pub headless: bool,
    /// Viewport
    pub viewport: Viewport,
    /// Device scale factor
    pub device_scale_factor: f64,
    /// Effective user agent
    pub user_agent: String,
    /// Headers added to every request, without `User-Agent`
    pub extra_http_headers: BTreeMap<String, String>,
    /// Accept invalid certificates
    pub ignore_https_errors: bool,
    /// Page timeouts
    pub timeouts: Timeouts,
    /// Scenario timeout
    pub timeout_ms: u64,
    /// Retries per scenario
    pub retries: u32,
    /// Trace retention
    pub trace: TraceMode,
    /// Screenshot capture
    pub screenshot: ScreenshotMode,
    /// Video setting
    pub video: VideoMode,
    /// Origin the mock app is addressed at
    pub mock_origin: Option<String>,
}

impl ResolvedProject {
    /// Whether mock routes are installed on this project's pages
    #[must_use]
    pub const fn is_mock(&self) -> bool {
        matches!(self.kind, ProjectKind::Mock)
    }
}

// =============================================================================
// SUITE CONFIG
// =============================================================================

/// Whole-suite configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Directory scenario sources are named relative to
    pub test_dir: PathBuf,
    /// Run scenarios of one source in parallel
    pub fully_parallel: bool,
    /// Reject focused scenarios
    pub forbid_only: bool,
    /// Retries per scenario
    pub retries: u32,
    /// Concurrent workers
    pub workers: usize,
    /// Output formats
    pub reporters: Vec<ReporterKind>,
    /// Shared browser options
    #[serde(rename = "use")]
    pub use_options: UseOptions,
    /// Scenario timeout
    pub timeout_ms: u64,
    /// Expectation timeout
    pub expect_timeout_ms: u64,
    /// Projects
    pub projects: Vec<ProjectConfig>,
    /// Artifact and report directory
    pub output_dir: PathBuf,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self::for_environment(false)
    }
}

impl SuiteConfig {
    /// Built-in configuration for a local (`ci = false`) or CI run
    #[must_use]
    pub fn for_environment(ci: bool) -> Self {
        let output_dir = PathBuf::from("test-results");
        let mut live_headers = accept_language();
        live_headers.insert("User-Agent".to_string(), LIVE_USER_AGENT.to_string());
        Self {
            test_dir: PathBuf::from("src/suites"),
            fully_parallel: false,
            forbid_only: ci,
            retries: if ci { 2 } else { 1 },
            workers: 1,
            reporters: vec![
                ReporterKind::Html,
                ReporterKind::Junit {
                    output_file: output_dir.join("junit.xml"),
                },
                ReporterKind::Json {
                    output_file: output_dir.join("results.json"),
                },
                ReporterKind::List,
                ReporterKind::Github,
            ],
            use_options: UseOptions {
                headless: ci,
                ..UseOptions::default()
            },
            timeout_ms: 120_000,
            expect_timeout_ms: 10_000,
            projects: vec![
                ProjectConfig {
                    name: TRACK_A.to_string(),
                    test_match: "**/instagram_*.rs".to_string(),
                    kind: ProjectKind::Live,
                    use_options: ProjectUse {
                        device: Some(DeviceDescriptor::DESKTOP_CHROME.name.to_string()),
                        base_url: Some(LIVE_BASE_URL.to_string()),
                        extra_http_headers: Some(live_headers),
                        headless: None,
                    },
                    retries: Some(if ci { 0 } else { 1 }),
                    mock_origin: None,
                },
                ProjectConfig {
                    name: TRACK_B.to_string(),
                    test_match: "**/mock_*.rs".to_string(),
                    kind: ProjectKind::Mock,
                    use_options: ProjectUse {
                        device: Some(DeviceDescriptor::DESKTOP_CHROME.name.to_string()),
                        base_url: None,
                        extra_http_headers: Some(accept_language()),
                        headless: None,
                    },
                    retries: None,
                    mock_origin: Some(DEFAULT_MOCK_ORIGIN.to_string()),
                },
            ],
            output_dir,
        }
    }

    /// Built-in configuration for the current environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::for_environment(is_ci())
    }

    /// Parse and validate YAML
    pub fn from_yaml(yaml: &str) -> ProbeResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a YAML file
    pub fn load(path: &Path) -> ProbeResult<Self> {
        let yaml = fs::read_to_string(path)?;
        Self::from_yaml(&yaml).map_err(|e| ProbeError::ConfigError {
            message: format!("{}: {e}", path.display()),
        })
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> ProbeResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Render as pretty JSON
    pub fn to_json(&self) -> ProbeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check internal consistency
    pub fn validate(&self) -> ProbeResult<()> {
        let fail = |message: String| Err(ProbeError::ConfigError { message });
        if self.workers == 0 {
            return fail("workers must be at least 1".to_string());
        }
        if self.timeout_ms == 0 || self.expect_timeout_ms == 0 {
            return fail("timeouts must be positive".to_string());
        }
        let mut seen = std::collections::HashSet::new();
        for project in &self.projects {
            if !seen.insert(project.name.as_str()) {
                return fail(format!("duplicate project '{}'", project.name));
            }
            if project.test_match.is_empty() {
                return fail(format!("project '{}' has an empty test_match", project.name));
            }
            if let Some(device) = &project.use_options.device {
                if DeviceDescriptor::by_name(device).is_none() {
                    return fail(format!("project '{}' uses unknown device '{device}'", project.name));
                }
            }
        }
        Ok(())
    }

    /// Look a project up by name
    #[must_use]
    pub fn project(&self, name: &str) -> Option<&ProjectConfig> {
        self.projects.iter().find(|p| p.name == name)
    }

    /// Fold global options into a project
    pub fn resolve_project(&self, name: &str) -> ProbeResult<ResolvedProject> {
        let project = self.project(name).ok_or_else(|| ProbeError::ConfigError {
            message: format!("unknown project '{name}'"),
        })?;
        Ok(self.resolve(project))
    }

    /// Every project, resolved
    #[must_use]
    pub fn resolved_projects(&self) -> Vec<ResolvedProject> {
        self.projects.iter().map(|p| self.resolve(p)).collect()
    }

    fn resolve(&self, project: &ProjectConfig) -> ResolvedProject {
        let global = &self.use_options;
        let device = project
            .use_options
            .device
            .as_deref()
            .and_then(DeviceDescriptor::by_name);
        let mut headers = project
            .use_options
            .extra_http_headers
            .clone()
            .unwrap_or_else(|| global.extra_http_headers.clone());
        let header_ua = headers
            .keys()
            .find(|k| k.eq_ignore_ascii_case("user-agent"))
            .cloned()
            .and_then(|k| headers.remove(&k));
        let user_agent = header_ua
            .or_else(|| device.map(|d| d.user_agent.to_string()))
            .unwrap_or_else(|| DeviceDescriptor::DESKTOP_CHROME.user_agent.to_string());
        let viewport = device.map_or(global.viewport, |d| Viewport {
            width: d.viewport_width,
            height: d.viewport_height,
        });
        let base_url = match project.kind {
            ProjectKind::Live => project
                .use_options
                .base_url
                .clone()
                .or_else(|| global.base_url.clone()),
            ProjectKind::Mock => project.use_options.base_url.clone(),
        };
        let mock_origin = match project.kind {
            ProjectKind::Live => None,
            ProjectKind::Mock => Some(
                project
                    .mock_origin
                    .clone()
                    .unwrap_or_else(|| DEFAULT_MOCK_ORIGIN.to_string()),
            ),
        };

        ResolvedProject {
            name: project.name.clone(),
            kind: project.kind,
            test_match: project.test_match.clone(),
            base_url,
            headless: project.use_options.headless.unwrap_or(global.headless),
            viewport,
            device_scale_factor: device.map_or(1.0, |d| d.device_scale_factor),
            user_agent,
            extra_http_headers: headers,
            ignore_https_errors: global.ignore_https_errors,
            timeouts: Timeouts {
                action_ms: global.action_timeout_ms,
                navigation_ms: global.navigation_timeout_ms,
                expect_ms: self.expect_timeout_ms,
            },
            timeout_ms: self.timeout_ms,
            retries: project.retries.unwrap_or(self.retries),
            trace: global.trace,
            screenshot: global.screenshot,
            video: global.video,
            mock_origin,
        }
    }

    /// Projects that run scenarios from `source`
    #[must_use]
    pub fn projects_for(&self, source: &str) -> Vec<&ProjectConfig> {
        self.projects
            .iter()
            .filter(|p| p.matches_source(source))
            .collect()
    }

    /// Set the output directory, moving file reporters along with it
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        for reporter in &mut self.reporters {
            if let ReporterKind::Junit { output_file } | ReporterKind::Json { output_file } = reporter
            {
                if let Some(name) = output_file.file_name() {
                    *output_file = dir.join(name);
                }
            }
        }
        self.output_dir = dir;
        self
    }

    /// Force headed or headless mode
    #[must_use]
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.use_options.headless = headless;
        for project in &mut self.projects {
            project.use_options.headless = None;
        }
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod default_tests {
        use super::*;

        #[test]
        fn test_local_defaults() {
            let c = SuiteConfig::for_environment(false);
            assert!(!c.fully_parallel);
            assert!(!c.forbid_only);
            assert_eq!(c.retries, 1);
            assert_eq!(c.workers, 1);
            assert_eq!(c.timeout_ms, 120_000);
            assert_eq!(c.expect_timeout_ms, 10_000);
            assert!(!c.use_options.headless);
            assert_eq!(c.reporters.len(), 5);
            c.validate().unwrap();
        }

        #[test]
        fn test_ci_defaults() {
            let c = SuiteConfig::for_environment(true);
            assert!(c.forbid_only);
            assert_eq!(c.retries, 2);
            assert!(c.use_options.headless);
            assert_eq!(c.resolve_project(TRACK_A).unwrap().retries, 0);
            assert_eq!(c.resolve_project(TRACK_B).unwrap().retries, 2);
        }

        #[test]
        fn test_file_reporters_under_output_dir() {
            let c = SuiteConfig::default().with_output_dir("out");
            assert!(c.reporters.contains(&ReporterKind::Junit {
                output_file: PathBuf::from("out/junit.xml")
            }));
            assert_eq!(c.output_dir, PathBuf::from("out"));
        }
    }

    mod resolve_tests {
        use super::*;

        #[test]
        fn test_track_a_pins_user_agent() {
            let p = SuiteConfig::default().resolve_project(TRACK_A).unwrap();
            assert_eq!(p.user_agent, LIVE_USER_AGENT);
            assert!(!p.extra_http_headers.contains_key("User-Agent"));
            assert_eq!(p.extra_http_headers["Accept-Language"], ACCEPT_LANGUAGE);
            assert_eq!(p.base_url.as_deref(), Some(LIVE_BASE_URL));
            assert_eq!(p.viewport, Viewport::default());
            assert_eq!(p.timeouts, Timeouts::default());
            assert!(!p.is_mock());
        }

        #[test]
        fn test_track_b_has_no_base_url() {
            let p = SuiteConfig::default().resolve_project(TRACK_B).unwrap();
            assert!(p.is_mock());
            assert_eq!(p.base_url, None);
            assert_eq!(p.mock_origin.as_deref(), Some(DEFAULT_MOCK_ORIGIN));
            assert_eq!(p.user_agent, DeviceDescriptor::DESKTOP_CHROME.user_agent);
        }

        #[test]
        fn test_unknown_project() {
            assert!(matches!(
                SuiteConfig::default().resolve_project("nope"),
                Err(ProbeError::ConfigError { .. })
            ));
        }

        #[test]
        fn test_source_matching() {
            let c = SuiteConfig::default();
            let names = |s: &str| c.projects_for(s).iter().map(|p| p.name.clone()).collect::<Vec<_>>();
            assert_eq!(names("src/suites/instagram_registration.rs"), vec![TRACK_A]);
            assert_eq!(names("src/suites/mock_social_app.rs"), vec![TRACK_B]);
            assert!(names("src/suites/other.rs").is_empty());
        }

        #[test]
        fn test_headed_override_clears_projects() {
            let c = SuiteConfig::for_environment(true).with_headless(false);
            assert!(!c.resolve_project(TRACK_A).unwrap().headless);
        }
    }

    mod yaml_tests {
        use super::*;

        #[test]
        fn test_yaml_roundtrip_of_defaults() {
            let c = SuiteConfig::for_environment(true);
            let back = SuiteConfig::from_yaml(&c.to_yaml().unwrap()).unwrap();
            assert_eq!(back, c);
        }

        #[test]
        fn test_partial_yaml_uses_defaults() {
            let c = SuiteConfig::from_yaml("retries: 0\nworkers: 1\n").unwrap();
            assert_eq!(c.retries, 0);
            assert_eq!(c.projects.len(), 2);
        }

        #[test]
        fn test_validation_errors() {
            assert!(SuiteConfig::from_yaml("workers: 0").is_err());
            let dup = r"
projects:
  - name: a
    test_match: '**/*.rs'
  - name: a
    test_match: '**/*.rs'
";
            let err = SuiteConfig::from_yaml(dup).unwrap_err();
            assert!(err.to_string().contains("duplicate project"));
            let device = r"
projects:
  - name: a
    test_match: '**/*.rs'
    use:
      device: Pixel 7
";
            assert!(SuiteConfig::from_yaml(device).is_err());
        }

        #[test]
        fn test_load_reports_path() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("suite.yaml");
            fs::write(&path, "workers: 0\n").unwrap();
            let err = SuiteConfig::load(&path).unwrap_err();
            assert!(err.to_string().contains("suite.yaml"));
        }
    }
}
