//! Scenario runner end to end against the in-memory driver.

use socialprobe::config::ReporterKind;
use socialprobe::scenario::artifact_dir;
use socialprobe::suites::all_scenarios;
use socialprobe::{
    MockDriver, MockEffect, MockElement, Page, PageFactory, ProbeResult, ResolvedProject,
    RunFilter, ScenarioRunner, SuiteConfig, TestStatus, Timeouts, TRACK_B,
};
use std::sync::Arc;

fn fast() -> Timeouts {
    Timeouts {
        action_ms: 50,
        navigation_ms: 50,
        expect_ms: 50,
    }
}

fn demo_driver() -> MockDriver {
    MockDriver::new()
        .with_element("h1", MockElement::text("Mock Social App Demo"))
        .with_element(
            "#demo-content",
            MockElement::text("This is a demonstration of Track B - Mock Social Application functionality."),
        )
        .with_element("#demo-button", MockElement::text("Click Me"))
        .on_click(
            "#demo-button",
            vec![MockEffect::SetText {
                selector: "#demo-result".into(),
                text: "Button clicked successfully!".into(),
            }],
        )
}

fn factory() -> Arc<dyn PageFactory> {
    Arc::new(|_: &ResolvedProject| -> ProbeResult<Page> {
        Ok(Page::new(Arc::new(demo_driver())).with_timeouts(fast()))
    })
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("socialprobe=debug")
        .with_test_writer()
        .try_init();
}

fn runner(output: &std::path::Path) -> ScenarioRunner {
    init_tracing();
    let config = SuiteConfig::for_environment(false).with_output_dir(output);
    ScenarioRunner::new(factory(), config)
}

#[tokio::test]
async fn passing_scenario_writes_every_report() {
    let tmp = tempfile::tempdir().unwrap();
    let runner = runner(tmp.path());
    let filter = RunFilter::new(Some(TRACK_B.to_string()), Some("Simple mock")).unwrap();
    let mut seen = Vec::new();
    let reporter = runner
        .run_all_with(&all_scenarios(), &filter, |entry| seen.push(entry.title.clone()))
        .await
        .unwrap();

    assert_eq!(seen, vec!["Mock Social App - Track B › Simple mock functionality test"]);
    assert_eq!(reporter.passed_count(), 1);
    assert!(reporter.all_passed());
    assert_eq!(reporter.results()[0].steps.len(), 3);

    let mut terminal = Vec::new();
    let written = reporter
        .write_reports(&runner.config().reporters, tmp.path(), &mut terminal)
        .unwrap();
    assert_eq!(written.len(), 3);
    assert!(tmp.path().join("html-report/index.html").is_file());
    let junit = std::fs::read_to_string(tmp.path().join("junit.xml")).unwrap();
    assert!(junit.contains("Simple mock functionality test"));
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(tmp.path().join("results.json")).unwrap())
            .unwrap();
    assert!(json.is_object());
    let terminal = String::from_utf8(terminal).unwrap();
    assert!(terminal.contains("Simple mock functionality test"));
}

#[tokio::test]
async fn failing_scenario_retries_and_keeps_artifacts() {
    let tmp = tempfile::tempdir().unwrap();
    let runner = runner(tmp.path());
    let filter = RunFilter::new(None, Some("Mock workflow")).unwrap();
    let scenarios = all_scenarios();
    let reporter = runner.run_all(&scenarios, &filter).await.unwrap();

    assert_eq!(reporter.total_count(), 1);
    let entry = &reporter.results()[0];
    assert_eq!(entry.status, TestStatus::Failed);
    assert_eq!(entry.retries, 1);
    assert!(entry.error.as_deref().unwrap().contains("#start-workflow"));

    let meta = &scenarios
        .iter()
        .find(|s| s.meta.title == "Mock workflow demonstration")
        .unwrap()
        .meta;
    for attempt in 0..=1 {
        let dir = artifact_dir(tmp.path(), meta, TRACK_B, attempt);
        assert!(dir.join("screenshot.png").is_file(), "{}", dir.display());
        assert!(dir.join("trace.json").is_file());
    }

    let github = reporter.render_github();
    assert!(github.contains("::error"));
}

#[tokio::test]
async fn reporters_can_be_limited() {
    let tmp = tempfile::tempdir().unwrap();
    let runner = runner(tmp.path());
    let filter = RunFilter::new(Some(TRACK_B.to_string()), Some("Simple mock")).unwrap();
    let reporter = runner.run_all(&all_scenarios(), &filter).await.unwrap();

    let mut terminal = Vec::new();
    let written = reporter
        .write_reports(&[ReporterKind::List], tmp.path(), &mut terminal)
        .unwrap();
    assert!(written.is_empty());
    assert!(!tmp.path().join("junit.xml").exists());
    assert!(!terminal.is_empty());
}
