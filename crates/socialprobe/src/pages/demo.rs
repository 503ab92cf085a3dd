//! Demo page of the mock social origin: a button demo and a two-step
//! registration workflow that runs entirely client side.

use crate::locator::Locator;
use crate::mock_app::pages::DEMO_PATH;
use crate::mock_app::DEFAULT_MOCK_ORIGIN;
use crate::page::Page;
use crate::page_object::PageObject;
use crate::result::ProbeResult;
use crate::wait::poll_until;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Heading of the demo document
pub const DEMO_HEADING: &str = "Mock Social App Demo";

/// Where the workflow ended up after "Next Step"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowProgress {
    /// The profile setup form is showing
    StepTwo,
    /// Only the result banner is showing
    Result,
    /// Nothing changed within the wait budget
    Neither,
}

impl WorkflowProgress {
    /// Whether the workflow moved past step one
    #[must_use]
    pub const fn advanced(self) -> bool {
        !matches!(self, Self::Neither)
    }
}

/// The `/demo` document
#[derive(Debug, Clone)]
pub struct DemoPage<'a> {
    page: &'a Page,
    path: String,
    /// Page heading
    pub heading: Locator,
    /// Intro paragraph
    pub demo_content: Locator,
    /// "Click Me"
    pub demo_button: Locator,
    /// Banner revealed by the demo button
    pub demo_result: Locator,
    /// Reveals the workflow
    pub start_workflow_button: Locator,
    /// Current workflow step label
    pub workflow_step: Locator,
    /// Step one email
    pub workflow_email: Locator,
    /// Step one username
    pub workflow_username: Locator,
    /// Step one submit
    pub workflow_next: Locator,
    /// Step two container
    pub step_two: Locator,
    /// Step two full name
    pub workflow_full_name: Locator,
    /// Step two submit
    pub workflow_finish: Locator,
    /// Workflow result banner
    pub workflow_result: Locator,
}

impl<'a> DemoPage<'a> {
    /// Bind to the default mock origin
    #[must_use]
    pub fn new(page: &'a Page) -> Self {
        Self::with_origin(page, DEFAULT_MOCK_ORIGIN)
    }

    /// Bind to `origin`
    #[must_use]
    pub fn with_origin(page: &'a Page, origin: &str) -> Self {
        Self {
            page,
            path: format!("{}{DEMO_PATH}", origin.trim_end_matches('/')),
            heading: Locator::new("h1"),
            demo_content: Locator::new("#demo-content"),
            demo_button: Locator::new("#demo-button"),
            demo_result: Locator::new("#demo-result"),
            start_workflow_button: Locator::new("#start-workflow"),
            workflow_step: Locator::new("#workflow-step"),
            workflow_email: Locator::new("#workflow-email"),
            workflow_username: Locator::new("#workflow-username"),
            workflow_next: Locator::new("#workflow-next"),
            step_two: Locator::new("#step2"),
            workflow_full_name: Locator::new("#workflow-fullname"),
            workflow_finish: Locator::new("#workflow-finish"),
            workflow_result: Locator::new("#workflow-result"),
        }
    }

    /// Open the page and check its heading
    pub async fn navigate(&self) -> ProbeResult<()> {
        self.open().await?;
        self.page.expect(&self.heading).to_contain_text(DEMO_HEADING).await
    }

    /// Click the demo button
    pub async fn click_demo_button(&self) -> ProbeResult<()> {
        self.page.click(&self.demo_button).await
    }

    /// Reveal the workflow and check it starts at step one
    pub async fn start_workflow(&self) -> ProbeResult<()> {
        self.page.click(&self.start_workflow_button).await?;
        self.page
            .expect(&self.workflow_step)
            .to_contain_text("Step 1: Registration")
            .await
    }

    /// Fill step one and check the values stuck
    pub async fn fill_workflow(&self, email: &str, username: &str) -> ProbeResult<()> {
        self.page.fill(&self.workflow_email, email).await?;
        self.page.fill(&self.workflow_username, username).await?;
        self.page.expect(&self.workflow_email).to_have_value(email).await?;
        self.page
            .expect(&self.workflow_username)
            .to_have_value(username)
            .await
    }

    /// Submit step one
    pub async fn next_step(&self) -> ProbeResult<()> {
        self.page.click(&self.workflow_next).await
    }

    /// Wait up to `budget` for step two or the result banner
    pub async fn workflow_progress(&self, budget: Duration) -> ProbeResult<WorkflowProgress> {
        let (page, step_two, result) = (self.page, &self.step_two, &self.workflow_result);
        let progress = poll_until(budget, "workflow to advance", move || async move {
            if page.is_visible(step_two).await? {
                Ok(Some(WorkflowProgress::StepTwo))
            } else if page.is_visible(result).await? {
                Ok(Some(WorkflowProgress::Result))
            } else {
                Ok(None)
            }
        })
        .await;
        match progress {
            Ok(p) => Ok(p),
            Err(err) if err.is_assertion() => Ok(WorkflowProgress::Neither),
            Err(err) => Err(err),
        }
    }

    /// Complete step two and check the workflow finished
    pub async fn finish_workflow(&self, full_name: &str) -> ProbeResult<()> {
        self.page.fill(&self.workflow_full_name, full_name).await?;
        self.page.click(&self.workflow_finish).await?;
        self.page
            .expect(&self.workflow_step)
            .to_contain_text("Workflow Complete")
            .await
    }
}

impl PageObject for DemoPage<'_> {
    fn page(&self) -> &Page {
        self.page
    }

    fn url_path(&self) -> &str {
        &self.path
    }

    fn ready_marker(&self) -> Locator {
        self.demo_button.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockEffect, MockElement};
    use crate::page::Timeouts;
    use std::sync::Arc;

    fn workflow_driver() -> MockDriver {
        MockDriver::new()
            .with_element("h1", MockElement::text(DEMO_HEADING))
            .with_element("#start-workflow", MockElement::text("Start Registration Workflow"))
            .with_element("#workflow-step", MockElement::text("Step 1: Registration").hidden())
            .with_element("#workflow-email", MockElement::input().hidden())
            .with_element("#workflow-username", MockElement::input().hidden())
            .with_element("#workflow-next", MockElement::text("Next Step").hidden())
            .with_element("#step2", MockElement::text("").hidden())
            .with_element("#workflow-fullname", MockElement::input().hidden())
            .with_element("#workflow-finish", MockElement::text("Complete Registration").hidden())
            .on_click(
                "#start-workflow",
                vec![
                    MockEffect::Show("#workflow-step".into()),
                    MockEffect::Show("#workflow-email".into()),
                    MockEffect::Show("#workflow-username".into()),
                    MockEffect::Show("#workflow-next".into()),
                ],
            )
            .on_click(
                "#workflow-next",
                vec![
                    MockEffect::Show("#step2".into()),
                    MockEffect::Show("#workflow-fullname".into()),
                    MockEffect::Show("#workflow-finish".into()),
                ],
            )
            .on_click(
                "#workflow-finish",
                vec![MockEffect::SetText {
                    selector: "#workflow-step".into(),
                    text: "Workflow Complete".into(),
                }],
            )
    }

    fn quick(driver: MockDriver) -> (Arc<MockDriver>, Page) {
        let driver = Arc::new(driver);
        let page = Page::new(driver.clone()).with_timeouts(Timeouts {
            action_ms: 50,
            navigation_ms: 50,
            expect_ms: 50,
        });
        (driver, page)
    }

    #[tokio::test]
    async fn test_navigate_targets_demo_path() {
        let (driver, page) = quick(workflow_driver());
        DemoPage::with_origin(&page, "http://127.0.0.1:4000/")
            .navigate()
            .await
            .unwrap();
        assert!(driver.was_called("goto:http://127.0.0.1:4000/demo"));
    }

    #[tokio::test]
    async fn test_full_workflow() {
        let (_, page) = quick(workflow_driver());
        let demo = DemoPage::new(&page);
        demo.start_workflow().await.unwrap();
        demo.fill_workflow("user1@example.com", "user1").await.unwrap();
        demo.next_step().await.unwrap();
        let progress = demo.workflow_progress(Duration::from_millis(50)).await.unwrap();
        assert_eq!(progress, WorkflowProgress::StepTwo);
        demo.finish_workflow("Test User").await.unwrap();
    }

    #[tokio::test]
    async fn test_no_progress_is_neither() {
        let (_, page) = quick(workflow_driver());
        let demo = DemoPage::new(&page);
        let progress = demo.workflow_progress(Duration::from_millis(20)).await.unwrap();
        assert_eq!(progress, WorkflowProgress::Neither);
        assert!(!progress.advanced());
    }

    #[tokio::test]
    async fn test_result_only_counts_as_progress() {
        let (_, page) = quick(MockDriver::new().with_element("#workflow-result", MockElement::text("done")));
        let progress = DemoPage::new(&page)
            .workflow_progress(Duration::from_millis(20))
            .await
            .unwrap();
        assert_eq!(progress, WorkflowProgress::Result);
    }
}
