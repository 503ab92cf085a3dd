//! Page handle: a driver plus base URL and timeout budget.

use crate::assertion::Expect;
use crate::driver::{ElementState, PageDriver};
use crate::locator::Locator;
use crate::network::MockRoutes;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::poll_until;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Timeout budget for page operations, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    /// Auto-waiting actions (fill, click)
    pub action_ms: u64,
    /// Navigations
    pub navigation_ms: u64,
    /// Expectations
    pub expect_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            action_ms: 30_000,
            navigation_ms: 60_000,
            expect_ms: 10_000,
        }
    }
}

impl Timeouts {
    /// Action timeout
    #[must_use]
    pub const fn action(&self) -> Duration {
        Duration::from_millis(self.action_ms)
    }

    /// Navigation timeout
    #[must_use]
    pub const fn navigation(&self) -> Duration {
        Duration::from_millis(self.navigation_ms)
    }

    /// Expect timeout
    #[must_use]
    pub const fn expect(&self) -> Duration {
        Duration::from_millis(self.expect_ms)
    }
}

/// A browser page as seen by page objects and scenarios
#[derive(Debug, Clone)]
pub struct Page {
    driver: Arc<dyn PageDriver>,
    base_url: Option<String>,
    timeouts: Timeouts,
}

impl Page {
    /// Wrap a driver with default timeouts and no base URL
    #[must_use]
    pub fn new(driver: Arc<dyn PageDriver>) -> Self {
        Self {
            driver,
            base_url: None,
            timeouts: Timeouts::default(),
        }
    }

    /// Resolve relative navigations against `base_url`
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Replace the timeout budget
    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Underlying driver
    #[must_use]
    pub fn driver(&self) -> &Arc<dyn PageDriver> {
        &self.driver
    }

    /// Timeout budget
    #[must_use]
    pub const fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    /// Base URL, if any
    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Create a locator
    #[must_use]
    pub fn locator(&self, selector: &str) -> Locator {
        Locator::new(selector)
    }

    /// Turn a navigation target into an absolute URL
    ///
    /// Absolute URLs pass through; paths are joined onto the base URL.
    pub fn resolve_url(&self, target: &str) -> ProbeResult<String> {
        if target.contains("://") || target.starts_with("about:") || target.starts_with("data:") {
            return Ok(target.to_string());
        }
        let base = self.base_url.as_deref().ok_or_else(|| ProbeError::NavigationError {
            url: target.to_string(),
            message: "relative URL without a base URL".to_string(),
        })?;
        let base = base.trim_end_matches('/');
        if target.is_empty() {
            Ok(format!("{base}/"))
        } else if target.starts_with('/') {
            Ok(format!("{base}{target}"))
        } else {
            Ok(format!("{base}/{target}"))
        }
    }

    /// Navigate, bounded by the navigation timeout
    pub async fn goto(&self, target: &str) -> ProbeResult<()> {
        let url = self.resolve_url(target)?;
        tracing::debug!(%url, "goto");
        let timeout = self.timeouts.navigation();
        match tokio::time::timeout(timeout, self.driver.goto(&url)).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout {
                ms: timeout.as_millis() as u64,
                what: format!("navigation to {url}"),
            }),
        }
    }

    /// Current URL
    pub async fn url(&self) -> ProbeResult<String> {
        self.driver.current_url().await
    }

    /// Snapshot of an element, without waiting
    pub async fn element_state(&self, locator: &Locator) -> ProbeResult<ElementState> {
        self.driver.element_state(locator).await
    }

    async fn wait_actionable(&self, locator: &Locator) -> ProbeResult<()> {
        let timeout = locator.timeout().unwrap_or_else(|| self.timeouts.action());
        poll_until(timeout, &format!("{locator} to be actionable"), || async {
            Ok(self
                .element_state(locator)
                .await?
                .is_actionable()
                .then_some(()))
        })
        .await
    }

    async fn wait_attached(&self, locator: &Locator) -> ProbeResult<ElementState> {
        let timeout = locator.timeout().unwrap_or_else(|| self.timeouts.action());
        poll_until(timeout, &format!("{locator} to be attached"), || async {
            let state = self.element_state(locator).await?;
            Ok(state.attached.then_some(state))
        })
        .await
    }

    /// Fill a form control once it is visible and enabled
    pub async fn fill(&self, locator: &Locator, value: &str) -> ProbeResult<()> {
        self.wait_actionable(locator).await?;
        self.driver.fill(locator, value).await
    }

    /// Empty a form control
    pub async fn clear(&self, locator: &Locator) -> ProbeResult<()> {
        self.fill(locator, "").await
    }

    /// Click an element once it is visible and enabled
    pub async fn click(&self, locator: &Locator) -> ProbeResult<()> {
        self.wait_actionable(locator).await?;
        self.driver.click(locator).await
    }

    /// Whether the element is visible right now; missing counts as hidden
    pub async fn is_visible(&self, locator: &Locator) -> ProbeResult<bool> {
        let state = self.element_state(locator).await?;
        Ok(state.attached && state.visible)
    }

    /// Whether the element is disabled, waiting for it to exist
    pub async fn is_disabled(&self, locator: &Locator) -> ProbeResult<bool> {
        Ok(!self.wait_attached(locator).await?.enabled)
    }

    /// Value of a form control, waiting for it to exist
    pub async fn input_value(&self, locator: &Locator) -> ProbeResult<String> {
        let state = self.wait_attached(locator).await?;
        state.value.ok_or_else(|| ProbeError::page(format!("{locator} is not a form control")))
    }

    /// Text content, waiting for the element to exist
    pub async fn text_content(&self, locator: &Locator) -> ProbeResult<String> {
        Ok(self.wait_attached(locator).await?.text)
    }

    /// Number of matching elements right now
    pub async fn count(&self, locator: &Locator) -> ProbeResult<usize> {
        Ok(self.element_state(locator).await?.count)
    }

    /// Wait until the element is visible
    pub async fn wait_for(&self, locator: &Locator, timeout: Duration) -> ProbeResult<()> {
        poll_until(timeout, &format!("{locator} to be visible"), || async {
            let state = self.element_state(locator).await?;
            Ok((state.attached && state.visible).then_some(()))
        })
        .await
    }

    /// Sleep for a fixed time
    pub async fn wait_for_timeout(&self, ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    /// Start an expectation with the page's expect timeout
    #[must_use]
    pub fn expect(&self, locator: &Locator) -> Expect<'_> {
        Expect::new(self, locator)
    }

    /// Install interception routes
    pub async fn route(&self, routes: MockRoutes) -> ProbeResult<()> {
        self.driver.route(routes).await
    }

    /// PNG screenshot
    pub async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
        self.driver.screenshot().await
    }

    /// Close the page
    pub async fn close(&self) -> ProbeResult<()> {
        self.driver.close().await
    }
}
