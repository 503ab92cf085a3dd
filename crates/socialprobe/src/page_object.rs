//! Page Object Model support.
//!
//! A page object owns the locators of one screen and exposes named actions
//! over them. Page objects borrow a [`Page`] rather than owning it, so
//! several can act on the same browser page within one scenario.

use crate::locator::Locator;
use crate::page::Page;
use crate::result::ProbeResult;
use async_trait::async_trait;
use std::time::Duration;

/// A screen of the application under test
///
/// # Example
///
/// ```ignore
/// struct LoginPage<'a> {
///     page: &'a Page,
///     username: Locator,
/// }
///
/// impl PageObject for LoginPage<'_> {
///     fn page(&self) -> &Page { self.page }
///     fn url_path(&self) -> &str { "/login" }
///     fn ready_marker(&self) -> Locator { self.username.clone() }
/// }
/// ```
#[async_trait]
pub trait PageObject: Send + Sync {
    /// Page the object acts on
    fn page(&self) -> &Page;

    /// Path or URL this screen lives at
    fn url_path(&self) -> &str;

    /// Element whose visibility means the screen has loaded
    fn ready_marker(&self) -> Locator;

    /// Optional wait time for page load (in milliseconds)
    fn load_timeout_ms(&self) -> u64 {
        30_000
    }

    /// Get the page name for logging/debugging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Navigate to the screen without waiting for it to load
    async fn open(&self) -> ProbeResult<()> {
        tracing::debug!(page = self.page_name(), path = self.url_path(), "open");
        self.page().goto(self.url_path()).await
    }

    /// Whether the ready marker is visible right now
    async fn is_loaded(&self) -> ProbeResult<bool> {
        self.page().is_visible(&self.ready_marker()).await
    }

    /// Wait for the ready marker, bounded by the load timeout
    async fn wait_until_loaded(&self) -> ProbeResult<()> {
        self.page()
            .wait_for(
                &self.ready_marker(),
                Duration::from_millis(self.load_timeout_ms()),
            )
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement};
    use std::sync::Arc;

    struct Landing<'a> {
        page: &'a Page,
    }

    impl PageObject for Landing<'_> {
        fn page(&self) -> &Page {
            self.page
        }

        fn url_path(&self) -> &str {
            "/landing"
        }

        fn ready_marker(&self) -> Locator {
            Locator::new("#landing")
        }

        fn load_timeout_ms(&self) -> u64 {
            20
        }
    }

    #[tokio::test]
    async fn test_open_resolves_against_base_url() {
        let driver = Arc::new(MockDriver::new());
        let page = Page::new(driver.clone()).with_base_url("http://localhost:3001");
        let landing = Landing { page: &page };
        landing.open().await.unwrap();
        assert!(driver.was_called("goto:http://localhost:3001/landing"));
        assert!(landing.page_name().contains("Landing"));
    }

    #[tokio::test]
    async fn test_loaded_follows_marker() {
        let driver = Arc::new(MockDriver::new());
        let page = Page::new(driver.clone());
        let landing = Landing { page: &page };
        assert!(!landing.is_loaded().await.unwrap());
        assert!(landing.wait_until_loaded().await.is_err());
        driver.add_element("#landing", MockElement::text("hi"));
        assert!(landing.is_loaded().await.unwrap());
        landing.wait_until_loaded().await.unwrap();
    }
}
