//! Browser control for headless testing.
//!
//! When compiled with the `browser` feature this module drives Chromium over
//! the Chrome `DevTools` Protocol through chromiumoxide: [`ChromiumPageFactory`]
//! launches one browser and opens a fresh, project-configured page for every
//! scenario attempt. Without the feature the factory still exists but refuses
//! to open pages, so callers compile either way.
//!
//! Element queries run as JavaScript built from [`Locator::to_query`], which
//! keeps `:has-text(...)` selectors working without a second query engine.

use crate::config::ResolvedProject;
use crate::locator::Locator;

/// Browser configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Window width
    pub viewport_width: u32,
    /// Window height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Accept invalid TLS certificates
    pub ignore_https_errors: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            chromium_path: None,
            sandbox: true,
            ignore_https_errors: false,
        }
    }
}

impl BrowserConfig {
    /// Launch settings matching a project's `use` block
    #[must_use]
    pub fn for_project(project: &ResolvedProject) -> Self {
        Self {
            headless: project.headless,
            viewport_width: project.viewport.width,
            viewport_height: project.viewport.height,
            ignore_https_errors: project.ignore_https_errors,
            ..Self::default()
        }
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Extra command-line switches passed to Chromium
    #[must_use]
    pub fn launch_args(&self) -> Vec<String> {
        let mut args = vec!["--disable-dev-shm-usage".to_string()];
        if self.ignore_https_errors {
            args.push("--ignore-certificate-errors".to_string());
        }
        args
    }
}

// ============================================================================
// Page scripts
// ============================================================================

/// Script returning the [`ElementState`](crate::driver::ElementState) of a locator as JSON
#[must_use]
pub fn element_state_script(locator: &Locator) -> String {
    format!(
        "(() => {{ \
            const all = {all}; \
            const el = all[{index}] ?? null; \
            if (!el) {{ return {{ count: all.length, attached: false, visible: false, enabled: false, value: null, text: '' }}; }} \
            const style = getComputedStyle(el); \
            const rect = el.getBoundingClientRect(); \
            const visible = style.visibility !== 'hidden' && style.display !== 'none' && rect.width > 0 && rect.height > 0; \
            const isControl = el instanceof HTMLInputElement || el instanceof HTMLTextAreaElement || el instanceof HTMLSelectElement; \
            return {{ count: all.length, attached: true, visible, enabled: !el.disabled, value: isControl ? String(el.value) : null, text: el.textContent ?? '' }}; \
        }})()",
        all = locator.selector().to_query_all(),
        index = locator.target_index(),
    )
}

/// Script that sets a control's value the way typing would, returning whether
/// the element was found
///
/// Uses the prototype's value setter so frameworks that track the property
/// see the change, then fires `input` and `change`.
#[must_use]
pub fn fill_script(locator: &Locator, value: &str) -> String {
    format!(
        "(() => {{ \
            const el = {query}; \
            if (!el) {{ return false; }} \
            el.focus(); \
            const setter = Object.getOwnPropertyDescriptor(Object.getPrototypeOf(el), 'value')?.set; \
            if (setter) {{ setter.call(el, {value}); }} else {{ el.value = {value}; }} \
            el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
            el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
            return true; \
        }})()",
        query = locator.to_query(),
        value = serde_json::Value::String(value.to_string()),
    )
}

/// Script that scrolls to and clicks an element, returning whether it was found
#[must_use]
pub fn click_script(locator: &Locator) -> String {
    format!(
        "(() => {{ \
            const el = {query}; \
            if (!el) {{ return false; }} \
            el.scrollIntoView({{ block: 'center' }}); \
            el.click(); \
            return true; \
        }})()",
        query = locator.to_query(),
    )
}

/// The new fragment when `target` differs from `current` only after `#`
///
/// Such navigations are applied through `location.hash` so a single-page app
/// keeps its in-memory state.
#[must_use]
pub fn hash_only_change<'t>(current: &str, target: &'t str) -> Option<&'t str> {
    let (target_doc, fragment) = target.split_once('#')?;
    let current_doc = current.split_once('#').map_or(current, |(doc, _)| doc);
    (current_doc == target_doc).then_some(fragment)
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
#[allow(clippy::significant_drop_tightening, clippy::missing_errors_doc)]
mod cdp {
    use super::{
        click_script, element_state_script, fill_script, hash_only_change, not_found, BrowserConfig,
    };
    use crate::config::ResolvedProject;
    use crate::driver::{ElementState, PageDriver};
    use crate::locator::Locator;
    use crate::network::{HttpMethod, InterceptedRequest, MockResponse, MockRoutes};
    use crate::page::Page;
    use crate::result::{ProbeError, ProbeResult};
    use crate::scenario::PageFactory;
    use async_trait::async_trait;
    use base64::Engine;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
    use chromiumoxide::cdp::browser_protocol::fetch::{
        ContinueRequestParams, EnableParams as FetchEnableParams, EventRequestPaused,
        FulfillRequestParams, HeaderEntry,
    };
    use chromiumoxide::cdp::browser_protocol::network::{
        Headers, SetExtraHttpHeadersParams, SetUserAgentOverrideParams,
    };
    use chromiumoxide::cdp::browser_protocol::page::{
        CaptureScreenshotFormat, CaptureScreenshotParams,
    };
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tokio::task::JoinHandle;

    /// Browser instance with real CDP connection
    #[derive(Debug)]
    pub struct Browser {
        config: BrowserConfig,
        inner: Arc<Mutex<CdpBrowser>>,
        handle: JoinHandle<()>,
    }

    impl Browser {
        /// Launch a new browser instance
        pub async fn launch(config: BrowserConfig) -> ProbeResult<Self> {
            let mut builder =
                CdpConfig::builder().window_size(config.viewport_width, config.viewport_height);

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            for arg in config.launch_args() {
                builder = builder.arg(arg);
            }

            let cdp_config = builder.build().map_err(|message| {
                if config.chromium_path.is_none() && message.contains("executable") {
                    ProbeError::BrowserNotFound
                } else {
                    ProbeError::BrowserLaunchError { message }
                }
            })?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(|e| {
                ProbeError::BrowserLaunchError {
                    message: e.to_string(),
                }
            })?;

            let handle = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            tracing::info!(headless = config.headless, "browser launched");
            Ok(Self {
                config,
                inner: Arc::new(Mutex::new(browser)),
                handle,
            })
        }

        /// Open a blank page emulating `project`'s device and headers
        pub async fn new_page(&self, project: &ResolvedProject) -> ProbeResult<CdpPageDriver> {
            let page = {
                let browser = self.inner.lock().await;
                browser
                    .new_page("about:blank")
                    .await
                    .map_err(|e| ProbeError::page(e.to_string()))?
            };
            let driver = CdpPageDriver::new(page);
            driver.emulate(project).await?;
            Ok(driver)
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        /// Close the browser
        pub async fn close(self) -> ProbeResult<()> {
            let mut browser = self.inner.lock().await;
            browser
                .close()
                .await
                .map_err(|e| ProbeError::BrowserLaunchError {
                    message: e.to_string(),
                })?;
            self.handle.abort();
            Ok(())
        }
    }

    /// [`PageDriver`] backed by a Chromium tab
    #[derive(Debug)]
    pub struct CdpPageDriver {
        page: CdpPage,
        interceptor: std::sync::Mutex<Option<JoinHandle<()>>>,
    }

    impl CdpPageDriver {
        fn new(page: CdpPage) -> Self {
            Self {
                page,
                interceptor: std::sync::Mutex::new(None),
            }
        }

        async fn emulate(&self, project: &ResolvedProject) -> ProbeResult<()> {
            self.page
                .execute(SetDeviceMetricsOverrideParams::new(
                    i64::from(project.viewport.width),
                    i64::from(project.viewport.height),
                    project.device_scale_factor,
                    false,
                ))
                .await
                .map_err(|e| ProbeError::page(e.to_string()))?;

            self.page
                .execute(SetUserAgentOverrideParams::new(project.user_agent.clone()))
                .await
                .map_err(|e| ProbeError::page(e.to_string()))?;

            if !project.extra_http_headers.is_empty() {
                let headers = serde_json::to_value(&project.extra_http_headers)?;
                self.page
                    .execute(SetExtraHttpHeadersParams::new(Headers::new(headers)))
                    .await
                    .map_err(|e| ProbeError::page(e.to_string()))?;
            }
            Ok(())
        }

        async fn eval<T: serde::de::DeserializeOwned>(&self, script: String) -> ProbeResult<T> {
            let result = self
                .page
                .evaluate(script)
                .await
                .map_err(|e| ProbeError::page(e.to_string()))?;
            result
                .into_value()
                .map_err(|e| ProbeError::page(e.to_string()))
        }
    }

    fn intercepted(event: &EventRequestPaused) -> InterceptedRequest {
        let headers: HashMap<String, String> = event
            .request
            .headers
            .inner()
            .as_object()
            .map(|map| {
                map.iter()
                    .map(|(k, v)| {
                        let value = v.as_str().map_or_else(|| v.to_string(), str::to_string);
                        (k.to_ascii_lowercase(), value)
                    })
                    .collect()
            })
            .unwrap_or_default();
        let mut request = InterceptedRequest::new(
            HttpMethod::parse(&event.request.method),
            event.request.url.clone(),
        );
        request.headers = headers;
        request.body = event
            .request
            .post_data_entries
            .as_ref()
            .map(|entries| {
                use base64::Engine;
                entries
                    .iter()
                    .filter_map(|entry| entry.bytes.as_ref())
                    .flat_map(|data| {
                        let encoded: &str = data.as_ref();
                        base64::engine::general_purpose::STANDARD
                            .decode(encoded)
                            .unwrap_or_else(|_| encoded.as_bytes().to_vec())
                    })
                    .collect()
            });
        request
    }

    async fn fulfill(
        page: &CdpPage,
        event: &EventRequestPaused,
        response: &MockResponse,
    ) -> ProbeResult<()> {
        if response.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(response.delay_ms)).await;
        }
        let mut headers = vec![HeaderEntry::new("Content-Type", response.content_type.clone())];
        headers.extend(
            response
                .headers
                .iter()
                .map(|(k, v)| HeaderEntry::new(k.clone(), v.clone())),
        );
        let params = FulfillRequestParams::builder()
            .request_id(event.request_id.clone())
            .response_code(i64::from(response.status))
            .response_headers(headers)
            .body(base64::engine::general_purpose::STANDARD.encode(&response.body))
            .build()
            .map_err(|message| ProbeError::RouteError { message })?;
        page.execute(params)
            .await
            .map_err(|e| ProbeError::RouteError {
                message: e.to_string(),
            })?;
        Ok(())
    }

    #[async_trait]
    impl PageDriver for CdpPageDriver {
        async fn goto(&self, url: &str) -> ProbeResult<()> {
            let current = self.current_url().await?;
            if let Some(fragment) = hash_only_change(&current, url) {
                let script = format!(
                    "(() => {{ location.hash = {}; return true; }})()",
                    serde_json::Value::String(fragment.to_string())
                );
                return self.eval::<bool>(script).await.map(|_| ());
            }
            self.page
                .goto(url)
                .await
                .map_err(|e| ProbeError::NavigationError {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn current_url(&self) -> ProbeResult<String> {
            Ok(self
                .page
                .url()
                .await
                .map_err(|e| ProbeError::page(e.to_string()))?
                .unwrap_or_else(|| "about:blank".to_string()))
        }

        async fn element_state(&self, locator: &Locator) -> ProbeResult<ElementState> {
            self.eval(element_state_script(locator)).await
        }

        async fn fill(&self, locator: &Locator, value: &str) -> ProbeResult<()> {
            if self.eval::<bool>(fill_script(locator, value)).await? {
                Ok(())
            } else {
                Err(not_found(locator))
            }
        }

        async fn click(&self, locator: &Locator) -> ProbeResult<()> {
            if self.eval::<bool>(click_script(locator)).await? {
                Ok(())
            } else {
                Err(not_found(locator))
            }
        }

        async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
            let params = CaptureScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .build();
            let screenshot =
                self.page
                    .execute(params)
                    .await
                    .map_err(|e| ProbeError::ScreenshotError {
                        message: e.to_string(),
                    })?;
            base64::engine::general_purpose::STANDARD
                .decode(&screenshot.data)
                .map_err(|e| ProbeError::ScreenshotError {
                    message: e.to_string(),
                })
        }

        async fn route(&self, routes: MockRoutes) -> ProbeResult<()> {
            let mut events = self
                .page
                .event_listener::<EventRequestPaused>()
                .await
                .map_err(|e| ProbeError::RouteError {
                    message: e.to_string(),
                })?;
            self.page
                .execute(FetchEnableParams::default())
                .await
                .map_err(|e| ProbeError::RouteError {
                    message: e.to_string(),
                })?;

            let page = self.page.clone();
            let rules = routes.len();
            let handle = tokio::spawn(async move {
                while let Some(event) = events.next().await {
                    let request = intercepted(&event);
                    let outcome = match routes.handle(&request) {
                        Some(response) => fulfill(&page, &event, &response).await,
                        None => page
                            .execute(ContinueRequestParams::new(event.request_id.clone()))
                            .await
                            .map(|_| ())
                            .map_err(|e| ProbeError::RouteError {
                                message: e.to_string(),
                            }),
                    };
                    if let Err(err) = outcome {
                        tracing::warn!(url = %request.url, %err, "interception reply failed");
                    }
                }
            });

            let previous = self
                .interceptor
                .lock()
                .map_err(|_| ProbeError::page("interceptor lock poisoned"))?
                .replace(handle);
            if let Some(previous) = previous {
                previous.abort();
            }
            tracing::debug!(rules, "request interception enabled");
            Ok(())
        }

        async fn close(&self) -> ProbeResult<()> {
            if let Ok(mut interceptor) = self.interceptor.lock() {
                if let Some(handle) = interceptor.take() {
                    handle.abort();
                }
            }
            self.page
                .clone()
                .close()
                .await
                .map_err(|e| ProbeError::page(e.to_string()))
        }
    }

    /// Opens a Chromium page per scenario attempt, launching the browser lazily
    #[derive(Debug)]
    pub struct ChromiumPageFactory {
        config: BrowserConfig,
        browser: Mutex<Option<Arc<Browser>>>,
    }

    impl ChromiumPageFactory {
        /// Factory launching with `config` on first use
        #[must_use]
        pub fn new(config: BrowserConfig) -> Self {
            Self {
                config,
                browser: Mutex::new(None),
            }
        }

        async fn browser(&self) -> ProbeResult<Arc<Browser>> {
            let mut slot = self.browser.lock().await;
            if let Some(browser) = slot.as_ref() {
                return Ok(Arc::clone(browser));
            }
            let browser = Arc::new(Browser::launch(self.config.clone()).await?);
            *slot = Some(Arc::clone(&browser));
            Ok(browser)
        }

        /// Close the browser if one was launched
        pub async fn shutdown(&self) -> ProbeResult<()> {
            let browser = self.browser.lock().await.take();
            match browser.map(Arc::try_unwrap) {
                Some(Ok(browser)) => browser.close().await,
                Some(Err(_)) => Err(ProbeError::BrowserLaunchError {
                    message: "browser still in use".to_string(),
                }),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl PageFactory for ChromiumPageFactory {
        async fn new_page(&self, project: &ResolvedProject) -> ProbeResult<Page> {
            let browser = self.browser().await?;
            let driver = browser.new_page(project).await?;
            let page = Page::new(Arc::new(driver)).with_timeouts(project.timeouts);
            Ok(match &project.base_url {
                Some(base) => page.with_base_url(base.clone()),
                None => page,
            })
        }
    }
}

// ============================================================================
// Stand-in when the `browser` feature is NOT enabled
// ============================================================================

#[cfg(not(feature = "browser"))]
mod stub {
    use super::BrowserConfig;
    use crate::config::ResolvedProject;
    use crate::page::Page;
    use crate::result::{ProbeError, ProbeResult};
    use crate::scenario::PageFactory;
    use async_trait::async_trait;

    /// Page factory for builds without Chromium support; every page request fails
    #[derive(Debug)]
    pub struct ChromiumPageFactory {
        config: BrowserConfig,
    }

    impl ChromiumPageFactory {
        /// Factory that would launch with `config`
        #[must_use]
        pub const fn new(config: BrowserConfig) -> Self {
            Self { config }
        }

        /// Nothing to close
        #[allow(clippy::unused_async)]
        pub async fn shutdown(&self) -> ProbeResult<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl PageFactory for ChromiumPageFactory {
        async fn new_page(&self, project: &ResolvedProject) -> ProbeResult<Page> {
            Err(ProbeError::BrowserLaunchError {
                message: format!(
                    "cannot open a page for {} (headless={}): built without the `browser` feature",
                    project.name, self.config.headless
                ),
            })
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::{Browser, CdpPageDriver, ChromiumPageFactory};

#[cfg(not(feature = "browser"))]
pub use stub::ChromiumPageFactory;

/// Factory with launch settings taken from the first project's `use` block
#[must_use]
pub fn factory_for(project: &ResolvedProject) -> ChromiumPageFactory {
    ChromiumPageFactory::new(BrowserConfig::for_project(project))
}

#[cfg(feature = "browser")]
fn not_found(locator: &Locator) -> crate::result::ProbeError {
    crate::result::ProbeError::ElementNotFound {
        selector: locator.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod config_tests {
        use super::*;
        use crate::config::{SuiteConfig, TRACK_A};

        #[test]
        fn test_defaults() {
            let config = BrowserConfig::default();
            assert!(config.headless);
            assert!(config.sandbox);
            assert_eq!((config.viewport_width, config.viewport_height), (1280, 720));
        }

        #[test]
        fn test_builder() {
            let config = BrowserConfig::default()
                .with_viewport(800, 600)
                .with_headless(false)
                .with_chromium_path("/usr/bin/chromium")
                .with_no_sandbox();
            assert!(!config.headless);
            assert!(!config.sandbox);
            assert_eq!(config.chromium_path.as_deref(), Some("/usr/bin/chromium"));
            assert_eq!(config.viewport_width, 800);
        }

        #[test]
        fn test_https_errors_switch() {
            let mut config = BrowserConfig::default();
            assert!(!config
                .launch_args()
                .contains(&"--ignore-certificate-errors".to_string()));
            config.ignore_https_errors = true;
            assert!(config
                .launch_args()
                .contains(&"--ignore-certificate-errors".to_string()));
        }

        #[test]
        fn test_for_project() {
            let project = SuiteConfig::default().resolve_project(TRACK_A).unwrap();
            let config = BrowserConfig::for_project(&project);
            assert_eq!(config.viewport_width, project.viewport.width);
            assert_eq!(config.headless, project.headless);
        }
    }

    mod script_tests {
        use super::*;

        #[test]
        fn test_state_script_targets_index() {
            let script = element_state_script(&Locator::new(".post").nth(1));
            assert!(script.contains(r#"document.querySelectorAll(".post")"#));
            assert!(script.contains("all[1]"));
        }

        #[test]
        fn test_fill_script_escapes_value() {
            let script = fill_script(&Locator::new("#bio"), "it's \"quoted\"");
            assert!(script.contains(r#""it's \"quoted\"""#));
            assert!(script.contains("dispatchEvent(new Event('input'"));
        }

        #[test]
        fn test_click_script_uses_text_filter() {
            let script = click_script(&Locator::new(r#"button:has-text("Sign up")"#));
            assert!(script.contains(r#"textContent.includes("Sign up")"#));
            assert!(script.contains("el.click()"));
        }

        #[cfg(feature = "browser")]
        #[test]
        fn test_not_found_names_locator() {
            let err = not_found(&Locator::new("#missing"));
            assert!(err.to_string().contains("#missing"));
        }
    }

    mod hash_tests {
        use super::*;

        #[test]
        fn test_same_document_new_fragment() {
            assert_eq!(
                hash_only_change(
                    "http://localhost:3001/api-demo#/register",
                    "http://localhost:3001/api-demo#/login"
                ),
                Some("/login")
            );
            assert_eq!(
                hash_only_change(
                    "http://localhost:3001/api-demo",
                    "http://localhost:3001/api-demo#/register"
                ),
                Some("/register")
            );
        }

        #[test]
        fn test_other_document_navigates() {
            assert_eq!(
                hash_only_change("about:blank", "http://localhost:3001/api-demo#/register"),
                None
            );
            assert_eq!(
                hash_only_change("http://localhost:3001/demo", "http://localhost:3001/api-demo"),
                None
            );
        }
    }

    #[cfg(not(feature = "browser"))]
    #[tokio::test]
    async fn test_stub_factory_refuses_pages() {
        use crate::config::{SuiteConfig, TRACK_B};
        use crate::scenario::PageFactory;

        let project = SuiteConfig::default().resolve_project(TRACK_B).unwrap();
        let factory = factory_for(&project);
        let err = factory.new_page(&project).await.unwrap_err();
        assert!(err.to_string().contains("browser"));
        factory.shutdown().await.unwrap();
    }
}
