//! Browser automation seam.
//!
//! [`PageDriver`] is the only thing page objects and scenarios know about a
//! browser. Two implementations ship with the crate:
//!
//! - `CdpPageDriver` (feature `browser`): Chromium over the DevTools protocol
//! - [`MockDriver`]: an in-memory page with scripted elements, for unit tests

use crate::locator::Locator;
use crate::network::{InterceptedRequest, MockResponse, MockRoutes};
use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

/// Everything a single query learns about a locator's target element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementState {
    /// Number of elements matching the selector
    pub count: usize,
    /// Whether the targeted element exists
    pub attached: bool,
    /// Rendered and not hidden
    pub visible: bool,
    /// Not disabled
    pub enabled: bool,
    /// Current value for form controls
    pub value: Option<String>,
    /// Text content
    pub text: String,
}

impl ElementState {
    /// State of a locator that matches nothing
    #[must_use]
    pub fn detached() -> Self {
        Self::default()
    }

    /// Visible and enabled, ready for input
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        self.attached && self.visible && self.enabled
    }
}

/// Abstract browser page
#[async_trait]
pub trait PageDriver: Send + Sync + fmt::Debug {
    /// Navigate to an absolute URL
    async fn goto(&self, url: &str) -> ProbeResult<()>;

    /// Current page URL
    async fn current_url(&self) -> ProbeResult<String>;

    /// Snapshot of the locator's target element
    async fn element_state(&self, locator: &Locator) -> ProbeResult<ElementState>;

    /// Replace the value of a form control
    async fn fill(&self, locator: &Locator, value: &str) -> ProbeResult<()>;

    /// Click the target element
    async fn click(&self, locator: &Locator) -> ProbeResult<()>;

    /// PNG screenshot of the viewport
    async fn screenshot(&self) -> ProbeResult<Vec<u8>>;

    /// Start answering matching requests from `routes`
    async fn route(&self, routes: MockRoutes) -> ProbeResult<()>;

    /// Close the page
    async fn close(&self) -> ProbeResult<()>;
}

/// Device emulation profile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceDescriptor {
    /// Device name
    pub name: &'static str,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Device scale factor
    pub device_scale_factor: f64,
    /// Is mobile device
    pub is_mobile: bool,
    /// Has touch support
    pub has_touch: bool,
    /// Default user agent
    pub user_agent: &'static str,
}

impl DeviceDescriptor {
    /// Desktop Chrome at 1280x720
    pub const DESKTOP_CHROME: Self = Self {
        name: "Desktop Chrome",
        viewport_width: 1280,
        viewport_height: 720,
        device_scale_factor: 1.0,
        is_mobile: false,
        has_touch: false,
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    };

    /// Look a device up by name
    #[must_use]
    pub fn by_name(name: &str) -> Option<Self> {
        [Self::DESKTOP_CHROME]
            .into_iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }
}

// =============================================================================
// MOCK DRIVER
// =============================================================================

/// A scripted element of the in-memory page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    /// Rendered and not hidden
    pub visible: bool,
    /// Not disabled
    pub enabled: bool,
    /// Value for form controls, `None` for everything else
    pub value: Option<String>,
    /// Text content
    pub text: String,
}

impl MockElement {
    /// An empty, visible, enabled text input
    #[must_use]
    pub fn input() -> Self {
        Self {
            visible: true,
            enabled: true,
            value: Some(String::new()),
            text: String::new(),
        }
    }

    /// A visible element with text
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            visible: true,
            enabled: true,
            value: None,
            text: text.into(),
        }
    }

    /// Mark hidden
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Mark disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// What clicking a scripted element does to the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEffect {
    /// Make every element under a selector visible
    Show(String),
    /// Hide every element under a selector
    Hide(String),
    /// Set text of the first element under a selector, creating it if needed
    SetText {
        /// Selector key
        selector: String,
        /// New text
        text: String,
    },
    /// Add an element under a selector
    Insert {
        /// Selector key
        selector: String,
        /// Element to add
        element: MockElement,
    },
    /// Remove every element under a selector
    Remove(String),
    /// Send a request through the installed routes
    Fetch(InterceptedRequest),
}

#[derive(Debug)]
struct MockPageState {
    url: String,
    elements: HashMap<String, Vec<MockElement>>,
    click_effects: HashMap<String, Vec<MockEffect>>,
    routes: Option<MockRoutes>,
    last_response: Option<MockResponse>,
    screenshot: Vec<u8>,
    history: Vec<String>,
    closed: bool,
}

impl Default for MockPageState {
    fn default() -> Self {
        Self {
            url: "about:blank".to_string(),
            elements: HashMap::new(),
            click_effects: HashMap::new(),
            routes: None,
            last_response: None,
            screenshot: PNG_SIGNATURE.to_vec(),
            history: Vec::new(),
            closed: false,
        }
    }
}

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// In-memory page for unit testing
///
/// Elements are keyed by the selector's display form, so a test seeds
/// `"#email"` and a page object querying `Locator::new("#email")` finds it.
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockPageState>,
}

impl MockDriver {
    /// Create an empty page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> ProbeResult<MutexGuard<'_, MockPageState>> {
        self.state
            .lock()
            .map_err(|_| ProbeError::page("mock page state poisoned"))
    }

    fn lock_or_recover(&self) -> MutexGuard<'_, MockPageState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Add an element under a selector
    #[must_use]
    pub fn with_element(self, selector: &str, element: MockElement) -> Self {
        self.add_element(selector, element);
        self
    }

    /// Add an element under a selector
    pub fn add_element(&self, selector: &str, element: MockElement) {
        self.lock_or_recover()
            .elements
            .entry(key(selector))
            .or_default()
            .push(element);
    }

    /// Script what clicking a selector does
    #[must_use]
    pub fn on_click(self, selector: &str, effects: Vec<MockEffect>) -> Self {
        self.lock_or_recover()
            .click_effects
            .entry(key(selector))
            .or_default()
            .extend(effects);
        self
    }

    /// Set the bytes returned by `screenshot`
    pub fn set_screenshot(&self, png: Vec<u8>) {
        self.lock_or_recover().screenshot = png;
    }

    /// Elements currently under a selector
    #[must_use]
    pub fn elements(&self, selector: &str) -> Vec<MockElement> {
        self.lock_or_recover()
            .elements
            .get(&key(selector))
            .cloned()
            .unwrap_or_default()
    }

    /// Response served for the last navigation, if a route answered it
    #[must_use]
    pub fn last_response(&self) -> Option<MockResponse> {
        self.lock_or_recover().last_response.clone()
    }

    /// Routes installed on the page
    #[must_use]
    pub fn routes(&self) -> Option<MockRoutes> {
        self.lock_or_recover().routes.clone()
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock_or_recover().history.clone()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.lock_or_recover()
            .history
            .iter()
            .any(|c| c.starts_with(method))
    }

    /// Whether `close` has been called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock_or_recover().closed
    }
}

fn key(selector: &str) -> String {
    crate::locator::Selector::parse(selector).to_string()
}

fn target<'a>(state: &'a mut MockPageState, locator: &Locator) -> ProbeResult<&'a mut MockElement> {
    let selector = locator.selector().to_string();
    state
        .elements
        .get_mut(&selector)
        .and_then(|els| els.get_mut(locator.target_index()))
        .ok_or(ProbeError::ElementNotFound { selector })
}

fn apply(state: &mut MockPageState, effect: &MockEffect) {
    match effect {
        MockEffect::Show(sel) | MockEffect::Hide(sel) => {
            let visible = matches!(effect, MockEffect::Show(_));
            if let Some(els) = state.elements.get_mut(&key(sel)) {
                for el in els {
                    el.visible = visible;
                }
            }
        }
        MockEffect::SetText { selector, text } => {
            let els = state.elements.entry(key(selector)).or_default();
            match els.first_mut() {
                Some(el) => el.text.clone_from(text),
                None => els.push(MockElement::text(text.clone())),
            }
        }
        MockEffect::Insert { selector, element } => {
            state
                .elements
                .entry(key(selector))
                .or_default()
                .push(element.clone());
        }
        MockEffect::Remove(sel) => {
            state.elements.remove(&key(sel));
        }
        MockEffect::Fetch(request) => {
            let status = state
                .routes
                .as_ref()
                .and_then(|routes| routes.handle(request))
                .map(|r| r.status);
            state
                .history
                .push(format!("fetch:{} {} -> {status:?}", request.method, request.url));
        }
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn goto(&self, url: &str) -> ProbeResult<()> {
        let mut state = self.lock()?;
        state.history.push(format!("goto:{url}"));
        state.url = url.to_string();
        let request = InterceptedRequest::get(url);
        let response = state.routes.as_ref().and_then(|r| r.handle(&request));
        state.last_response = response;
        Ok(())
    }

    async fn current_url(&self) -> ProbeResult<String> {
        Ok(self.lock()?.url.clone())
    }

    async fn element_state(&self, locator: &Locator) -> ProbeResult<ElementState> {
        let state = self.lock()?;
        let Some(els) = state.elements.get(&locator.selector().to_string()) else {
            return Ok(ElementState::detached());
        };
        Ok(els.get(locator.target_index()).map_or_else(
            || ElementState {
                count: els.len(),
                ..ElementState::detached()
            },
            |el| ElementState {
                count: els.len(),
                attached: true,
                visible: el.visible,
                enabled: el.enabled,
                value: el.value.clone(),
                text: el.text.clone(),
            },
        ))
    }

    async fn fill(&self, locator: &Locator, value: &str) -> ProbeResult<()> {
        let mut state = self.lock()?;
        state.history.push(format!("fill:{locator}={value}"));
        let el = target(&mut state, locator)?;
        match el.value.as_mut() {
            Some(current) => {
                *current = value.to_string();
                Ok(())
            }
            None => Err(ProbeError::page(format!("{locator} is not a form control"))),
        }
    }

    async fn click(&self, locator: &Locator) -> ProbeResult<()> {
        let mut state = self.lock()?;
        state.history.push(format!("click:{locator}"));
        let el = target(&mut state, locator)?;
        if !el.visible || !el.enabled {
            return Err(ProbeError::page(format!("{locator} is not clickable")));
        }
        let effects = state
            .click_effects
            .get(&locator.selector().to_string())
            .cloned()
            .unwrap_or_default();
        for effect in &effects {
            apply(&mut state, effect);
        }
        Ok(())
    }

    async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
        let mut state = self.lock()?;
        state.history.push("screenshot".to_string());
        Ok(state.screenshot.clone())
    }

    async fn route(&self, routes: MockRoutes) -> ProbeResult<()> {
        let mut state = self.lock()?;
        state.history.push(format!("route:{} rules", routes.len()));
        state.routes = Some(routes);
        Ok(())
    }

    async fn close(&self) -> ProbeResult<()> {
        let mut state = self.lock()?;
        state.history.push("close".to_string());
        state.closed = true;
        Ok(())
    }
}
