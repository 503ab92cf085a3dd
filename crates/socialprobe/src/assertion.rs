//! Auto-retrying expectations on locators.
//!
//! An [`Expect`] re-queries its locator until the assertion holds or the
//! expect timeout runs out, then fails with the last state it observed.

use crate::driver::ElementState;
use crate::locator::Locator;
use crate::page::Page;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::poll_until;
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

/// A single check against an element snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectAssertion {
    /// Text content contains the string
    ContainsText(String),
    /// Form value equals the string
    HasValue(String),
    /// Element is visible
    Visible,
    /// Element is enabled
    Enabled,
    /// Form value, or text for non-controls, is empty
    Empty,
    /// Selector matches exactly this many elements
    Count(usize),
}

impl ExpectAssertion {
    /// Check a snapshot, returning what was received on failure
    pub fn validate(&self, state: &ElementState) -> Result<(), String> {
        let detached = || "element not found".to_string();
        match self {
            Self::ContainsText(expected) => {
                if !state.attached {
                    Err(detached())
                } else if state.text.contains(expected.as_str()) {
                    Ok(())
                } else {
                    Err(format!("received text {:?}", state.text))
                }
            }
            Self::HasValue(expected) => match &state.value {
                Some(value) if value == expected => Ok(()),
                Some(value) => Err(format!("received value {value:?}")),
                None if state.attached => Err("element has no value".to_string()),
                None => Err(detached()),
            },
            Self::Visible => {
                if state.attached && state.visible {
                    Ok(())
                } else if state.attached {
                    Err("element is hidden".to_string())
                } else {
                    Err(detached())
                }
            }
            Self::Enabled => {
                if state.attached && state.enabled {
                    Ok(())
                } else if state.attached {
                    Err("element is disabled".to_string())
                } else {
                    Err(detached())
                }
            }
            Self::Empty => {
                if !state.attached {
                    return Err(detached());
                }
                let content = state.value.as_deref().unwrap_or(&state.text);
                if content.is_empty() {
                    Ok(())
                } else {
                    Err(format!("received {content:?}"))
                }
            }
            Self::Count(expected) => {
                if state.count == *expected {
                    Ok(())
                } else {
                    Err(format!("received count {}", state.count))
                }
            }
        }
    }
}

impl fmt::Display for ExpectAssertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContainsText(t) => write!(f, "to_contain_text({t:?})"),
            Self::HasValue(v) => write!(f, "to_have_value({v:?})"),
            Self::Visible => f.write_str("to_be_visible()"),
            Self::Enabled => f.write_str("to_be_enabled()"),
            Self::Empty => f.write_str("to_be_empty()"),
            Self::Count(n) => write!(f, "to_have_count({n})"),
        }
    }
}

/// Expectation builder bound to a page
#[derive(Debug)]
pub struct Expect<'a> {
    page: &'a Page,
    locator: Locator,
    timeout: Duration,
}

impl<'a> Expect<'a> {
    /// Create an expectation with the page's expect timeout
    #[must_use]
    pub fn new(page: &'a Page, locator: &Locator) -> Self {
        Self {
            page,
            locator: locator.clone(),
            timeout: page.timeouts().expect(),
        }
    }

    /// Override the timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Assert the element's text contains `text`
    pub async fn to_contain_text(&self, text: &str) -> ProbeResult<()> {
        self.check(ExpectAssertion::ContainsText(text.to_string())).await
    }

    /// Assert the control's value equals `value`
    pub async fn to_have_value(&self, value: &str) -> ProbeResult<()> {
        self.check(ExpectAssertion::HasValue(value.to_string())).await
    }

    /// Assert the element is visible
    pub async fn to_be_visible(&self) -> ProbeResult<()> {
        self.check(ExpectAssertion::Visible).await
    }

    /// Assert the element is enabled
    pub async fn to_be_enabled(&self) -> ProbeResult<()> {
        self.check(ExpectAssertion::Enabled).await
    }

    /// Assert the control's value, or the element's text, is empty
    pub async fn to_be_empty(&self) -> ProbeResult<()> {
        self.check(ExpectAssertion::Empty).await
    }

    /// Assert the selector matches `count` elements
    pub async fn to_have_count(&self, count: usize) -> ProbeResult<()> {
        self.check(ExpectAssertion::Count(count)).await
    }

    /// Poll until the assertion holds
    pub async fn check(&self, assertion: ExpectAssertion) -> ProbeResult<()> {
        let last = Mutex::new(String::new());
        let what = format!("expect({}).{assertion}", self.locator);
        let (page, locator, expected, received) = (self.page, &self.locator, &assertion, &last);
        let result = poll_until(self.timeout, &what, move || async move {
            let state = page.element_state(locator).await?;
            match expected.validate(&state) {
                Ok(()) => Ok(Some(())),
                Err(message) => {
                    if let Ok(mut slot) = received.lock() {
                        *slot = message;
                    }
                    Ok(None)
                }
            }
        })
        .await;
        match result {
            Err(ProbeError::Timeout { ms, .. }) => {
                let last = last.into_inner().unwrap_or_default();
                Err(ProbeError::assertion(format!(
                    "{what} failed after {ms}ms: {last}"
                )))
            }
            other => other,
        }
    }
}
