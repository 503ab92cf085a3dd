//! Element locators.
//!
//! A [`Locator`] is a lazy description of elements on a page. It is resolved
//! by a [`crate::driver::PageDriver`] every time it is queried, so the same
//! locator can be polled while the DOM changes underneath it.
//!
//! Selectors use the CSS dialect of the browser plus one extension: a trailing
//! `:has-text("...")` restricts matches to elements whose text content
//! contains the given string.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default timeout for auto-waiting locator actions (5 seconds)
pub const DEFAULT_LOCATOR_TIMEOUT_MS: u64 = 5_000;

const HAS_TEXT_OPEN: &str = ":has-text(";

/// Selector for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selector {
    /// CSS selector (e.g., `input[aria-label="Username"]`)
    Css(String),
    /// Any element whose text content contains the string
    Text(String),
    /// CSS selector filtered by text content
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create a CSS selector with a text filter
    #[must_use]
    pub fn css_with_text(css: impl Into<String>, text: impl Into<String>) -> Self {
        Self::CssWithText {
            css: css.into(),
            text: text.into(),
        }
    }

    /// Parse a selector string, recognising a trailing `:has-text("...")`
    ///
    /// ```
    /// use socialprobe::Selector;
    ///
    /// let sel = Selector::parse(r#"button:has-text("Sign up")"#);
    /// assert_eq!(sel, Selector::css_with_text("button", "Sign up"));
    /// assert_eq!(Selector::parse("#email"), Selector::css("#email"));
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Some(start) = trimmed.find(HAS_TEXT_OPEN) {
            let (css, rest) = trimmed.split_at(start);
            let inner = &rest[HAS_TEXT_OPEN.len()..];
            if let Some(inner) = inner.strip_suffix(')') {
                if let Some(text) = unquote(inner.trim()) {
                    return if css.is_empty() {
                        Self::Text(text.to_string())
                    } else {
                        Self::css_with_text(css, text)
                    };
                }
            }
        }
        Self::Css(trimmed.to_string())
    }

    /// JavaScript expression evaluating to the array of matching elements
    #[must_use]
    pub fn to_query_all(&self) -> String {
        match self {
            Self::Css(css) => format!(
                "Array.from(document.querySelectorAll({}))",
                js_string(css)
            ),
            Self::Text(text) => format!(
                "Array.from(document.querySelectorAll('body *')).filter(el => el.textContent.includes({}) && !Array.from(el.children).some(c => c.textContent.includes({})))",
                js_string(text),
                js_string(text)
            ),
            Self::CssWithText { css, text } => format!(
                "Array.from(document.querySelectorAll({})).filter(el => el.textContent.includes({}))",
                js_string(css),
                js_string(text)
            ),
        }
    }

    /// JavaScript expression counting matches
    #[must_use]
    pub fn to_count_query(&self) -> String {
        format!("{}.length", self.to_query_all())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(css) => f.write_str(css),
            Self::Text(text) => write!(f, ":has-text({text:?})"),
            Self::CssWithText { css, text } => write!(f, "{css}:has-text({text:?})"),
        }
    }
}

impl From<&str> for Selector {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

fn unquote(s: &str) -> Option<&str> {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| s.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
}

/// Encode a Rust string as a JavaScript string literal
fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// A selector plus the element index and timeout used when acting on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    selector: Selector,
    index: Option<usize>,
    timeout_ms: Option<u64>,
}

impl Locator {
    /// Create a locator from a selector string
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::parse(&selector.into()))
    }

    /// Create a locator from a typed selector
    #[must_use]
    pub const fn from_selector(selector: Selector) -> Self {
        Self {
            selector,
            index: None,
            timeout_ms: None,
        }
    }

    /// Restrict the locator to elements whose text contains `text`
    #[must_use]
    pub fn filter_has_text(self, text: impl Into<String>) -> Self {
        let selector = match self.selector {
            Selector::Css(css) => Selector::css_with_text(css, text),
            Selector::CssWithText { css, .. } => Selector::css_with_text(css, text),
            Selector::Text(_) => Selector::text(text),
        };
        Self { selector, ..self }
    }

    /// Target the first match
    #[must_use]
    pub fn first(self) -> Self {
        self.nth(0)
    }

    /// Target the n-th match (zero based)
    #[must_use]
    pub const fn nth(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Override the action timeout for this locator
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// The underlying selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Element index, `None` means the first match
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        self.index
    }

    /// Element index with the default applied
    #[must_use]
    pub fn target_index(&self) -> usize {
        self.index.unwrap_or(0)
    }

    /// Per-locator timeout override
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// JavaScript expression evaluating to the targeted element or `null`
    #[must_use]
    pub fn to_query(&self) -> String {
        format!("({}[{}] ?? null)", self.selector.to_query_all(), self.target_index())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{} >> nth={i}", self.selector),
            None => write!(f, "{}", self.selector),
        }
    }
}

impl From<&str> for Locator {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}
