//! Request interception and canned responses.
//!
//! [`MockRoutes`] is an ordered table of rules. Each intercepted request is
//! offered to the rules in registration order and the **first registered
//! matching rule wins**. A rule's handler may decline a request by returning
//! [`RouteOutcome::Fallback`], in which case the next matching rule is tried.
//! A request no rule fulfils is left alone: the HTTP server answers it with
//! 404 and the browser driver lets it continue to the network.
//!
//! Handlers run once per request, so bodies that embed timestamps are fresh
//! for every request.

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// HTTP methods for request matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    /// GET request
    Get,
    /// POST request
    Post,
    /// PUT request
    Put,
    /// DELETE request
    Delete,
    /// PATCH request
    Patch,
    /// HEAD request
    Head,
    /// OPTIONS request
    Options,
    /// Any method
    Any,
}

impl HttpMethod {
    /// Parse from string, unknown methods map to `Any`
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            "PATCH" => Self::Patch,
            "HEAD" => Self::Head,
            "OPTIONS" => Self::Options,
            _ => Self::Any,
        }
    }

    /// Convert to string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Any => "*",
        }
    }

    /// Check if this method matches another
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        *self == Self::Any || *other == Self::Any || *self == *other
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A canned HTTP response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockResponse {
    /// HTTP status code
    pub status: u16,
    /// Extra response headers
    pub headers: HashMap<String, String>,
    /// Response body
    pub body: Vec<u8>,
    /// Content type
    pub content_type: String,
    /// Artificial delay in milliseconds
    pub delay_ms: u64,
}

impl Default for MockResponse {
    fn default() -> Self {
        Self {
            status: 200,
            headers: HashMap::new(),
            body: Vec::new(),
            content_type: "application/json".to_string(),
            delay_ms: 0,
        }
    }
}

impl MockResponse {
    /// Create an empty 200 response
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a JSON response
    pub fn json<T: Serialize>(data: &T) -> ProbeResult<Self> {
        Ok(Self {
            body: serde_json::to_vec(data)?,
            ..Self::default()
        })
    }

    /// Create an HTML response
    #[must_use]
    pub fn html(document: impl Into<String>) -> Self {
        Self {
            body: document.into().into_bytes(),
            content_type: "text/html".to_string(),
            ..Self::default()
        }
    }

    /// Create a text response
    #[must_use]
    pub fn text(content: &str) -> Self {
        Self {
            body: content.as_bytes().to_vec(),
            content_type: "text/plain".to_string(),
            ..Self::default()
        }
    }

    /// Create an error response
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        let body = serde_json::json!({ "error": message }).to_string();
        Self {
            status,
            body: body.into_bytes(),
            ..Self::default()
        }
    }

    /// Set status code
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// Set delay
    #[must_use]
    pub const fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Get body as string
    #[must_use]
    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Parse body as JSON
    pub fn body_json(&self) -> ProbeResult<serde_json::Value> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Pattern for matching request URLs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrlPattern {
    /// Exact URL match
    Exact(String),
    /// Prefix match
    Prefix(String),
    /// Contains substring
    Contains(String),
    /// Regex match
    Regex(String),
    /// Glob pattern: `**` matches anything, `*` anything but `/`
    Glob(String),
    /// Match any URL
    Any,
}

impl UrlPattern {
    /// Create a glob pattern
    #[must_use]
    pub fn glob(pattern: impl Into<String>) -> Self {
        Self::Glob(pattern.into())
    }

    /// Check if a URL matches this pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(pattern) => url == pattern,
            Self::Prefix(pattern) => url.starts_with(pattern),
            Self::Contains(pattern) => url.contains(pattern),
            Self::Regex(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(url))
                .unwrap_or(false),
            Self::Glob(pattern) => glob_matches(pattern, url),
            Self::Any => true,
        }
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(p) | Self::Glob(p) => f.write_str(p),
            Self::Prefix(p) => write!(f, "{p}*"),
            Self::Contains(p) => write!(f, "*{p}*"),
            Self::Regex(p) => write!(f, "/{p}/"),
            Self::Any => f.write_str("**"),
        }
    }
}

/// Translate a URL glob into an anchored regular expression
#[must_use]
pub fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2 + 2);
    out.push('^');
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                out.push_str(".*");
            }
            '*' => out.push_str("[^/]*"),
            '?' => out.push('.'),
            c => out.push_str(&regex::escape(&c.to_string())),
        }
    }
    out.push('$');
    out
}

/// Match a URL against a glob pattern
#[must_use]
pub fn glob_matches(pattern: &str, url: &str) -> bool {
    regex::Regex::new(&glob_to_regex(pattern))
        .map(|re| re.is_match(url))
        .unwrap_or(false)
}

/// Path component of a URL, without query or fragment
#[must_use]
pub fn url_path(url: &str) -> &str {
    let after_scheme = url.find("://").map_or(url, |i| &url[i + 3..]);
    let path = after_scheme
        .find('/')
        .map_or("/", |i| &after_scheme[i..]);
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

/// Origin (`scheme://host[:port]`) of a URL, if it has one
#[must_use]
pub fn url_origin(url: &str) -> Option<&str> {
    let scheme_end = url.find("://")? + 3;
    let host_end = url[scheme_end..]
        .find(['/', '?', '#'])
        .map_or(url.len(), |i| scheme_end + i);
    Some(&url[..host_end])
}

/// A request offered to the route table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterceptedRequest {
    /// Absolute request URL
    pub url: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body
    pub body: Option<Vec<u8>>,
}

impl InterceptedRequest {
    /// Create a request without headers or body
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Create a GET request
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// Create a POST request with a JSON body
    #[must_use]
    pub fn post_json(url: impl Into<String>, body: &serde_json::Value) -> Self {
        Self::new(HttpMethod::Post, url)
            .with_header("content-type", "application/json")
            .with_body(body.to_string().into_bytes())
    }

    /// Set the body
    #[must_use]
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_lowercase(), value.to_string());
        self
    }

    /// Path component of the URL
    #[must_use]
    pub fn path(&self) -> &str {
        url_path(&self.url)
    }

    /// Get body as string
    #[must_use]
    pub fn body_string(&self) -> Option<String> {
        self.body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).to_string())
    }

    /// Parse body as JSON
    pub fn body_json<T: for<'de> Deserialize<'de>>(&self) -> ProbeResult<T> {
        let body = self.body.as_ref().ok_or_else(|| ProbeError::RouteError {
            message: "No request body".to_string(),
        })?;
        Ok(serde_json::from_slice(body)?)
    }
}

/// What a route handler decided to do with a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Answer with this response
    Fulfill(MockResponse),
    /// Offer the request to the next matching rule
    Fallback,
}

/// A route handler
pub type RouteHandler = Arc<dyn Fn(&InterceptedRequest) -> RouteOutcome + Send + Sync>;

/// A single interception rule
#[derive(Clone)]
pub struct RouteRule {
    /// URL pattern to match
    pub pattern: UrlPattern,
    /// HTTP method to match
    pub method: HttpMethod,
    handler: RouteHandler,
}

impl RouteRule {
    /// Create a rule
    pub fn new<F>(pattern: UrlPattern, method: HttpMethod, handler: F) -> Self
    where
        F: Fn(&InterceptedRequest) -> RouteOutcome + Send + Sync + 'static,
    {
        Self {
            pattern,
            method,
            handler: Arc::new(handler),
        }
    }

    /// Create a rule that always answers with the same response
    #[must_use]
    pub fn fixed(pattern: UrlPattern, method: HttpMethod, response: MockResponse) -> Self {
        Self::new(pattern, method, move |_| {
            RouteOutcome::Fulfill(response.clone())
        })
    }

    /// Check if this rule applies to a request
    #[must_use]
    pub fn matches(&self, request: &InterceptedRequest) -> bool {
        self.method.matches(&request.method) && self.pattern.matches(&request.url)
    }

    /// Run the handler
    #[must_use]
    pub fn handle(&self, request: &InterceptedRequest) -> RouteOutcome {
        (self.handler)(request)
    }
}

impl fmt::Debug for RouteRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteRule")
            .field("pattern", &self.pattern)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

/// Ordered route table with a shared request log
///
/// Clones share the request log, so a table handed to a server or a driver
/// can still be inspected by the test that built it. Capture is on by
/// default; long-lived tables turn it off with [`MockRoutes::without_capture`].
#[derive(Debug, Clone)]
pub struct MockRoutes {
    rules: Vec<RouteRule>,
    captured: Arc<Mutex<Vec<InterceptedRequest>>>,
    capture: bool,
}

impl Default for MockRoutes {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            captured: Arc::default(),
            capture: true,
        }
    }
}

impl MockRoutes {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop recording handled requests
    #[must_use]
    pub fn without_capture(mut self) -> Self {
        self.capture = false;
        self.captured = Arc::default();
        self
    }

    /// Whether handled requests are recorded
    #[must_use]
    pub const fn captures(&self) -> bool {
        self.capture
    }

    /// Append a rule
    pub fn route(&mut self, rule: RouteRule) {
        self.rules.push(rule);
    }

    /// Append a rule, builder style
    #[must_use]
    pub fn with_route(mut self, rule: RouteRule) -> Self {
        self.route(rule);
        self
    }

    /// Append a rule from a pattern, method and handler
    #[must_use]
    pub fn on<F>(self, pattern: UrlPattern, method: HttpMethod, handler: F) -> Self
    where
        F: Fn(&InterceptedRequest) -> RouteOutcome + Send + Sync + 'static,
    {
        self.with_route(RouteRule::new(pattern, method, handler))
    }

    /// Registered rules in precedence order
    #[must_use]
    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// Number of registered rules
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether any rule could apply to the request
    #[must_use]
    pub fn intercepts(&self, request: &InterceptedRequest) -> bool {
        self.rules.iter().any(|rule| rule.matches(request))
    }

    /// Offer a request to the table; `None` means nothing fulfilled it
    pub fn handle(&self, request: &InterceptedRequest) -> Option<MockResponse> {
        if self.capture {
            if let Ok(mut captured) = self.captured.lock() {
                captured.push(request.clone());
            }
        }
        for rule in self.rules.iter().filter(|rule| rule.matches(request)) {
            match rule.handle(request) {
                RouteOutcome::Fulfill(response) => {
                    tracing::debug!(
                        method = %request.method,
                        url = %request.url,
                        pattern = %rule.pattern,
                        status = response.status,
                        "route fulfilled"
                    );
                    return Some(response);
                }
                RouteOutcome::Fallback => continue,
            }
        }
        tracing::debug!(method = %request.method, url = %request.url, "no route fulfilled request");
        None
    }

    /// Every request offered to the table so far
    #[must_use]
    pub fn captured_requests(&self) -> Vec<InterceptedRequest> {
        self.captured
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    /// Captured requests matching a pattern and method
    #[must_use]
    pub fn requests_matching(
        &self,
        pattern: &UrlPattern,
        method: HttpMethod,
    ) -> Vec<InterceptedRequest> {
        self.captured_requests()
            .into_iter()
            .filter(|r| pattern.matches(&r.url) && method.matches(&r.method))
            .collect()
    }

    /// Assert that at least one matching request was seen
    pub fn assert_requested(&self, pattern: &UrlPattern, method: HttpMethod) -> ProbeResult<()> {
        if self.requests_matching(pattern, method).is_empty() {
            return Err(ProbeError::assertion(format!(
                "Expected a {method} request matching {pattern}, none was seen"
            )));
        }
        Ok(())
    }

    /// Forget captured requests
    pub fn clear_captured(&self) {
        if let Ok(mut captured) = self.captured.lock() {
            captured.clear();
        }
    }
}
