//! Bounded polling and selector probing.

use crate::locator::Locator;
use crate::page::Page;
use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Per-candidate timeout used by validation probes (2 seconds)
pub const PROBE_TIMEOUT_MS: u64 = 2_000;

/// Poll `check` until it yields a value or `timeout` elapses
///
/// `check` runs at least once, even with a zero timeout. Errors returned by
/// `check` end the wait immediately.
pub async fn poll_until<T, F, Fut>(timeout: Duration, what: &str, mut check: F) -> ProbeResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<Option<T>>>,
{
    let poll = Duration::from_millis(DEFAULT_POLL_INTERVAL_MS);
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(value) = check().await? {
            return Ok(value);
        }
        let now = Instant::now();
        if now >= deadline {
            return Err(ProbeError::Timeout {
                ms: timeout.as_millis() as u64,
                what: what.to_string(),
            });
        }
        tokio::time::sleep(poll.min(deadline - now)).await;
    }
}

/// Result of probing a list of candidate selectors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// A candidate became visible
    Found {
        /// The candidate that matched
        selector: String,
    },
    /// No candidate became visible in time
    NotFound,
}

impl ProbeOutcome {
    /// Whether a candidate matched
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

/// Try each candidate in order, waiting up to `per_candidate` for it to be visible
///
/// Stops at the first visible candidate. Worst case takes
/// `candidates.len() * per_candidate`.
pub async fn probe_any(page: &Page, candidates: &[&str], per_candidate: Duration) -> ProbeOutcome {
    for candidate in candidates {
        match page.wait_for(&Locator::new(*candidate), per_candidate).await {
            Ok(()) => {
                tracing::debug!(selector = candidate, "probe matched");
                return ProbeOutcome::Found {
                    selector: (*candidate).to_string(),
                };
            }
            Err(err) => tracing::debug!(selector = candidate, %err, "probe candidate missed"),
        }
    }
    ProbeOutcome::NotFound
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    mod poll_tests {
        use super::*;

        #[tokio::test]
        async fn test_returns_first_value() {
            let calls = AtomicUsize::new(0);
            let v = poll_until(Duration::from_secs(1), "third call", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok((n >= 2).then_some(n)) }
            })
            .await
            .unwrap();
            assert_eq!(v, 2);
        }

        #[tokio::test]
        async fn test_zero_timeout_checks_once() {
            let calls = AtomicUsize::new(0);
            let err = poll_until::<(), _, _>(Duration::ZERO, "never", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(None) }
            })
            .await
            .unwrap_err();
            assert_eq!(calls.load(Ordering::SeqCst), 1);
            assert!(matches!(err, ProbeError::Timeout { ms: 0, .. }));
        }

        #[tokio::test]
        async fn test_error_short_circuits() {
            let err = poll_until::<(), _, _>(Duration::from_secs(5), "x", || async {
                Err(ProbeError::page("gone"))
            })
            .await
            .unwrap_err();
            assert!(matches!(err, ProbeError::PageError { .. }));
        }
    }

    mod probe_tests {
        use super::*;

        #[tokio::test]
        async fn test_finds_later_candidate() {
            let driver = Arc::new(
                MockDriver::new().with_element(r#"span[id*="error"]"#, MockElement::text("bad")),
            );
            let page = Page::new(driver);
            let outcome = probe_any(
                &page,
                &[r#"div[role="alert"]"#, r#"span[id*="error"]"#],
                Duration::from_millis(10),
            )
            .await;
            assert_eq!(
                outcome,
                ProbeOutcome::Found {
                    selector: r#"span[id*="error"]"#.to_string()
                }
            );
        }

        #[tokio::test]
        async fn test_hidden_candidate_is_not_found() {
            let driver = Arc::new(
                MockDriver::new().with_element(r#"div[role="alert"]"#, MockElement::text("x").hidden()),
            );
            let page = Page::new(driver);
            let outcome = probe_any(&page, &[r#"div[role="alert"]"#], Duration::from_millis(10)).await;
            assert!(!outcome.is_found());
        }
    }
}
