//! Built-in scenarios.
//!
//! Each file is one source for project `test_match` globs: the live-site
//! project picks up `instagram_*.rs`, the mock project `mock_*.rs`.

pub mod instagram_registration;
pub mod mock_social_app;

use crate::scenario::Scenario;

/// Every built-in scenario, live-site ones first
#[must_use]
pub fn all_scenarios() -> Vec<Scenario> {
    let mut scenarios = instagram_registration::scenarios();
    scenarios.extend(mock_social_app::scenarios());
    scenarios
}
