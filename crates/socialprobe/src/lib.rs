//! Socialprobe: end-to-end browser scenarios for a social app's
//! registration, login and profile workflow.
//!
//! Two projects share one runner:
//!
//! - **Track A** drives the live registration form. Scenarios fill and
//!   validate it but never submit.
//! - **Track B** drives a mock social app. Every page of the project gets
//!   the mock route table installed, so the app is served entirely from
//!   interception; [`MockAppServer`] exposes the same table over HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐   ┌────────────┐   ┌────────────┐   ┌────────────┐
//! │ Suites     │──►│ Page       │──►│ Page +     │──►│ PageDriver │
//! │ (scenarios)│   │ objects    │   │ Expect     │   │ CDP / mock │
//! └────────────┘   └────────────┘   └────────────┘   └────────────┘
//!       │                                                  ▲
//!       ▼                                                  │
//! ┌────────────┐   ┌────────────┐                    ┌────────────┐
//! │ Scenario   │──►│ Reporter   │                    │ MockRoutes │
//! │ runner     │   │ html/junit │                    │ (Track B)  │
//! └────────────┘   └────────────┘                    └────────────┘
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

/// Web-first assertions with auto-retry
pub mod assertion;

/// Chromium over the `DevTools` protocol
#[allow(clippy::doc_markdown)]
pub mod browser;

/// Suite and project configuration
#[allow(clippy::missing_errors_doc)]
pub mod config;

/// Browser automation seam and the in-memory test driver
#[allow(clippy::missing_errors_doc)]
pub mod driver;

/// Selectors and locators
pub mod locator;

/// Mock social app: route table, documents and HTTP server
#[allow(clippy::missing_errors_doc)]
pub mod mock_app;

/// Request interception
pub mod network;

/// A browser page with timeouts and base URL resolution
#[allow(clippy::missing_errors_doc)]
pub mod page;

/// Page Object Model support
pub mod page_object;

/// Page objects for the live form and the mock app
#[allow(clippy::missing_errors_doc)]
pub mod pages;

/// Test result reporting (HTML, JUnit, JSON, list, GitHub)
#[allow(clippy::missing_errors_doc, clippy::cast_precision_loss)]
pub mod reporter;

mod result;

/// Scenarios, steps and the runner
#[allow(clippy::missing_errors_doc)]
pub mod scenario;

/// Global setup
#[allow(clippy::missing_errors_doc)]
pub mod setup;

/// Built-in scenarios
pub mod suites;

/// Test data generation
pub mod test_data;

/// Polling helpers
#[allow(clippy::missing_errors_doc)]
pub mod wait;

pub use assertion::Expect;
pub use browser::{BrowserConfig, ChromiumPageFactory};
pub use config::{ProjectConfig, ResolvedProject, SuiteConfig, TRACK_A, TRACK_B};
pub use driver::{ElementState, MockDriver, MockEffect, MockElement, PageDriver};
pub use locator::{Locator, Selector};
pub use mock_app::{social_app_routes, MockAppServer, DEFAULT_MOCK_ORIGIN};
pub use network::{InterceptedRequest, MockResponse, MockRoutes, RouteOutcome, UrlPattern};
pub use page::{Page, Timeouts};
pub use page_object::PageObject;
pub use reporter::{Reporter, TestResultEntry, TestStatus};
pub use result::{ProbeError, ProbeResult};
pub use scenario::{PageFactory, RunFilter, Scenario, ScenarioContext, ScenarioMeta, ScenarioRunner};
pub use setup::{global_setup, CredentialStatus, SetupReport};
pub use test_data::{generate_unique_user_data, UserData};

/// Prelude for writing scenarios
pub mod prelude {
    pub use super::assertion::*;
    pub use super::browser::*;
    pub use super::config::*;
    pub use super::driver::*;
    pub use super::locator::*;
    pub use super::network::*;
    pub use super::page::*;
    pub use super::page_object::*;
    pub use super::pages::*;
    pub use super::result::*;
    pub use super::scenario::*;
    pub use super::test_data::*;
    pub use super::wait::*;
}
