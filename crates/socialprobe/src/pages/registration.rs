//! Live-site registration form.
//!
//! Fields are located by their ARIA labels. The site's validation markup is
//! not stable, so validation is checked by probing a list of candidate
//! error selectors and falling back to the submit button's disabled state.

use crate::locator::Locator;
use crate::page::Page;
use crate::page_object::PageObject;
use crate::result::ProbeResult;
use crate::test_data::UserData;
use crate::wait::{probe_any, ProbeOutcome, PROBE_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Relative path of the sign-up form
pub const REGISTRATION_PATH: &str = "/accounts/emailsignup/";

/// Candidate selectors signalling an email validation error
pub const EMAIL_ERROR_SELECTORS: &[&str] = &[
    r#"div[role="alert"]"#,
    r#"div:has-text("Enter a valid email address")"#,
    r#"div[id*="error"]"#,
    r#"span[id*="error"]"#,
];

/// Candidate selectors signalling a password validation error
pub const PASSWORD_ERROR_SELECTORS: &[&str] = &[
    r#"div[role="alert"]"#,
    r#"div:has-text("password")"#,
    r#"div:has-text("weak")"#,
    r#"div[id*="error"]"#,
    r#"span[id*="error"]"#,
];

/// How the form reacted to invalid input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "feedback", rename_all = "snake_case")]
pub enum ValidationFeedback {
    /// An error indicator became visible
    Message {
        /// The candidate selector that matched
        selector: String,
    },
    /// No message, but the submit button is disabled
    SubmitDisabled,
    /// Neither signal was observed
    Missing,
}

impl ValidationFeedback {
    /// Whether the form signalled the problem in some way
    #[must_use]
    pub const fn is_signalled(&self) -> bool {
        !matches!(self, Self::Missing)
    }
}

/// Registration form of the live site
#[derive(Debug, Clone)]
pub struct RegistrationPage<'a> {
    page: &'a Page,
    /// Email or phone input
    pub email_input: Locator,
    /// Full name input
    pub full_name_input: Locator,
    /// Username input
    pub username_input: Locator,
    /// Password input
    pub password_input: Locator,
    /// Sign up button
    pub sign_up_button: Locator,
    probe_timeout: Duration,
}

impl<'a> RegistrationPage<'a> {
    /// Bind the form's locators to a page
    #[must_use]
    pub fn new(page: &'a Page) -> Self {
        Self {
            page,
            email_input: Locator::new(r#"input[aria-label="Mobile Number or Email"]"#),
            full_name_input: Locator::new(r#"input[aria-label="Full Name"]"#),
            username_input: Locator::new(r#"input[aria-label="Username"]"#),
            password_input: Locator::new(r#"input[aria-label="Password"]"#),
            sign_up_button: Locator::new(r#"button:has-text("Sign up")"#),
            probe_timeout: Duration::from_millis(PROBE_TIMEOUT_MS),
        }
    }

    /// Override the per-candidate probe timeout
    #[must_use]
    pub const fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Open the sign-up form relative to the page's base URL
    pub async fn navigate(&self) -> ProbeResult<()> {
        self.open().await
    }

    /// Fill the email field
    pub async fn fill_email(&self, email: &str) -> ProbeResult<()> {
        self.page.fill(&self.email_input, email).await
    }

    /// Fill the full name field
    pub async fn fill_full_name(&self, full_name: &str) -> ProbeResult<()> {
        self.page.fill(&self.full_name_input, full_name).await
    }

    /// Fill the username field
    pub async fn fill_username(&self, username: &str) -> ProbeResult<()> {
        self.page.fill(&self.username_input, username).await
    }

    /// Fill the password field
    pub async fn fill_password(&self, password: &str) -> ProbeResult<()> {
        self.page.fill(&self.password_input, password).await
    }

    /// Fill all four fields in form order
    pub async fn fill_form(&self, user: &UserData) -> ProbeResult<()> {
        self.fill_email(&user.email).await?;
        self.fill_full_name(&user.full_name).await?;
        self.fill_username(&user.username).await?;
        self.fill_password(&user.password).await
    }

    /// Assert every field holds the record's value
    pub async fn expect_values(&self, user: &UserData) -> ProbeResult<()> {
        self.page.expect(&self.email_input).to_have_value(&user.email).await?;
        self.page
            .expect(&self.full_name_input)
            .to_have_value(&user.full_name)
            .await?;
        self.page
            .expect(&self.username_input)
            .to_have_value(&user.username)
            .await?;
        self.page
            .expect(&self.password_input)
            .to_have_value(&user.password)
            .await
    }

    /// Look for feedback after entering an invalid email
    pub async fn verify_email_validation(&self) -> ValidationFeedback {
        self.verify_validation("email", EMAIL_ERROR_SELECTORS).await
    }

    /// Look for feedback after entering a weak password
    pub async fn verify_password_validation(&self) -> ValidationFeedback {
        self.verify_validation("password", PASSWORD_ERROR_SELECTORS).await
    }

    async fn verify_validation(&self, field: &str, candidates: &[&str]) -> ValidationFeedback {
        if let ProbeOutcome::Found { selector } =
            probe_any(self.page, candidates, self.probe_timeout).await
        {
            return ValidationFeedback::Message { selector };
        }
        match self.page.is_disabled(&self.sign_up_button).await {
            Ok(true) => ValidationFeedback::SubmitDisabled,
            Ok(false) => {
                tracing::warn!(
                    field,
                    "no {field} validation message found, but the sign up button is still enabled"
                );
                ValidationFeedback::Missing
            }
            Err(err) => {
                tracing::warn!(field, %err, "{field} validation check completed without a signal");
                ValidationFeedback::Missing
            }
        }
    }

    /// Empty all four fields
    pub async fn clear_form(&self) -> ProbeResult<()> {
        self.page.clear(&self.email_input).await?;
        self.page.clear(&self.full_name_input).await?;
        self.page.clear(&self.username_input).await?;
        self.page.clear(&self.password_input).await
    }
}

impl PageObject for RegistrationPage<'_> {
    fn page(&self) -> &Page {
        self.page
    }

    fn url_path(&self) -> &str {
        REGISTRATION_PATH
    }

    fn ready_marker(&self) -> Locator {
        self.email_input.clone()
    }

    fn load_timeout_ms(&self) -> u64 {
        self.page.timeouts().navigation_ms
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement};
    use crate::page::Timeouts;
    use std::sync::Arc;

    fn form_driver() -> MockDriver {
        MockDriver::new()
            .with_element(r#"input[aria-label="Mobile Number or Email"]"#, MockElement::input())
            .with_element(r#"input[aria-label="Full Name"]"#, MockElement::input())
            .with_element(r#"input[aria-label="Username"]"#, MockElement::input())
            .with_element(r#"input[aria-label="Password"]"#, MockElement::input())
    }

    fn quick(driver: MockDriver) -> (Arc<MockDriver>, Page) {
        let driver = Arc::new(driver);
        let page = Page::new(driver.clone())
            .with_base_url("https://www.instagram.com")
            .with_timeouts(Timeouts {
                action_ms: 50,
                navigation_ms: 50,
                expect_ms: 50,
            });
        (driver, page)
    }

    #[test]
    fn test_sign_up_locator_parses_has_text() {
        let driver = Arc::new(MockDriver::new());
        let page = Page::new(driver);
        let form = RegistrationPage::new(&page);
        assert_eq!(form.sign_up_button.to_string(), r#"button:has-text("Sign up")"#);
    }

    #[tokio::test]
    async fn test_navigate_uses_signup_path() {
        let (driver, page) = quick(form_driver());
        RegistrationPage::new(&page).navigate().await.unwrap();
        assert!(driver.was_called("goto:https://www.instagram.com/accounts/emailsignup/"));
    }

    #[tokio::test]
    async fn test_message_found() {
        let (_, page) = quick(
            form_driver().with_element(r#"div[id*="error"]"#, MockElement::text("Enter a valid email address.")),
        );
        let form = RegistrationPage::new(&page).with_probe_timeout(Duration::from_millis(5));
        assert_eq!(
            form.verify_email_validation().await,
            ValidationFeedback::Message {
                selector: r#"div[id*="error"]"#.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_falls_back_to_disabled_button() {
        let (_, page) = quick(
            form_driver().with_element(r#"button:has-text("Sign up")"#, MockElement::text("Sign up").disabled()),
        );
        let form = RegistrationPage::new(&page).with_probe_timeout(Duration::from_millis(5));
        assert_eq!(
            form.verify_password_validation().await,
            ValidationFeedback::SubmitDisabled
        );
    }

    #[tokio::test]
    async fn test_missing_is_soft() {
        let (_, page) = quick(
            form_driver().with_element(r#"button:has-text("Sign up")"#, MockElement::text("Sign up")),
        );
        let form = RegistrationPage::new(&page).with_probe_timeout(Duration::from_millis(5));
        let feedback = form.verify_email_validation().await;
        assert_eq!(feedback, ValidationFeedback::Missing);
        assert!(!feedback.is_signalled());
    }

    #[tokio::test]
    async fn test_missing_button_is_soft_too() {
        let (_, page) = quick(form_driver());
        let form = RegistrationPage::new(&page).with_probe_timeout(Duration::from_millis(5));
        assert_eq!(form.verify_email_validation().await, ValidationFeedback::Missing);
    }
}
