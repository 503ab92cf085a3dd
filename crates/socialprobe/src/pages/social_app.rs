//! Page object for the API demo app of the mock social origin.
//!
//! The app is hash routed: `/api-demo#/register`, `#/login`, `#/feed` and
//! `#/profile`. Only the active view is in the document, so the register
//! and login views can share the `#username` and `#password` ids.

use crate::locator::Locator;
use crate::mock_app::pages::API_DEMO_PATH;
use crate::mock_app::DEFAULT_MOCK_ORIGIN;
use crate::page::Page;
use crate::page_object::PageObject;
use crate::result::ProbeResult;
use crate::test_data::UserData;
use std::time::Duration;

/// How long to wait for the registration response to render
pub const REGISTRATION_TIMEOUT_MS: u64 = 15_000;

/// Password used by generated mock app users
pub const MOCK_APP_PASSWORD: &str = "SecurePassword123!";

/// Fresh mock app user derived from the current time
///
/// `user<T>@example.com`, `user<T>`, `Test User <T>` with `T` in unix millis.
#[must_use]
pub fn generate_test_data() -> UserData {
    let t = chrono::Utc::now().timestamp_millis();
    UserData::new(
        format!("user{t}@example.com"),
        format!("Test User {t}"),
        format!("user{t}"),
        MOCK_APP_PASSWORD,
    )
}

/// API demo app of the mock social origin
#[derive(Debug, Clone)]
pub struct MockSocialAppPage<'a> {
    page: &'a Page,
    origin: String,
    path: String,

    /// Registration email input
    pub email_input: Locator,
    /// Registration username input
    pub username_input: Locator,
    /// Registration full name input
    pub full_name_input: Locator,
    /// Registration password input
    pub password_input: Locator,
    /// Registration submit button
    pub register_button: Locator,
    /// Registration success banner
    pub success_message: Locator,
    /// Error banner of the register and login views
    pub error_message: Locator,

    /// Login username input
    pub login_username_input: Locator,
    /// Login password input
    pub login_password_input: Locator,
    /// Login submit button
    pub login_button: Locator,
    /// Switches from login to registration
    pub create_account_button: Locator,

    /// Feed heading
    pub feed_title: Locator,
    /// Feed to profile button
    pub profile_button: Locator,
    /// Feed logout button
    pub logout_button: Locator,
    /// Feed posts
    pub posts: Locator,

    /// Profile heading
    pub profile_title: Locator,
    /// Profile username line
    pub username_display: Locator,
    /// Profile counters
    pub stats_display: Locator,
    /// Opens the profile form
    pub edit_profile_button: Locator,
    /// Profile to feed button
    pub back_to_feed_button: Locator,
    /// Profile logout button
    pub profile_logout_button: Locator,

    /// Profile edit form
    pub profile_form: Locator,
    /// Full name input of the edit form
    pub edit_full_name_input: Locator,
    /// Saves the edit form
    pub save_profile_button: Locator,
    /// Closes the edit form
    pub cancel_edit_button: Locator,
    /// Banner shown after saving
    pub update_success_message: Locator,

    heading: Locator,
    login_heading: Locator,
}

impl<'a> MockSocialAppPage<'a> {
    /// Bind the app's locators to a page, addressing the default mock origin
    #[must_use]
    pub fn new(page: &'a Page) -> Self {
        Self::with_origin(page, DEFAULT_MOCK_ORIGIN)
    }

    /// Bind the app's locators to a page, addressing `origin`
    #[must_use]
    pub fn with_origin(page: &'a Page, origin: &str) -> Self {
        let origin = origin.trim_end_matches('/').to_string();
        Self {
            page,
            path: format!("{origin}{API_DEMO_PATH}"),
            origin,
            email_input: Locator::new("#email"),
            username_input: Locator::new("#username"),
            full_name_input: Locator::new("#fullName"),
            password_input: Locator::new("#password"),
            register_button: Locator::new("#register-btn"),
            success_message: Locator::new("#success-message"),
            error_message: Locator::new("#error-message"),
            login_username_input: Locator::new("#username"),
            login_password_input: Locator::new("#password"),
            login_button: Locator::new("#login-btn"),
            create_account_button: Locator::new("button").filter_has_text("Create Account"),
            feed_title: Locator::new("h1").filter_has_text("Feed"),
            profile_button: Locator::new("#profile-btn"),
            logout_button: Locator::new("#logout-btn"),
            posts: Locator::new(".post"),
            profile_title: Locator::new("h1").filter_has_text("Profile"),
            username_display: Locator::new("#username-display"),
            stats_display: Locator::new("#stats"),
            edit_profile_button: Locator::new("#edit-profile"),
            back_to_feed_button: Locator::new("#back-to-feed"),
            profile_logout_button: Locator::new("#logout-btn-profile"),
            profile_form: Locator::new("#profile-form"),
            edit_full_name_input: Locator::new("#edit-fullName"),
            save_profile_button: Locator::new("#save-profile"),
            cancel_edit_button: Locator::new("#cancel-edit"),
            update_success_message: Locator::new("#update-success"),
            heading: Locator::new("h1"),
            login_heading: Locator::new("#login-page h1"),
        }
    }

    /// Origin the app is addressed at
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Open the registration view
    pub async fn navigate_to_register(&self) -> ProbeResult<()> {
        self.page.goto(&format!("{}#/register", self.path)).await?;
        self.page.expect(&self.heading).to_contain_text("Create Account").await
    }

    /// Open the login view
    pub async fn navigate_to_login(&self) -> ProbeResult<()> {
        self.page.goto(&format!("{}#/login", self.path)).await?;
        self.page.expect(&self.login_heading).to_contain_text("Login").await
    }

    /// Fill the registration form
    pub async fn fill_registration_form(&self, user: &UserData) -> ProbeResult<()> {
        self.page.fill(&self.email_input, &user.email).await?;
        self.page.fill(&self.username_input, &user.username).await?;
        self.page.fill(&self.full_name_input, &user.full_name).await?;
        self.page.fill(&self.password_input, &user.password).await
    }

    /// Submit the registration form
    pub async fn submit_registration(&self) -> ProbeResult<()> {
        self.page.click(&self.register_button).await
    }

    /// Wait for and check the registration success banner
    pub async fn verify_registration_success(&self) -> ProbeResult<()> {
        self.page
            .wait_for(
                &self.success_message,
                Duration::from_millis(REGISTRATION_TIMEOUT_MS),
            )
            .await?;
        self.page
            .expect(&self.success_message)
            .to_contain_text("Registration successful")
            .await
    }

    /// Log in from the login view
    pub async fn perform_login(&self, username: &str, password: &str) -> ProbeResult<()> {
        self.page.fill(&self.login_username_input, username).await?;
        self.page.fill(&self.login_password_input, password).await?;
        self.page.click(&self.login_button).await
    }

    /// Check the feed is showing
    pub async fn verify_login_success(&self) -> ProbeResult<()> {
        self.page.expect(&self.feed_title).to_be_visible().await
    }

    /// Check the feed has its two posts
    pub async fn verify_feed_content(&self) -> ProbeResult<()> {
        self.page.expect(&self.posts).to_have_count(2).await?;
        self.page
            .expect(&self.posts.clone().first())
            .to_contain_text("testuser: This is a mock post")
            .await
    }

    /// Go from the feed to the profile
    pub async fn navigate_to_profile(&self) -> ProbeResult<()> {
        self.page.click(&self.profile_button).await?;
        self.page.expect(&self.profile_title).to_be_visible().await
    }

    /// Check the profile's username and counters
    pub async fn verify_profile_info(&self, expected_username: &str) -> ProbeResult<()> {
        self.page
            .expect(&self.username_display)
            .to_contain_text(expected_username)
            .await?;
        let stats = self.page.expect(&self.stats_display);
        stats.to_contain_text("Posts: 5").await?;
        stats.to_contain_text("Followers: 150").await?;
        stats.to_contain_text("Following: 200").await
    }

    /// Open the edit form, change the full name and save
    pub async fn edit_profile(&self, new_full_name: &str) -> ProbeResult<()> {
        self.page.click(&self.edit_profile_button).await?;
        self.page.expect(&self.profile_form).to_be_visible().await?;
        self.page.fill(&self.edit_full_name_input, new_full_name).await?;
        self.page.click(&self.save_profile_button).await
    }

    /// Check the save banner
    pub async fn verify_profile_update_success(&self) -> ProbeResult<()> {
        let banner = self.page.expect(&self.update_success_message);
        banner.to_be_visible().await?;
        banner.to_contain_text("Profile updated successfully").await
    }

    /// Log out from whichever view shows a logout button
    pub async fn logout(&self) -> ProbeResult<()> {
        if self.page.is_visible(&self.logout_button).await? {
            self.page.click(&self.logout_button).await?;
        } else if self.page.is_visible(&self.profile_logout_button).await? {
            self.page.click(&self.profile_logout_button).await?;
        }
        self.page.expect(&self.heading).to_contain_text("Login").await
    }

    /// Check the login view is back with an empty username
    pub async fn verify_logout_success(&self) -> ProbeResult<()> {
        self.page.expect(&self.heading).to_contain_text("Login").await?;
        self.page.expect(&self.login_username_input).to_be_empty().await
    }

    /// Empty the registration form
    pub async fn clear_registration_form(&self) -> ProbeResult<()> {
        self.page.clear(&self.email_input).await?;
        self.page.clear(&self.username_input).await?;
        self.page.clear(&self.full_name_input).await?;
        self.page.clear(&self.password_input).await
    }

    /// Check the feed's navigation buttons
    pub async fn verify_navigation_elements(&self) -> ProbeResult<()> {
        self.page.expect(&self.profile_button).to_be_visible().await?;
        self.page.expect(&self.logout_button).to_be_visible().await
    }

    /// Check the profile can be edited
    pub async fn verify_profile_editing_elements(&self) -> ProbeResult<()> {
        let edit = self.page.expect(&self.edit_profile_button);
        edit.to_be_visible().await?;
        edit.to_be_enabled().await
    }
}

impl PageObject for MockSocialAppPage<'_> {
    fn page(&self) -> &Page {
        self.page
    }

    fn url_path(&self) -> &str {
        &self.path
    }

    fn ready_marker(&self) -> Locator {
        self.heading.clone()
    }
}
