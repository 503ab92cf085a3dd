//! Page objects for the live registration form and the mock social app.

pub mod demo;
pub mod registration;
pub mod social_app;

pub use demo::{DemoPage, WorkflowProgress};
pub use registration::{RegistrationPage, ValidationFeedback};
pub use social_app::{generate_test_data, MockSocialAppPage};
