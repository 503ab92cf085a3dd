//! Synthetic user records for registration and login scenarios.
//!
//! Usernames are made unique per call from the wall clock plus a random
//! suffix: `testuser_<unix millis>_<0..=9999>`. This is collision resistant
//! within a run, not cryptographically unique.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Email used by every generated record
pub const DEFAULT_EMAIL: &str = "test@example.com";
/// Full name used by every generated record
pub const DEFAULT_FULL_NAME: &str = "Test User";
/// Password used by every generated record
pub const DEFAULT_PASSWORD: &str = "TestPassword123!";
/// Prefix of generated usernames
pub const USERNAME_PREFIX: &str = "testuser";
/// Malformed email used by the invalid-email probe
pub const INVALID_EMAIL: &str = "invalid-email";
/// Short password used by the weak-password probe
pub const WEAK_PASSWORD: &str = "weak";

/// A registration form record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    /// Email or phone field
    pub email: String,
    /// Full name field
    pub full_name: String,
    /// Username field
    pub username: String,
    /// Password field
    pub password: String,
}

impl UserData {
    /// Create a record from its four fields
    pub fn new(
        email: impl Into<String>,
        full_name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            full_name: full_name.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Replace every field set in `overrides`
    #[must_use]
    pub fn with_overrides(mut self, overrides: &UserOverrides) -> Self {
        if let Some(email) = &overrides.email {
            self.email.clone_from(email);
        }
        if let Some(full_name) = &overrides.full_name {
            self.full_name.clone_from(full_name);
        }
        if let Some(username) = &overrides.username {
            self.username.clone_from(username);
        }
        if let Some(password) = &overrides.password {
            self.password.clone_from(password);
        }
        self
    }

    /// Whether all four fields are empty
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.email.is_empty()
            && self.full_name.is_empty()
            && self.username.is_empty()
            && self.password.is_empty()
    }
}

/// A partial record used to corrupt one field of a valid record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOverrides {
    /// Replacement email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Replacement full name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Replacement username
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Replacement password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Build a username from a timestamp and suffix
#[must_use]
pub fn unique_username(unix_millis: i64, suffix: u32) -> String {
    format!("{USERNAME_PREFIX}_{unix_millis}_{suffix}")
}

/// Generate a valid record with a fresh username
#[must_use]
pub fn generate_unique_user_data() -> UserData {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = rand::thread_rng().gen_range(0..=9999);
    UserData::new(
        DEFAULT_EMAIL,
        DEFAULT_FULL_NAME,
        unique_username(millis, suffix),
        DEFAULT_PASSWORD,
    )
}

/// Override replacing the email with a malformed address
#[must_use]
pub fn invalid_email_data() -> UserOverrides {
    UserOverrides {
        email: Some(INVALID_EMAIL.to_string()),
        ..UserOverrides::default()
    }
}

/// Override replacing the password with one that is too weak
#[must_use]
pub fn weak_password_data() -> UserOverrides {
    UserOverrides {
        password: Some(WEAK_PASSWORD.to_string()),
        ..UserOverrides::default()
    }
}

/// A record with every field empty
#[must_use]
pub fn empty_form_data() -> UserData {
    UserData::new("", "", "", "")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod generator_tests {
        use super::*;

        #[test]
        fn test_generated_fixed_fields() {
            let user = generate_unique_user_data();
            assert_eq!(user.email, DEFAULT_EMAIL);
            assert_eq!(user.full_name, DEFAULT_FULL_NAME);
            assert_eq!(user.password, DEFAULT_PASSWORD);
        }

        #[test]
        fn test_generated_username_shape() {
            let re = regex::Regex::new(r"^testuser_\d+_(\d{1,4})$").unwrap();
            let user = generate_unique_user_data();
            let caps = re.captures(&user.username).expect("username shape");
            let suffix: u32 = caps[1].parse().unwrap();
            assert!(suffix <= 9999);
        }

        #[test]
        fn test_two_calls_differ() {
            let a = generate_unique_user_data();
            let b = generate_unique_user_data();
            let c = generate_unique_user_data();
            // millis can repeat, the random suffix makes a triple collision vanishingly rare
            assert!(a.username != b.username || b.username != c.username);
        }

        #[test]
        fn test_unique_username_format() {
            assert_eq!(unique_username(1_700_000_000_000, 42), "testuser_1700000000000_42");
        }
    }

    mod override_tests {
        use super::*;

        #[test]
        fn test_invalid_email_only_touches_email() {
            let base = generate_unique_user_data();
            let bad = base.clone().with_overrides(&invalid_email_data());
            assert_eq!(bad.email, "invalid-email");
            assert_eq!(bad.username, base.username);
            assert_eq!(bad.password, base.password);
        }

        #[test]
        fn test_weak_password_only_touches_password() {
            let base = generate_unique_user_data();
            let weak = base.clone().with_overrides(&weak_password_data());
            assert_eq!(weak.password, "weak");
            assert_eq!(weak.email, base.email);
        }

        #[test]
        fn test_empty_form_is_blank() {
            assert!(empty_form_data().is_blank());
            assert!(!generate_unique_user_data().is_blank());
        }

        #[test]
        fn test_serializes_camel_case() {
            let json = serde_json::to_value(empty_form_data()).unwrap();
            assert!(json.get("fullName").is_some());
            let partial = serde_json::to_value(weak_password_data()).unwrap();
            assert_eq!(partial, serde_json::json!({"password": "weak"}));
        }
    }
}
