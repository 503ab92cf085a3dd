//! Global setup, run once before any scenario.

use crate::config::SuiteConfig;
use crate::result::ProbeResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Environment variable holding the live-site username
pub const USERNAME_VAR: &str = "INSTAGRAM_USERNAME";

/// Environment variable holding the live-site password
pub const PASSWORD_VAR: &str = "INSTAGRAM_PASSWORD";

/// Whether live-site credentials are available
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CredentialStatus {
    /// Both variables are set
    Present,
    /// At least one variable is unset or empty
    Missing {
        /// Names of the missing variables
        variables: Vec<String>,
    },
}

impl CredentialStatus {
    /// Inspect credentials through a lookup function
    pub fn check_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let variables: Vec<String> = [USERNAME_VAR, PASSWORD_VAR]
            .into_iter()
            .filter(|var| lookup(var).map_or(true, |v| v.is_empty()))
            .map(str::to_string)
            .collect();
        if variables.is_empty() {
            Self::Present
        } else {
            Self::Missing { variables }
        }
    }

    /// Inspect credentials in the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::check_with(|var| std::env::var(var).ok())
    }

    /// Whether credentials are available
    #[must_use]
    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Present)
    }
}

/// What global setup found and did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupReport {
    /// Output directory, now guaranteed to exist
    pub output_dir: PathBuf,
    /// Whether setup had to create it
    pub created_output_dir: bool,
    /// Live-site credentials
    pub credentials: CredentialStatus,
}

/// Prepare the output directory and check credentials
///
/// Missing credentials only produce a warning; scenarios that need them
/// decide for themselves whether to skip.
pub fn global_setup(config: &SuiteConfig) -> ProbeResult<SetupReport> {
    global_setup_with(config, CredentialStatus::from_env())
}

/// [`global_setup`] with an explicit credential status
pub fn global_setup_with(
    config: &SuiteConfig,
    credentials: CredentialStatus,
) -> ProbeResult<SetupReport> {
    let output_dir = config.output_dir.clone();
    let created_output_dir = !output_dir.exists();
    if created_output_dir {
        fs::create_dir_all(&output_dir)?;
        tracing::info!(dir = %output_dir.display(), "created output directory");
    }
    if let CredentialStatus::Missing { variables } = &credentials {
        tracing::warn!(
            missing = %variables.join(", "),
            "live-site credentials are not set; credential-dependent scenarios will be skipped"
        );
    }
    Ok(SetupReport {
        output_dir,
        created_output_dir,
        credentials,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_present() {
        let status = CredentialStatus::check_with(|_| Some("x".to_string()));
        assert!(status.is_present());
    }

    #[test]
    fn test_empty_counts_as_missing() {
        let status = CredentialStatus::check_with(|var| {
            (var == USERNAME_VAR).then(|| "someone".to_string()).or(Some(String::new()))
        });
        assert_eq!(
            status,
            CredentialStatus::Missing {
                variables: vec![PASSWORD_VAR.to_string()]
            }
        );
    }

    #[test]
    fn test_creates_nested_output_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("a/b/test-results");
        let config = SuiteConfig::default().with_output_dir(&dir);
        let report = global_setup_with(&config, CredentialStatus::Present).unwrap();
        assert!(report.created_output_dir);
        assert!(dir.is_dir());

        let again = global_setup_with(&config, CredentialStatus::Present).unwrap();
        assert!(!again.created_output_dir);
    }

    #[test]
    fn test_missing_credentials_do_not_fail() {
        let tmp = tempfile::tempdir().unwrap();
        let config = SuiteConfig::default().with_output_dir(tmp.path());
        let report = global_setup_with(&config, CredentialStatus::check_with(|_| None)).unwrap();
        assert!(!report.credentials.is_present());
    }
}
