//! Error types for scwctl
//!
//! Core errors are mapped onto a small set of user-facing variants, each
//! with suggestions printed as cargo-style tips.

use colored::Colorize;
use scwctl_core::{ConfigError, ScwError};
use thiserror::Error;

/// Cargo-style diagnostic formatter for CLI errors.
///
/// Produces structured output like:
/// ```text
/// error: Profile 'prod' not found
///
///   tip: List available profiles: scwctl profile list
/// ```
pub struct CliDiagnostic {
    message: String,
    detail: Option<String>,
    tips: Vec<String>,
}

impl CliDiagnostic {
    /// Start a new error diagnostic with the given message.
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
            detail: None,
            tips: Vec::new(),
        }
    }

    /// Add a detail line below the error message.
    pub fn detail(mut self, text: &str) -> Self {
        self.detail = Some(text.to_string());
        self
    }

    pub fn tip(mut self, description: &str) -> Self {
        self.tips.push(description.to_string());
        self
    }

    /// Print the diagnostic to stderr with colored formatting.
    pub fn print(&self) {
        eprint!("{}{}", "error".red().bold(), ": ".bold());
        eprintln!("{}", self.message);

        if let Some(detail) = &self.detail {
            for line in detail.lines() {
                eprintln!("  {}", line);
            }
        }

        for description in &self.tips {
            eprintln!();
            eprint!("  {}{}", "tip".yellow().bold(), ": ".bold());
            eprintln!("{}", description);
        }
    }
}

/// Main error type for the scwctl application
#[derive(Error, Debug)]
pub enum ScwCtlError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("No profile configured. Use 'scwctl profile set' to configure a profile.")]
    NoProfileConfigured,

    #[error("Missing credentials for profile '{name}'")]
    MissingCredentials { name: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("API error: {message}")]
    ApiError { message: String },

    /// Several failures at once, typically from a sweep
    #[error("{count} operations failed")]
    PartialFailure { count: usize, details: Vec<String> },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Refusing to sweep without --yes")]
    ConfirmationRequired,

    #[error("File error for '{path}': {message}")]
    FileError { path: String, message: String },

    #[error("Connection error: {message}")]
    ConnectionError { message: String },

    #[error("Timeout: {message}")]
    Timeout { message: String },

    #[error("Output formatting error: {message}")]
    OutputError { message: String },
}

/// Result type for scwctl operations
pub type Result<T> = std::result::Result<T, ScwCtlError>;

impl ScwCtlError {
    /// Get helpful suggestions for resolving this error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            ScwCtlError::ProfileNotFound { name } => vec![
                "List available profiles: scwctl profile list".to_string(),
                format!("Create profile '{}': scwctl profile set {} --secret-key <key>", name, name),
            ],
            ScwCtlError::NoProfileConfigured => vec![
                "Create a profile: scwctl profile set default --secret-key <key> --default-zone fr-par-1".to_string(),
                "Or export SCW_SECRET_KEY (and optionally SCW_DEFAULT_PROJECT_ID, SCW_DEFAULT_ZONE)".to_string(),
            ],
            ScwCtlError::MissingCredentials { name } => vec![
                format!("Update profile credentials: scwctl profile set {} --secret-key <key>", name),
                format!("Check profile details: scwctl profile show {}", name),
                "Verify SCW_SECRET_KEY is set correctly".to_string(),
            ],
            ScwCtlError::AuthenticationFailed { .. } => vec![
                "Check your credentials: scwctl profile show <profile>".to_string(),
                "Make sure the secret key has not been revoked".to_string(),
            ],
            ScwCtlError::NotFound { .. } => vec![
                "Verify the resource ID is correct".to_string(),
                "Resources are scoped to a zone or region: pass --zone / --region".to_string(),
            ],
            ScwCtlError::ConfirmationRequired => vec![
                "Sweeping deletes every matching resource; re-run with --yes to proceed".to_string(),
            ],
            ScwCtlError::ConnectionError { .. } => vec![
                "Check network connectivity".to_string(),
                "Verify the API URL: scwctl profile show <profile>".to_string(),
            ],
            ScwCtlError::Timeout { .. } => vec![
                "Raise the limit with --timeout, or the profile's poll_timeout".to_string(),
            ],
            ScwCtlError::InvalidInput { .. } => vec![
                "Check the command syntax: scwctl <command> --help".to_string(),
            ],
            ScwCtlError::FileError { path, .. } => vec![
                format!("Check that file exists: {}", path),
                "Verify file permissions are correct".to_string(),
            ],
            _ => vec![],
        }
    }

    /// Print a cargo-style diagnostic to stderr using colored formatting.
    pub fn print_diagnostic(&self) {
        let mut diag = CliDiagnostic::error(&self.to_string());

        if let ScwCtlError::PartialFailure { details, .. } = self {
            diag = diag.detail(&details.join("\n"));
        }

        for suggestion in self.suggestions() {
            diag = diag.tip(&suggestion);
        }

        diag.print();
    }
}

impl From<ScwError> for ScwCtlError {
    fn from(err: ScwError) -> Self {
        let err = match err {
            ScwError::Config(config) => return config.into(),
            ScwError::Multiple(list) => {
                let mut errors = list.into_vec();
                if errors.len() == 1 {
                    return errors.remove(0).into();
                }
                return ScwCtlError::PartialFailure {
                    count: errors.len(),
                    details: errors.iter().map(ToString::to_string).collect(),
                };
            }
            other => other,
        };

        let message = err.to_string();
        match err.root() {
            ScwError::AuthenticationFailed { .. } | ScwError::PermissionDenied { .. } => {
                ScwCtlError::AuthenticationFailed { message }
            }
            ScwError::NotFound { .. } => ScwCtlError::NotFound { message },
            ScwError::Transport(_) => ScwCtlError::ConnectionError { message },
            ScwError::MaxRetriesExceeded { .. } => ScwCtlError::Timeout { message },
            ScwError::InvalidArgument(_) | ScwError::InvalidLocality(_) => {
                ScwCtlError::InvalidInput { message }
            }
            _ => ScwCtlError::ApiError { message },
        }
    }
}

impl From<ConfigError> for ScwCtlError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ProfileNotFound { name } => ScwCtlError::ProfileNotFound { name },
            ConfigError::NoProfiles { .. } => ScwCtlError::NoProfileConfigured,
            ConfigError::MissingCredential { profile, .. } => {
                ScwCtlError::MissingCredentials { name: profile }
            }
            other => ScwCtlError::Configuration(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ScwCtlError {
    fn from(err: serde_json::Error) -> Self {
        ScwCtlError::OutputError {
            message: format!("JSON error: {}", err),
        }
    }
}

impl From<std::io::Error> for ScwCtlError {
    fn from(err: std::io::Error) -> Self {
        ScwCtlError::OutputError {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<anyhow::Error> for ScwCtlError {
    fn from(err: anyhow::Error) -> Self {
        ScwCtlError::InvalidInput {
            message: format!("{:#}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scwctl_core::ErrorList;

    #[test]
    fn test_not_found_keeps_context() {
        let err = ScwError::from_status(404, "resource is not found".into(), None)
            .context("error deleting block volume v1");
        let cli: ScwCtlError = err.into();
        assert!(matches!(cli, ScwCtlError::NotFound { .. }));
        assert_eq!(
            cli.to_string(),
            "error deleting block volume v1: Not found: resource is not found"
        );
    }

    #[test]
    fn test_several_failures_become_partial_failure() {
        let mut list = ErrorList::new();
        list.push(ScwError::from_status(409, "busy".into(), None).context("error deleting a"));
        list.push(ScwError::from_status(500, "boom".into(), None).context("error deleting b"));
        let cli: ScwCtlError = list.into_result().unwrap_err().into();
        match cli {
            ScwCtlError::PartialFailure { count, details } => {
                assert_eq!(count, 2);
                assert_eq!(details[0], "error deleting a: Conflict: busy");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_config_errors_map_to_profile_variants() {
        let cli: ScwCtlError = ConfigError::NoProfiles {
            suggestion: String::new(),
        }
        .into();
        assert!(matches!(cli, ScwCtlError::NoProfileConfigured));
        assert!(!cli.suggestions().is_empty());
    }

    #[test]
    fn test_wrapped_config_error_is_unwrapped() {
        let cli: ScwCtlError = ScwError::Config(ConfigError::ProfileNotFound {
            name: "x".to_string(),
        })
        .into();
        assert!(matches!(cli, ScwCtlError::ProfileNotFound { ref name } if name == "x"));
    }
}
