//! Error types for cloud provider operations.
//!
//! Errors are categorized so callers can tell apart conditions that
//! abort a run (missing build tool, invalid template), conditions that
//! skip a single provider (no credentials, CLI not installed), and
//! conditions that are recorded per resource and never abort anything
//! (an individual delete failing).

use crate::types::Provider;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Categories of provider errors, driving skip/abort decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Credentials absent or rejected
    Auth,
    /// Vendor CLI not installed
    CliMissing,
    /// Resource no longer exists
    NotFound,
    /// Resource still referenced by something else
    InUse,
    /// Operation denied by provider IAM
    Permission,
    /// Vendor CLI output could not be parsed
    Parse,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Whether this category degrades to "skip this provider" rather
    /// than aborting the whole run.
    pub fn skips_provider(&self) -> bool {
        matches!(self, Self::Auth | Self::CliMissing)
    }

    /// Whether a delete hitting this category left nothing to do.
    pub fn is_already_gone(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Auth => "Credentials missing or invalid",
            Self::CliMissing => "Provider CLI not installed",
            Self::NotFound => "Resource not found",
            Self::InUse => "Resource in use",
            Self::Permission => "Permission denied",
            Self::Parse => "Unparseable CLI output",
            Self::Other => "Unexpected error",
        }
    }
}

/// Errors from cloud provider and build tool operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A required external tool is not on PATH
    #[error("required tool not found: {tool}")]
    MissingDependency {
        /// Binary name that could not be located
        tool: String,
    },

    /// Provider credentials are absent or invalid
    #[error("{provider} credentials missing or invalid: {message}")]
    AuthMissing { provider: Provider, message: String },

    /// A vendor CLI invocation returned non-zero
    #[error("{provider} command failed: {message}")]
    CommandFailed {
        provider: Provider,
        /// Trimmed stderr from the vendor CLI
        message: String,
        category: ErrorCategory,
    },

    /// Vendor CLI returned output we could not interpret
    #[error("could not parse {provider} output: {message}")]
    ParseFailure { provider: Provider, message: String },

    /// Image template failed validation
    #[error("template validation failed: {0}")]
    ValidationFailure(String),

    /// The image build itself returned non-zero
    #[error("build failed: {0}")]
    BuildFailure(String),

    /// A flag or value was rejected before any work started
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Get the category for skip/abort decisions.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::MissingDependency { .. } => ErrorCategory::CliMissing,
            Error::AuthMissing { .. } => ErrorCategory::Auth,
            Error::CommandFailed { category, .. } => *category,
            Error::ParseFailure { .. } => ErrorCategory::Parse,
            _ => ErrorCategory::Other,
        }
    }

    /// Whether this error should skip the provider instead of aborting.
    pub fn skips_provider(&self) -> bool {
        self.category().skips_provider()
    }

    /// Create an error from a failed vendor CLI invocation.
    ///
    /// Sniffs stderr for the well-known credential and not-found
    /// phrases each CLI emits so the caller gets a usable category.
    pub fn from_cli_stderr(provider: Provider, stderr: &str) -> Self {
        let lower = stderr.to_lowercase();
        let message = stderr.trim().to_string();

        let auth = lower.contains("unable to locate credentials")
            || lower.contains("invalidclienttokenid")
            || lower.contains("authfailure")
            || lower.contains("expiredtoken")
            || lower.contains("you do not currently have an active account")
            || lower.contains("please run 'az login'")
            || lower.contains("az login")
            || lower.contains("could not automatically determine credentials")
            || lower.contains("application default credentials");
        if auth {
            return Error::AuthMissing { provider, message };
        }

        let category = if lower.contains("notfound")
            || lower.contains("not found")
            || lower.contains("was not found")
            || lower.contains("does not exist")
            || lower.contains("could not be found")
        {
            ErrorCategory::NotFound
        } else if lower.contains("in use")
            || lower.contains("dependencyviolation")
            || lower.contains("resourceinuse")
            || lower.contains("being used")
        {
            ErrorCategory::InUse
        } else if lower.contains("unauthorizedoperation")
            || lower.contains("permission")
            || lower.contains("forbidden")
            || lower.contains("accessdenied")
        {
            ErrorCategory::Permission
        } else {
            ErrorCategory::Other
        };

        Error::CommandFailed {
            provider,
            message,
            category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aws_credentials_error_is_auth() {
        let err = Error::from_cli_stderr(
            Provider::Aws,
            "Unable to locate credentials. You can configure credentials by running \"aws configure\".",
        );
        assert_eq!(err.category(), ErrorCategory::Auth);
        assert!(err.skips_provider());
    }

    #[test]
    fn test_az_login_error_is_auth() {
        let err = Error::from_cli_stderr(
            Provider::Azure,
            "ERROR: Please run 'az login' to setup account.",
        );
        assert_eq!(err.category(), ErrorCategory::Auth);
    }

    #[test]
    fn test_dependency_violation_is_in_use() {
        let err = Error::from_cli_stderr(
            Provider::Aws,
            "An error occurred (DependencyViolation) when calling the DeleteSecurityGroup operation",
        );
        assert_eq!(err.category(), ErrorCategory::InUse);
        assert!(!err.skips_provider());
    }

    #[test]
    fn test_not_found_is_already_gone() {
        let err = Error::from_cli_stderr(
            Provider::Gcp,
            "ERROR: (gcloud.compute.images.delete) Could not fetch resource: The resource 'x' was not found",
        );
        assert!(err.category().is_already_gone());
    }

    #[test]
    fn test_build_tool_failures_abort_instead_of_skipping() {
        let validation = Error::ValidationFailure("image.pkr.hcl".to_string());
        assert_eq!(validation.category(), ErrorCategory::Other);
        assert!(!validation.skips_provider());

        let build = Error::BuildFailure("poc-nginx-image v1.0.0".to_string());
        assert!(!build.skips_provider());
        assert!(build.to_string().starts_with("build failed"));

        let arg = Error::InvalidArgument("image template not found".to_string());
        assert!(!arg.skips_provider());
    }

    #[test]
    fn test_missing_dependency_skips_provider() {
        let err = Error::MissingDependency {
            tool: "gcloud".to_string(),
        };
        assert!(err.skips_provider());
    }
}
