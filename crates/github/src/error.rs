//! Error types for GitHub operations.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for GitHub operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while opening a release pull request.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The pull request description is incomplete.
    #[error("invalid PR request: {message}")]
    #[diagnostic(code(relver::github::invalid_request))]
    InvalidRequest {
        /// Which field is missing
        message: String,
    },

    /// Authentication material is missing or rejected.
    #[error("GitHub authentication failed: {message}")]
    #[diagnostic(
        code(relver::github::auth),
        help("Pass --token or set GITHUB_TOKEN to a token with contents and pull-requests write access")
    )]
    Auth {
        /// The error message
        message: String,
    },

    /// A GitHub API call failed.
    #[error("{operation}: {message}")]
    #[diagnostic(code(relver::github::api))]
    Api {
        /// What was being attempted (e.g. "creating branch")
        operation: String,
        /// The error reported by the API client
        message: String,
    },

    /// A local file to commit could not be read.
    #[error("reading file {}: {source}", .path.display())]
    #[diagnostic(code(relver::github::io))]
    Io {
        /// The file being committed
        path: PathBuf,
        /// The underlying source error
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a new invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a new authentication error.
    #[must_use]
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create a new API error for `operation`.
    #[must_use]
    pub fn api(operation: impl Into<String>, message: impl ToString) -> Self {
        Self::Api {
            operation: operation.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_request_display() {
        let err = Error::invalid_request("owner is required");
        assert_eq!(err.to_string(), "invalid PR request: owner is required");
    }

    #[test]
    fn test_api_display() {
        let err = Error::api("creating branch", "Reference already exists");
        assert_eq!(err.to_string(), "creating branch: Reference already exists");
    }

    #[test]
    fn test_auth_has_help() {
        let err = Error::auth("token is required");
        assert!(err.help().is_some());
        assert!(err.to_string().contains("token is required"));
    }
}
