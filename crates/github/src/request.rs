//! Pull request inputs and outputs.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything needed to open a release pull request.
///
/// All fields except `body` are required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrRequest {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Branch the PR merges into (e.g. "main")
    pub base_branch: String,
    /// Branch created to carry the release commit
    pub head_branch: String,
    /// PR title
    pub title: String,
    /// PR description (markdown)
    pub body: String,
    /// Repository-relative files to commit to the head branch
    pub files: Vec<PathBuf>,
}

impl PrRequest {
    /// Check that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] naming the first missing field.
    pub fn validate(&self) -> Result<()> {
        let required = [
            (&self.owner, "owner is required"),
            (&self.repo, "repo is required"),
            (&self.base_branch, "base branch is required"),
            (&self.head_branch, "head branch is required"),
            (&self.title, "title is required"),
        ];
        if let Some((_, message)) = required.iter().find(|(value, _)| value.is_empty()) {
            return Err(Error::invalid_request(*message));
        }
        if self.files.is_empty() {
            return Err(Error::invalid_request("at least one file is required"));
        }
        Ok(())
    }
}

/// The pull request that was opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrResult {
    /// PR number
    pub number: u64,
    /// Browser URL of the PR
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> PrRequest {
        PrRequest {
            owner: "stacklok".to_string(),
            repo: "toolhive".to_string(),
            base_branch: "main".to_string(),
            head_branch: "release/v1.0.0".to_string(),
            title: "Release v1.0.0".to_string(),
            body: String::new(),
            files: vec![PathBuf::from("VERSION")],
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_body_is_optional() {
        let req = PrRequest {
            body: String::new(),
            ..valid()
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_missing_fields() {
        let cases: [(fn(&mut PrRequest), &str); 6] = [
            (|r| r.owner.clear(), "owner is required"),
            (|r| r.repo.clear(), "repo is required"),
            (|r| r.base_branch.clear(), "base branch is required"),
            (|r| r.head_branch.clear(), "head branch is required"),
            (|r| r.title.clear(), "title is required"),
            (|r| r.files.clear(), "at least one file is required"),
        ];

        for (clear, expected) in cases {
            let mut req = valid();
            clear(&mut req);
            let err = req.validate().unwrap_err();
            assert!(
                err.to_string().contains(expected),
                "expected {expected:?}, got {err}"
            );
        }
    }

    #[test]
    fn test_first_missing_field_reported() {
        let err = PrRequest::default().validate().unwrap_err();
        assert!(err.to_string().contains("owner is required"));
    }
}
