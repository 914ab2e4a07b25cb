//! GitHub integration for relver.
//!
//! Opens the pull request that carries a release: a `release/v<version>`
//! branch cut from the base branch, one commit per updated file, and a PR
//! labelled `release`.
//!
//! - [`PrCreator`] is the seam the release pipeline depends on
//! - [`GitHubClient`] implements it with octocrab
//! - [`FileReader`] supplies file contents and can be swapped in tests

#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod request;

pub use client::{FileReader, FsFileReader, GitHubClient, PrCreator, RELEASE_LABEL};
pub use error::{Error, Result};
pub use request::{PrRequest, PrResult};
