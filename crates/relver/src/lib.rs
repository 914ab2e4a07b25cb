//! relver: release pull request automation.
//!
//! Bumps the canonical `VERSION`, moves every declared copy of the version in
//! YAML files to the new value without reformatting them, optionally runs
//! helm-docs, and opens a pull request with the result.
//!
//! The binary is a thin wrapper; the pieces live here so they can be tested
//! with fakes:
//!
//! - [`cli`] - flags, error type, exit codes and error rendering
//! - [`config`] - validated [`config::ReleaseConfig`]
//! - [`release`] - the pipeline and its [`release::Dependencies`]
//! - [`helm_docs`] - helm-docs argument allowlist and change discovery
//! - [`outputs`] - GitHub Actions step outputs
//! - [`pr_body`] - pull request description
//! - [`tracing`] - subscriber setup

pub mod cli;
pub mod config;
pub mod helm_docs;
pub mod outputs;
pub mod pr_body;
pub mod release;
pub mod tracing;

pub use cli::{Cli, CliError};
pub use config::ReleaseConfig;
pub use release::{Dependencies, ReleaseOutcome};
