//! helm-docs invocation and change discovery.
//!
//! Arguments come from workflow input, so every flag is checked against a
//! fixed allowlist before the process is spawned. After helm-docs runs, the
//! files it touched are discovered with `git status --porcelain`.

use miette::Diagnostic;
use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;
use tracing::{debug, info};

/// Flags helm-docs accepts, and whether each one takes a value.
const ALLOWED_FLAGS: &[(&str, bool)] = &[
    ("--chart-search-root", true),
    ("-c", true),
    ("--template-files", true),
    ("-t", true),
    ("--output-file", true),
    ("-o", true),
    ("--sort-values-order", true),
    ("-s", true),
    ("--values-file", true),
    ("-f", true),
    ("--ignore-file", true),
    ("-i", true),
    ("--skip-version-footer", false),
    ("--document-dependency-values", false),
    ("-u", false),
    ("--log-level", true),
    ("-l", true),
    ("--chart-to-generate", true),
    ("-g", true),
    ("--badge-style", true),
    ("--ignore-non-descriptions", false),
    ("--dry-run", false),
    ("-d", false),
];

/// Errors from validating or running helm-docs.
#[derive(Error, Debug, Diagnostic)]
pub enum HelmDocsError {
    /// A flag outside the allowlist
    #[error("helm-docs flag {flag:?} is not allowed")]
    #[diagnostic(
        code(relver::helm_docs::disallowed_flag),
        help("Allowed flags: --chart-search-root, --template-files, --output-file, --sort-values-order, --values-file, --ignore-file, --skip-version-footer, --document-dependency-values, --log-level, --chart-to-generate, --badge-style, --ignore-non-descriptions, --dry-run and their short forms")
    )]
    DisallowedFlag {
        /// The rejected flag
        flag: String,
    },

    /// A value-taking flag without a usable value
    #[error("helm-docs flag {flag} requires a value")]
    #[diagnostic(code(relver::helm_docs::missing_value))]
    MissingValue {
        /// The flag missing its value
        flag: String,
    },

    /// A bare token where a flag was expected
    #[error("unexpected helm-docs argument {arg:?}")]
    #[diagnostic(
        code(relver::helm_docs::unexpected_argument),
        help("helm-docs takes flags only; pass values as --flag=value or --flag value")
    )]
    UnexpectedArgument {
        /// The stray token
        arg: String,
    },

    /// A process could not be started or exited unsuccessfully
    #[error("{program} failed: {message}")]
    #[diagnostic(code(relver::helm_docs::command))]
    Command {
        /// Program that failed
        program: String,
        /// Exit status or spawn error
        message: String,
    },
}

/// Split `raw` on whitespace and check every flag against the allowlist.
///
/// Returns the validated argument vector, empty when `raw` is blank.
///
/// # Errors
///
/// Returns an error for unknown flags, stray positional arguments, or
/// value-taking flags whose value is missing or looks like another flag.
pub fn validate_args(raw: &str) -> Result<Vec<String>, HelmDocsError> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    let mut args = Vec::with_capacity(tokens.len());
    let mut iter = tokens.into_iter();

    while let Some(token) = iter.next() {
        if !token.starts_with('-') {
            return Err(HelmDocsError::UnexpectedArgument {
                arg: token.to_string(),
            });
        }

        let (flag, inline_value) = match token.split_once('=') {
            Some((flag, value)) => (flag, Some(value)),
            None => (token, None),
        };

        let Some(&(_, takes_value)) = ALLOWED_FLAGS.iter().find(|(name, _)| *name == flag) else {
            return Err(HelmDocsError::DisallowedFlag {
                flag: flag.to_string(),
            });
        };

        args.push(token.to_string());

        if !takes_value || inline_value.is_some() {
            if takes_value && inline_value.is_some_and(str::is_empty) {
                return Err(HelmDocsError::MissingValue {
                    flag: flag.to_string(),
                });
            }
            continue;
        }

        match iter.next() {
            Some(value) if !value.starts_with('-') => args.push(value.to_string()),
            _ => {
                return Err(HelmDocsError::MissingValue {
                    flag: flag.to_string(),
                });
            }
        }
    }

    Ok(args)
}

/// Runs helm-docs and reports which files changed.
pub trait HelmDocsRunner: Send + Sync {
    /// Run helm-docs with already validated `args`.
    ///
    /// Returns the repository-relative paths reported as modified afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if helm-docs or git cannot be run or exit non-zero.
    fn run(&self, args: &[String]) -> Result<Vec<PathBuf>, HelmDocsError>;
}

/// [`HelmDocsRunner`] that spawns `helm-docs` and `git` from `PATH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessHelmDocs;

impl HelmDocsRunner for ProcessHelmDocs {
    fn run(&self, args: &[String]) -> Result<Vec<PathBuf>, HelmDocsError> {
        info!(args = ?args, "Running helm-docs");
        let status = Command::new("helm-docs")
            .args(args)
            .status()
            .map_err(|e| HelmDocsError::Command {
                program: "helm-docs".to_string(),
                message: e.to_string(),
            })?;
        if !status.success() {
            return Err(HelmDocsError::Command {
                program: "helm-docs".to_string(),
                message: status.to_string(),
            });
        }

        let output = Command::new("git")
            .args(["status", "--porcelain"])
            .output()
            .map_err(|e| HelmDocsError::Command {
                program: "git status".to_string(),
                message: e.to_string(),
            })?;
        if !output.status.success() {
            return Err(HelmDocsError::Command {
                program: "git status".to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let files = parse_porcelain(&String::from_utf8_lossy(&output.stdout));
        debug!(count = files.len(), "Files modified after helm-docs");
        Ok(files)
    }
}

/// Extract file paths from `git status --porcelain` (v1) output.
///
/// Renames report their destination. Quoted paths are unquoted.
#[must_use]
pub fn parse_porcelain(output: &str) -> Vec<PathBuf> {
    output
        .lines()
        .filter_map(|line| {
            let line = line.trim_end();
            // "XY path": two status columns and a space
            let path = line.get(3..)?.trim();
            if path.is_empty() {
                return None;
            }
            let path = path.rsplit_once(" -> ").map_or(path, |(_, to)| to);
            let path = path
                .strip_prefix('"')
                .and_then(|p| p.strip_suffix('"'))
                .unwrap_or(path);
            Some(PathBuf::from(path))
        })
        .collect()
}
