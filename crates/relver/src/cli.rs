//! Command-line surface: flags, error type, exit codes and rendering.

use crate::tracing::{LogLevel, TracingFormat};
use clap::Parser;
use miette::{Diagnostic, Report};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Successful execution exit code
pub const EXIT_OK: i32 = 0;
/// CLI or configuration error exit code
pub const EXIT_CLI: i32 = 2;
/// Release pipeline failure exit code
pub const EXIT_RELEASE: i32 = 3;

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum CliError {
    /// CLI or configuration error (exit code 2)
    #[error("CLI/configuration error: {message}")]
    #[diagnostic(code(relver::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Release pipeline failure (exit code 3)
    #[error("Release failed: {message}")]
    #[diagnostic(code(relver::cli::release))]
    Release {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Other unexpected error (exit code 3)
    #[error("Unexpected error: {message}")]
    #[diagnostic(code(relver::cli::other))]
    Other {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new configuration error with help text
    #[must_use]
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a new release failure
    #[must_use]
    pub fn release(message: impl Into<String>) -> Self {
        Self::Release {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new other error
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            help: None,
        }
    }

    /// Add help text to an existing error, returning a new error with the help text set.
    #[must_use]
    pub fn with_help(self, help_text: impl Into<String>) -> Self {
        let help = Some(help_text.into());
        match self {
            Self::Config { message, .. } => Self::Config { message, help },
            Self::Release { message, .. } => Self::Release { message, help },
            Self::Other { message, .. } => Self::Other { message, help },
        }
    }

    /// Wrap a library error as a release failure, prefixing `context`.
    ///
    /// The diagnostic help of the source error is kept.
    #[must_use]
    pub fn release_from(context: &str, err: &(dyn Diagnostic + Send + Sync)) -> Self {
        Self::Release {
            message: format!("{context}: {err}"),
            help: err.help().map(|h| h.to_string()),
        }
    }
}

impl From<relver_release::Error> for CliError {
    fn from(err: relver_release::Error) -> Self {
        let help = err.help().map(|h| h.to_string());
        match err {
            relver_release::Error::InvalidBumpType { .. }
            | relver_release::Error::InvalidTargets { .. }
            | relver_release::Error::PathGuard { .. } => Self::Config {
                message: err.to_string(),
                help,
            },
            _ => Self::Release {
                message: err.to_string(),
                help,
            },
        }
    }
}

impl From<relver_github::Error> for CliError {
    fn from(err: relver_github::Error) -> Self {
        let help = err.help().map(|h| h.to_string());
        match err {
            relver_github::Error::Auth { .. } => Self::Config {
                message: err.to_string(),
                help,
            },
            _ => Self::Release {
                message: err.to_string(),
                help,
            },
        }
    }
}

/// Map an error to the process exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Config { .. } => EXIT_CLI,
        CliError::Release { .. } | CliError::Other { .. } => EXIT_RELEASE,
    }
}

/// Render error appropriately based on JSON mode
#[allow(clippy::print_stdout, clippy::print_stderr)]
pub fn render_error(err: &CliError, json_mode: bool) {
    if json_mode {
        let error_envelope = ErrorEnvelope::new(serde_json::json!({
            "code": match err {
                CliError::Config { .. } => "config",
                CliError::Release { .. } => "release",
                CliError::Other { .. } => "other",
            },
            "message": err.to_string()
        }));

        match serde_json::to_string(&error_envelope) {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("Error serializing error response"),
        }
    } else {
        let report = Report::new(err.clone());
        eprintln!("{report:?}");
        let _ = io::stderr().flush();
    }
}

/// Success response envelope for JSON output
#[derive(Debug, Clone, Serialize)]
pub struct OkEnvelope<T> {
    /// Status indicator - always "ok" for success
    pub status: &'static str,
    /// The actual data payload
    pub data: T,
}

impl<T> OkEnvelope<T> {
    /// Create a new success envelope
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self { status: "ok", data }
    }
}

/// Error response envelope for JSON output
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope<E> {
    /// Status indicator - always "error" for failures
    pub status: &'static str,
    /// The error details
    pub error: E,
}

impl<E> ErrorEnvelope<E> {
    /// Create a new error envelope
    #[must_use]
    pub const fn new(error: E) -> Self {
        Self {
            status: "error",
            error,
        }
    }
}

/// Bump VERSION, update version fields in YAML files, and open a release pull request.
///
/// Every flag can also be supplied through its environment variable, which is
/// how the GitHub Action passes its inputs.
#[derive(Parser, Debug, Clone)]
#[command(name = "relver", version, about, long_about = None)]
pub struct Cli {
    /// Version component to bump: major, minor or patch
    #[arg(long, env = "RELVER_BUMP_TYPE", value_name = "TYPE")]
    pub bump_type: Option<String>,

    /// Path to the plain-text version file
    #[arg(long, env = "RELVER_VERSION_FILE", default_value = "VERSION")]
    pub version_file: PathBuf,

    /// Arguments passed to helm-docs; helm-docs is skipped when empty
    #[arg(long, env = "RELVER_HELM_DOCS_ARGS", value_name = "ARGS")]
    pub helm_docs_args: Option<String>,

    /// JSON array of YAML targets: [{"file": ..., "path": ..., "prefix": ...}]
    #[arg(long, env = "RELVER_VERSION_FILES", value_name = "JSON")]
    pub version_files: Option<String>,

    /// GitHub token used to open the pull request
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Repository in owner/name form
    #[arg(long, env = "GITHUB_REPOSITORY", value_name = "OWNER/REPO")]
    pub repository: Option<String>,

    /// Branch the release pull request targets
    #[arg(long, env = "RELVER_BASE_BRANCH", default_value = "main")]
    pub base_branch: String,

    /// Apply file changes locally but do not open a pull request
    #[arg(long, env = "RELVER_DRY_RUN")]
    pub dry_run: bool,

    /// Log level for relver's own output
    #[arg(
        short = 'L',
        long,
        env = "RELVER_LOG_LEVEL",
        default_value = "info",
        value_enum
    )]
    pub level: LogLevel,

    /// Log and result format; `json` also prints a JSON result envelope on stdout
    #[arg(long, env = "RELVER_LOG_FORMAT", default_value = "compact", value_enum)]
    pub format: TracingFormat,
}

impl Cli {
    /// Whether results and errors are printed as JSON envelopes
    #[must_use]
    pub fn json_mode(&self) -> bool {
        self.format == TracingFormat::Json
    }
}

/// Parse command-line arguments, exiting with a usage error on failure
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
