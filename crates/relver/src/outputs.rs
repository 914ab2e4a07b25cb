//! GitHub Actions step outputs.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the step output file
pub const GITHUB_OUTPUT_ENV: &str = "GITHUB_OUTPUT";

/// Sink for `name=value` step outputs.
///
/// Outputs are appended to the file named by `$GITHUB_OUTPUT`; outside of
/// Actions they are only logged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GithubOutput {
    path: Option<PathBuf>,
}

impl GithubOutput {
    /// Write to `path`, or only log when `None`.
    #[must_use]
    pub const fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Use `$GITHUB_OUTPUT` when it is set and non-empty.
    #[must_use]
    pub fn from_env() -> Self {
        let path = std::env::var_os(GITHUB_OUTPUT_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self { path }
    }

    /// Output file, if any
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Record one output. Write failures are logged, never fatal.
    pub fn set(&self, name: &str, value: &str) {
        match &self.path {
            Some(path) => {
                if let Err(e) = append_output(path, name, value) {
                    warn!(name, path = %path.display(), error = %e, "Failed to write step output");
                }
            }
            None => info!(name, value, "Output"),
        }
    }
}

fn append_output(path: &Path, name: &str, value: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{name}={value}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_appends_name_value_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("output");
        std::fs::write(&path, "existing=1\n").unwrap();

        let outputs = GithubOutput::new(Some(path.clone()));
        outputs.set("version", "1.3.0");
        outputs.set("pr_number", "42");

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "existing=1\nversion=1.3.0\npr_number=42\n"
        );
    }

    #[test]
    fn test_creates_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("output");

        GithubOutput::new(Some(path.clone())).set("version", "2.0.0");

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "version=2.0.0\n");
    }

    #[test]
    fn test_write_failure_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let outputs = GithubOutput::new(Some(dir.path().join("missing").join("output")));
        outputs.set("version", "1.0.0");
    }

    #[test]
    fn test_from_env() {
        temp_env::with_var(GITHUB_OUTPUT_ENV, Some("/tmp/gh-output"), || {
            assert_eq!(
                GithubOutput::from_env().path(),
                Some(Path::new("/tmp/gh-output"))
            );
        });
        temp_env::with_var(GITHUB_OUTPUT_ENV, Some(""), || {
            assert_eq!(GithubOutput::from_env().path(), None);
        });
        temp_env::with_var_unset(GITHUB_OUTPUT_ENV, || {
            assert_eq!(GithubOutput::from_env(), GithubOutput::default());
        });
    }
}
