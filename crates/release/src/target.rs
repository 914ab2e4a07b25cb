//! Declared version locations inside YAML files.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A (file, path) pair naming one version value to keep in sync.
///
/// Deserializes from the `--version-files` JSON form:
///
/// ```json
/// {"file": "charts/app/values.yaml", "path": "image.tag", "prefix": "v"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionFileTarget {
    /// YAML file to update, relative to the working directory.
    pub file: PathBuf,
    /// Dot/bracket address of the value inside the file.
    pub path: String,
    /// Literal placed before the version in this file (e.g. `v`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub prefix: String,
}

impl VersionFileTarget {
    /// Create a target without a prefix.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, path: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            path: path.into(),
            prefix: String::new(),
        }
    }

    /// Set the version prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// The file as a path.
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }
}

/// Parse a JSON array of targets.
///
/// An empty or whitespace-only string yields no targets.
///
/// # Errors
///
/// Returns [`Error::InvalidTargets`] when the JSON is malformed or an entry
/// has an empty `file` or `path`.
pub fn parse_targets(json: &str) -> Result<Vec<VersionFileTarget>> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }

    let targets: Vec<VersionFileTarget> =
        serde_json::from_str(json).map_err(|e| Error::invalid_targets(e.to_string()))?;

    for (i, target) in targets.iter().enumerate() {
        if target.file.as_os_str().is_empty() {
            return Err(Error::invalid_targets(format!("entry {i}: file is required")));
        }
        if target.path.is_empty() {
            return Err(Error::invalid_targets(format!(
                "entry {i} ({}): path is required",
                target.file.display()
            )));
        }
    }

    Ok(targets)
}
